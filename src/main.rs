//! news-haiku: turn live news headlines into three-line poems, in the terminal.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌─────────────┐ PipelineEvent ┌──────────┐  draw()  ┌──────────┐
//! │ dispatch.rs │ ────────────► │  app.rs  │ ───────► │  ui.rs   │
//! │  (tasks)    │   (channel)   │ (state)  │          │ (render) │
//! └─────────────┘               └──────────┘          └──────────┘
//!        ▲                           ▲
//!        │ Effect                    │ handle_key_event()
//!        └──────── main loop ◄── ┌──────────┐
//!                                │ input.rs │
//!                                └──────────┘
//! ```
//!
//! * **`source/`**: the `HeadlineSource` / `PoemSource` traits with Google
//!   News RSS and Gemini implementations.
//! * **`cache`**: one pool of headlines, reused for ten minutes.
//! * **`pipeline`**: the rate-limited generate cycle.
//! * **`animator`** / **`sound`**: typewriter reveal with optional ticks.
//! * **`store/`**: history, favorites and preferences on disk.
//! * **`app`**, **`ui`**, **`input`**: state, rendering and key handling.
//! * **`main`**: wires everything together: parse args, set up logging and
//!   the terminal, and run the event loop.

mod animator;
mod app;
mod cache;
mod config;
mod dispatch;
mod indicator;
mod input;
mod locale;
mod pipeline;
mod share;
mod sound;
mod source;
mod store;
mod ui;

#[cfg(test)]
mod testing;

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::EnvFilter;

use animator::Animator;
use app::{App, Effect};
use cache::HeadlineCache;
use config::Cli;
use dispatch::EventSender;
use pipeline::Generator;
use share::{SystemBrowser, SystemClipboard};
use source::{GeminiPoet, GoogleNewsSource};
use store::{FileStore, Library, MemoryStore, Preferences, Storage};

const HTTP_TIMEOUT: Duration = Duration::from_secs(20);
const TICK_RATE: Duration = Duration::from_millis(100);

// ---------------------------------------------------------------------------
// RAII terminal guard
// ---------------------------------------------------------------------------

/// Raw mode and the alternate screen for as long as this value lives.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Restore the terminal before the default hook prints the panic.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(info);
    }));
}

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

/// Log to `news-haiku.log` in the data directory. Stdout belongs to the TUI,
/// so without a data directory logging stays off.
fn init_logging(level: &str, data_dir: Option<&Path>) -> Result<()> {
    let Some(dir) = data_dir else {
        return Ok(());
    };
    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating data directory {}", dir.display()))?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("news-haiku.log"))
        .context("opening log file")?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("news_haiku={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .init();
    Ok(())
}

fn open_store(data_dir: Option<&Path>) -> Arc<dyn Storage> {
    if let Some(dir) = data_dir {
        match FileStore::open(dir) {
            Ok(store) => {
                tracing::info!(dir = %store.dir().display(), "using data directory");
                return Arc::new(store);
            }
            Err(e) => tracing::warn!(dir = %dir.display(), error = %e, "data directory unusable"),
        }
    }
    tracing::warn!("history and preferences will not be saved");
    Arc::new(MemoryStore::new())
}

fn spawn_effect(generator: &Arc<Generator>, effect: Effect, tx: &EventSender) {
    match effect {
        Effect::Generate(request) => {
            dispatch::spawn_generation(Arc::clone(generator), request, tx.clone());
        }
        Effect::Prefetch {
            category,
            country,
            announcement,
        } => {
            dispatch::spawn_prefetch(
                Arc::clone(generator),
                category,
                country,
                Some(announcement),
                tx.clone(),
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let data_dir = cli.data_dir();
    if let Err(e) = init_logging(&cli.log_level, data_dir.as_deref()) {
        eprintln!("news-haiku: logging disabled: {e:#}");
    }
    install_panic_hook();

    // -- collaborators -------------------------------------------------------
    let client = reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .user_agent(concat!("news-haiku/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("building HTTP client")?;

    let api_key = cli.api_key();
    if api_key.is_none() {
        tracing::warn!("no Gemini API key; every poem request will fail");
    }
    let headlines = Arc::new(GoogleNewsSource::new(cli.feed_base.clone(), client.clone()));
    let poet = Arc::new(GeminiPoet::new(
        cli.endpoint.clone(),
        cli.model.clone(),
        api_key,
        client,
    ));

    let store = open_store(data_dir.as_deref());
    let prefs = Preferences::load(Arc::clone(&store));
    let library = Arc::new(Library::load(store));
    let sound_on = Arc::new(AtomicBool::new(*prefs.sound.get()));

    let generator = Arc::new(Generator::new(
        Arc::new(HeadlineCache::new(headlines)),
        poet,
        Animator::new(sound::default_beeper(), Arc::clone(&sound_on), cli.reduce_motion),
        Arc::clone(&library),
    ));

    let mut app = App::new(
        prefs,
        library,
        sound_on,
        Box::new(SystemClipboard::default()),
        Box::new(SystemBrowser),
    );
    let (tx, mut rx) = dispatch::channel();

    // Warm the pool for the stored selection so the first generate is quick.
    let warm = app.request();
    dispatch::spawn_prefetch(
        Arc::clone(&generator),
        warm.category,
        warm.country,
        None,
        tx.clone(),
    );
    tracing::info!(category = %warm.category, "news-haiku started");

    // -- terminal setup (Drop restores on exit or panic) ---------------------
    let mut guard = TerminalGuard::new()?;

    // -- main event loop -----------------------------------------------------
    // Each tick: apply task events, render, then wait up to TICK_RATE for a
    // key. Crossterm's poll blocks the runtime thread it runs on; the
    // multi-threaded runtime keeps the tasks moving meanwhile.
    loop {
        while let Ok(msg) = rx.try_recv() {
            app.apply(msg);
        }
        app.revealing = generator.is_revealing();
        app.expire_notification(Instant::now());

        guard.terminal.draw(|f| ui::draw(&mut app, f))?;

        if event::poll(TICK_RATE)? {
            if let Event::Key(key) = event::read()? {
                if let Some(effect) = input::handle_key_event(&mut app, key) {
                    spawn_effect(&generator, effect, &tx);
                }
            }
        }

        if app.quit {
            break;
        }
    }

    tracing::info!("news-haiku exiting");
    // `guard` is dropped here, restoring the terminal.
    Ok(())
}

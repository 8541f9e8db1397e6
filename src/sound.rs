//! Typing-tick output.
//!
//! The animator only knows the [`Beeper`] trait. The default build rings the
//! terminal bell; with the `audio` feature a short sine tone is synthesized
//! on a dedicated thread, since rodio's output stream is neither `Send` nor
//! `Sync`.

use std::io::Write;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Shortest gap between two terminal bells.
pub const BELL_INTERVAL: Duration = Duration::from_millis(150);

/// One short tone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub frequency_hz: f32,
    pub duration: Duration,
    /// Linear gain, 0.0–1.0.
    pub volume: f32,
}

/// Plays ticks. Must never block the caller for longer than it takes to
/// queue the sound.
pub trait Beeper: Send + Sync {
    fn beep(&self, tone: Tone);
}

/// Discards every tone.
pub struct Silent;

impl Beeper for Silent {
    fn beep(&self, _tone: Tone) {}
}

/// Rings the terminal bell; pitch and length are ignored.
///
/// Rings at most once per [`BELL_INTERVAL`] and writes to stderr, so bells
/// never land inside a frame the UI is writing to stdout.
#[derive(Default)]
pub struct TerminalBell {
    last_rung: Mutex<Option<Instant>>,
}

impl TerminalBell {
    /// Whether a bell may ring at `now`; stamps the time when it may.
    fn admit(&self, now: Instant) -> bool {
        let mut last = self.last_rung.lock();
        if last.is_some_and(|prev| now.duration_since(prev) < BELL_INTERVAL) {
            return false;
        }
        *last = Some(now);
        true
    }
}

impl Beeper for TerminalBell {
    fn beep(&self, _tone: Tone) {
        if !self.admit(Instant::now()) {
            return;
        }
        let mut stderr = std::io::stderr().lock();
        let _ = stderr.write_all(b"\x07");
        let _ = stderr.flush();
    }
}

#[cfg(feature = "audio")]
pub use synth::SineBeeper;

#[cfg(feature = "audio")]
mod synth {
    use std::sync::mpsc;
    use std::thread;

    use rodio::source::{SineWave, Source};

    use super::{Beeper, Tone};

    /// Sine ticks through the default output device.
    pub struct SineBeeper {
        tx: mpsc::SyncSender<Tone>,
    }

    impl SineBeeper {
        /// Spawn the audio thread. Returns `None` if it cannot be started;
        /// a missing output device only shows up later as silence.
        pub fn spawn() -> Option<Self> {
            // Bounded so a burst of ticks cannot pile up behind a slow device.
            let (tx, rx) = mpsc::sync_channel::<Tone>(32);
            thread::Builder::new()
                .name("news-haiku-audio".to_string())
                .spawn(move || {
                    let output = match rodio::OutputStream::try_default() {
                        Ok(output) => output,
                        Err(e) => {
                            tracing::debug!(error = %e, "no audio output, ticks disabled");
                            return;
                        }
                    };
                    let (_stream, handle) = output;
                    while let Ok(tone) = rx.recv() {
                        let source = SineWave::new(tone.frequency_hz)
                            .take_duration(tone.duration)
                            .amplify(tone.volume);
                        if let Err(e) = handle.play_raw(source.convert_samples()) {
                            tracing::debug!(error = %e, "failed to play tick");
                        }
                    }
                })
                .map_err(|e| tracing::warn!(error = %e, "failed to spawn audio thread"))
                .ok()?;
            Some(Self { tx })
        }
    }

    impl Beeper for SineBeeper {
        fn beep(&self, tone: Tone) {
            // Drop the tick rather than wait when the queue is full.
            let _ = self.tx.try_send(tone);
        }
    }
}

/// The best available beeper for this build.
pub fn default_beeper() -> std::sync::Arc<dyn Beeper> {
    #[cfg(feature = "audio")]
    if let Some(beeper) = SineBeeper::spawn() {
        return std::sync::Arc::new(beeper);
    }
    std::sync::Arc::new(TerminalBell::default())
}

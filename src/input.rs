//! Keyboard input handling.
//!
//! Maps terminal key events to [`App`] actions. Most actions mutate the app
//! directly; the ones that need the runtime come back as an [`Effect`] for
//! the main loop to spawn.
//!
//! ## For contributors
//!
//! To add a new keybinding:
//!
//! 1. Add a method on [`App`] for the action (if one doesn't exist).
//! 2. Add a match arm in [`handle_overlay_key`] or [`handle_main_key`].
//! 3. Update the help line in [`crate::ui`].

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::app::{App, Effect, Overlay};

/// Process a single key event.
///
/// Only reacts to key-press events (ignoring release / repeat) so that each
/// physical keypress triggers exactly one action. Letters are matched case
/// insensitively.
pub fn handle_key_event(app: &mut App, key: KeyEvent) -> Option<Effect> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    let code = match key.code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    };

    if app.overlay != Overlay::None {
        handle_overlay_key(app, code);
        return None;
    }
    handle_main_key(app, code)
}

fn handle_overlay_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc | KeyCode::Char('q') => app.close_overlay(),
        KeyCode::Char('h') if app.overlay == Overlay::History => app.close_overlay(),
        KeyCode::Char('v') if app.overlay == Overlay::Favorites => app.close_overlay(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),
        KeyCode::Char('c') => app.copy_selected(),
        KeyCode::Char('o') | KeyCode::Enter => app.open_selected(),
        KeyCode::Char('f') => app.favorite_selected(),
        KeyCode::Char('d') | KeyCode::Delete => app.remove_selected(),
        _ => {}
    }
}

fn handle_main_key(app: &mut App, code: KeyCode) -> Option<Effect> {
    match code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit = true,
        KeyCode::Char('n') | KeyCode::Enter | KeyCode::Char(' ') => {
            return Some(Effect::Generate(app.request()))
        }
        KeyCode::Char('c') => app.copy_current(),
        KeyCode::Char('s') => app.toggle_sound(),
        KeyCode::Char('t') => app.toggle_theme(),
        KeyCode::Char('f') => app.toggle_favorite_current(),
        KeyCode::Char('w') => app.share_tweet(),
        KeyCode::Char('b') => app.share_facebook(),
        KeyCode::Char('h') => app.open_overlay(Overlay::History),
        KeyCode::Char('v') => app.open_overlay(Overlay::Favorites),
        KeyCode::Char('l') => app.cycle_language(),
        KeyCode::Char(']') | KeyCode::Right => return app.step_category(true),
        KeyCode::Char('[') | KeyCode::Left => return app.step_category(false),
        KeyCode::Char('>') | KeyCode::Char('.') => return app.step_country(1),
        KeyCode::Char('<') | KeyCode::Char(',') => return app.step_country(-1),
        _ => {}
    }
    None
}

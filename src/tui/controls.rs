//! Keyboard input handling for the TUI.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::runtime::App;

/// Wind speed step for `w` / `W`, in m/s.
const WIND_STEP_MS: f64 = 1.0;

/// Maps a key event to an application action.
///
/// Guards on [`KeyEventKind::Press`] to avoid double-fire on some terminals.
pub fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit = true,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit = true,
        KeyCode::Char(' ') => app.toggle_pause(),
        KeyCode::Char('+' | '=') | KeyCode::Right => app.speed_up(),
        KeyCode::Char('-') | KeyCode::Left => app.speed_down(),
        KeyCode::Char('s') => app.storm(),
        KeyCode::Char('c') => app.calm(),
        KeyCode::Char('i') => app.toggle_industrial(),
        KeyCode::Char('w') => app.adjust_wind(-WIND_STEP_MS),
        KeyCode::Char('W') => app.adjust_wind(WIND_STEP_MS),
        KeyCode::Char('r') => app.reset(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyEventState;

    use super::*;
    use crate::config::ScenarioConfig;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn app() -> App {
        App::new(&ScenarioConfig::baseline(), "baseline").expect("baseline is valid")
    }

    #[test]
    fn plain_c_is_calm_but_ctrl_c_quits() {
        let mut app = app();
        handle_key(&mut app, press(KeyCode::Char('c'), KeyModifiers::NONE));
        assert!(!app.quit);
        assert!(app.wind_speed() < 2.0);

        handle_key(&mut app, press(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.quit);
    }

    #[test]
    fn wind_keys_step_by_one() {
        let mut app = app();
        let start = app.wind_speed();
        handle_key(&mut app, press(KeyCode::Char('W'), KeyModifiers::SHIFT));
        assert!((app.wind_speed() - (start + 1.0)).abs() < 1e-9);
        handle_key(&mut app, press(KeyCode::Char('w'), KeyModifiers::NONE));
        assert!((app.wind_speed() - start).abs() < 1e-9);
    }

    #[test]
    fn release_events_are_ignored() {
        let mut app = app();
        let mut key = press(KeyCode::Char(' '), KeyModifiers::NONE);
        key.kind = KeyEventKind::Release;
        handle_key(&mut app, key);
        assert!(!app.paused);
    }
}

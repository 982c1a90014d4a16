use ratatui::crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
};

use crate::action::Action;
use crate::app::InputMode;

/// Map a crossterm terminal event to a TUI action, respecting input mode.
pub fn map_event(event: &Event, input_mode: &InputMode) -> Action {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
            // Ctrl+C always quits regardless of mode
            if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                return Action::Quit;
            }

            match input_mode {
                InputMode::Normal => map_key_normal(key),
                InputMode::TextInput => map_key_text_input(key),
            }
        }
        Event::Mouse(mouse) => map_mouse(mouse),
        Event::Resize(w, h) => Action::Resize(*w, *h),
        _ => Action::None,
    }
}

fn map_mouse(mouse: &MouseEvent) -> Action {
    match mouse.kind {
        MouseEventKind::ScrollDown => Action::ScrollDown,
        MouseEventKind::ScrollUp => Action::ScrollUp,
        _ => Action::None,
    }
}

fn map_key_normal(key: &KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Char('j') | KeyCode::Down | KeyCode::Tab => Action::MoveDown,
        KeyCode::Char('k') | KeyCode::Up | KeyCode::BackTab => Action::MoveUp,
        KeyCode::Char('h') | KeyCode::Left => Action::Decrease,
        KeyCode::Char('l') | KeyCode::Right => Action::Increase,
        KeyCode::Char('H') => Action::DecreaseMore,
        KeyCode::Char('L') => Action::IncreaseMore,
        KeyCode::Enter | KeyCode::Char(' ') => Action::Activate,
        KeyCode::Esc => Action::NavigateBack,
        KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::SaveConfig,
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::PageDown,
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::PageUp,
        KeyCode::Char('J') => Action::ScrollDown,
        KeyCode::Char('K') => Action::ScrollUp,
        KeyCode::Char('r') => Action::Reload,
        KeyCode::Char('?') => Action::ToggleHelp,
        KeyCode::PageDown => Action::PageDown,
        KeyCode::PageUp => Action::PageUp,
        KeyCode::Char('g') | KeyCode::Home => Action::GoTop,
        KeyCode::Char('G') | KeyCode::End => Action::GoBottom,
        _ => Action::None,
    }
}

fn map_key_text_input(key: &KeyEvent) -> Action {
    match key.code {
        KeyCode::Esc => Action::SearchCancel,
        KeyCode::Enter => Action::SearchConfirm,
        KeyCode::Left => Action::CursorLeft,
        KeyCode::Right => Action::CursorRight,
        KeyCode::Home => Action::CursorHome,
        KeyCode::End => Action::CursorEnd,
        KeyCode::Char(c) => Action::SearchInput(c),
        KeyCode::Backspace => Action::SearchInput('\x08'), // sentinel for backspace
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn ctrl_c_quits_in_every_mode() {
        let evt = press(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_event(&evt, &InputMode::Normal), Action::Quit);
        assert_eq!(map_event(&evt, &InputMode::TextInput), Action::Quit);
    }

    #[test]
    fn letters_are_text_while_editing() {
        let evt = press(KeyCode::Char('q'), KeyModifiers::NONE);
        assert_eq!(map_event(&evt, &InputMode::Normal), Action::Quit);
        assert_eq!(
            map_event(&evt, &InputMode::TextInput),
            Action::SearchInput('q')
        );
    }

    #[test]
    fn ctrl_s_saves_config() {
        let evt = press(KeyCode::Char('s'), KeyModifiers::CONTROL);
        assert_eq!(map_event(&evt, &InputMode::Normal), Action::SaveConfig);
    }

    #[test]
    fn backspace_maps_to_sentinel() {
        let evt = press(KeyCode::Backspace, KeyModifiers::NONE);
        assert_eq!(
            map_event(&evt, &InputMode::TextInput),
            Action::SearchInput('\x08')
        );
    }
}

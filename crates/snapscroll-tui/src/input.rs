use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Input action that can be performed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    WheelDown,
    WheelUp,
    FocusNext,     // Tab: focus moves into the next section
    FocusPrevious, // Shift+Tab
    SnapNext,
    SnapPrevious,
    SnapTo(usize), // 1-9, zero-based here
    Reset,
    None,
}

/// Handle a key event and return the corresponding action
pub fn handle_key_event(key: KeyEvent) -> Action {
    match (key.code, key.modifiers) {
        // Quit
        (KeyCode::Char('q'), KeyModifiers::NONE) => Action::Quit,
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Action::Quit,

        // Wheel-equivalent gestures
        (KeyCode::Char('j'), KeyModifiers::NONE) => Action::WheelDown,
        (KeyCode::Char('k'), KeyModifiers::NONE) => Action::WheelUp,
        (KeyCode::Down, KeyModifiers::NONE) => Action::WheelDown,
        (KeyCode::Up, KeyModifiers::NONE) => Action::WheelUp,

        // Keyboard focus
        (KeyCode::Tab, KeyModifiers::NONE) => Action::FocusNext,
        (KeyCode::BackTab, _) => Action::FocusPrevious,

        // Direct navigation
        (KeyCode::Char('n'), KeyModifiers::NONE) => Action::SnapNext,
        (KeyCode::Char('p'), KeyModifiers::NONE) => Action::SnapPrevious,
        (KeyCode::Char(c @ '1'..='9'), KeyModifiers::NONE) => {
            Action::SnapTo(c as usize - '1' as usize)
        }
        (KeyCode::Char('g'), KeyModifiers::NONE) => Action::Reset,

        _ => Action::None,
    }
}

use winit::keyboard::KeyCode;

/// Remote-control key codes as delivered by TV platforms.
pub mod code {
    pub const ENTER: u32 = 13;
    pub const LEFT: u32 = 37;
    pub const UP: u32 = 38;
    pub const RIGHT: u32 = 39;
    pub const DOWN: u32 = 40;
    /// RETURN / back button.
    pub const RETURN: u32 = 10009;
}

/// Translate a physical keyboard key into the remote key code it stands in
/// for, if any.
pub fn remote_code_for(key: KeyCode) -> Option<u32> {
    let remote = match key {
        KeyCode::ArrowLeft => code::LEFT,
        KeyCode::ArrowUp => code::UP,
        KeyCode::ArrowRight => code::RIGHT,
        KeyCode::ArrowDown => code::DOWN,
        KeyCode::Enter | KeyCode::NumpadEnter => code::ENTER,
        KeyCode::Escape | KeyCode::Backspace | KeyCode::BrowserBack => code::RETURN,
        _ => return None,
    };
    Some(remote)
}

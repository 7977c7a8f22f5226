use crossterm::event::{MouseEvent, MouseEventKind};

/// Mouse button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// A completed mouse press, ready for hit testing against a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Click {
    pub x: u16,
    pub y: u16,
    pub button: MouseButton,
}

impl Click {
    /// Extract a click from a raw crossterm mouse event. Anything that is
    /// not a button press (movement, release, scroll) is `None`.
    pub fn from_mouse(event: &MouseEvent) -> Option<Self> {
        match event.kind {
            MouseEventKind::Down(button) => Some(Self {
                x: event.column,
                y: event.row,
                button: button.into(),
            }),
            _ => None,
        }
    }
}

impl From<crossterm::event::MouseButton> for MouseButton {
    fn from(btn: crossterm::event::MouseButton) -> Self {
        use crossterm::event::MouseButton as CtBtn;
        match btn {
            CtBtn::Left => MouseButton::Left,
            CtBtn::Right => MouseButton::Right,
            CtBtn::Middle => MouseButton::Middle,
        }
    }
}

use crate::drivers::joystick::hid_report::Direction;

/// Axis a command moves
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// A single keystroke typed on the operator console
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// `1`
    ToggleButton,
    /// `2`, `4`, `5`, `6` and `8`, laid out like a numeric keypad
    SetDpad(Direction),
    /// `w`, `a`, `s` and `d`. The sign gives the direction of travel.
    MoveAxis(Axis, i8),
    /// `q`
    Quit,
}

impl Command {
    /// Decode a console character. Returns [None] for characters without a
    /// binding.
    pub fn from_char(c: char) -> Option<Self> {
        let cmd = match c {
            '1' => Self::ToggleButton,
            '2' => Self::SetDpad(Direction::Down),
            '4' => Self::SetDpad(Direction::Left),
            '5' => Self::SetDpad(Direction::Centered),
            '6' => Self::SetDpad(Direction::Right),
            '8' => Self::SetDpad(Direction::Up),
            'a' => Self::MoveAxis(Axis::Horizontal, -1),
            'd' => Self::MoveAxis(Axis::Horizontal, 1),
            'w' => Self::MoveAxis(Axis::Vertical, 1),
            's' => Self::MoveAxis(Axis::Vertical, -1),
            'q' => Self::Quit,
            _ => return None,
        };
        Some(cmd)
    }
}

use crate::drivers::joystick::{
    driver::{JOY_AXIS_OPERATING_MAX, JOY_AXIS_OPERATING_MIN, JOY_AXIS_STEP},
    hid_report::Direction,
};

use super::command::{Axis, Command};

/// Current state of the virtual joystick. Starts released and centered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct JoystickState {
    pub button_pressed: bool,
    pub horizontal: i8,
    pub vertical: i8,
    pub dpad: Direction,
}

impl JoystickState {
    /// Update the state for the given command. [Command::Quit] leaves the
    /// state untouched.
    pub fn apply(&mut self, cmd: Command) {
        match cmd {
            Command::ToggleButton => self.button_pressed = !self.button_pressed,
            Command::SetDpad(direction) => self.dpad = direction,
            Command::MoveAxis(axis, sign) => {
                let value = match axis {
                    Axis::Horizontal => &mut self.horizontal,
                    Axis::Vertical => &mut self.vertical,
                };
                *value = step_axis(*value, sign);
            }
            Command::Quit => (),
        }
    }
}

/// Move an axis value one step in the direction of `sign`, staying inside the
/// operating range.
fn step_axis(value: i8, sign: i8) -> i8 {
    let delta = JOY_AXIS_STEP as i16 * sign.signum() as i16;
    let next = (value as i16 + delta).clamp(
        JOY_AXIS_OPERATING_MIN as i16,
        JOY_AXIS_OPERATING_MAX as i16,
    );
    next as i8
}

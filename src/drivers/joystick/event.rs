/// Events decoded from output reports the host sends to the joystick
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputEvent {
    /// LED state, one bit per LED
    Led { flags: u8 },
}

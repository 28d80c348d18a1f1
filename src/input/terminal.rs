use std::io;

use nix::sys::termios::{
    tcgetattr, tcsetattr, LocalFlags, SetArg, SpecialCharacterIndices, Termios,
};

/// Switches the console out of line buffering so each keystroke is delivered
/// as soon as it is typed. The previous settings come back on drop.
pub struct RawMode {
    original: Termios,
}

impl RawMode {
    pub fn enable() -> Result<Self, nix::Error> {
        let stdin = io::stdin();
        let original = tcgetattr(&stdin)?;

        let mut raw = original.clone();
        raw.local_flags.remove(LocalFlags::ICANON);
        raw.control_chars[SpecialCharacterIndices::VMIN as usize] = 1;
        tcsetattr(&stdin, SetArg::TCSANOW, &raw)?;

        Ok(Self { original })
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if let Err(e) = tcsetattr(io::stdin(), SetArg::TCSANOW, &self.original) {
            log::warn!("Cannot restore tty state: {e}");
        }
    }
}

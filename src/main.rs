use std::env;
use std::error::Error;
use std::fs::{File, OpenOptions};
use std::io;
use std::os::fd::AsFd;
use std::path::PathBuf;

use clap::Parser;

use crate::constants::DEFAULT_UHID_PATH;
use crate::drivers::joystick::{driver, report_descriptor::REPORT_DESCRIPTOR};
use crate::input::multiplexer::{Multiplexer, PollWaiter};
use crate::input::terminal::RawMode;
use crate::uhid::device::DeviceSession;

mod constants;
mod drivers;
mod input;
mod uhid;

/// Drive a virtual uhid joystick from the keyboard.
///
/// Keys: 1 toggles the button, 2/4/5/6/8 set the d-pad like a numeric keypad,
/// w/a/s/d move the stick and q quits.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the uhid character device
    #[arg(default_value = DEFAULT_UHID_PATH)]
    pub path: PathBuf,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let log_level = match env::var("LOG_LEVEL") {
        Ok(value) => value,
        Err(_) => "info".to_string(),
    };
    env::set_var("RUST_LOG", log_level);
    env_logger::init();
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    log::info!("Starting uhid-joystick v{}", VERSION);

    // Keystrokes need to arrive one at a time
    let _raw_mode = match RawMode::enable() {
        Ok(raw_mode) => Some(raw_mode),
        Err(e) => {
            log::warn!("Cannot set tty state: {e}");
            None
        }
    };

    log::info!("Open uhid-cdev {}", args.path.display());
    let device = match OpenOptions::new().read(true).write(true).open(&args.path) {
        Ok(device) => device,
        Err(e) => {
            log::error!("Cannot open uhid-cdev {}: {e}", args.path.display());
            return Err(e.into());
        }
    };
    let device_fd = device.as_fd().try_clone_to_owned()?;

    // Read the console through its own descriptor so nothing sits in a
    // userspace buffer that poll cannot see.
    let input = File::from(io::stdin().as_fd().try_clone_to_owned()?);
    let input_fd = input.as_fd().try_clone_to_owned()?;

    log::info!("Create uhid device");
    let mut session = DeviceSession::new(device);
    if let Err(e) = session.register(&REPORT_DESCRIPTOR, &driver::identity()) {
        log::error!("{e}");
        return Err(e.into());
    }

    log::info!("Press 'q' to quit...");
    let mut multiplexer = Multiplexer::new(input, PollWaiter::new(input_fd, device_fd));
    match multiplexer.run(&mut session) {
        Ok(reason) => {
            log::info!("Stopped: {reason:?}");
            log::debug!(
                "Final state: {:?}, session {:?}",
                multiplexer.state(),
                session.state()
            );
        }
        Err(e) => {
            log::error!("Stopped with error: {e}");
            return Err(e.into());
        }
    }

    Ok(())
}

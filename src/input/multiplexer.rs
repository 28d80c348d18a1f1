use std::{
    io::{self, ErrorKind, Read, Write},
    os::fd::{AsFd, OwnedFd},
};

use nix::{
    errno::Errno,
    poll::{poll, PollFd, PollFlags, PollTimeout},
};
use packed_struct::{PackedStruct, PackingError};
use thiserror::Error;

use crate::{
    drivers::joystick::{
        driver::PACKET_SIZE,
        event::OutputEvent,
        hid_report::{decode_output, encode_input},
    },
    uhid::{
        device::{DeviceSession, SessionError},
        event::DeviceEvent,
    },
};

use super::{command::Command, state::JoystickState};

// Largest number of console characters handled per wakeup
const INPUT_BUFFER_SIZE: usize = 128;

/// Possible errors that end the control loop
#[derive(Error, Debug)]
pub enum MultiplexError {
    #[error("failed to wait for input: {0}")]
    Wait(io::Error),
    #[error("failed to read console input: {0}")]
    Input(io::Error),
    #[error("failed to pack input report: {0}")]
    Packing(#[from] PackingError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Why the control loop stopped without an error
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitReason {
    /// The operator typed the quit command
    Quit,
    /// The console input closed
    InputHangup,
    /// The kernel side of the uhid channel closed
    DeviceHangup,
}

/// Readiness of a single source after a wait
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SourceReadiness {
    pub readable: bool,
    pub hangup: bool,
}

/// Readiness of both sources the loop waits on
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Readiness {
    pub input: SourceReadiness,
    pub device: SourceReadiness,
}

/// Blocks until the console input or the device channel needs attention
pub trait Waiter {
    fn wait(&mut self) -> io::Result<Readiness>;
}

/// [Waiter] backed by poll(2) with no timeout
#[derive(Debug)]
pub struct PollWaiter {
    input: OwnedFd,
    device: OwnedFd,
}

impl PollWaiter {
    pub fn new(input: OwnedFd, device: OwnedFd) -> Self {
        Self { input, device }
    }
}

impl Waiter for PollWaiter {
    fn wait(&mut self) -> io::Result<Readiness> {
        loop {
            let mut fds = [
                PollFd::new(self.input.as_fd(), PollFlags::POLLIN),
                PollFd::new(self.device.as_fd(), PollFlags::POLLIN),
            ];
            match poll(&mut fds, PollTimeout::NONE) {
                Ok(_) => (),
                Err(Errno::EINTR) => continue,
                Err(e) => return Err(e.into()),
            }

            return Ok(Readiness {
                input: source_readiness(fds[0].revents()),
                device: source_readiness(fds[1].revents()),
            });
        }
    }
}

/// An error or invalid descriptor is reported as a hang-up, otherwise poll
/// would keep returning it without anything left to read.
fn source_readiness(revents: Option<PollFlags>) -> SourceReadiness {
    let revents = revents.unwrap_or(PollFlags::empty());
    SourceReadiness {
        readable: revents.contains(PollFlags::POLLIN),
        hangup: revents.intersects(PollFlags::POLLHUP | PollFlags::POLLERR | PollFlags::POLLNVAL),
    }
}

/// The [Multiplexer] drives the virtual joystick from console input and
/// services events the kernel sends for the device, one at a time on the
/// calling thread. Every state change is written to the device before the
/// next character is looked at.
#[derive(Debug)]
pub struct Multiplexer<I: Read, W: Waiter> {
    input: I,
    waiter: W,
    state: JoystickState,
}

impl<I: Read, W: Waiter> Multiplexer<I, W> {
    pub fn new(input: I, waiter: W) -> Self {
        Self {
            input,
            waiter,
            state: JoystickState::default(),
        }
    }

    pub fn state(&self) -> &JoystickState {
        &self.state
    }

    /// Run until the operator quits, either side hangs up, or an error occurs.
    /// The device is destroyed before returning in every case.
    pub fn run<T: Read + Write>(
        &mut self,
        session: &mut DeviceSession<T>,
    ) -> Result<ExitReason, MultiplexError> {
        let result = self.run_loop(session);
        log::info!("Destroy uhid device");
        session.unregister();
        result
    }

    fn run_loop<T: Read + Write>(
        &mut self,
        session: &mut DeviceSession<T>,
    ) -> Result<ExitReason, MultiplexError> {
        loop {
            let ready = self.waiter.wait().map_err(MultiplexError::Wait)?;
            if ready.device.hangup {
                log::info!("Received HUP on uhid-cdev");
                return Ok(ExitReason::DeviceHangup);
            }
            if ready.input.hangup {
                log::info!("Received HUP on stdin");
                return Ok(ExitReason::InputHangup);
            }

            if ready.input.readable {
                if let Some(reason) = self.handle_input(session)? {
                    return Ok(reason);
                }
            }
            if ready.device.readable {
                let event = match session.receive() {
                    Ok(event) => event,
                    Err(SessionError::ChannelClosed) => {
                        log::info!("Read HUP on uhid-cdev");
                        return Ok(ExitReason::DeviceHangup);
                    }
                    Err(e) => return Err(e.into()),
                };
                self.handle_device_event(session, event)?;
            }
        }
    }

    /// Read whatever the console has buffered and apply it in order
    fn handle_input<T: Read + Write>(
        &mut self,
        session: &mut DeviceSession<T>,
    ) -> Result<Option<ExitReason>, MultiplexError> {
        let mut buf = [0u8; INPUT_BUFFER_SIZE];
        let read = loop {
            match self.input.read(&mut buf) {
                Ok(read) => break read,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(MultiplexError::Input(e)),
            }
        };
        if read == 0 {
            log::info!("Read HUP on stdin");
            return Ok(Some(ExitReason::InputHangup));
        }

        for c in buf[..read].iter().map(|b| *b as char) {
            let Some(cmd) = Command::from_char(c) else {
                log::warn!("Invalid input: {c:?}");
                continue;
            };
            if cmd == Command::Quit {
                log::info!("Quit requested");
                return Ok(Some(ExitReason::Quit));
            }
            self.state.apply(cmd);
            self.write_state(session)?;
        }

        Ok(None)
    }

    /// Write the current joystick state to the device
    fn write_state<T: Read + Write>(
        &self,
        session: &mut DeviceSession<T>,
    ) -> Result<(), MultiplexError> {
        let report = encode_input(&self.state);
        log::debug!("Sending input report: {report:?}");
        let data: [u8; PACKET_SIZE] = report.pack()?;
        session.transmit(&data)?;
        Ok(())
    }

    fn handle_device_event<T: Read + Write>(
        &mut self,
        session: &mut DeviceSession<T>,
        event: DeviceEvent,
    ) -> Result<(), MultiplexError> {
        match event {
            // Answer to the create request. Always the first event.
            DeviceEvent::Start { dev_flags } => {
                log::info!("Start event received with flags {dev_flags:#x}");
            }
            // Answer to the destroy request
            DeviceEvent::Stop => log::info!("Stop event received"),
            DeviceEvent::Open => log::debug!("Open event received"),
            DeviceEvent::Close => log::debug!("Close event received"),
            DeviceEvent::Output { report_type, data } => {
                log::debug!("Output event received");
                if let Some(OutputEvent::Led { flags }) = decode_output(report_type, &data) {
                    log::info!("LED output report received with flags {flags:x}");
                }
            }
            DeviceEvent::OutputExtended => log::debug!("Output extended event received"),
            // The kernel waits for a reply with the same id, so refuse rather
            // than leave it to time out. This device has no feature reports.
            DeviceEvent::GetReport {
                id,
                report_number,
                report_type,
            } => {
                log::debug!(
                    "Received GetReport event: id: {id}, num: {report_number}, type: {report_type:?}"
                );
                session.reply_get_report(id, Errno::EIO as u16, &[])?;
            }
            DeviceEvent::SetReport {
                id,
                report_number,
                report_type,
                data,
            } => {
                log::debug!("Received SetReport event: id: {id}, num: {report_number}, type: {report_type:?}, data: {data:?}");
                session.reply_set_report(id, Errno::EIO as u16)?;
            }
            DeviceEvent::Unknown(event_type) => {
                log::warn!("Invalid event from uhid-dev: {event_type}");
            }
        }

        Ok(())
    }
}

use std::io::{self, ErrorKind, Read, Write};

use thiserror::Error;

use super::event::{DeviceEvent, DeviceIdentity, FrameError, InputEvent, UHID_EVENT_SIZE};

/// Registration state of a [DeviceSession]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Unregistered,
    Registered,
    TornDown,
}

/// Possible errors talking to the uhid channel
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("uhid channel i/o failed: {0}")]
    Io(#[from] io::Error),
    #[error("wrong size written to uhid channel: {written} != {expected}")]
    ShortWrite { written: usize, expected: usize },
    #[error("uhid channel hung up")]
    ChannelClosed,
    #[error("invalid size read from uhid channel: {read} != {expected}")]
    MalformedEvent { read: usize, expected: usize },
    #[error("failed to build uhid event: {0}")]
    Frame(#[from] FrameError),
    #[error("failed to register virtual device: {0}")]
    Registration(Box<SessionError>),
    #[error("failed to transmit input report: {0}")]
    Transmit(Box<SessionError>),
    #[error("device session is {0:?}")]
    InvalidState(SessionState),
}

/// A [DeviceSession] owns the uhid channel and the registration of the single
/// virtual device created on it. Frames are written and read whole; anything
/// else means the session is out of sync with the kernel.
#[derive(Debug)]
pub struct DeviceSession<T: Read + Write> {
    transport: T,
    state: SessionState,
}

impl<T: Read + Write> DeviceSession<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            state: SessionState::Unregistered,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Create the virtual device with the given report descriptor
    pub fn register(
        &mut self,
        descriptor: &[u8],
        identity: &DeviceIdentity,
    ) -> Result<(), SessionError> {
        if self.state != SessionState::Unregistered {
            return Err(SessionError::InvalidState(self.state));
        }
        let event = InputEvent::Create {
            identity,
            descriptor,
        };
        self.send(&event)
            .map_err(|e| SessionError::Registration(Box::new(e)))?;
        self.state = SessionState::Registered;
        log::debug!(
            "Registered '{}' {:04x}:{:04x} with {} byte report descriptor",
            identity.name,
            identity.vendor,
            identity.product,
            descriptor.len()
        );

        Ok(())
    }

    /// Write the given input report to the device
    pub fn transmit(&mut self, report: &[u8]) -> Result<(), SessionError> {
        self.ensure_registered()?;
        self.send(&InputEvent::Input { data: report })
            .map_err(|e| SessionError::Transmit(Box::new(e)))
    }

    /// Answer a GET_REPORT request
    pub fn reply_get_report(&mut self, id: u32, err: u16, data: &[u8]) -> Result<(), SessionError> {
        self.ensure_registered()?;
        self.send(&InputEvent::GetReportReply { id, err, data })
    }

    /// Answer a SET_REPORT request
    pub fn reply_set_report(&mut self, id: u32, err: u16) -> Result<(), SessionError> {
        self.ensure_registered()?;
        self.send(&InputEvent::SetReportReply { id, err })
    }

    /// Block until the kernel sends the next event
    pub fn receive(&mut self) -> Result<DeviceEvent, SessionError> {
        self.ensure_registered()?;
        let mut frame = [0u8; UHID_EVENT_SIZE];
        let read = loop {
            match self.transport.read(&mut frame) {
                Ok(read) => break read,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        };
        if read == 0 {
            return Err(SessionError::ChannelClosed);
        }
        if read != UHID_EVENT_SIZE {
            return Err(SessionError::MalformedEvent {
                read,
                expected: UHID_EVENT_SIZE,
            });
        }

        let event = DeviceEvent::from_frame(&frame);
        log::trace!("Received uhid event: {event:?}");
        Ok(event)
    }

    /// Destroy the virtual device. Failures are only logged since this runs on
    /// every exit path, including after the channel already broke.
    pub fn unregister(&mut self) {
        if self.state != SessionState::Registered {
            return;
        }
        self.state = SessionState::TornDown;
        if let Err(e) = self.send(&InputEvent::Destroy) {
            log::error!("Failed to destroy uhid device: {e}");
        }
    }

    fn ensure_registered(&self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Registered => Ok(()),
            state => Err(SessionError::InvalidState(state)),
        }
    }

    fn send(&mut self, event: &InputEvent) -> Result<(), SessionError> {
        let frame = event.to_frame()?;
        log::trace!("Writing uhid event: {:?}", event.event_type());
        let written = loop {
            match self.transport.write(&frame) {
                Ok(written) => break written,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        };
        if written != frame.len() {
            return Err(SessionError::ShortWrite {
                written,
                expected: frame.len(),
            });
        }

        Ok(())
    }
}

impl<T: Read + Write> Drop for DeviceSession<T> {
    fn drop(&mut self) {
        self.unregister();
    }
}

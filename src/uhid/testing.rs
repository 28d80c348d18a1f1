//! In-memory stand-in for `/dev/uhid` used by the unit tests.
use std::{
    cell::RefCell,
    collections::VecDeque,
    io::{self, ErrorKind, Read, Write},
    mem::{offset_of, size_of},
    rc::Rc,
};

use uhid_sys::{
    uhid_create2_req, uhid_event, uhid_get_report_reply_req, uhid_get_report_req,
    uhid_input2_req, uhid_output_req, uhid_set_report_req,
};

/// Size of a `struct uhid_event` as the kernel defines it
pub const EVENT_SIZE: usize = size_of::<uhid_event>();

// Field offsets of `struct uhid_event`, taken from the kernel bindings
pub const TYPE: usize = offset_of!(uhid_event, type_);
pub const PAYLOAD: usize = offset_of!(uhid_event, u);
pub const CREATE2_NAME: usize = PAYLOAD + offset_of!(uhid_create2_req, name);
pub const CREATE2_RD_SIZE: usize = PAYLOAD + offset_of!(uhid_create2_req, rd_size);
pub const CREATE2_BUS: usize = PAYLOAD + offset_of!(uhid_create2_req, bus);
pub const CREATE2_VENDOR: usize = PAYLOAD + offset_of!(uhid_create2_req, vendor);
pub const CREATE2_PRODUCT: usize = PAYLOAD + offset_of!(uhid_create2_req, product);
pub const CREATE2_RD_DATA: usize = PAYLOAD + offset_of!(uhid_create2_req, rd_data);
pub const INPUT2_SIZE: usize = PAYLOAD + offset_of!(uhid_input2_req, size);
pub const INPUT2_DATA: usize = PAYLOAD + offset_of!(uhid_input2_req, data);
pub const OUTPUT_DATA: usize = PAYLOAD + offset_of!(uhid_output_req, data);
pub const OUTPUT_SIZE: usize = PAYLOAD + offset_of!(uhid_output_req, size);
pub const OUTPUT_RTYPE: usize = PAYLOAD + offset_of!(uhid_output_req, rtype);
pub const REPORT_ID: usize = PAYLOAD + offset_of!(uhid_get_report_req, id);
pub const REPORT_RNUM: usize = PAYLOAD + offset_of!(uhid_get_report_req, rnum);
pub const REPORT_RTYPE: usize = PAYLOAD + offset_of!(uhid_get_report_req, rtype);
pub const SET_REPORT_SIZE: usize = PAYLOAD + offset_of!(uhid_set_report_req, size);
pub const SET_REPORT_DATA: usize = PAYLOAD + offset_of!(uhid_set_report_req, data);
pub const REPLY_ERR: usize = PAYLOAD + offset_of!(uhid_get_report_reply_req, err);

/// A channel that plays back scripted reads and records every write
#[derive(Debug, Default)]
pub struct TestChannel {
    /// Each entry is returned whole by one read. An empty entry reads as
    /// hang-up.
    reads: VecDeque<Vec<u8>>,
    written: Rc<RefCell<Vec<Vec<u8>>>>,
    /// Number of writes that succeed before writes start failing
    writes_allowed: Option<usize>,
    /// Byte count reported for every write instead of the full length
    short_write: Option<usize>,
}

impl TestChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a handle to the frames written so far that outlives the channel
    pub fn written(&self) -> Rc<RefCell<Vec<Vec<u8>>>> {
        self.written.clone()
    }

    pub fn push_read(&mut self, frame: Vec<u8>) {
        self.reads.push_back(frame);
    }

    pub fn fail_writes_after(&mut self, count: usize) {
        self.writes_allowed = Some(count);
    }

    pub fn short_writes(&mut self, size: usize) {
        self.short_write = Some(size);
    }
}

impl Read for TestChannel {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let Some(frame) = self.reads.pop_front() else {
            return Ok(0);
        };
        if frame.len() > buf.len() {
            return Err(io::Error::new(
                ErrorKind::InvalidInput,
                format!("read buffer of {} bytes for a {} byte frame", buf.len(), frame.len()),
            ));
        }
        buf[..frame.len()].copy_from_slice(&frame);
        Ok(frame.len())
    }
}

impl Write for TestChannel {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Some(allowed) = self.writes_allowed {
            if self.written.borrow().len() >= allowed {
                return Err(io::Error::new(ErrorKind::BrokenPipe, "channel is gone"));
            }
        }
        self.written.borrow_mut().push(buf.to_vec());
        Ok(self.short_write.unwrap_or(buf.len()).min(buf.len()))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Build an empty full-size frame of the given event type
pub fn frame(event_type: u32) -> Vec<u8> {
    let mut frame = vec![0u8; EVENT_SIZE];
    frame[TYPE..TYPE + 4].copy_from_slice(&event_type.to_ne_bytes());
    frame
}

/// Build an OUTPUT frame carrying the given report
pub fn output_frame(report_type: u8, data: &[u8]) -> Vec<u8> {
    let mut frame = frame(6);
    frame[OUTPUT_DATA..OUTPUT_DATA + data.len()].copy_from_slice(data);
    frame[OUTPUT_SIZE..OUTPUT_SIZE + 2].copy_from_slice(&(data.len() as u16).to_ne_bytes());
    frame[OUTPUT_RTYPE] = report_type;
    frame
}

/// Build a GET_REPORT request frame
pub fn get_report_frame(id: u32, report_number: u8, report_type: u8) -> Vec<u8> {
    let mut frame = frame(9);
    frame[REPORT_ID..REPORT_ID + 4].copy_from_slice(&id.to_ne_bytes());
    frame[REPORT_RNUM] = report_number;
    frame[REPORT_RTYPE] = report_type;
    frame
}

/// Build a SET_REPORT request frame
pub fn set_report_frame(id: u32, report_number: u8, report_type: u8, data: &[u8]) -> Vec<u8> {
    let mut frame = get_report_frame(id, report_number, report_type);
    frame[TYPE..TYPE + 4].copy_from_slice(&13u32.to_ne_bytes());
    frame[SET_REPORT_SIZE..SET_REPORT_SIZE + 2]
        .copy_from_slice(&(data.len() as u16).to_ne_bytes());
    frame[SET_REPORT_DATA..SET_REPORT_DATA + data.len()].copy_from_slice(data);
    frame
}

pub fn read_u16(frame: &[u8], offset: usize) -> u16 {
    u16::from_ne_bytes([frame[offset], frame[offset + 1]])
}

pub fn read_u32(frame: &[u8], offset: usize) -> u32 {
    u32::from_ne_bytes([
        frame[offset],
        frame[offset + 1],
        frame[offset + 2],
        frame[offset + 3],
    ])
}

/// Event type of a written frame
pub fn event_type(frame: &[u8]) -> u32 {
    read_u32(frame, TYPE)
}

/// Report carried by a written INPUT2 frame
pub fn input_report(frame: &[u8]) -> Vec<u8> {
    let size = read_u16(frame, INPUT2_SIZE) as usize;
    frame[INPUT2_DATA..INPUT2_DATA + size].to_vec()
}

//! Wire format of the events exchanged with the kernel over `/dev/uhid`.
//!
//! Every event is a `struct uhid_event`: a `u32` event type followed by a
//! union of request payloads, all in host byte order. Reads and writes always
//! move exactly [UHID_EVENT_SIZE] bytes. Field positions come from the
//! `uhid-sys` bindings of `linux/uhid.h`.
//! https://www.kernel.org/doc/html/latest/hid/uhid.html
use std::mem::{offset_of, size_of};

use thiserror::Error;
use uhid_sys::{
    uhid_create2_req, uhid_event, uhid_get_report_reply_req, uhid_get_report_req,
    uhid_input2_req, uhid_output_req, uhid_set_report_reply_req, uhid_set_report_req,
    uhid_start_req,
};

/// Size of every event read from or written to the uhid channel
pub const UHID_EVENT_SIZE: usize = size_of::<uhid_event>();

/// Largest report or descriptor a single event can carry
pub const UHID_DATA_MAX: usize =
    size_of::<uhid_create2_req>() - offset_of!(uhid_create2_req, rd_data);

// Offsets into an event, relative to the start of the frame
const TYPE_OFFSET: usize = offset_of!(uhid_event, type_);
const PAYLOAD_OFFSET: usize = offset_of!(uhid_event, u);

const CREATE2_NAME: usize = PAYLOAD_OFFSET + offset_of!(uhid_create2_req, name);
const CREATE2_PHYS: usize = PAYLOAD_OFFSET + offset_of!(uhid_create2_req, phys);
const CREATE2_UNIQ: usize = PAYLOAD_OFFSET + offset_of!(uhid_create2_req, uniq);
const CREATE2_RD_SIZE: usize = PAYLOAD_OFFSET + offset_of!(uhid_create2_req, rd_size);
const CREATE2_BUS: usize = PAYLOAD_OFFSET + offset_of!(uhid_create2_req, bus);
const CREATE2_VENDOR: usize = PAYLOAD_OFFSET + offset_of!(uhid_create2_req, vendor);
const CREATE2_PRODUCT: usize = PAYLOAD_OFFSET + offset_of!(uhid_create2_req, product);
const CREATE2_VERSION: usize = PAYLOAD_OFFSET + offset_of!(uhid_create2_req, version);
const CREATE2_COUNTRY: usize = PAYLOAD_OFFSET + offset_of!(uhid_create2_req, country);
const CREATE2_RD_DATA: usize = PAYLOAD_OFFSET + offset_of!(uhid_create2_req, rd_data);

// Fixed string fields hold a NUL terminated string
const NAME_SIZE: usize = CREATE2_PHYS - CREATE2_NAME;
const PHYS_SIZE: usize = CREATE2_UNIQ - CREATE2_PHYS;
const UNIQ_SIZE: usize = CREATE2_RD_SIZE - CREATE2_UNIQ;

const INPUT2_SIZE: usize = PAYLOAD_OFFSET + offset_of!(uhid_input2_req, size);
const INPUT2_DATA: usize = PAYLOAD_OFFSET + offset_of!(uhid_input2_req, data);

const OUTPUT_DATA: usize = PAYLOAD_OFFSET + offset_of!(uhid_output_req, data);
const OUTPUT_SIZE: usize = PAYLOAD_OFFSET + offset_of!(uhid_output_req, size);
const OUTPUT_RTYPE: usize = PAYLOAD_OFFSET + offset_of!(uhid_output_req, rtype);

const START_DEV_FLAGS: usize = PAYLOAD_OFFSET + offset_of!(uhid_start_req, dev_flags);

const GET_REPORT_ID: usize = PAYLOAD_OFFSET + offset_of!(uhid_get_report_req, id);
const GET_REPORT_RNUM: usize = PAYLOAD_OFFSET + offset_of!(uhid_get_report_req, rnum);
const GET_REPORT_RTYPE: usize = PAYLOAD_OFFSET + offset_of!(uhid_get_report_req, rtype);

const SET_REPORT_ID: usize = PAYLOAD_OFFSET + offset_of!(uhid_set_report_req, id);
const SET_REPORT_RNUM: usize = PAYLOAD_OFFSET + offset_of!(uhid_set_report_req, rnum);
const SET_REPORT_RTYPE: usize = PAYLOAD_OFFSET + offset_of!(uhid_set_report_req, rtype);
const SET_REPORT_SIZE: usize = PAYLOAD_OFFSET + offset_of!(uhid_set_report_req, size);
const SET_REPORT_DATA: usize = PAYLOAD_OFFSET + offset_of!(uhid_set_report_req, data);

const GET_REPORT_REPLY_ID: usize = PAYLOAD_OFFSET + offset_of!(uhid_get_report_reply_req, id);
const GET_REPORT_REPLY_ERR: usize = PAYLOAD_OFFSET + offset_of!(uhid_get_report_reply_req, err);
const GET_REPORT_REPLY_SIZE: usize =
    PAYLOAD_OFFSET + offset_of!(uhid_get_report_reply_req, size);
const GET_REPORT_REPLY_DATA: usize =
    PAYLOAD_OFFSET + offset_of!(uhid_get_report_reply_req, data);

const SET_REPORT_REPLY_ID: usize = PAYLOAD_OFFSET + offset_of!(uhid_set_report_reply_req, id);
const SET_REPORT_REPLY_ERR: usize = PAYLOAD_OFFSET + offset_of!(uhid_set_report_reply_req, err);

/// uhid event types, as defined in `linux/uhid.h`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventType {
    Destroy = 1,
    Start = 2,
    Stop = 3,
    Open = 4,
    Close = 5,
    Output = 6,
    OutputEv = 7,
    GetReport = 9,
    GetReportReply = 10,
    Create2 = 11,
    Input2 = 12,
    SetReport = 13,
    SetReportReply = 14,
}

impl EventType {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            1 => Some(Self::Destroy),
            2 => Some(Self::Start),
            3 => Some(Self::Stop),
            4 => Some(Self::Open),
            5 => Some(Self::Close),
            6 => Some(Self::Output),
            7 => Some(Self::OutputEv),
            9 => Some(Self::GetReport),
            10 => Some(Self::GetReportReply),
            11 => Some(Self::Create2),
            12 => Some(Self::Input2),
            13 => Some(Self::SetReport),
            14 => Some(Self::SetReportReply),
            _ => None,
        }
    }
}

/// HID report types carried by OUTPUT, GET_REPORT and SET_REPORT events
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportType {
    Feature,
    Output,
    Input,
    Unknown(u8),
}

impl From<u8> for ReportType {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::Feature,
            1 => Self::Output,
            2 => Self::Input,
            v => Self::Unknown(v),
        }
    }
}

/// Bus types from `linux/input.h`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bus {
    Usb = 0x03,
}

/// Static identity the virtual device is created with
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceIdentity {
    pub name: String,
    pub phys: String,
    pub uniq: String,
    pub bus: Bus,
    pub vendor: u32,
    pub product: u32,
    pub version: u32,
    pub country: u32,
}

/// Errors building an outbound event
#[derive(Error, Debug, PartialEq, Eq)]
pub enum FrameError {
    #[error("{field} is {len} bytes but at most {max} fit in a uhid event")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },
}

/// Events written by this process to the kernel
#[derive(Clone, Debug)]
pub enum InputEvent<'a> {
    /// Create the device. Must be the first event written.
    Create {
        identity: &'a DeviceIdentity,
        descriptor: &'a [u8],
    },
    /// Tear the device down
    Destroy,
    /// Raw input report
    Input { data: &'a [u8] },
    /// Answer to [DeviceEvent::GetReport] with the same id
    GetReportReply { id: u32, err: u16, data: &'a [u8] },
    /// Answer to [DeviceEvent::SetReport] with the same id
    SetReportReply { id: u32, err: u16 },
}

impl InputEvent<'_> {
    pub fn event_type(&self) -> EventType {
        match self {
            Self::Create { .. } => EventType::Create2,
            Self::Destroy => EventType::Destroy,
            Self::Input { .. } => EventType::Input2,
            Self::GetReportReply { .. } => EventType::GetReportReply,
            Self::SetReportReply { .. } => EventType::SetReportReply,
        }
    }

    /// Serialize the event into a full-size uhid frame
    pub fn to_frame(&self) -> Result<Vec<u8>, FrameError> {
        let mut frame = vec![0u8; UHID_EVENT_SIZE];
        put_u32(&mut frame, TYPE_OFFSET, self.event_type() as u32);

        match self {
            Self::Create {
                identity,
                descriptor,
            } => {
                put_str(&mut frame, CREATE2_NAME, NAME_SIZE, "name", &identity.name)?;
                put_str(&mut frame, CREATE2_PHYS, PHYS_SIZE, "phys", &identity.phys)?;
                put_str(&mut frame, CREATE2_UNIQ, UNIQ_SIZE, "uniq", &identity.uniq)?;
                put_data(&mut frame, CREATE2_RD_DATA, "report descriptor", descriptor)?;
                put_u16(&mut frame, CREATE2_RD_SIZE, descriptor.len() as u16);
                put_u16(&mut frame, CREATE2_BUS, identity.bus as u16);
                put_u32(&mut frame, CREATE2_VENDOR, identity.vendor);
                put_u32(&mut frame, CREATE2_PRODUCT, identity.product);
                put_u32(&mut frame, CREATE2_VERSION, identity.version);
                put_u32(&mut frame, CREATE2_COUNTRY, identity.country);
            }
            Self::Destroy => (),
            Self::Input { data } => {
                put_data(&mut frame, INPUT2_DATA, "input report", data)?;
                put_u16(&mut frame, INPUT2_SIZE, data.len() as u16);
            }
            Self::GetReportReply { id, err, data } => {
                put_data(&mut frame, GET_REPORT_REPLY_DATA, "report reply", data)?;
                put_u32(&mut frame, GET_REPORT_REPLY_ID, *id);
                put_u16(&mut frame, GET_REPORT_REPLY_ERR, *err);
                put_u16(&mut frame, GET_REPORT_REPLY_SIZE, data.len() as u16);
            }
            Self::SetReportReply { id, err } => {
                put_u32(&mut frame, SET_REPORT_REPLY_ID, *id);
                put_u16(&mut frame, SET_REPORT_REPLY_ERR, *err);
            }
        }

        Ok(frame)
    }
}

/// Events read by this process from the kernel
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeviceEvent {
    /// The HID device was started. Answer to [InputEvent::Create].
    Start { dev_flags: u64 },
    /// The HID device was stopped. Answer to [InputEvent::Destroy].
    Stop,
    /// Some process started reading from the HID device
    Open,
    /// No process is reading from the HID device anymore
    Close,
    /// The host wants to send a report to the device
    Output {
        report_type: ReportType,
        data: Vec<u8>,
    },
    /// Legacy input-event style output, superseded by [DeviceEvent::Output]
    OutputExtended,
    /// GET_REPORT request that must be answered with the same id
    GetReport {
        id: u32,
        report_number: u8,
        report_type: ReportType,
    },
    /// SET_REPORT request that must be answered with the same id
    SetReport {
        id: u32,
        report_number: u8,
        report_type: ReportType,
        data: Vec<u8>,
    },
    /// Any event type this device does not know about
    Unknown(u32),
}

impl DeviceEvent {
    /// Classify a full-size frame read from the kernel
    pub fn from_frame(frame: &[u8; UHID_EVENT_SIZE]) -> Self {
        let event_type = get_u32(frame, TYPE_OFFSET);
        let Some(kind) = EventType::from_u32(event_type) else {
            return Self::Unknown(event_type);
        };

        match kind {
            EventType::Start => Self::Start {
                dev_flags: get_u64(frame, START_DEV_FLAGS),
            },
            EventType::Stop => Self::Stop,
            EventType::Open => Self::Open,
            EventType::Close => Self::Close,
            EventType::Output => {
                let size = get_u16(frame, OUTPUT_SIZE) as usize;
                Self::Output {
                    report_type: frame[OUTPUT_RTYPE].into(),
                    data: get_data(frame, OUTPUT_DATA, size),
                }
            }
            EventType::OutputEv => Self::OutputExtended,
            EventType::GetReport => Self::GetReport {
                id: get_u32(frame, GET_REPORT_ID),
                report_number: frame[GET_REPORT_RNUM],
                report_type: frame[GET_REPORT_RTYPE].into(),
            },
            EventType::SetReport => {
                let size = get_u16(frame, SET_REPORT_SIZE) as usize;
                Self::SetReport {
                    id: get_u32(frame, SET_REPORT_ID),
                    report_number: frame[SET_REPORT_RNUM],
                    report_type: frame[SET_REPORT_RTYPE].into(),
                    data: get_data(frame, SET_REPORT_DATA, size),
                }
            }
            // Only ever written by userspace, never read back
            EventType::Destroy
            | EventType::GetReportReply
            | EventType::Create2
            | EventType::Input2
            | EventType::SetReportReply => Self::Unknown(event_type),
        }
    }
}

fn put_u16(frame: &mut [u8], offset: usize, value: u16) {
    frame[offset..offset + 2].copy_from_slice(&value.to_ne_bytes());
}

fn put_u32(frame: &mut [u8], offset: usize, value: u32) {
    frame[offset..offset + 4].copy_from_slice(&value.to_ne_bytes());
}

/// Copy a string into a fixed size field, leaving room for the NUL terminator
fn put_str(
    frame: &mut [u8],
    offset: usize,
    size: usize,
    field: &'static str,
    value: &str,
) -> Result<(), FrameError> {
    let bytes = value.as_bytes();
    if bytes.len() >= size {
        return Err(FrameError::FieldTooLong {
            field,
            len: bytes.len(),
            max: size - 1,
        });
    }
    frame[offset..offset + bytes.len()].copy_from_slice(bytes);
    Ok(())
}

fn put_data(
    frame: &mut [u8],
    offset: usize,
    field: &'static str,
    data: &[u8],
) -> Result<(), FrameError> {
    if data.len() > UHID_DATA_MAX {
        return Err(FrameError::FieldTooLong {
            field,
            len: data.len(),
            max: UHID_DATA_MAX,
        });
    }
    frame[offset..offset + data.len()].copy_from_slice(data);
    Ok(())
}

fn get_u16(frame: &[u8], offset: usize) -> u16 {
    let mut buf = [0u8; 2];
    buf.copy_from_slice(&frame[offset..offset + 2]);
    u16::from_ne_bytes(buf)
}

fn get_u32(frame: &[u8], offset: usize) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&frame[offset..offset + 4]);
    u32::from_ne_bytes(buf)
}

fn get_u64(frame: &[u8], offset: usize) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&frame[offset..offset + 8]);
    u64::from_ne_bytes(buf)
}

/// Read a report payload, clamping a bogus size to the buffer
fn get_data(frame: &[u8], offset: usize, size: usize) -> Vec<u8> {
    let size = size.min(UHID_DATA_MAX);
    frame[offset..offset + size].to_vec()
}

use packed_struct::prelude::*;

use crate::{input::state::JoystickState, uhid::event::ReportType};

use super::{
    driver::{LED_REPORT_MARKER, LED_REPORT_SIZE},
    event::OutputEvent,
};

/// Hat switch positions. The descriptor declares a logical range of 1-8, so
/// [Direction::Centered] falls outside of it and reads as the null state.
#[derive(PrimitiveEnum_u8, Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Direction {
    #[default]
    Centered = 0,
    Up = 1,
    UpRight = 2,
    Right = 3,
    DownRight = 4,
    Down = 5,
    DownLeft = 6,
    Left = 7,
    UpLeft = 8,
}

/// Joystick input report
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq, Default)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "4")]
pub struct PackedInputDataReport {
    // byte 0
    #[packed_field(bits = "0")]
    pub button8: bool,
    #[packed_field(bits = "1")]
    pub button7: bool,
    #[packed_field(bits = "2")]
    pub button6: bool,
    #[packed_field(bits = "3")]
    pub button5: bool,
    #[packed_field(bits = "4")]
    pub button4: bool,
    #[packed_field(bits = "5")]
    pub button3: bool,
    #[packed_field(bits = "6")]
    pub button2: bool,
    #[packed_field(bits = "7")]
    pub button1: bool,

    // byte 1-2
    #[packed_field(bytes = "1")]
    pub joystick_x: i8,
    #[packed_field(bytes = "2")]
    pub joystick_y: i8,

    // byte 3
    #[packed_field(bits = "24..=27", ty = "enum")]
    pub dpad2: Direction,
    #[packed_field(bits = "28..=31", ty = "enum")]
    pub dpad1: Direction,
}

/// LED state sent by the host as an output report
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq, Default)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "2")]
pub struct PackedLedOutputReport {
    #[packed_field(bytes = "0")]
    pub report_marker: u8,
    #[packed_field(bytes = "1")]
    pub flags: u8,
}

/// Build the input report describing the given joystick state. Only the first
/// button and the first hat switch are driven; the rest always read as zero.
pub fn encode_input(state: &JoystickState) -> PackedInputDataReport {
    PackedInputDataReport {
        button1: state.button_pressed,
        joystick_x: state.horizontal,
        joystick_y: state.vertical,
        dpad1: state.dpad,
        ..Default::default()
    }
}

/// Decode an output report sent from the host. Anything other than a 2-byte
/// LED report is not understood by this device and is dropped.
pub fn decode_output(report_type: ReportType, data: &[u8]) -> Option<OutputEvent> {
    if report_type != ReportType::Output {
        log::trace!("Ignoring {report_type:?} report: {data:?}");
        return None;
    }
    if data.len() != LED_REPORT_SIZE {
        log::trace!("Ignoring output report with size {}", data.len());
        return None;
    }
    let buf: [u8; LED_REPORT_SIZE] = data.try_into().ok()?;
    let report = PackedLedOutputReport::unpack(&buf).ok()?;
    if report.report_marker != LED_REPORT_MARKER {
        log::trace!("Ignoring output report with marker {}", report.report_marker);
        return None;
    }

    Some(OutputEvent::Led {
        flags: report.flags,
    })
}

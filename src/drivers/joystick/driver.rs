use crate::uhid::event::{Bus, DeviceIdentity};

// Hardware ID's
pub const VID: u16 = 0x15d9;
pub const PID: u16 = 0x0a37;

/// Name the virtual device is registered with
pub const DEVICE_NAME: &str = "test-uhid-device";

// Input report size
pub const PACKET_SIZE: usize = 4;

// Range the console commands are allowed to drive the axes to. The report
// descriptor itself allows -127 to 127.
pub const JOY_AXIS_OPERATING_MAX: i8 = 100;
pub const JOY_AXIS_OPERATING_MIN: i8 = -100;

/// Amount a single axis command moves the stick
pub const JOY_AXIS_STEP: i8 = 20;

// Output report marker for LED state
pub const LED_REPORT_MARKER: u8 = 0x02;

// Output report size
pub const LED_REPORT_SIZE: usize = 2;

/// Identity the virtual joystick is created with
pub fn identity() -> DeviceIdentity {
    DeviceIdentity {
        name: String::from(DEVICE_NAME),
        phys: String::from(""),
        uniq: String::from(""),
        bus: Bus::Usb,
        vendor: VID as u32,
        product: PID as u32,
        version: 0,
        country: 0,
    }
}

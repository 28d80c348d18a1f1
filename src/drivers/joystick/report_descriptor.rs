pub const REPORT_DESCRIPTOR: [u8; 60] = [
    0x05, 0x01, // Usage Page (Generic Desktop)        0
    0x09, 0x04, // Usage (Joystick)                    2
    0xa1, 0x01, // Collection (Application)            4
    0x09, 0x01, //  Usage (Pointer)                    6
    0xa1, 0x00, //  Collection (Physical)              8
    0x05, 0x09, //   Usage Page (Button)               10
    0x19, 0x01, //   Usage Minimum (1)                 12
    0x29, 0x08, //   Usage Maximum (8)                 14
    0x15, 0x00, //   Logical Minimum (0)               16
    0x25, 0x01, //   Logical Maximum (1)               18
    0x95, 0x08, //   Report Count (8)                  20
    0x75, 0x01, //   Report Size (1)                   22
    0x81, 0x02, //   Input (Data,Var,Abs)              24
    0x05, 0x01, //   Usage Page (Generic Desktop)      26
    0x09, 0x30, //   Usage (X)                         28
    0x09, 0x31, //   Usage (Y)                         30
    0x15, 0x81, //   Logical Minimum (-127)            32
    0x25, 0x7f, //   Logical Maximum (127)             34
    0x95, 0x02, //   Report Count (2)                  36
    0x75, 0x08, //   Report Size (8)                   38
    0x81, 0x02, //   Input (Data,Var,Abs)              40
    0x05, 0x01, //   Usage Page (Generic Desktop)      42
    0x09, 0x39, //   Usage (Hat switch)                44
    0x09, 0x39, //   Usage (Hat switch)                46
    0x15, 0x01, //   Logical Minimum (1)               48
    0x25, 0x08, //   Logical Maximum (8)               50
    0x95, 0x02, //   Report Count (2)                  52
    0x75, 0x04, //   Report Size (4)                   54
    0x81, 0x02, //   Input (Data,Var,Abs)              56
    0xc0, //  End Collection                           58
    0xc0, // End Collection                            59
];

pub mod driver;
pub mod event;
pub mod hid_report;
pub mod report_descriptor;

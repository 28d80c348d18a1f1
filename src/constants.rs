/// uhid character device used when no path is given
pub const DEFAULT_UHID_PATH: &str = "/dev/uhid";

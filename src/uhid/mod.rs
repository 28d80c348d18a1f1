pub mod device;
pub mod event;
#[cfg(test)]
pub mod testing;

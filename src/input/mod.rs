pub mod command;
pub mod multiplexer;
pub mod state;
#[cfg(test)]
pub mod state_test;
pub mod terminal;

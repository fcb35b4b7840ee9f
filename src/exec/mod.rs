//! Execution control
//!
//! Spawns the interpreter in its own process group and bounds it with a watchdog.

pub mod executor;
pub mod watchdog;

pub use executor::Executor;

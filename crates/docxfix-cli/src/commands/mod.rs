//! Command implementations.

pub mod process;

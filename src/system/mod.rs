//! Process-level helpers for applications embedding the store

pub mod logging;

pub use logging::init_logging;

//! System-level modules: logging initialization and process concerns

pub mod logging;

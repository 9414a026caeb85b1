//! Utility functions and helpers for the folio gateway.
//!
//! # Submodules
//!
//! - `logging`: Tracing initialization and secret redaction.
//!
//! Author: kelexine (<https://github.com/kelexine>)

pub mod logging;

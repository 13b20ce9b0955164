//! Reporting: formatted terminal tables for a finished run.

pub mod format;

pub use format::*;

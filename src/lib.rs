//! `share-of-search` library crate.
//!
//! Computes each keyword's share of total search interest over time, then
//! aggregates it into calendar buckets, yearly snapshots and year-over-year
//! changes. The binary (`sos`) is a thin wrapper around this library so that:
//!
//! - the share computations are testable without spawning processes
//! - providers (CSV files, synthetic samples) stay swappable behind one trait

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod plot;
pub mod report;
pub mod sos;

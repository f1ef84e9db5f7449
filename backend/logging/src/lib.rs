//! Structured logging for SnapSolve.
//!
//! Wraps `tracing` with a human-readable console layer plus an optional
//! daily-rolling NDJSON file appender.

pub mod logger;

pub use logger::init_logger;

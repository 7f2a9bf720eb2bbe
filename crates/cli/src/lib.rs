//! Notes CLI
//!
//! Command-line views over the notes collection: dashboard, list, detail,
//! search and the message log.

pub mod commands;
pub mod output;

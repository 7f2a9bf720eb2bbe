//! CLI Commands

pub mod config;
pub mod note;

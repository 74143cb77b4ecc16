//! Core building blocks for secaudit
//!
//! - **config**: environment-derived run settings, resolved once
//! - **error**: error types and process exit codes

pub mod config;
pub mod error;

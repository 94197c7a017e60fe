//! Core types, errors, configuration, report documents, status codes and
//! tracing setup for the verdict validation engine.

pub mod config;
pub mod constants;
pub mod errors;
pub mod report;
pub mod status;
pub mod tracing;

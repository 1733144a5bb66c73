//! Utility modules.

/// Timestamp serialization helpers shared by wire types.
pub mod datetime;

/// Log sanitization utilities to prevent sensitive data exposure.
pub mod log_sanitizer;

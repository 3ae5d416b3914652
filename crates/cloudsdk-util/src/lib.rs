//! Shared utilities for the managed Cloud SDK installer.
//!
//! This crate provides cross-cutting concerns used by all other crates in the
//! workspace: error types, filesystem helpers, process execution, progress
//! listeners and terminal progress indicators, and locale-aware formatting.

pub mod errors;
pub mod format;
pub mod fs;
pub mod process;
pub mod progress;

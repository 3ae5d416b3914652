//! Managed Cloud SDK installation.
//!
//! Resolves where a given SDK release lives, downloads and safely extracts
//! its archive, runs the bundled install script for the rapid channel, and
//! verifies every stage before reporting the SDK home.

pub mod download;
pub mod extract;
pub mod installer;
pub mod managed;
pub mod os;
pub mod permissions;
pub mod resolver;
pub mod script;
pub mod version;

pub use tokio_util::sync::CancellationToken;

//! Core configuration for the managed Cloud SDK installer.

pub mod config;

//! Meshprobe shared types.
//!
//! This crate provides:
//! - Id newtypes used across the probing and interpolation crates
//! - The unified `Error` enum with stable codes and categories

pub mod error;
pub mod id;

pub use error::{Error, ErrorCategory, Result};
pub use id::GlobalProbeId;

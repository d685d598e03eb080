//! Meshprobe process-group abstraction.
//!
//! This crate provides:
//! - The `ProcessGroup` trait: an explicitly passed handle carrying rank,
//!   group size, and the synchronous collectives and tagged point-to-point
//!   exchanges the aggregation protocol needs
//! - `LocalGroup`: an in-process implementation over crossbeam channels,
//!   one handle per simulated rank
//!
//! All primitives are synchronous and reliable. A rank that never joins a
//! collective blocks its peers forever; that is the intended all-or-nothing
//! failure model, not a recoverable condition.

pub mod group;
pub mod local;

pub use group::{MessageTag, Payload, ProcessGroup};
pub use local::LocalGroup;

//! Meshprobe probing and aggregation.
//!
//! This crate provides:
//! - `ProbeRecord` / `StatisticProbeRecord`: one evaluation point with a
//!   growing snapshot history, or with two fixed running-statistic slots
//! - `ProbeCollection` / `StatisticProbeCollection`: the process-local sets
//!   with collective global-id assignment
//! - The aggregation protocol (`gather_on_root`): reconstruction of the
//!   full, id-ordered result array on a designated root rank
//! - The `.probes` binary dump written by root
//!
//! The field being probed is consumed through the `FieldEval` capability;
//! point location and basis evaluation live behind that trait and are not
//! reimplemented here.

pub mod aggregate;
pub mod collection;
pub mod field;
pub mod record;

#[cfg(any(test, feature = "test-utils"))]
pub mod testutil;

pub use aggregate::{
    gather_and_save, gather_on_root, read_dump, ProbeDump, ProbeSet, Selector, DEFAULT_ROOT,
};
pub use collection::{ProbeCollection, StatisticProbeCollection};
pub use field::FieldEval;
pub use record::{ProbeRecord, StatSlot, StatisticProbeRecord};

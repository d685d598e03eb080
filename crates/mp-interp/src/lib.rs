//! Non-matching-mesh interpolation for Meshprobe.
//!
//! This crate provides:
//! - The consumed function-space capability: `FunctionSpace` plus the
//!   `SpaceLayout` subspace tree
//! - `extract_dof_component_map`: assignment of every scalar dof to its
//!   leaf subspace component
//! - `interpolate_nonmatching`: filling a destination space's local dof
//!   buffer by point-evaluating a source field on a different mesh, one
//!   owning rank at a time

pub mod component_map;
pub mod interpolate;
pub mod space;

pub use component_map::{extract_dof_component_map, DofComponentMap};
pub use interpolate::interpolate_nonmatching;
pub use space::{FunctionSpace, SpaceLayout};

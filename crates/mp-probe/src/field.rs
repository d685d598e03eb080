//! The consumed field-evaluation capability.
//!
//! Locating the mesh cell that contains a point and evaluating basis
//! functions there belong to the host simulation; probing only needs this
//! narrow seam.

/// A field that can be point-evaluated on the calling process.
pub trait FieldEval {
    /// Spatial dimension of evaluation points.
    fn geometry_dim(&self) -> usize;

    /// Number of value components (1 for scalar fields, N for vector or
    /// tensor fields of dimension N).
    fn value_size(&self) -> usize;

    /// Whether this process can evaluate the field at `point`. Exactly one
    /// rank of the group owns any point inside the global domain.
    fn owns_point(&self, point: &[f64]) -> bool;

    /// Evaluate the field at an owned point, writing `value_size()` values
    /// into `out`. Only called for points `owns_point` accepted.
    fn eval_at(&self, point: &[f64], out: &mut [f64]);
}

impl<F: FieldEval + ?Sized> FieldEval for &F {
    fn geometry_dim(&self) -> usize {
        (**self).geometry_dim()
    }

    fn value_size(&self) -> usize {
        (**self).value_size()
    }

    fn owns_point(&self, point: &[f64]) -> bool {
        (**self).owns_point(point)
    }

    fn eval_at(&self, point: &[f64], out: &mut [f64]) {
        (**self).eval_at(point, out)
    }
}

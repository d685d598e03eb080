//! Analytic fields over slab-partitioned domains, for tests.
//!
//! A `SlabField` splits the x-extent of the global domain into equal slabs,
//! one per rank, so a set of points distributes across a `LocalGroup` the
//! way mesh cells distribute across real processes. Evaluation is an exact
//! closed-form function, which keeps assertions tolerance-free.

use crate::field::FieldEval;

/// Analytic field owned in equal x-slabs across a process group.
#[derive(Debug, Clone)]
pub struct SlabField {
    rank: usize,
    size: usize,
    gdim: usize,
    value_size: usize,
    lo: f64,
    hi: f64,
    func: fn(&[f64], &mut [f64]),
}

impl SlabField {
    pub fn new(
        rank: usize,
        size: usize,
        gdim: usize,
        value_size: usize,
        extent: (f64, f64),
        func: fn(&[f64], &mut [f64]),
    ) -> Self {
        assert!(rank < size);
        assert!(extent.0 < extent.1);
        SlabField {
            rank,
            size,
            gdim,
            value_size,
            lo: extent.0,
            hi: extent.1,
            func,
        }
    }

    /// The 4-component demo field `(x, y, z, y*z)` on x in [0, 2).
    pub fn xyz_yz(rank: usize, size: usize) -> Self {
        SlabField::new(rank, size, 3, 4, (0.0, 2.0), |p, out| {
            out[0] = p[0];
            out[1] = p[1];
            out[2] = p[2];
            out[3] = p[1] * p[2];
        })
    }

    /// Scalar field `x + 10y + 100z` on x in [0, 2).
    pub fn linear(rank: usize, size: usize) -> Self {
        SlabField::new(rank, size, 3, 1, (0.0, 2.0), |p, out| {
            out[0] = p[0] + 10.0 * p[1] + 100.0 * p[2];
        })
    }
}

impl FieldEval for SlabField {
    fn geometry_dim(&self) -> usize {
        self.gdim
    }

    fn value_size(&self) -> usize {
        self.value_size
    }

    fn owns_point(&self, point: &[f64]) -> bool {
        let x = point[0];
        if x < self.lo || x >= self.hi {
            return false;
        }
        let width = (self.hi - self.lo) / self.size as f64;
        let slab = ((x - self.lo) / width) as usize;
        slab.min(self.size - 1) == self.rank
    }

    fn eval_at(&self, point: &[f64], out: &mut [f64]) {
        (self.func)(point, out)
    }
}

//! Multi-rank interpolation tests over an in-process group.
//!
//! Destination spaces here assign dof coordinates by a fixed permutation of
//! the dof index, so a rank's dofs scatter across the source field's
//! ownership slabs and every round of the rank loop exchanges real data.

use std::thread;

use approx::assert_abs_diff_eq;
use mp_comm::{LocalGroup, ProcessGroup};
use mp_interp::{interpolate_nonmatching, FunctionSpace, SpaceLayout};
use mp_probe::testutil::SlabField;

fn run_on_ranks<F>(n: usize, f: F)
where
    F: Fn(LocalGroup) + Send + Sync + Clone + 'static,
{
    let handles: Vec<_> = LocalGroup::split(n)
        .into_iter()
        .map(|g| {
            let f = f.clone();
            thread::spawn(move || f(g))
        })
        .collect();
    for h in handles {
        h.join().expect("rank thread panicked");
    }
}

/// Scalar destination: one dof per node, contiguous ownership, coordinates
/// permuted across the x-extent [0, 2).
#[derive(Clone)]
struct ScalarSlabSpace {
    rank: usize,
    size: usize,
    nodes_per_rank: usize,
}

impl ScalarSlabSpace {
    fn total_nodes(&self) -> usize {
        self.size * self.nodes_per_rank
    }

    fn node_coord(&self, node: usize) -> [f64; 3] {
        let n = self.total_nodes();
        let shuffled = (node * 7) % n;
        let x = (shuffled as f64 + 0.5) * 2.0 / n as f64;
        [x, 0.25 * x, 1.0 - 0.4 * x]
    }
}

impl FunctionSpace for ScalarSlabSpace {
    fn geometry_dim(&self) -> usize {
        3
    }

    fn ownership_range(&self) -> (usize, usize) {
        let start = self.rank * self.nodes_per_rank;
        (start, start + self.nodes_per_rank)
    }

    fn dof_coordinates(&self) -> Vec<f64> {
        let (start, end) = self.ownership_range();
        (start..end)
            .flat_map(|node| self.node_coord(node))
            .collect()
    }

    fn layout(&self) -> SpaceLayout {
        let (start, end) = self.ownership_range();
        SpaceLayout::leaf((start..end).collect())
    }
}

/// Mixed destination: four leaf components interleaved node-major, dof
/// `node * 4 + c` belongs to component `c` and sits at the node coordinate.
#[derive(Clone)]
struct MixedSlabSpace {
    scalar: ScalarSlabSpace,
}

impl MixedSlabSpace {
    fn new(rank: usize, size: usize, nodes_per_rank: usize) -> Self {
        MixedSlabSpace {
            scalar: ScalarSlabSpace {
                rank,
                size,
                nodes_per_rank,
            },
        }
    }
}

impl FunctionSpace for MixedSlabSpace {
    fn geometry_dim(&self) -> usize {
        3
    }

    fn ownership_range(&self) -> (usize, usize) {
        let (start, end) = self.scalar.ownership_range();
        (start * 4, end * 4)
    }

    fn dof_coordinates(&self) -> Vec<f64> {
        let (start, end) = self.scalar.ownership_range();
        (start..end)
            .flat_map(|node| {
                let p = self.scalar.node_coord(node);
                (0..4).flat_map(move |_| p)
            })
            .collect()
    }

    fn layout(&self) -> SpaceLayout {
        let (start, end) = self.ownership_range();
        let leaves = (0..4)
            .map(|c| SpaceLayout::leaf((start..end).filter(|d| d % 4 == c).collect()))
            .collect();
        SpaceLayout::mixed(leaves)
    }
}

#[test]
fn scalar_interpolation_recovers_the_source_field() {
    run_on_ranks(3, |group| {
        let source = SlabField::linear(group.rank(), group.size());
        let dest = ScalarSlabSpace {
            rank: group.rank(),
            size: group.size(),
            nodes_per_rank: 5,
        };
        let dd = interpolate_nonmatching(&source, &dest, &group).unwrap();
        assert_eq!(dd.len(), 5);
        let (start, _) = dest.ownership_range();
        for (j, v) in dd.iter().enumerate() {
            let p = dest.node_coord(start + j);
            let want = p[0] + 10.0 * p[1] + 100.0 * p[2];
            assert_abs_diff_eq!(*v, want, epsilon = 1e-12);
        }
    });
}

#[test]
fn solo_interpolation_is_the_identity() {
    let group = LocalGroup::solo();
    let source = SlabField::linear(0, 1);
    let dest = ScalarSlabSpace {
        rank: 0,
        size: 1,
        nodes_per_rank: 8,
    };
    let dd = interpolate_nonmatching(&source, &dest, &group).unwrap();
    for (j, v) in dd.iter().enumerate() {
        let p = dest.node_coord(j);
        let want = p[0] + 10.0 * p[1] + 100.0 * p[2];
        assert_abs_diff_eq!(*v, want, epsilon = 1e-12);
    }
}

#[test]
fn mixed_interpolation_remaps_components() {
    run_on_ranks(2, |group| {
        let source = SlabField::xyz_yz(group.rank(), group.size());
        let dest = MixedSlabSpace::new(group.rank(), group.size(), 4);
        let dd = interpolate_nonmatching(&source, &dest, &group).unwrap();
        assert_eq!(dd.len(), 16);
        let (start, _) = dest.ownership_range();
        for (j, v) in dd.iter().enumerate() {
            let dof = start + j;
            let node = dof / 4;
            let comp = dof % 4;
            let p = dest.scalar.node_coord(node);
            let want = [p[0], p[1], p[2], p[1] * p[2]][comp];
            assert_abs_diff_eq!(*v, want, epsilon = 1e-12);
        }
    });
}

#[test]
fn geometry_mismatch_is_rejected_up_front() {
    let group = LocalGroup::solo();
    let source = SlabField::new(0, 1, 2, 1, (0.0, 2.0), |p, out| out[0] = p[0]);
    let dest = ScalarSlabSpace {
        rank: 0,
        size: 1,
        nodes_per_rank: 2,
    };
    let err = interpolate_nonmatching(&source, &dest, &group).unwrap_err();
    assert!(matches!(
        err,
        mp_common::Error::GeometryMismatch { source: 2, dest: 3 }
    ));
}

#[test]
fn scalar_destination_rejects_multi_component_source() {
    let group = LocalGroup::solo();
    let source = SlabField::xyz_yz(0, 1);
    let dest = ScalarSlabSpace {
        rank: 0,
        size: 1,
        nodes_per_rank: 2,
    };
    let err = interpolate_nonmatching(&source, &dest, &group).unwrap_err();
    assert!(matches!(
        err,
        mp_common::Error::ValueSizeMismatch { value_size: 4 }
    ));
}

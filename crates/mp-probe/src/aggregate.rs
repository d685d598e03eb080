//! Root aggregation of distributed probe data.
//!
//! Every rank computes its partial array (local probes x components x
//! selected axis), all ranks join a count gather, and root merges: its own
//! rows first, then each non-root rank's contribution in increasing rank
//! order, id list before value payload. Non-root ranks send and return
//! without waiting on root. The merged array is id-ordered and, optionally,
//! persisted to a `.probes` dump by root alone.

use std::path::{Path, PathBuf};

use mp_common::{Error, Result};
use mp_comm::{MessageTag, Payload, ProcessGroup};
use ndarray::{Array3, ArrayD, Axis};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::collection::{ProbeCollection, StatisticProbeCollection};
use crate::record::StatSlot;

/// Conventional root rank when the caller has no reason to pick another.
pub const DEFAULT_ROOT: usize = 0;

/// What to aggregate: one snapshot, one statistic slot, or the full axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    /// A single full-history snapshot.
    Snapshot(usize),
    /// A single running-statistic slot.
    Slot(StatSlot),
    /// Every snapshot (or both statistic slots).
    All,
}

impl Selector {
    /// Axis indices this selector covers, validated against the local
    /// collection before any communication happens.
    fn indices(self, axis_len: usize) -> Result<Vec<usize>> {
        match self {
            Selector::Snapshot(n) => {
                if n >= axis_len {
                    return Err(Error::SnapshotOutOfRange {
                        requested: n,
                        available: axis_len,
                    });
                }
                Ok(vec![n])
            }
            Selector::Slot(slot) => Ok(vec![slot.index()]),
            Selector::All => Ok((0..axis_len).collect()),
        }
    }

    fn dump_suffix(self, statistics: bool) -> String {
        if statistics {
            return "_statistics".to_string();
        }
        match self {
            Selector::Snapshot(n) => format!("_snapshot_{n}"),
            Selector::Slot(slot) => format!("_snapshot_{}", slot.index()),
            Selector::All => "_all".to_string(),
        }
    }
}

/// The collection contract the aggregation protocol consumes. Implemented
/// by both the full-history and the statistics collections.
pub trait ProbeSet {
    fn value_size(&self) -> usize;
    fn local_count(&self) -> usize;
    /// Root-accurate total probe count across the group.
    fn total_count(&self) -> usize;
    /// This rank's global probe ids, in local order.
    fn global_ids(&self) -> Vec<u64>;
    /// Length of the snapshot (or slot) axis.
    fn axis_len(&self) -> usize;
    /// Local values of one component at one axis index, in local order.
    fn component_and_index(&self, component: usize, index: usize) -> Result<Vec<f64>>;
    /// Whether this is the running-statistics variant (drives the dump
    /// file name).
    fn is_statistics(&self) -> bool {
        false
    }
}

impl ProbeSet for ProbeCollection {
    fn value_size(&self) -> usize {
        self.value_size()
    }

    fn local_count(&self) -> usize {
        self.local_count()
    }

    fn total_count(&self) -> usize {
        self.total_count()
    }

    fn global_ids(&self) -> Vec<u64> {
        self.global_ids().iter().map(|id| id.0).collect()
    }

    fn axis_len(&self) -> usize {
        self.snapshot_count()
    }

    fn component_and_index(&self, component: usize, index: usize) -> Result<Vec<f64>> {
        self.component_and_snapshot(component, index)
    }
}

impl ProbeSet for StatisticProbeCollection {
    fn value_size(&self) -> usize {
        self.value_size()
    }

    fn local_count(&self) -> usize {
        self.local_count()
    }

    fn total_count(&self) -> usize {
        self.total_count()
    }

    fn global_ids(&self) -> Vec<u64> {
        self.global_ids().iter().map(|id| id.0).collect()
    }

    fn axis_len(&self) -> usize {
        2
    }

    fn component_and_index(&self, component: usize, index: usize) -> Result<Vec<f64>> {
        self.component_and_slot(component, index)
    }

    fn is_statistics(&self) -> bool {
        true
    }
}

/// Reconstruct the full, id-ordered result array on `root`.
///
/// Returns the merged array (with trailing singleton axes squeezed) on
/// root and `None` on every other rank. Local state is unmodified, so
/// calling this twice without an intervening evaluation yields identical
/// results. Every rank of the group must make this call; a missing
/// participant blocks the group forever.
pub fn gather_on_root<C, G>(
    coll: &C,
    selector: Selector,
    root: usize,
    group: &G,
) -> Result<Option<ArrayD<f64>>>
where
    C: ProbeSet,
    G: ProcessGroup,
{
    group.check_rank(root)?;
    // precondition checks complete before any communication
    let indices = selector.indices(coll.axis_len())?;
    let comp = coll.value_size();
    let naxis = indices.len();
    let local = coll.local_count();
    let is_root = group.rank() == root;
    let ids = coll.global_ids();

    let rows = if is_root { coll.total_count() } else { local };
    let mut z = Array3::<f64>::zeros((rows, comp, naxis));
    for (a, &idx) in indices.iter().enumerate() {
        for k in 0..comp {
            let column = coll.component_and_index(k, idx)?;
            for (i, v) in column.iter().enumerate() {
                let r = if is_root { ids[i] as usize } else { i };
                z[[r, k, a]] = *v;
            }
        }
    }

    let counts = group.gather_counts(root, local)?;

    if is_root {
        let counts =
            counts.ok_or_else(|| Error::GroupClosed("count gather yielded nothing on root".into()))?;
        for src in 0..group.size() {
            if src == root {
                continue;
            }
            let src_ids = group.recv(src, MessageTag::Ids)?.into_ids()?;
            let (shape, data) = group.recv(src, MessageTag::Values)?.into_values()?;
            let expected = vec![src_ids.len(), comp, naxis];
            if shape != expected || data.len() != expected.iter().product::<usize>() {
                return Err(Error::PayloadShape {
                    expected,
                    actual: shape,
                });
            }
            for (i, id) in src_ids.iter().enumerate() {
                for k in 0..comp {
                    for a in 0..naxis {
                        z[[*id as usize, k, a]] = data[(i * comp + k) * naxis + a];
                    }
                }
            }
            debug!(src, probes = src_ids.len(), "merged partial from rank");
        }
        let found: usize = counts.iter().sum();
        if found != coll.total_count() {
            return Err(Error::IncompleteCoverage {
                expected: coll.total_count(),
                found,
            });
        }
        debug!(
            rows = coll.total_count(),
            components = comp,
            axis = naxis,
            "aggregation complete on root"
        );
        Ok(Some(squeeze_trailing(z.into_dyn())))
    } else {
        group.send(root, MessageTag::Ids, Payload::Ids(ids))?;
        let (data, _) = z.into_raw_vec_and_offset();
        group.send(
            root,
            MessageTag::Values,
            Payload::Values {
                shape: vec![local, comp, naxis],
                data,
            },
        )?;
        debug!(rank = group.rank(), root, probes = local, "sent partial to root");
        Ok(None)
    }
}

/// Aggregate on `root` and persist the result there.
///
/// The dump lands next to `basename`:
/// `<basename>_snapshot_<N>.probes`, `<basename>_all.probes`, or
/// `<basename>_statistics.probes` for the statistics variant. Only root
/// writes; every other rank returns `None` as with `gather_on_root`.
pub fn gather_and_save<C, G>(
    coll: &C,
    selector: Selector,
    root: usize,
    group: &G,
    basename: &str,
) -> Result<Option<ArrayD<f64>>>
where
    C: ProbeSet,
    G: ProcessGroup,
{
    let merged = gather_on_root(coll, selector, root, group)?;
    if let Some(array) = &merged {
        let path = PathBuf::from(format!(
            "{basename}{}.probes",
            selector.dump_suffix(coll.is_statistics())
        ));
        write_dump(array, &path)?;
        info!(path = %path.display(), "wrote probe dump");
    }
    Ok(merged)
}

/// On-disk representation of a probe dump.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeDump {
    pub shape: Vec<usize>,
    pub data: Vec<f64>,
}

fn write_dump(array: &ArrayD<f64>, path: &Path) -> Result<()> {
    let dump = ProbeDump {
        shape: array.shape().to_vec(),
        data: array.iter().copied().collect(),
    };
    std::fs::write(path, bincode::serialize(&dump)?)?;
    Ok(())
}

/// Read a probe dump back, for inspection and tests.
pub fn read_dump(path: &Path) -> Result<ProbeDump> {
    let bytes = std::fs::read(path)?;
    Ok(bincode::deserialize(&bytes)?)
}

/// Remove trailing axes of length one, matching the shape callers expect
/// from a squeezed result (a scalar-field snapshot comes back 1-D).
fn squeeze_trailing(mut array: ArrayD<f64>) -> ArrayD<f64> {
    while array.ndim() > 1 && array.shape()[array.ndim() - 1] == 1 {
        let last = array.ndim() - 1;
        array = array.index_axis_move(Axis(last), 0);
    }
    array
}

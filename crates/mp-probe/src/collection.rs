//! Process-local probe collections with collective global-id assignment.
//!
//! Every rank calls `new`/`add_positions` with the same flattened point
//! list; the global id of a point is its position in that cumulative
//! sequence, so ids agree across ranks without any communication. A rank
//! keeps records only for the points its field can evaluate.

use mp_common::{Error, GlobalProbeId, Result};

use crate::field::FieldEval;
use crate::record::{ProbeRecord, StatSlot, StatisticProbeRecord};

fn check_points(points: &[f64], gdim: usize) -> Result<()> {
    if gdim == 0 || points.len() % gdim != 0 {
        return Err(Error::MalformedPoints {
            len: points.len(),
            gdim,
        });
    }
    Ok(())
}

/// Process-local set of `ProbeRecord`s.
#[derive(Debug, Clone)]
pub struct ProbeCollection {
    gdim: usize,
    value_size: usize,
    /// Cumulative number of points supplied across all ranks' collective
    /// `add_positions` calls; root-accurate total probe count.
    total: usize,
    records: Vec<(GlobalProbeId, ProbeRecord)>,
    evals: usize,
}

impl ProbeCollection {
    /// Create a collection over a flattened point array, keeping the points
    /// the local field owns.
    pub fn new<F: FieldEval>(points: &[f64], field: &F) -> Result<Self> {
        let mut coll = ProbeCollection {
            gdim: field.geometry_dim(),
            value_size: field.value_size(),
            total: 0,
            records: Vec::new(),
            evals: 0,
        };
        coll.add_positions(points, field)?;
        Ok(coll)
    }

    /// Append points, extending the global id space from the current total.
    pub fn add_positions<F: FieldEval>(&mut self, points: &[f64], field: &F) -> Result<()> {
        check_points(points, self.gdim)?;
        for point in points.chunks(self.gdim) {
            let id = GlobalProbeId(self.total as u64);
            self.total += 1;
            if field.owns_point(point) {
                self.records
                    .push((id, ProbeRecord::new(point.to_vec(), self.value_size)));
            }
        }
        Ok(())
    }

    /// Evaluate the field at every local probe, appending one snapshot.
    pub fn eval<F: FieldEval>(&mut self, field: &F) {
        for (_, rec) in &mut self.records {
            rec.eval(field);
        }
        self.evals += 1;
    }

    pub fn value_size(&self) -> usize {
        self.value_size
    }

    pub fn geometry_dim(&self) -> usize {
        self.gdim
    }

    /// Number of probes owned by this rank.
    pub fn local_count(&self) -> usize {
        self.records.len()
    }

    /// Total number of probes supplied across the group.
    pub fn total_count(&self) -> usize {
        self.total
    }

    /// Snapshots recorded so far (uniform across ranks, since evaluation is
    /// collective).
    pub fn snapshot_count(&self) -> usize {
        self.evals
    }

    /// This rank's global ids, in local order.
    pub fn global_ids(&self) -> Vec<GlobalProbeId> {
        self.records.iter().map(|(id, _)| *id).collect()
    }

    /// Indexed access; `None` past the end.
    pub fn get(&self, index: usize) -> Option<(GlobalProbeId, &ProbeRecord)> {
        self.records.get(index).map(|(id, rec)| (*id, rec))
    }

    /// Iterate local probes as `(global id, record)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (GlobalProbeId, &ProbeRecord)> {
        self.records.iter().map(|(id, rec)| (*id, rec))
    }

    /// Local values of one component at one snapshot, in local order.
    pub fn component_and_snapshot(&self, component: usize, snapshot: usize) -> Result<Vec<f64>> {
        if component >= self.value_size {
            return Err(Error::ComponentOutOfRange {
                requested: component,
                value_size: self.value_size,
            });
        }
        if snapshot >= self.evals {
            return Err(Error::SnapshotOutOfRange {
                requested: snapshot,
                available: self.evals,
            });
        }
        self.records
            .iter()
            .map(|(_, rec)| Ok(rec.snapshot(snapshot)?[component]))
            .collect()
    }

    /// Drop all accumulated history; point identities are retained.
    pub fn clear(&mut self) {
        for (_, rec) in &mut self.records {
            rec.clear();
        }
        self.evals = 0;
    }
}

/// Iterator over `(global id, record)` pairs of a collection.
pub struct Iter<'a> {
    inner: std::slice::Iter<'a, (GlobalProbeId, ProbeRecord)>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (GlobalProbeId, &'a ProbeRecord);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(id, rec)| (*id, rec))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a> IntoIterator for &'a ProbeCollection {
    type Item = (GlobalProbeId, &'a ProbeRecord);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        Iter {
            inner: self.records.iter(),
        }
    }
}

/// Process-local set of `StatisticProbeRecord`s.
#[derive(Debug, Clone)]
pub struct StatisticProbeCollection {
    gdim: usize,
    value_size: usize,
    total: usize,
    records: Vec<(GlobalProbeId, StatisticProbeRecord)>,
    evals: usize,
}

impl StatisticProbeCollection {
    pub fn new<F: FieldEval>(points: &[f64], field: &F) -> Result<Self> {
        let mut coll = StatisticProbeCollection {
            gdim: field.geometry_dim(),
            value_size: field.value_size(),
            total: 0,
            records: Vec::new(),
            evals: 0,
        };
        coll.add_positions(points, field)?;
        Ok(coll)
    }

    pub fn add_positions<F: FieldEval>(&mut self, points: &[f64], field: &F) -> Result<()> {
        check_points(points, self.gdim)?;
        for point in points.chunks(self.gdim) {
            let id = GlobalProbeId(self.total as u64);
            self.total += 1;
            if field.owns_point(point) {
                self.records.push((
                    id,
                    StatisticProbeRecord::new(point.to_vec(), self.value_size),
                ));
            }
        }
        Ok(())
    }

    /// Evaluate the field at every local probe, folding the running sums.
    pub fn eval<F: FieldEval>(&mut self, field: &F) {
        for (_, rec) in &mut self.records {
            rec.eval(field);
        }
        self.evals += 1;
    }

    pub fn value_size(&self) -> usize {
        self.value_size
    }

    pub fn geometry_dim(&self) -> usize {
        self.gdim
    }

    pub fn local_count(&self) -> usize {
        self.records.len()
    }

    pub fn total_count(&self) -> usize {
        self.total
    }

    /// Evaluations folded into the running statistics so far.
    pub fn evaluations(&self) -> usize {
        self.evals
    }

    pub fn global_ids(&self) -> Vec<GlobalProbeId> {
        self.records.iter().map(|(id, _)| *id).collect()
    }

    pub fn get(&self, index: usize) -> Option<(GlobalProbeId, &StatisticProbeRecord)> {
        self.records.get(index).map(|(id, rec)| (*id, rec))
    }

    pub fn iter(&self) -> impl Iterator<Item = (GlobalProbeId, &StatisticProbeRecord)> {
        self.records.iter().map(|(id, rec)| (*id, rec))
    }

    /// Local values of one component for one statistic slot, in local
    /// order. `slot` outside {0, 1} is rejected before any communication.
    pub fn component_and_slot(&self, component: usize, slot: usize) -> Result<Vec<f64>> {
        if component >= self.value_size {
            return Err(Error::ComponentOutOfRange {
                requested: component,
                value_size: self.value_size,
            });
        }
        let slot = StatSlot::try_from(slot)?;
        Ok(self
            .records
            .iter()
            .map(|(_, rec)| rec.slot(slot)[component])
            .collect())
    }

    /// Reset the running statistics; point identities are retained.
    pub fn clear(&mut self) {
        for (_, rec) in &mut self.records {
            rec.clear();
        }
        self.evals = 0;
    }
}

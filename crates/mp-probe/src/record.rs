//! Single-point probe records.
//!
//! `ProbeRecord` keeps the full time history of field values at one fixed
//! point, one snapshot per evaluation. `StatisticProbeRecord` keeps exactly
//! two running-statistic slots instead: the accumulated value sum and the
//! accumulated square sum, with a shared evaluation counter.

use mp_common::{Error, Result};

use crate::field::FieldEval;

/// Fixed spatial point with an appendable snapshot history.
#[derive(Debug, Clone)]
pub struct ProbeRecord {
    position: Vec<f64>,
    value_size: usize,
    /// Snapshot-major storage: snapshot n occupies
    /// `n * value_size .. (n + 1) * value_size`.
    history: Vec<f64>,
}

impl ProbeRecord {
    pub fn new(position: Vec<f64>, value_size: usize) -> Self {
        ProbeRecord {
            position,
            value_size,
            history: Vec::new(),
        }
    }

    /// Physical coordinates of the probe point.
    pub fn position(&self) -> &[f64] {
        &self.position
    }

    pub fn value_size(&self) -> usize {
        self.value_size
    }

    /// Number of snapshots recorded so far.
    pub fn snapshot_count(&self) -> usize {
        self.history.len() / self.value_size
    }

    /// Evaluate the field at this point, appending one snapshot.
    pub fn eval<F: FieldEval>(&mut self, field: &F) {
        let start = self.history.len();
        self.history.resize(start + self.value_size, 0.0);
        field.eval_at(&self.position, &mut self.history[start..]);
    }

    /// All value components of one snapshot.
    pub fn snapshot(&self, n: usize) -> Result<&[f64]> {
        let count = self.snapshot_count();
        if n >= count {
            return Err(Error::SnapshotOutOfRange {
                requested: n,
                available: count,
            });
        }
        let start = n * self.value_size;
        Ok(&self.history[start..start + self.value_size])
    }

    /// Time history of one value component across all snapshots.
    pub fn component_history(&self, component: usize) -> Result<Vec<f64>> {
        if component >= self.value_size {
            return Err(Error::ComponentOutOfRange {
                requested: component,
                value_size: self.value_size,
            });
        }
        Ok(self
            .history
            .chunks(self.value_size)
            .map(|snap| snap[component])
            .collect())
    }

    /// Drop all accumulated history; the point identity is retained.
    pub fn clear(&mut self) {
        self.history.clear();
    }
}

/// One of the two running-statistic channels of a statistics probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatSlot {
    /// Running mean of the field values.
    MeanSum = 0,
    /// Running mean of the squared field values.
    SquareSum = 1,
}

impl StatSlot {
    pub fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<usize> for StatSlot {
    type Error = Error;

    fn try_from(i: usize) -> Result<Self> {
        match i {
            0 => Ok(StatSlot::MeanSum),
            1 => Ok(StatSlot::SquareSum),
            other => Err(Error::InvalidStatSlot { requested: other }),
        }
    }
}

/// Fixed spatial point with two running-statistic slots updated in place.
#[derive(Debug, Clone)]
pub struct StatisticProbeRecord {
    position: Vec<f64>,
    value_size: usize,
    /// Value sums followed by square sums, `2 * value_size` entries.
    sums: Vec<f64>,
    evals: usize,
}

impl StatisticProbeRecord {
    pub fn new(position: Vec<f64>, value_size: usize) -> Self {
        StatisticProbeRecord {
            position,
            value_size,
            sums: vec![0.0; 2 * value_size],
            evals: 0,
        }
    }

    pub fn position(&self) -> &[f64] {
        &self.position
    }

    pub fn value_size(&self) -> usize {
        self.value_size
    }

    /// Number of evaluations folded into the running sums.
    pub fn evaluations(&self) -> usize {
        self.evals
    }

    /// Evaluate the field at this point, folding the value and its square
    /// into the running sums.
    pub fn eval<F: FieldEval>(&mut self, field: &F) {
        let vs = self.value_size;
        let mut value = vec![0.0; vs];
        field.eval_at(&self.position, &mut value);
        for (k, v) in value.iter().enumerate() {
            self.sums[k] += v;
            self.sums[vs + k] += v * v;
        }
        self.evals += 1;
    }

    /// Current running statistic for one slot, normalized by the evaluation
    /// count. All zeros before the first evaluation.
    pub fn slot(&self, slot: StatSlot) -> Vec<f64> {
        let vs = self.value_size;
        let start = slot.index() * vs;
        if self.evals == 0 {
            return vec![0.0; vs];
        }
        let n = self.evals as f64;
        self.sums[start..start + vs].iter().map(|s| s / n).collect()
    }

    /// Running mean per component.
    pub fn mean(&self) -> Vec<f64> {
        self.slot(StatSlot::MeanSum)
    }

    /// Running population variance per component.
    pub fn variance(&self) -> Vec<f64> {
        let mean = self.mean();
        self.slot(StatSlot::SquareSum)
            .iter()
            .zip(&mean)
            .map(|(sq, m)| sq - m * m)
            .collect()
    }

    /// Reset the running sums and the evaluation counter; the point
    /// identity is retained.
    pub fn clear(&mut self) {
        self.sums.iter_mut().for_each(|s| *s = 0.0);
        self.evals = 0;
    }
}

//! Probe identity types.
//!
//! A probe point is identified by its position in the cumulative sequence of
//! points supplied to a collection. Every rank runs the same collective
//! `add_positions` calls, so the id assignment is identical everywhere even
//! though each rank keeps only the points it can evaluate.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Process-independent identifier of a probe point, stable for the run.
///
/// Ids are assigned monotonically as positions are added and double as the
/// row index of the aggregated result array on root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GlobalProbeId(pub u64);

impl GlobalProbeId {
    /// Row index into an aggregated result array.
    pub fn row(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for GlobalProbeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for GlobalProbeId {
    fn from(id: u64) -> Self {
        GlobalProbeId(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_is_transparent_in_serde() {
        let id = GlobalProbeId(42);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "42");
        let back: GlobalProbeId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn id_orders_by_value() {
        assert!(GlobalProbeId(3) < GlobalProbeId(7));
        assert_eq!(GlobalProbeId(5).row(), 5);
    }
}

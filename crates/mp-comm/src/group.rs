//! The process-group trait and wire-level message model.
//!
//! Point-to-point messages carry an explicit tag so that the two exchanges
//! of the aggregation protocol (id list, then value payload) can never be
//! confused even when several logical exchanges are conceptually in flight.

use mp_common::{Error, Result};
use serde::{Deserialize, Serialize};

/// Purpose tag of a point-to-point message.
///
/// The wire values match the tag scheme the protocol has always used:
/// 101 for id lists, 102 for value payloads.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageTag {
    /// A list of global probe ids, in the sender's local order.
    Ids = 101,
    /// A flattened value array plus its shape.
    Values = 102,
}

impl MessageTag {
    /// Numeric wire tag.
    pub fn wire(self) -> u16 {
        self as u16
    }
}

impl std::fmt::Display for MessageTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageTag::Ids => write!(f, "ids"),
            MessageTag::Values => write!(f, "values"),
        }
    }
}

/// Body of a tagged point-to-point message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Payload {
    /// Global probe ids, one per locally held probe.
    Ids(Vec<u64>),
    /// Row-major value array with its shape.
    Values { shape: Vec<usize>, data: Vec<f64> },
}

impl Payload {
    fn kind(&self) -> &'static str {
        match self {
            Payload::Ids(_) => "ids",
            Payload::Values { .. } => "values",
        }
    }

    /// Unwrap an id-list payload.
    pub fn into_ids(self) -> Result<Vec<u64>> {
        match self {
            Payload::Ids(ids) => Ok(ids),
            other => Err(Error::PayloadMismatch {
                tag: "ids",
                got: other.kind(),
            }),
        }
    }

    /// Unwrap a value payload into (shape, data).
    pub fn into_values(self) -> Result<(Vec<usize>, Vec<f64>)> {
        match self {
            Payload::Values { shape, data } => Ok((shape, data)),
            other => Err(Error::PayloadMismatch {
                tag: "values",
                got: other.kind(),
            }),
        }
    }
}

/// Fixed-size process group established once per run.
///
/// Every rank must call every collective entry point in the same order;
/// calls block until the exchange completes. Implementations must deliver
/// messages between a given pair of ranks in send order.
pub trait ProcessGroup {
    /// This process's rank, in `0..size()`.
    fn rank(&self) -> usize;

    /// Number of ranks in the group.
    fn size(&self) -> usize;

    /// Broadcast `buf` from `root` to every rank. On non-root ranks the
    /// buffer is replaced by the root's contents, resizing as needed.
    fn broadcast_f64(&self, root: usize, buf: &mut Vec<f64>) -> Result<()>;

    /// Gather one count per rank onto `root`. Returns the rank-indexed
    /// counts on root and `None` elsewhere.
    fn gather_counts(&self, root: usize, count: usize) -> Result<Option<Vec<usize>>>;

    /// Send a tagged message to `dest`. Does not block on the receiver.
    fn send(&self, dest: usize, tag: MessageTag, payload: Payload) -> Result<()>;

    /// Receive the next message with the given tag from `source`, blocking
    /// until one arrives. Messages with other tags from the same source are
    /// held back in order.
    fn recv(&self, source: usize, tag: MessageTag) -> Result<Payload>;

    /// Validate a caller-supplied rank (e.g. the root parameter).
    fn check_rank(&self, rank: usize) -> Result<()> {
        if rank >= self.size() {
            return Err(Error::RankOutOfRange {
                rank,
                size: self.size(),
            });
        }
        Ok(())
    }
}

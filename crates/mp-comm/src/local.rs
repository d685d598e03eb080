//! In-process process group backed by crossbeam channels.
//!
//! `LocalGroup::split(n)` builds a fully connected mesh of unbounded
//! channels and hands out one group handle per rank. Each handle is meant to
//! be moved onto its own thread; collectives are implemented over the same
//! channels as the tagged point-to-point messages. An rsmpi-backed group can
//! replace this behind the same trait without touching the protocol code.

use std::cell::RefCell;
use std::collections::VecDeque;

use crossbeam_channel::{unbounded, Receiver, Sender};
use mp_common::{Error, Result};

use crate::group::{MessageTag, Payload, ProcessGroup};

/// One envelope on the rank-to-rank channels. Collectives share the fabric
/// with tagged messages, so the receiver filters by variant.
#[derive(Debug)]
enum Wire {
    Tagged(MessageTag, Payload),
    Bcast(Vec<f64>),
    Count(usize),
}

/// Handle for one rank of an in-process group.
///
/// Not `Sync`: a handle belongs to exactly one thread, like a communicator
/// belongs to one process.
pub struct LocalGroup {
    rank: usize,
    size: usize,
    /// senders[d] delivers into rank d's inbox for messages from this rank.
    senders: Vec<Sender<Wire>>,
    /// inboxes[s] receives messages sent by rank s.
    inboxes: Vec<Receiver<Wire>>,
    /// Per-source hold-back queues preserving arrival order for messages
    /// that did not match the variant currently being waited on.
    pending: RefCell<Vec<VecDeque<Wire>>>,
}

impl LocalGroup {
    /// Build a connected group of `n` ranks and return one handle per rank,
    /// in rank order.
    ///
    /// # Panics
    /// Panics if `n` is zero.
    pub fn split(n: usize) -> Vec<LocalGroup> {
        assert!(n > 0, "process group needs at least one rank");
        // pair (s, d) gets its own channel so per-pair ordering holds
        let mut txs: Vec<Vec<Sender<Wire>>> = Vec::with_capacity(n);
        let mut rxs: Vec<Vec<Option<Receiver<Wire>>>> = Vec::with_capacity(n);
        for _ in 0..n {
            let mut tx_row = Vec::with_capacity(n);
            let mut rx_row = Vec::with_capacity(n);
            for _ in 0..n {
                let (tx, rx) = unbounded();
                tx_row.push(tx);
                rx_row.push(Some(rx));
            }
            txs.push(tx_row);
            rxs.push(rx_row);
        }

        (0..n)
            .map(|rank| {
                let senders = (0..n).map(|dest| txs[rank][dest].clone()).collect();
                let inboxes = (0..n)
                    .map(|src| {
                        rxs[src][rank]
                            .take()
                            .unwrap_or_else(|| unreachable!("receiver taken twice"))
                    })
                    .collect();
                LocalGroup {
                    rank,
                    size: n,
                    senders,
                    inboxes,
                    pending: RefCell::new((0..n).map(|_| VecDeque::new()).collect()),
                }
            })
            .collect()
    }

    /// Single-rank group, for serial runs and tests.
    pub fn solo() -> LocalGroup {
        LocalGroup::split(1)
            .pop()
            .unwrap_or_else(|| unreachable!("split(1) yields one handle"))
    }

    fn push_wire(&self, dest: usize, wire: Wire) -> Result<()> {
        self.check_rank(dest)?;
        self.senders[dest]
            .send(wire)
            .map_err(|_| Error::GroupClosed(format!("rank {dest} hung up")))
    }

    /// Pull the next envelope from `source` matching `want`, holding back
    /// everything else in arrival order.
    fn pull_wire(&self, source: usize, want: impl Fn(&Wire) -> bool) -> Result<Wire> {
        self.check_rank(source)?;
        let mut pending = self.pending.borrow_mut();
        let queue = &mut pending[source];
        if let Some(pos) = queue.iter().position(&want) {
            // earlier held-back envelopes stay queued in order
            return queue
                .remove(pos)
                .ok_or_else(|| Error::GroupClosed("hold-back queue desync".into()));
        }
        loop {
            let wire = self.inboxes[source]
                .recv()
                .map_err(|_| Error::GroupClosed(format!("rank {source} hung up")))?;
            if want(&wire) {
                return Ok(wire);
            }
            queue.push_back(wire);
        }
    }
}

impl ProcessGroup for LocalGroup {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn broadcast_f64(&self, root: usize, buf: &mut Vec<f64>) -> Result<()> {
        self.check_rank(root)?;
        if self.rank == root {
            for dest in 0..self.size {
                if dest != root {
                    self.push_wire(dest, Wire::Bcast(buf.clone()))?;
                }
            }
        } else {
            match self.pull_wire(root, |w| matches!(w, Wire::Bcast(_)))? {
                Wire::Bcast(values) => *buf = values,
                _ => unreachable!("pull_wire matched Bcast"),
            }
        }
        Ok(())
    }

    fn gather_counts(&self, root: usize, count: usize) -> Result<Option<Vec<usize>>> {
        self.check_rank(root)?;
        if self.rank == root {
            let mut counts = vec![0usize; self.size];
            counts[root] = count;
            for src in 0..self.size {
                if src == root {
                    continue;
                }
                match self.pull_wire(src, |w| matches!(w, Wire::Count(_)))? {
                    Wire::Count(c) => counts[src] = c,
                    _ => unreachable!("pull_wire matched Count"),
                }
            }
            Ok(Some(counts))
        } else {
            self.push_wire(root, Wire::Count(count))?;
            Ok(None)
        }
    }

    fn send(&self, dest: usize, tag: MessageTag, payload: Payload) -> Result<()> {
        self.push_wire(dest, Wire::Tagged(tag, payload))
    }

    fn recv(&self, source: usize, tag: MessageTag) -> Result<Payload> {
        match self.pull_wire(source, |w| matches!(w, Wire::Tagged(t, _) if *t == tag))? {
            Wire::Tagged(_, payload) => Ok(payload),
            _ => unreachable!("pull_wire matched Tagged"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn run_on_ranks<F>(n: usize, f: F)
    where
        F: Fn(LocalGroup) + Send + Sync + 'static + Clone,
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

    #[test]
    fn solo_group_is_trivial() {
        let g = LocalGroup::solo();
        assert_eq!(g.rank(), 0);
        assert_eq!(g.size(), 1);
        let mut buf = vec![1.0, 2.0];
        g.broadcast_f64(0, &mut buf).unwrap();
        assert_eq!(buf, vec![1.0, 2.0]);
        assert_eq!(g.gather_counts(0, 5).unwrap(), Some(vec![5]));
    }

    #[test]
    fn broadcast_replaces_non_root_buffers() {
        run_on_ranks(3, |g| {
            let mut buf = if g.rank() == 1 {
                vec![3.0, 1.0, 4.0, 1.5]
            } else {
                vec![0.0]
            };
            g.broadcast_f64(1, &mut buf).unwrap();
            assert_eq!(buf, vec![3.0, 1.0, 4.0, 1.5]);
        });
    }

    #[test]
    fn gather_counts_is_rank_indexed() {
        run_on_ranks(4, |g| {
            let counts = g.gather_counts(2, 10 + g.rank()).unwrap();
            if g.rank() == 2 {
                assert_eq!(counts, Some(vec![10, 11, 12, 13]));
            } else {
                assert_eq!(counts, None);
            }
        });
    }

    #[test]
    fn recv_holds_back_mismatched_tags() {
        run_on_ranks(2, |g| {
            if g.rank() == 0 {
                // deliberately send values before ids
                g.send(
                    1,
                    MessageTag::Values,
                    Payload::Values {
                        shape: vec![2, 1],
                        data: vec![7.0, 8.0],
                    },
                )
                .unwrap();
                g.send(1, MessageTag::Ids, Payload::Ids(vec![4, 9])).unwrap();
            } else {
                let ids = g.recv(0, MessageTag::Ids).unwrap().into_ids().unwrap();
                assert_eq!(ids, vec![4, 9]);
                let (shape, data) = g
                    .recv(0, MessageTag::Values)
                    .unwrap()
                    .into_values()
                    .unwrap();
                assert_eq!(shape, vec![2, 1]);
                assert_eq!(data, vec![7.0, 8.0]);
            }
        });
    }

    #[test]
    fn rank_bounds_are_checked() {
        let g = LocalGroup::solo();
        let err = g.recv(3, MessageTag::Ids).unwrap_err();
        assert!(matches!(err, Error::RankOutOfRange { rank: 3, size: 1 }));
    }
}

//! Thread-hosted multi-rank communicator.
//!
//! [`LocalComm::universe`] builds N rank endpoints connected by a full
//! mesh of unbounded channels. Each endpoint is moved onto its own
//! thread (see [`run_spmd`]) and behaves like one SPMD rank: sends never
//! block, receives block until the matching peer send arrives. Because
//! the solver is bulk-synchronous and every (src, dst) pair has a
//! dedicated FIFO link, program-order matching is sufficient — no tags.

use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::comm::Communicator;
use crate::error::CommError;

/// How long a receive may wait before the collective is declared failed.
///
/// Generous by design: a hit means a peer died or the call sequence
/// diverged between ranks, both fatal conditions.
const RECV_TIMEOUT: Duration = Duration::from_secs(60);

/// One rank endpoint of a thread-hosted communicator universe.
pub struct LocalComm {
    rank: usize,
    /// Sender to each peer, indexed by destination rank. `to[rank]` is
    /// the self-loop used by single-rank-per-axis exchanges.
    to: Vec<Sender<Vec<f64>>>,
    /// Receiver from each peer, indexed by source rank.
    from: Vec<Receiver<Vec<f64>>>,
}

impl LocalComm {
    /// Build a fully-connected universe of `ranks` endpoints.
    ///
    /// The returned vector is indexed by rank. Endpoints are inert until
    /// moved onto threads; dropping one disconnects its links, which
    /// surfaces at peers as [`CommError::CollectiveFailed`].
    pub fn universe(ranks: usize) -> Vec<LocalComm> {
        assert!(ranks > 0, "universe needs at least one rank");
        // senders[i][j]: link i -> j. Receivers are the transpose.
        let mut senders: Vec<Vec<Sender<Vec<f64>>>> = (0..ranks).map(|_| Vec::new()).collect();
        let mut receivers: Vec<Vec<Option<Receiver<Vec<f64>>>>> =
            (0..ranks).map(|_| (0..ranks).map(|_| None).collect()).collect();
        for i in 0..ranks {
            for j in 0..ranks {
                let (tx, rx) = unbounded();
                senders[i].push(tx);
                receivers[j][i] = Some(rx);
            }
        }
        senders
            .into_iter()
            .zip(receivers)
            .enumerate()
            .map(|(rank, (to, from))| LocalComm {
                rank,
                to,
                from: from.into_iter().map(|r| r.expect("mesh link")).collect(),
            })
            .collect()
    }

    fn check_rank(&self, rank: usize) -> Result<(), CommError> {
        if rank >= self.to.len() {
            Err(CommError::InvalidRank {
                rank,
                size: self.to.len(),
            })
        } else {
            Ok(())
        }
    }

    fn send(&self, dest: usize, data: Vec<f64>) -> Result<(), CommError> {
        self.to[dest]
            .send(data)
            .map_err(|_| CommError::CollectiveFailed {
                reason: format!("rank {dest} disconnected (send from rank {})", self.rank),
            })
    }

    fn recv(&self, src: usize) -> Result<Vec<f64>, CommError> {
        self.from[src]
            .recv_timeout(RECV_TIMEOUT)
            .map_err(|e| CommError::CollectiveFailed {
                reason: format!("receive from rank {src} at rank {}: {e}", self.rank),
            })
    }
}

impl Communicator for LocalComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.to.len()
    }

    fn exchange(
        &self,
        dest: Option<usize>,
        src: Option<usize>,
        data: &[f64],
        recv_len: usize,
    ) -> Result<Option<Vec<f64>>, CommError> {
        // Send first; unbounded links mean this never blocks, so the
        // symmetric exchange cannot deadlock.
        if let Some(dest) = dest {
            self.check_rank(dest)?;
            self.send(dest, data.to_vec())?;
        }
        let Some(src) = src else { return Ok(None) };
        self.check_rank(src)?;
        let received = self.recv(src)?;
        if received.len() != recv_len {
            return Err(CommError::CollectiveFailed {
                reason: format!(
                    "exchange length mismatch at rank {}: got {} from rank {src}, expected {recv_len}",
                    self.rank,
                    received.len()
                ),
            });
        }
        Ok(Some(received))
    }

    fn all_reduce_min(&self, local: &[f64]) -> Result<Vec<f64>, CommError> {
        self.all_reduce(local, f64::min)
    }

    fn all_reduce_max(&self, local: &[f64]) -> Result<Vec<f64>, CommError> {
        self.all_reduce(local, f64::max)
    }

    fn barrier(&self) -> Result<(), CommError> {
        self.all_reduce(&[], f64::min).map(|_| ())
    }
}

impl LocalComm {
    /// Butterfly-free all-reduce: broadcast to all peers, fold everything
    /// received. O(n²) messages, which is fine for the rank counts a
    /// single process hosts.
    fn all_reduce(&self, local: &[f64], op: fn(f64, f64) -> f64) -> Result<Vec<f64>, CommError> {
        for dest in 0..self.size() {
            if dest != self.rank {
                self.send(dest, local.to_vec())?;
            }
        }
        let mut acc = local.to_vec();
        for src in 0..self.size() {
            if src == self.rank {
                continue;
            }
            let contribution = self.recv(src)?;
            if contribution.len() != acc.len() {
                return Err(CommError::CollectiveFailed {
                    reason: format!(
                        "reduce length mismatch at rank {}: got {} from rank {src}, expected {}",
                        self.rank,
                        contribution.len(),
                        acc.len()
                    ),
                });
            }
            for (a, c) in acc.iter_mut().zip(contribution) {
                *a = op(*a, c);
            }
        }
        Ok(acc)
    }
}

/// Run one closure per rank on its own thread and collect the results
/// in rank order. Panics in any rank propagate to the caller.
pub fn run_spmd<F, T>(ranks: usize, f: F) -> Vec<T>
where
    F: Fn(LocalComm) -> T + Sync,
    T: Send,
{
    let universe = LocalComm::universe(ranks);
    let f = &f;
    std::thread::scope(|scope| {
        let handles: Vec<_> = universe
            .into_iter()
            .map(|comm| scope.spawn(move || f(comm)))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("rank thread panicked"))
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_exchange() {
        let values = run_spmd(3, |comm| {
            let rank = comm.rank();
            let right = (rank + 1) % 3;
            let left = (rank + 2) % 3;
            // Send rank id to the right, receive from the left.
            let got = comm
                .exchange(Some(right), Some(left), &[rank as f64], 1)
                .unwrap()
                .unwrap();
            got[0]
        });
        assert_eq!(values, vec![2.0, 0.0, 1.0]);
    }

    #[test]
    fn self_exchange_round_trips() {
        let values = run_spmd(2, |comm| {
            let rank = comm.rank();
            comm.exchange(Some(rank), Some(rank), &[10.0 + rank as f64], 1)
                .unwrap()
                .unwrap()[0]
        });
        assert_eq!(values, vec![10.0, 11.0]);
    }

    #[test]
    fn edge_ranks_exchange_one_sided() {
        // Two ranks in a line: each sends inward only.
        let values = run_spmd(2, |comm| {
            let rank = comm.rank();
            let (dest, src) = if rank == 0 {
                (Some(1), Some(1))
            } else {
                (Some(0), Some(0))
            };
            // Low side of the line: rank 0 has no minus neighbor.
            let low = comm
                .exchange(
                    if rank == 1 { dest } else { None },
                    if rank == 0 { src } else { None },
                    &[rank as f64],
                    1,
                )
                .unwrap();
            low.map(|v| v[0])
        });
        assert_eq!(values, vec![Some(1.0), None]);
    }

    #[test]
    fn all_reduce_min_max() {
        let results = run_spmd(4, |comm| {
            let r = comm.rank() as f64;
            let min = comm.all_reduce_min(&[r, -r]).unwrap();
            let max = comm.all_reduce_max(&[r, -r]).unwrap();
            (min, max)
        });
        for (min, max) in results {
            assert_eq!(min, vec![0.0, -3.0]);
            assert_eq!(max, vec![3.0, 0.0]);
        }
    }

    #[test]
    fn reduce_with_infinity_identity() {
        // A rank with no data contributes the identity element.
        let results = run_spmd(2, |comm| {
            let local = if comm.rank() == 0 {
                [f64::INFINITY, f64::INFINITY]
            } else {
                [5.0, -2.0]
            };
            comm.all_reduce_min(&local).unwrap()
        });
        for min in results {
            assert_eq!(min, vec![5.0, -2.0]);
        }
    }

    #[test]
    fn barrier_completes() {
        run_spmd(3, |comm| comm.barrier().unwrap());
    }

    #[test]
    fn length_mismatch_is_fatal() {
        let results = run_spmd(2, |comm| {
            let peer = 1 - comm.rank();
            comm.exchange(Some(peer), Some(peer), &[0.0; 4], 3)
        });
        for r in results {
            assert!(matches!(r, Err(CommError::CollectiveFailed { .. })));
        }
    }
}

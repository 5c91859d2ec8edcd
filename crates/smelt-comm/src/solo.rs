//! Single-rank communicator.

use crate::comm::Communicator;
use crate::error::CommError;

/// The trivial communicator: one rank, no peers.
///
/// Exchanges must be self-sends and reductions are identity copies.
/// This is the backend for production single-process runs and for most
/// unit tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct SoloComm;

impl Communicator for SoloComm {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn exchange(
        &self,
        dest: Option<usize>,
        src: Option<usize>,
        data: &[f64],
        recv_len: usize,
    ) -> Result<Option<Vec<f64>>, CommError> {
        if let Some(dest) = dest {
            if dest != 0 {
                return Err(CommError::InvalidRank { rank: dest, size: 1 });
            }
        }
        match src {
            None => Ok(None),
            Some(src) if src != 0 => Err(CommError::InvalidRank { rank: src, size: 1 }),
            Some(_) => {
                // With one rank, a receive can only be satisfied by the
                // matching self-send.
                if dest.is_none() || data.len() != recv_len {
                    return Err(CommError::CollectiveFailed {
                        reason: format!(
                            "self-exchange mismatch: sent {} to {dest:?}, expected {recv_len}",
                            data.len()
                        ),
                    });
                }
                Ok(Some(data.to_vec()))
            }
        }
    }

    fn all_reduce_min(&self, local: &[f64]) -> Result<Vec<f64>, CommError> {
        Ok(local.to_vec())
    }

    fn all_reduce_max(&self, local: &[f64]) -> Result<Vec<f64>, CommError> {
        Ok(local.to_vec())
    }

    fn barrier(&self) -> Result<(), CommError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_exchange_round_trips() {
        let comm = SoloComm;
        let out = comm.exchange(Some(0), Some(0), &[1.0, 2.0, 3.0], 3).unwrap();
        assert_eq!(out, Some(vec![1.0, 2.0, 3.0]));
    }

    #[test]
    fn one_sided_exchange_is_silent() {
        let comm = SoloComm;
        assert_eq!(comm.exchange(None, None, &[], 0).unwrap(), None);
    }

    #[test]
    fn exchange_rejects_peers() {
        let comm = SoloComm;
        assert!(comm.exchange(Some(1), Some(0), &[], 0).is_err());
        assert!(comm.exchange(Some(0), Some(2), &[], 0).is_err());
    }

    #[test]
    fn receive_without_send_is_fatal() {
        let comm = SoloComm;
        assert!(comm.exchange(None, Some(0), &[], 0).is_err());
    }

    #[test]
    fn reductions_are_identity() {
        let comm = SoloComm;
        assert_eq!(comm.all_reduce_min(&[3.0, -1.0]).unwrap(), vec![3.0, -1.0]);
        assert_eq!(comm.all_reduce_max(&[3.0, -1.0]).unwrap(), vec![3.0, -1.0]);
    }
}

//! Wall-clock progress records.

use std::time::Instant;

use tracing::info;

/// One monitor emission.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonitorRecord {
    /// Steps completed when the record was written.
    pub step: u64,
    /// Simulated time at the record.
    pub sim_time: f64,
    /// Wall-clock seconds since the run started.
    pub elapsed: f64,
    /// Steps per wall-clock second since the previous record.
    pub rate: f64,
}

/// Tracks wall-clock progress of the step loop and logs it on rank 0.
#[derive(Debug)]
pub struct Monitor {
    rank: usize,
    started: Instant,
    last_write: Instant,
    ticks: u64,
    ticks_at_last_write: u64,
}

impl Monitor {
    /// Start the clock.
    pub fn new(rank: usize) -> Self {
        let now = Instant::now();
        Self {
            rank,
            started: now,
            last_write: now,
            ticks: 0,
            ticks_at_last_write: 0,
        }
    }

    /// Count one loop iteration.
    pub fn tick(&mut self) {
        self.ticks += 1;
    }

    /// Emit a record for `step` completed steps at simulated time
    /// `sim_time`. Logged through `tracing` on rank 0 only; the record
    /// is returned for callers that aggregate.
    pub fn write(&mut self, step: u64, sim_time: f64) -> MonitorRecord {
        let now = Instant::now();
        let window = now.duration_since(self.last_write).as_secs_f64();
        let steps_in_window = self.ticks - self.ticks_at_last_write;
        let rate = if window > 0.0 {
            steps_in_window as f64 / window
        } else {
            f64::INFINITY
        };
        let record = MonitorRecord {
            step,
            sim_time,
            elapsed: now.duration_since(self.started).as_secs_f64(),
            rate,
        };
        self.last_write = now;
        self.ticks_at_last_write = self.ticks;
        if self.rank == 0 {
            info!(
                step = record.step,
                sim_time = record.sim_time,
                elapsed_s = record.elapsed,
                steps_per_s = record.rate,
                "monitor"
            );
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_count_ticks_between_writes() {
        let mut m = Monitor::new(0);
        for _ in 0..5 {
            m.tick();
        }
        let r = m.write(5, 0.5);
        assert_eq!(r.step, 5);
        assert_eq!(r.sim_time, 0.5);
        assert!(r.elapsed >= 0.0);
        assert!(r.rate > 0.0);
    }

    #[test]
    fn nonzero_ranks_stay_quiet_but_still_record() {
        let mut m = Monitor::new(3);
        m.tick();
        let r = m.write(1, 0.1);
        assert_eq!(r.step, 1);
    }
}

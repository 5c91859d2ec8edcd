//! Time queries against a scan path.

use smelt_core::Vec3;

use crate::path::ScanPath;
use crate::segment::SegmentKind;
use crate::EPS;

/// The beam cursor: a scan path plus the mutable query state.
///
/// [`move_to`](Beam::move_to) is a deterministic function of the query
/// time and the loaded path. The active segment index is cached between
/// calls; the time loop queries monotonically increasing times, so the
/// walk almost always advances zero or one segment. Backward queries
/// walk the other way and are equally valid.
#[derive(Clone, Debug)]
pub struct Beam {
    path: ScanPath,
    index: usize,
    position: Vec3,
    power: f64,
}

impl Beam {
    /// Wrap a loaded path. The beam starts dark at the sentinel origin.
    pub fn new(path: ScanPath) -> Self {
        let position = path.segments()[0].position;
        Self {
            path,
            index: 0,
            position,
            power: 0.0,
        }
    }

    /// The underlying path.
    pub fn path(&self) -> &ScanPath {
        &self.path
    }

    /// Current beam position, as of the last [`move_to`](Self::move_to).
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Current beam power, as of the last [`move_to`](Self::move_to).
    pub fn power(&self) -> f64 {
        self.power
    }

    /// Advance (or rewind) the beam to simulated time `t`.
    ///
    /// Past the path's end time the beam is dark and parked at the end
    /// of the last powered segment.
    pub fn move_to(&mut self, t: f64) {
        let past_end = t - self.path.end_time() > EPS;
        let t = if past_end { self.path.end_time() } else { t };

        let segments = self.path.segments();
        let last = segments.len() - 1;

        // Locate the active segment: time_end[i-1] < t <= time_end[i].
        while self.index < last && t > segments[self.index].time_end {
            self.index += 1;
        }
        while self.index > 0 && t <= segments[self.index - 1].time_end {
            self.index -= 1;
        }
        // Zero-duration dwells own no time interval; stand on the
        // segment after them.
        while self.index < last && segments[self.index].is_zero_dwell() {
            self.index += 1;
        }

        let segment = &segments[self.index];
        let previous = &segments[self.index.saturating_sub(1)];

        self.position = match segment.kind {
            SegmentKind::Dwell => segment.position,
            SegmentKind::Traverse => {
                let span = segment.time_end - previous.time_end;
                if span > 0.0 {
                    let frac = ((t - previous.time_end) / span).clamp(0.0, 1.0);
                    [
                        previous.position[0] + frac * (segment.position[0] - previous.position[0]),
                        previous.position[1] + frac * (segment.position[1] - previous.position[1]),
                        previous.position[2] + frac * (segment.position[2] - previous.position[2]),
                    ]
                } else {
                    segment.position
                }
            }
        };

        self.power = if past_end {
            0.0
        } else if t - previous.time_end > EPS {
            segment.power
        } else {
            previous.power
        };
    }
}

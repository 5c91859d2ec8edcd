//! Scan path segments.

use smelt_core::Vec3;

/// How the beam reaches a segment's end position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegmentKind {
    /// Mode 0: the beam traverses a straight line from the previous
    /// segment's position at a fixed scan speed.
    Traverse,
    /// Mode 1: the beam sits at the segment position for a fixed
    /// duration (which may be zero, marking an instantaneous jump or a
    /// power change).
    Dwell,
}

/// One entry of a scan path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    /// Dwell or traverse.
    pub kind: SegmentKind,
    /// End position of the segment (dwell: the held position).
    pub position: Vec3,
    /// Beam power over the segment, in watts.
    pub power: f64,
    /// Scan speed in m/s for a traverse, dwell duration in seconds for
    /// a dwell.
    pub parameter: f64,
    /// Absolute simulated time at which the segment completes. Derived
    /// during loading from the preceding segment's `time_end`.
    pub time_end: f64,
}

impl Segment {
    /// The sentinel placed at index 0 of every path: a zero-length
    /// dwell at the origin with zero power, anchoring the first real
    /// segment's start position and time.
    pub fn sentinel() -> Self {
        Self {
            kind: SegmentKind::Dwell,
            position: [0.0; 3],
            power: 0.0,
            parameter: 0.0,
            time_end: 0.0,
        }
    }

    /// Whether this is a zero-duration dwell (the query walk skips
    /// these; they carry no time interval of their own).
    pub fn is_zero_dwell(&self) -> bool {
        self.kind == SegmentKind::Dwell && self.parameter == 0.0
    }
}

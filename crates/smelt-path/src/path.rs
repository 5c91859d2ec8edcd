//! Scan path loading.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use smelt_core::distance;

use crate::error::PathError;
use crate::segment::{Segment, SegmentKind};
use crate::EPS;

/// A loaded scan path: the sentinel plus every parsed segment, with
/// `time_end` values accumulated in order.
///
/// Immutable after loading. Queries go through [`Beam`](crate::Beam),
/// which carries the mutable cursor state.
#[derive(Clone, Debug, PartialEq)]
pub struct ScanPath {
    segments: Vec<Segment>,
    end_time: f64,
}

impl ScanPath {
    /// Load a path from a reader. The first line is a header and is
    /// discarded; each subsequent non-empty line is
    /// `mode x y z power parameter`.
    ///
    /// # Errors
    ///
    /// Returns `Err` for unreadable input, a file with no segments, or
    /// any malformed or invalid segment line (unknown mode, wrong field
    /// count, non-positive traverse speed, negative dwell time,
    /// negative power, non-finite numbers).
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, PathError> {
        let mut segments = vec![Segment::sentinel()];
        let mut lines = BufReader::new(reader).lines().enumerate();

        // Header line. A completely empty file is also "no segments".
        if lines.next().is_none() {
            return Err(PathError::Empty);
        }

        for (idx, line) in lines {
            let line_no = idx + 1;
            let line = line.map_err(|e| PathError::Malformed {
                line: line_no,
                reason: format!("unreadable: {e}"),
            })?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let segment = parse_segment(trimmed, line_no)?;
            let previous = *segments.last().expect("sentinel always present");
            segments.push(finish_segment(segment, &previous, line_no)?);
        }

        if segments.len() == 1 {
            return Err(PathError::Empty);
        }

        // The path ends when the beam last carries power; trailing
        // zero-power repositioning moves do not extend it.
        let end_time = segments
            .iter()
            .filter(|s| s.power > EPS)
            .map(|s| s.time_end)
            .fold(0.0, f64::max);
        Ok(Self { segments, end_time })
    }

    /// Load a path from a file.
    pub fn from_path(path: &Path) -> Result<Self, PathError> {
        let file = File::open(path).map_err(|e| PathError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_reader(file)
    }

    /// All segments, sentinel first.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Latest `time_end` whose segment carries power above the
    /// threshold. Queries past this time see a dead beam.
    pub fn end_time(&self) -> f64 {
        self.end_time
    }
}

/// Parse `mode x y z power parameter` into a segment with
/// `time_end` still unset.
fn parse_segment(line: &str, line_no: usize) -> Result<Segment, PathError> {
    let malformed = |reason: String| PathError::Malformed {
        line: line_no,
        reason,
    };
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 6 {
        return Err(malformed(format!(
            "expected 6 fields (mode x y z power parameter), got {}",
            fields.len()
        )));
    }
    let kind = match fields[0] {
        "0" => SegmentKind::Traverse,
        "1" => SegmentKind::Dwell,
        other => return Err(malformed(format!("unknown mode '{other}'"))),
    };
    let mut numbers = [0.0f64; 5];
    for (slot, field) in numbers.iter_mut().zip(&fields[1..]) {
        *slot = field
            .parse()
            .map_err(|e| malformed(format!("bad number '{field}': {e}")))?;
        if !slot.is_finite() {
            return Err(malformed(format!("non-finite value '{field}'")));
        }
    }
    let [x, y, z, power, parameter] = numbers;
    if power < 0.0 {
        return Err(malformed(format!("negative power {power}")));
    }
    Ok(Segment {
        kind,
        position: [x, y, z],
        power,
        parameter,
        time_end: 0.0,
    })
}

/// Validate the parameter against the mode and accumulate `time_end`
/// from the preceding segment.
fn finish_segment(
    mut segment: Segment,
    previous: &Segment,
    line_no: usize,
) -> Result<Segment, PathError> {
    let malformed = |reason: String| PathError::Malformed {
        line: line_no,
        reason,
    };
    segment.time_end = match segment.kind {
        SegmentKind::Dwell => {
            if segment.parameter < 0.0 {
                return Err(malformed(format!(
                    "dwell duration must be >= 0, got {}",
                    segment.parameter
                )));
            }
            previous.time_end + segment.parameter
        }
        SegmentKind::Traverse => {
            if segment.parameter <= 0.0 {
                return Err(malformed(format!(
                    "scan speed must be > 0, got {}",
                    segment.parameter
                )));
            }
            previous.time_end + distance(previous.position, segment.position) / segment.parameter
        }
    };
    Ok(segment)
}

//! Per-rank event CSV emission.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use smelt_core::config::SamplingFormat;

use crate::recorder::{SolidificationData, EVENT_WIDTH};

/// Write the recorded events as comma-separated rows, ten-decimal
/// fixed-point, no header.
///
/// The `Default` format emits all nine columns
/// (`x,y,z,tm,ts,R,Gx,Gy,Gz`); `Exaca` stops after the cooling rate.
pub fn write_events_csv<W: Write>(
    w: &mut W,
    data: &SolidificationData,
    format: SamplingFormat,
) -> io::Result<()> {
    let columns = match format {
        SamplingFormat::Default => EVENT_WIDTH,
        SamplingFormat::Exaca => 6,
    };
    for row in data.events() {
        for (c, value) in row.iter().take(columns).enumerate() {
            if c > 0 {
                write!(w, ",")?;
            }
            write!(w, "{value:.10}")?;
        }
        writeln!(w)?;
    }
    Ok(())
}

/// Path of the event file for `rank` under `dir`.
pub fn csv_path(dir: &Path, rank: usize) -> PathBuf {
    dir.join(format!("data_{rank}.csv"))
}

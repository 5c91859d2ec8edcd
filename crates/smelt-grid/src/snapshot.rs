//! Structured-grid snapshot writer.
//!
//! Emits one legacy-VTK `STRUCTURED_POINTS` dataset per call with the
//! temperature as cell data. The writer is generic over any
//! [`Write`](std::io::Write) sink so tests capture into a `Vec<u8>` and
//! production writes one file per rank per emission.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use smelt_core::Vec3;

/// Write one snapshot of a block's interior cell values.
///
/// `values` is x-fastest with `cells[0]·cells[1]·cells[2]` entries;
/// `origin` is the physical low corner of the block. `step` and `time`
/// label the dataset header.
///
/// # Panics
///
/// Panics if `values` does not match the cell counts; the grid always
/// hands its own interior here.
pub fn write_snapshot<W: Write>(
    w: &mut W,
    origin: Vec3,
    spacing: f64,
    cells: [usize; 3],
    values: &[f64],
    step: u64,
    time: f64,
) -> io::Result<()> {
    assert_eq!(
        values.len(),
        cells[0] * cells[1] * cells[2],
        "snapshot value count mismatch"
    );
    writeln!(w, "# vtk DataFile Version 3.0")?;
    writeln!(w, "temperature step {step} time {time:.9e}")?;
    writeln!(w, "ASCII")?;
    writeln!(w, "DATASET STRUCTURED_POINTS")?;
    // STRUCTURED_POINTS dimensions are point counts: cells + 1.
    writeln!(
        w,
        "DIMENSIONS {} {} {}",
        cells[0] + 1,
        cells[1] + 1,
        cells[2] + 1
    )?;
    writeln!(w, "ORIGIN {:.9e} {:.9e} {:.9e}", origin[0], origin[1], origin[2])?;
    writeln!(w, "SPACING {spacing:.9e} {spacing:.9e} {spacing:.9e}")?;
    writeln!(w, "CELL_DATA {}", values.len())?;
    writeln!(w, "SCALARS temperature double 1")?;
    writeln!(w, "LOOKUP_TABLE default")?;
    for v in values {
        writeln!(w, "{v:.9e}")?;
    }
    Ok(())
}

/// Path of the snapshot file for `step` on `rank` under `dir`.
pub fn snapshot_path(dir: &Path, step: u64, rank: usize) -> PathBuf {
    dir.join(format!("snapshot_{step:06}_{rank}.vtk"))
}

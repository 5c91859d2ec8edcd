//! Smelt driver: read a configuration, run one layer, emit events.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use smelt::comm::{Communicator, SoloComm};
use smelt::engine::Layer;
use smelt::grid::{BoundarySet, GridSpec, LocalGrid};
use smelt::path::{Beam, ScanPath};
use smelt::sample::{csv_path, write_events_csv, SolidificationData};
use smelt::solver::{FtcsSolver, StepParams};
use smelt::types::Input;

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "smelt", version, about = "Moving-source heat conduction solver")]
struct Args {
    /// Path to the input configuration file (TOML).
    #[arg(short = 'i', value_name = "FILE")]
    input: PathBuf,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Single-rank driver, so rank 0 is the one printing.
            eprintln!("smelt: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let input = Input::from_path(&args.input)?;
    input.validate()?;

    let properties = input.properties()?;
    let source = input.source_shape()?;
    let time = input.time_control()?;

    let spec = GridSpec::new(
        input.space.cell_size,
        input.space.global_low_corner,
        input.space.global_high_corner,
    )?;
    let requested = input
        .space
        .ranks_per_dim
        .map(|d| [d[0] as usize, d[1] as usize, d[2] as usize])
        .unwrap_or([0; 3]);

    let comm = SoloComm;
    let mut grid = LocalGrid::new(
        &comm,
        spec,
        requested,
        BoundarySet::adiabatic(),
        input.space.initial_temperature,
    )?;
    info!(
        cells = ?spec.cells,
        dt = time.dt,
        steps = time.num_steps,
        "grid ready"
    );

    let scan_path = ScanPath::from_path(&input.source.scan_path_file)?;
    let mut beam = Beam::new(scan_path);
    let solver = FtcsSolver::new(StepParams::new(
        &properties,
        &source,
        input.space.cell_size,
        time.dt,
    ));

    let mut sampler = input
        .sampling
        .as_ref()
        .map(|_| SolidificationData::new(properties.liquidus, &grid));

    let mut layer = Layer::new(
        &mut grid,
        &mut beam,
        &solver,
        sampler.as_mut(),
        &comm,
        time,
        Some(PathBuf::from(".")),
    );
    let stats = layer.run().context("layer run failed")?;
    info!(
        steps = stats.steps,
        final_time = stats.final_time,
        events = ?stats.events,
        "layer complete"
    );

    if let (Some(sampling), Some(sampler)) = (&input.sampling, &sampler) {
        let dir = PathBuf::from(&sampling.directory_name);
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("cannot create {}", dir.display()))?;
        let path = csv_path(&dir, comm.rank());
        let file =
            File::create(&path).with_context(|| format!("cannot create {}", path.display()))?;
        let mut w = BufWriter::new(file);
        write_events_csv(&mut w, sampler, sampling.format)
            .and_then(|()| w.flush())
            .with_context(|| format!("cannot write {}", path.display()))?;
        info!(events = sampler.len(), file = %path.display(), "events written");

        if !sampler.is_empty() {
            let lo = sampler.lower_bounds(&comm)?;
            let hi = sampler.upper_bounds(&comm)?;
            info!(lower = ?lo, upper = ?hi, "event bounding box");
        }
    }

    Ok(())
}

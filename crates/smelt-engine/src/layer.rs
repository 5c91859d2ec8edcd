//! The layer loop.

use std::path::PathBuf;

use tracing::info;

use smelt_comm::Communicator;
use smelt_core::TimeControl;
use smelt_grid::LocalGrid;
use smelt_path::Beam;
use smelt_sample::SolidificationData;
use smelt_solver::FtcsSolver;

use crate::error::EngineError;
use crate::monitor::{Monitor, MonitorRecord};

/// Summary of a completed layer run.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerStats {
    /// Steps executed.
    pub steps: u64,
    /// Final simulated time.
    pub final_time: f64,
    /// Events recorded by the sampler, if one was attached.
    pub events: Option<usize>,
    /// Monitor records emitted over the run.
    pub monitor_records: Vec<MonitorRecord>,
}

/// One simulated layer: borrows every subsystem for the duration of
/// [`run`](Layer::run).
///
/// The layer owns no state of its own beyond the loop bookkeeping;
/// grid, beam, solver, and sampler live with the caller (there is no
/// shared-ownership cycle). Snapshot emission is skipped entirely when
/// `output_dir` is `None`.
pub struct Layer<'a> {
    grid: &'a mut LocalGrid,
    beam: &'a mut Beam,
    solver: &'a FtcsSolver,
    sampler: Option<&'a mut SolidificationData>,
    comm: &'a dyn Communicator,
    time: TimeControl,
    output_dir: Option<PathBuf>,
}

impl<'a> Layer<'a> {
    /// Assemble a layer over borrowed subsystems.
    pub fn new(
        grid: &'a mut LocalGrid,
        beam: &'a mut Beam,
        solver: &'a FtcsSolver,
        sampler: Option<&'a mut SolidificationData>,
        comm: &'a dyn Communicator,
        time: TimeControl,
        output_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            grid,
            beam,
            solver,
            sampler,
            comm,
            time,
            output_dir,
        }
    }

    /// Run the loop to completion.
    ///
    /// Per step: advance the beam, snapshot the field, run the kernel,
    /// apply boundaries, gather halos, scan for crossings. Monitor
    /// records and field snapshots are emitted every configured
    /// interval and always at the final step, whether or not the
    /// interval divides the step count.
    ///
    /// # Errors
    ///
    /// Returns `Err` on the first failed halo exchange or emission;
    /// there is no recovery inside the loop.
    pub fn run(&mut self) -> Result<LayerStats, EngineError> {
        let rank = self.comm.rank();
        let mut monitor = Monitor::new(rank);
        let mut records = Vec::new();
        let dt = self.time.dt;
        let mut t = self.time.start_time;

        if rank == 0 {
            info!(
                steps = self.time.num_steps,
                dt,
                end_time = self.time.end_time,
                "starting layer"
            );
        }

        // The first step's stencil reads ghosts of the initial field.
        self.grid.update_boundaries();
        self.grid.gather(self.comm)?;

        for n in 0..self.time.num_steps {
            monitor.tick();
            t += dt;

            self.beam.move_to(t);
            let power = self.beam.power();
            let position = self.beam.position();

            self.grid.store_previous();
            self.solver.step(self.grid, position, power);
            self.grid.update_boundaries();
            self.grid.gather(self.comm)?;

            if let Some(sampler) = self.sampler.as_deref_mut() {
                sampler.update(self.grid, t, dt);
            }

            let step = n + 1;
            let last = step == self.time.num_steps;
            if step % self.time.monitor_interval == 0 || last {
                records.push(monitor.write(step, t));
            }
            if step % self.time.output_interval == 0 || last {
                if let Some(dir) = &self.output_dir {
                    let label = self.time.start_time + step as f64 * dt;
                    self.grid.output(dir, step, label)?;
                }
            }
        }

        Ok(LayerStats {
            steps: self.time.num_steps,
            final_time: t,
            events: self.sampler.as_deref().map(SolidificationData::len),
            monitor_records: records,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smelt_comm::SoloComm;
    use smelt_core::{MaterialProperties, SourceShape};
    use smelt_grid::{BoundarySet, GridSpec};
    use smelt_path::ScanPath;
    use smelt_solver::StepParams;

    fn unit_props() -> MaterialProperties {
        MaterialProperties::new(1.0, 1.0, 1.0, 0.0, 1e6, 2e6).unwrap()
    }

    fn dark_beam() -> Beam {
        Beam::new(ScanPath::from_reader("h\n1 0 0 0 0.0 0.5\n".as_bytes()).unwrap())
    }

    #[test]
    fn intervals_and_terminal_emission() {
        // 10 steps, monitor every 3: records at 3, 6, 9 and the forced
        // terminal one at 10.
        let time = TimeControl::derive(0.1, 1.0, 1.0, 0.0, 1.0, 0, 3).unwrap();
        assert_eq!(time.num_steps, 10);
        assert_eq!(time.monitor_interval, 3);

        let spec = GridSpec::new(1.0, [0.0; 3], [4.0; 3]).unwrap();
        let mut grid =
            LocalGrid::new(&SoloComm, spec, [0; 3], BoundarySet::adiabatic(), 300.0).unwrap();
        let mut beam = dark_beam();
        let source = SourceShape::new(1.0, [1.0; 3]).unwrap();
        let solver = FtcsSolver::new(StepParams::new(&unit_props(), &source, 1.0, time.dt));

        let mut layer = Layer::new(&mut grid, &mut beam, &solver, None, &SoloComm, time, None);
        let stats = layer.run().unwrap();

        assert_eq!(stats.steps, 10);
        let steps: Vec<u64> = stats.monitor_records.iter().map(|r| r.step).collect();
        assert_eq!(steps, vec![3, 6, 9, 10]);
        assert!(stats.events.is_none());
        assert!((stats.final_time - 1.0).abs() < 1e-9);
    }

    #[test]
    fn suppressed_monitor_still_emits_terminal_record() {
        let time = TimeControl::derive(0.1, 1.0, 1.0, 0.0, 0.5, 0, 0).unwrap();
        let spec = GridSpec::new(1.0, [0.0; 3], [3.0; 3]).unwrap();
        let mut grid =
            LocalGrid::new(&SoloComm, spec, [0; 3], BoundarySet::adiabatic(), 300.0).unwrap();
        let mut beam = dark_beam();
        let source = SourceShape::new(1.0, [1.0; 3]).unwrap();
        let solver = FtcsSolver::new(StepParams::new(&unit_props(), &source, 1.0, time.dt));

        let mut layer = Layer::new(&mut grid, &mut beam, &solver, None, &SoloComm, time, None);
        let stats = layer.run().unwrap();
        let steps: Vec<u64> = stats.monitor_records.iter().map(|r| r.step).collect();
        assert_eq!(steps, vec![time.num_steps]);
    }

    #[test]
    fn uniform_field_survives_a_full_run() {
        let time = TimeControl::derive(0.15, 1.0, 1.0, 0.0, 2.0, 0, 0).unwrap();
        let spec = GridSpec::new(1.0, [0.0; 3], [5.0; 3]).unwrap();
        let mut grid =
            LocalGrid::new(&SoloComm, spec, [0; 3], BoundarySet::adiabatic(), 450.0).unwrap();
        let mut beam = dark_beam();
        let source = SourceShape::new(1.0, [1.0; 3]).unwrap();
        let solver = FtcsSolver::new(StepParams::new(&unit_props(), &source, 1.0, time.dt));

        let mut layer = Layer::new(&mut grid, &mut beam, &solver, None, &SoloComm, time, None);
        layer.run().unwrap();
        for (i, j, k) in grid.owned_index_space().iter() {
            assert_eq!(grid.temperature().at(i, j, k), 450.0);
        }
    }
}

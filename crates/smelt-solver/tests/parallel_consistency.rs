//! Rank-count independence: a decomposed run must reproduce the
//! single-rank solution bit-for-bit up to roundoff.

use smelt_comm::{run_spmd, Communicator, SoloComm};
use smelt_core::MaterialProperties;
use smelt_core::SourceShape;
use smelt_grid::{BoundarySet, GridSpec, LocalGrid};
use smelt_solver::{FtcsSolver, StepParams};

const GLOBAL: [usize; 3] = [8, 4, 4];

fn build_grid(comm: &dyn Communicator, dims: [usize; 3]) -> LocalGrid {
    let spec = GridSpec::new(
        1.0,
        [0.0; 3],
        [GLOBAL[0] as f64, GLOBAL[1] as f64, GLOBAL[2] as f64],
    )
    .unwrap();
    let mut grid = LocalGrid::new(comm, spec, dims, BoundarySet::adiabatic(), 0.0).unwrap();
    // Step function: cold for x < L/2, hot above.
    let offset = grid.partition().offset;
    for (i, j, k) in grid.owned_index_space().iter() {
        let gx = offset[0] + i - 1;
        *grid.temperature_mut().at_mut(i, j, k) = if gx < GLOBAL[0] / 2 { 0.0 } else { 1.0 };
    }
    grid.update_boundaries();
    grid.gather(comm).unwrap();
    grid
}

fn build_solver() -> FtcsSolver {
    let props = MaterialProperties::new(1.0, 1.0, 1.0, 0.0, 1e6, 2e6).unwrap();
    let source = SourceShape::new(1.0, [1.0, 1.0, 1.0]).unwrap();
    // Co = 1/6, h = 1, alpha = 1.
    FtcsSolver::new(StepParams::new(&props, &source, 1.0, 1.0 / 6.0))
}

fn advance(grid: &mut LocalGrid, comm: &dyn Communicator, steps: usize) {
    let solver = build_solver();
    for _ in 0..steps {
        grid.store_previous();
        solver.step(grid, [0.0; 3], 0.0);
        grid.update_boundaries();
        grid.gather(comm).unwrap();
    }
}

/// Dense global field from a solo reference run.
fn reference(steps: usize) -> Vec<f64> {
    let mut grid = build_grid(&SoloComm, [0; 3]);
    advance(&mut grid, &SoloComm, steps);
    grid.temperature().interior_values()
}

fn global_index(g: [usize; 3]) -> usize {
    g[0] + GLOBAL[0] * (g[1] + GLOBAL[1] * g[2])
}

#[test]
fn two_ranks_along_x_match_solo_after_one_step() {
    let expected = reference(1);
    run_spmd(2, |comm| {
        let mut grid = build_grid(&comm, [2, 1, 1]);
        advance(&mut grid, &comm, 1);
        let offset = grid.partition().offset;
        for (i, j, k) in grid.owned_index_space().iter() {
            let g = [offset[0] + i - 1, offset[1] + j - 1, offset[2] + k - 1];
            let got = grid.temperature().at(i, j, k);
            let want = expected[global_index(g)];
            assert!(
                (got - want).abs() < 1e-12,
                "rank {} cell {g:?}: {got} vs {want}",
                comm.rank()
            );
        }
    });
}

#[test]
fn four_ranks_match_solo_after_many_steps() {
    let expected = reference(25);
    run_spmd(4, |comm| {
        let mut grid = build_grid(&comm, [2, 2, 1]);
        advance(&mut grid, &comm, 25);
        let offset = grid.partition().offset;
        for (i, j, k) in grid.owned_index_space().iter() {
            let g = [offset[0] + i - 1, offset[1] + j - 1, offset[2] + k - 1];
            let got = grid.temperature().at(i, j, k);
            let want = expected[global_index(g)];
            assert!(
                (got - want).abs() < 1e-12,
                "rank {} cell {g:?}: {got} vs {want}",
                comm.rank()
            );
        }
    });
}

//! The per-rank grid: fields, boundary application, halo exchange.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use smallvec::SmallVec;
use tracing::warn;

use smelt_comm::{resolve_dims, CartesianTopology, Communicator};
use smelt_core::{IndexSpace, Vec3};

use crate::boundary::BoundarySet;
use crate::error::GridError;
use crate::field::ScalarField3;
use crate::partition::BlockPartition;
use crate::snapshot::{snapshot_path, write_snapshot};
use crate::spec::GridSpec;

/// One rank's block of the global lattice.
///
/// Owns the current and previous temperature fields (distinct
/// allocations, one ghost layer each), the boundary conditions, and the
/// rank's place in the Cartesian process grid. The communicator is
/// borrowed per call rather than stored, so a grid can be driven by any
/// backend and tests can construct grids without spinning up a
/// universe.
#[derive(Debug)]
pub struct LocalGrid {
    spec: GridSpec,
    topology: CartesianTopology,
    partition: BlockPartition,
    boundary: BoundarySet,
    temperature: ScalarField3,
    previous: ScalarField3,
}

impl LocalGrid {
    /// Build this rank's block.
    ///
    /// `requested_dims` is the configured ranks-per-dimension; zeros or
    /// a product that disagrees with `comm.size()` fall back to the
    /// automatic partitioner (logged once, on rank 0). Both fields are
    /// filled with `initial_temperature`, ghosts included.
    ///
    /// # Errors
    ///
    /// Returns `Err` when no process grid fits the lattice.
    pub fn new(
        comm: &dyn Communicator,
        spec: GridSpec,
        requested_dims: [usize; 3],
        boundary: BoundarySet,
        initial_temperature: f64,
    ) -> Result<Self, GridError> {
        let (dims, fallback) =
            resolve_dims(comm.size(), requested_dims, spec.cells).map_err(GridError::Partition)?;
        if fallback && comm.rank() == 0 {
            warn!(
                requested = ?requested_dims,
                chosen = ?dims,
                "ranks_per_dim infeasible for {} ranks; auto-partitioned",
                comm.size()
            );
        }
        let topology = CartesianTopology::new(comm.rank(), comm.size(), dims)
            .map_err(GridError::Partition)?;
        let partition = BlockPartition::new(dims, topology.coords, spec.cells);
        let temperature = ScalarField3::with_ghosts(partition.cells, initial_temperature);
        let previous = temperature.clone();
        Ok(Self {
            spec,
            topology,
            partition,
            boundary,
            temperature,
            previous,
        })
    }

    /// The global grid descriptor.
    pub fn spec(&self) -> &GridSpec {
        &self.spec
    }

    /// This rank's place in the process grid.
    pub fn topology(&self) -> &CartesianTopology {
        &self.topology
    }

    /// This rank's block of global cells.
    pub fn partition(&self) -> &BlockPartition {
        &self.partition
    }

    /// Current temperature field (interior + ghosts).
    pub fn temperature(&self) -> &ScalarField3 {
        &self.temperature
    }

    /// Mutable current temperature field.
    pub fn temperature_mut(&mut self) -> &mut ScalarField3 {
        &mut self.temperature
    }

    /// Previous-step temperature field (interior + ghosts).
    pub fn previous_temperature(&self) -> &ScalarField3 {
        &self.previous
    }

    /// Mutable previous-step temperature field.
    pub fn previous_temperature_mut(&mut self) -> &mut ScalarField3 {
        &mut self.previous
    }

    /// Split borrow for the update kernel: writable current field,
    /// read-only previous field.
    pub fn fields_mut(&mut self) -> (&mut ScalarField3, &ScalarField3) {
        (&mut self.temperature, &self.previous)
    }

    /// Snapshot the current field into the previous-step buffer,
    /// ghosts included.
    pub fn store_previous(&mut self) {
        self.previous.copy_from(&self.temperature);
    }

    /// The half-open range of locally-owned cell indices in the padded
    /// arrays (ghosts excluded).
    pub fn owned_index_space(&self) -> IndexSpace {
        self.temperature.interior()
    }

    /// Physical cell-center coordinates of local padded index
    /// `(i, j, k)`. Local index 1 is the block's first owned cell.
    pub fn local_coordinates(&self, i: usize, j: usize, k: usize) -> Vec3 {
        self.spec.cell_center(
            self.partition.offset[0] + i - 1,
            self.partition.offset[1] + j - 1,
            self.partition.offset[2] + k - 1,
        )
    }

    /// Faces of this block lying on the global domain boundary, as
    /// indices into [`crate::FACE_NAMES`] order.
    pub fn physical_faces(&self) -> SmallVec<[usize; 6]> {
        let mut faces = SmallVec::new();
        for f in 0..6 {
            let axis = f / 2;
            let side = if f % 2 == 1 { 1 } else { -1 };
            if self.topology.neighbor(axis, side).is_none() {
                faces.push(f);
            }
        }
        faces
    }

    /// Apply the configured boundary conditions to the ghost slabs of
    /// every physical face of the current field.
    ///
    /// Rank-interface ghosts are left for [`gather`](Self::gather),
    /// which overwrites them with the neighbor's interior values; the
    /// two calls together establish the full ghost-layer invariant.
    pub fn update_boundaries(&mut self) {
        let faces = self.physical_faces();
        self.boundary.apply(&mut self.temperature, faces);
    }

    /// One halo exchange: overwrite rank-interface ghost slabs of the
    /// current field with the owning neighbor's interior values.
    ///
    /// Axes run in order, two paired phases each (low slabs shift down,
    /// high slabs shift up). All ranks issue the same sequence, which
    /// is what the communicator's program-order matching requires.
    ///
    /// # Errors
    ///
    /// Any failed exchange is fatal and surfaces as
    /// [`GridError::Exchange`].
    pub fn gather(&mut self, comm: &dyn Communicator) -> Result<(), GridError> {
        for axis in 0..3 {
            let n = self.temperature.dims()[axis];
            let minus = self.topology.neighbor(axis, -1);
            let plus = self.topology.neighbor(axis, 1);

            // Low interior layer travels to the minus neighbor; the
            // matching slab arrives from the plus neighbor into the
            // high ghost layer.
            let slab = self.pack(axis, 1);
            if let Some(received) = comm
                .exchange(minus, plus, &slab, slab.len())
                .map_err(GridError::Exchange)?
            {
                self.unpack(axis, n - 1, &received);
            }

            // High interior layer travels to the plus neighbor.
            let slab = self.pack(axis, n - 2);
            if let Some(received) = comm
                .exchange(plus, minus, &slab, slab.len())
                .map_err(GridError::Exchange)?
            {
                self.unpack(axis, 0, &received);
            }
        }
        Ok(())
    }

    /// Copy the slab `index[axis] == layer` (full transverse range,
    /// ghosts included) out of the current field, x fastest.
    fn pack(&self, axis: usize, layer: usize) -> Vec<f64> {
        let dims = self.temperature.dims();
        let (ta, tb) = ((axis + 1) % 3, (axis + 2) % 3);
        let mut out = Vec::with_capacity(dims[ta] * dims[tb]);
        for b in 0..dims[tb] {
            for a in 0..dims[ta] {
                let mut idx = [0usize; 3];
                idx[axis] = layer;
                idx[ta] = a;
                idx[tb] = b;
                out.push(self.temperature.at(idx[0], idx[1], idx[2]));
            }
        }
        out
    }

    /// Inverse of [`pack`](Self::pack): write a received slab into
    /// `index[axis] == layer`.
    fn unpack(&mut self, axis: usize, layer: usize, data: &[f64]) {
        let dims = self.temperature.dims();
        let (ta, tb) = ((axis + 1) % 3, (axis + 2) % 3);
        let mut it = data.iter();
        for b in 0..dims[tb] {
            for a in 0..dims[ta] {
                let mut idx = [0usize; 3];
                idx[axis] = layer;
                idx[ta] = a;
                idx[tb] = b;
                *self.temperature.at_mut(idx[0], idx[1], idx[2]) =
                    *it.next().expect("slab length checked by exchange");
            }
        }
    }

    /// Write the current field's interior as a snapshot to `w`.
    pub fn write_snapshot_to<W: Write>(
        &self,
        w: &mut W,
        step: u64,
        time: f64,
    ) -> Result<(), GridError> {
        let h = self.spec.cell_size;
        let origin = [
            self.spec.low_corner[0] + self.partition.offset[0] as f64 * h,
            self.spec.low_corner[1] + self.partition.offset[1] as f64 * h,
            self.spec.low_corner[2] + self.partition.offset[2] as f64 * h,
        ];
        write_snapshot(
            w,
            origin,
            h,
            self.partition.cells,
            &self.temperature.interior_values(),
            step,
            time,
        )
        .map_err(GridError::Snapshot)
    }

    /// Emit one snapshot file for this rank under `dir` (which must
    /// already exist).
    pub fn output(&self, dir: &Path, step: u64, time: f64) -> Result<(), GridError> {
        let path = snapshot_path(dir, step, self.topology.rank);
        let file = File::create(path).map_err(GridError::Snapshot)?;
        let mut w = BufWriter::new(file);
        self.write_snapshot_to(&mut w, step, time)?;
        w.flush().map_err(GridError::Snapshot)
    }
}

//! The per-cell crossing detector and lock-free event log.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use rayon::prelude::*;
use tracing::debug;

use smelt_comm::Communicator;
use smelt_grid::LocalGrid;

use crate::error::SampleError;

/// Columns per event row: `x, y, z, tm, ts, R, Gx, Gy, Gz`.
pub const EVENT_WIDTH: usize = 9;

/// Per-cell liquidus-crossing recorder.
///
/// Field values are stored as `AtomicU64` bit patterns so the parallel
/// scan can publish rows without locks: one `fetch_add` on the row
/// counter claims a slot, and distinct events write distinct rows. The
/// melt-time field is single-writer per pass (one thread owns each
/// cell), so its stores are relaxed.
///
/// # Capacity protocol
///
/// The counter may run past the buffer during a pass; rows beyond
/// capacity are dropped. After the pass the counter is compared to
/// capacity: on overflow the buffer is regrown to twice the attempted
/// count, the counter is restored to its pre-pass value, and the pass
/// reruns (melt-time writes are idempotent, so the retry recomputes
/// identical values). Above 90% occupancy the buffer is regrown
/// preserving its contents, so the next pass is unlikely to overflow.
pub struct SolidificationData {
    liquidus: f64,
    cell_size: f64,
    /// Owned cell counts, for melt-field indexing.
    cells: [usize; 3],
    /// Most recent melt time per owned cell, NaN until first melt.
    melt_time: Vec<AtomicU64>,
    /// `capacity × EVENT_WIDTH` row storage.
    events: Vec<AtomicU64>,
    /// Rows appended (may exceed capacity transiently during a pass).
    count: AtomicUsize,
    /// Current row capacity of `events`.
    capacity: usize,
}

impl SolidificationData {
    /// Create a recorder for `grid`'s owned block with the default
    /// initial capacity of one row per owned cell.
    pub fn new(liquidus: f64, grid: &LocalGrid) -> Self {
        let cells = grid.partition().cells;
        Self::with_capacity(liquidus, grid, cells[0] * cells[1] * cells[2])
    }

    /// Create a recorder with an explicit initial row capacity.
    pub fn with_capacity(liquidus: f64, grid: &LocalGrid, capacity: usize) -> Self {
        let cells = grid.partition().cells;
        let owned = cells[0] * cells[1] * cells[2];
        Self {
            liquidus,
            cell_size: grid.spec().cell_size,
            cells,
            melt_time: (0..owned)
                .map(|_| AtomicU64::new(f64::NAN.to_bits()))
                .collect(),
            events: Self::allocate_rows(capacity),
            count: AtomicUsize::new(0),
            capacity,
        }
    }

    fn allocate_rows(rows: usize) -> Vec<AtomicU64> {
        (0..rows * EVENT_WIDTH).map(|_| AtomicU64::new(0)).collect()
    }

    /// Replace the row storage with a buffer of `target` rows, copying
    /// the first `keep` rows across.
    fn regrow(&mut self, target: usize, keep: usize) {
        let mut grown = Self::allocate_rows(target);
        for (new, old) in grown
            .iter_mut()
            .zip(self.events.iter().take(keep * EVENT_WIDTH))
        {
            *new.get_mut() = old.load(Ordering::Acquire);
        }
        self.events = grown;
        self.capacity = target;
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    /// Whether any events have been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current row capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recent melt time recorded for owned cell `(i, j, k)` (padded
    /// indices); NaN if the cell never melted.
    pub fn melt_time_at(&self, i: usize, j: usize, k: usize) -> f64 {
        f64::from_bits(self.melt_time[self.melt_index(i, j, k)].load(Ordering::Relaxed))
    }

    fn melt_index(&self, i: usize, j: usize, k: usize) -> usize {
        (i - 1) + self.cells[0] * ((j - 1) + self.cells[1] * (k - 1))
    }

    /// Scan the step's temperature pair for liquidus crossings.
    ///
    /// `time` is the simulated time at the end of the step and `dt` its
    /// length. Reads the grid's current and previous fields; the
    /// current field's ghost layer must be valid on all axes (the
    /// gradient stencil reaches into it).
    pub fn update(&mut self, grid: &LocalGrid, time: f64, dt: f64) {
        loop {
            let before = self.count.load(Ordering::Acquire);
            self.pass(grid, time, dt);
            let appended = self.count.load(Ordering::Acquire);
            if appended >= self.capacity {
                // Overflow: rows claimed by this pass may have been
                // dropped, so the whole pass reruns against the same
                // field pair. Rows from earlier steps stay valid and
                // move to the regrown buffer; everything this pass
                // wrote is discarded with the old one.
                let target = (2 * appended).max(1);
                debug!(
                    attempted = appended - before,
                    capacity = self.capacity,
                    target,
                    "event buffer overflow; regrowing and retrying"
                );
                self.regrow(target, before);
                self.count.store(before, Ordering::Release);
                continue;
            }
            if appended * 10 > self.capacity * 9 {
                // Near-full: regrow ahead of the next pass, keeping
                // every recorded row.
                let target = 2 * appended;
                debug!(
                    occupied = appended,
                    capacity = self.capacity,
                    target,
                    "event buffer nearly full; reserving"
                );
                self.regrow(target, appended);
            }
            return;
        }
    }

    /// One parallel crossing scan. Appends may run past capacity; the
    /// caller fixes that up.
    fn pass(&self, grid: &LocalGrid, time: f64, dt: f64) {
        let temperature = grid.temperature();
        let previous = grid.previous_temperature();
        let liquidus = self.liquidus;
        let inv_2h = 1.0 / (2.0 * self.cell_size);
        let [cx, cy, cz] = self.cells;

        (0..cy * cz).into_par_iter().for_each(|r| {
            let j = r % cy + 1;
            let k = r / cy + 1;
            for i in 1..=cx {
                let t_now = temperature.at(i, j, k);
                let t_prev = previous.at(i, j, k);

                if t_now <= liquidus && t_prev > liquidus {
                    // Solidified this step: claim a row and fill it.
                    let row = self.count.fetch_add(1, Ordering::AcqRel);
                    if row < self.capacity {
                        let m = ((t_now - liquidus) / (t_now - t_prev)).clamp(0.0, 1.0);
                        let position = grid.local_coordinates(i, j, k);
                        let record = [
                            position[0],
                            position[1],
                            position[2],
                            self.melt_time_at(i, j, k),
                            time - m * dt,
                            (t_prev - t_now) / dt,
                            (temperature.at(i + 1, j, k) - temperature.at(i - 1, j, k)) * inv_2h,
                            (temperature.at(i, j + 1, k) - temperature.at(i, j - 1, k)) * inv_2h,
                            (temperature.at(i, j, k + 1) - temperature.at(i, j, k - 1)) * inv_2h,
                        ];
                        let base = row * EVENT_WIDTH;
                        for (c, value) in record.into_iter().enumerate() {
                            self.events[base + c].store(value.to_bits(), Ordering::Release);
                        }
                    }
                } else if t_now > liquidus && t_prev <= liquidus {
                    // Melted this step: stamp the crossing time. Only
                    // this thread touches this cell, and a retry pass
                    // recomputes the identical value.
                    let m = ((t_now - liquidus) / (t_now - t_prev)).clamp(0.0, 1.0);
                    self.melt_time[self.melt_index(i, j, k)]
                        .store((time - m * dt).to_bits(), Ordering::Relaxed);
                }
            }
        });
    }

    /// Dense copy of all recorded rows, in insertion order.
    ///
    /// Insertion order is a race-resolved permutation of the events
    /// detected within each pass; only row contents are stable across
    /// runs.
    pub fn events(&self) -> Vec<[f64; EVENT_WIDTH]> {
        let n = self.len();
        let mut out = Vec::with_capacity(n);
        for row in 0..n {
            let mut record = [0.0; EVENT_WIDTH];
            for (c, slot) in record.iter_mut().enumerate() {
                *slot = f64::from_bits(self.events[row * EVENT_WIDTH + c].load(Ordering::Acquire));
            }
            out.push(record);
        }
        out
    }

    /// Component-wise minimum of event positions across all ranks.
    ///
    /// A rank with no events contributes `+∞` on every axis.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the reduction collective fails.
    pub fn lower_bounds(&self, comm: &dyn Communicator) -> Result<[f64; 3], SampleError> {
        let local = self.local_extrema(f64::INFINITY, f64::min);
        let reduced = comm.all_reduce_min(&local).map_err(SampleError::Reduce)?;
        Ok([reduced[0], reduced[1], reduced[2]])
    }

    /// Component-wise maximum of event positions across all ranks.
    ///
    /// A rank with no events contributes `−∞` on every axis.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the reduction collective fails.
    pub fn upper_bounds(&self, comm: &dyn Communicator) -> Result<[f64; 3], SampleError> {
        let local = self.local_extrema(f64::NEG_INFINITY, f64::max);
        let reduced = comm.all_reduce_max(&local).map_err(SampleError::Reduce)?;
        Ok([reduced[0], reduced[1], reduced[2]])
    }

    fn local_extrema(&self, identity: f64, op: fn(f64, f64) -> f64) -> [f64; 3] {
        let mut acc = [identity; 3];
        for row in self.events() {
            for d in 0..3 {
                acc[d] = op(acc[d], row[d]);
            }
        }
        acc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smelt_comm::SoloComm;
    use smelt_grid::{BoundarySet, GridSpec, LocalGrid};

    const LIQUIDUS: f64 = 1700.0;

    fn grid(cells: [usize; 3], initial: f64) -> LocalGrid {
        let spec = GridSpec::new(
            1.0,
            [0.0; 3],
            [cells[0] as f64, cells[1] as f64, cells[2] as f64],
        )
        .unwrap();
        LocalGrid::new(&SoloComm, spec, [0; 3], BoundarySet::adiabatic(), initial).unwrap()
    }

    /// Overwrite a cell pair (previous, current) to force a crossing.
    fn force(grid: &mut LocalGrid, cell: (usize, usize, usize), prev: f64, now: f64) {
        let (i, j, k) = cell;
        *grid.previous_temperature_mut().at_mut(i, j, k) = prev;
        *grid.temperature_mut().at_mut(i, j, k) = now;
    }

    #[test]
    fn single_solidification_event_values() {
        // Degenerate single-cell block: 2000 K -> 1500 K across one
        // step of 0.1 s ending at t = 1.0.
        let mut g = grid([1, 1, 1], 1500.0);
        g.previous_temperature_mut().fill(2000.0);
        let mut data = SolidificationData::new(LIQUIDUS, &g);
        data.update(&g, 1.0, 0.1);

        let rows = data.events();
        assert_eq!(rows.len(), 1);
        let row = rows[0];
        // Cell center of the only cell.
        assert_eq!(&row[0..3], &[0.5, 0.5, 0.5]);
        // Never melted: sentinel melt time.
        assert!(row[3].is_nan());
        // m = (1500-1700)/(1500-2000) = 0.4, ts = 1.0 - 0.04.
        assert!((row[4] - 0.96).abs() < 1e-12);
        // R = (2000-1500)/0.1.
        assert!((row[5] - 5000.0).abs() < 1e-9);
    }

    #[test]
    fn melt_then_solidify_links_the_times() {
        let mut g = grid([1, 1, 1], 1600.0);
        let mut data = SolidificationData::new(LIQUIDUS, &g);

        // Step 1 ends at t = 0.5: 1600 -> 1800 (upward crossing).
        force(&mut g, (1, 1, 1), 1600.0, 1800.0);
        data.update(&g, 0.5, 0.1);
        assert!(data.is_empty());
        // m = (1800-1700)/(1800-1600) = 0.5 -> tm = 0.5 - 0.05.
        assert!((data.melt_time_at(1, 1, 1) - 0.45).abs() < 1e-12);

        // Step 2 ends at t = 1.0: 1800 -> 1500 (downward crossing).
        force(&mut g, (1, 1, 1), 1800.0, 1500.0);
        data.update(&g, 1.0, 0.1);

        let rows = data.events();
        assert_eq!(rows.len(), 1);
        assert!((rows[0][3] - 0.45).abs() < 1e-12);
        let m = (1500.0 - LIQUIDUS) / (1500.0 - 1800.0);
        assert!((rows[0][4] - (1.0 - m * 0.1)).abs() < 1e-12);
        assert!((rows[0][5] - 3000.0).abs() < 1e-9);
    }

    #[test]
    fn no_crossing_no_event() {
        let mut g = grid([2, 2, 2], 1600.0);
        let mut data = SolidificationData::new(LIQUIDUS, &g);
        // Stays below.
        g.store_previous();
        data.update(&g, 0.1, 0.1);
        // Stays above.
        g.temperature_mut().fill(1900.0);
        g.previous_temperature_mut().fill(1800.0);
        data.update(&g, 0.2, 0.1);
        assert!(data.is_empty());
    }

    #[test]
    fn remelt_overwrites_melt_time() {
        let mut g = grid([1, 1, 1], 1600.0);
        let mut data = SolidificationData::new(LIQUIDUS, &g);

        force(&mut g, (1, 1, 1), 1600.0, 1800.0);
        data.update(&g, 0.5, 0.1);
        force(&mut g, (1, 1, 1), 1800.0, 1600.0);
        data.update(&g, 1.0, 0.1);
        force(&mut g, (1, 1, 1), 1600.0, 1800.0);
        data.update(&g, 1.5, 0.1);

        let tm = data.melt_time_at(1, 1, 1);
        assert!(tm > 1.0, "second melt must overwrite the first: {tm}");
        // One event from the single solidification in between.
        assert_eq!(data.len(), 1);
    }

    #[test]
    fn gradient_uses_current_field() {
        let mut g = grid([3, 3, 3], 1000.0);
        // Linear-in-x current field; uniform previous field above
        // liquidus so the center cell solidifies.
        for (i, j, k) in g.owned_index_space().iter() {
            *g.temperature_mut().at_mut(i, j, k) = 100.0 * i as f64;
        }
        g.update_boundaries();
        g.previous_temperature_mut().fill(1800.0);
        // Center cell below liquidus; its neighbors along x are 100
        // apart, so Gx = 200/(2h) = 100.
        let mut data = SolidificationData::new(LIQUIDUS, &g);
        data.update(&g, 1.0, 0.1);
        let rows = data.events();
        let center: Vec<_> = rows
            .iter()
            .filter(|r| r[0..3] == [1.5, 1.5, 1.5])
            .collect();
        assert_eq!(center.len(), 1);
        assert!((center[0][6] - 100.0).abs() < 1e-12);
        assert_eq!(center[0][7], 0.0);
        assert_eq!(center[0][8], 0.0);
    }

    #[test]
    fn overflow_regrows_and_keeps_every_event() {
        // Five crossings into a buffer of four rows.
        let mut g = grid([5, 1, 1], 1500.0);
        g.previous_temperature_mut().fill(2000.0);
        let mut data = SolidificationData::with_capacity(LIQUIDUS, &g, 4);
        data.update(&g, 1.0, 0.1);

        assert_eq!(data.len(), 5);
        assert!(data.capacity() >= 10);
        let mut xs: Vec<f64> = data.events().iter().map(|r| r[0]).collect();
        xs.sort_by(f64::total_cmp);
        assert_eq!(xs, vec![0.5, 1.5, 2.5, 3.5, 4.5]);
    }

    #[test]
    fn event_count_is_capacity_independent() {
        // The same trace through buffers of every starting size ends
        // with identical event sets.
        let mut reference: Option<Vec<[f64; EVENT_WIDTH]>> = None;
        for capacity in [1, 2, 3, 8, 64] {
            let mut g = grid([4, 2, 1], 1500.0);
            g.previous_temperature_mut().fill(2000.0);
            let mut data = SolidificationData::with_capacity(LIQUIDUS, &g, capacity);
            data.update(&g, 1.0, 0.1);

            // A second step with fresh crossings on top.
            g.temperature_mut().fill(1900.0);
            g.store_previous();
            g.temperature_mut().fill(1400.0);
            data.update(&g, 1.1, 0.1);

            let mut rows = data.events();
            rows.sort_by(|a, b| a[0].total_cmp(&b[0]).then(a[1].total_cmp(&b[1])));
            match &reference {
                None => reference = Some(rows),
                Some(expected) => {
                    assert_eq!(expected.len(), rows.len(), "capacity {capacity}");
                    for (e, r) in expected.iter().zip(&rows) {
                        for c in 0..EVENT_WIDTH {
                            if e[c].is_nan() {
                                assert!(r[c].is_nan());
                            } else {
                                assert!(
                                    (e[c] - r[c]).abs() < 1e-12,
                                    "capacity {capacity} col {c}: {} vs {}",
                                    e[c],
                                    r[c]
                                );
                            }
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn near_full_reserve_preserves_rows() {
        let mut g = grid([10, 1, 1], 1500.0);
        g.previous_temperature_mut().fill(2000.0);
        // 10 crossings into 11 rows: no overflow, but > 90% occupancy.
        let mut data = SolidificationData::with_capacity(LIQUIDUS, &g, 11);
        data.update(&g, 1.0, 0.1);
        assert_eq!(data.len(), 10);
        assert_eq!(data.capacity(), 20);
        let mut xs: Vec<f64> = data.events().iter().map(|r| r[0]).collect();
        xs.sort_by(f64::total_cmp);
        let expected: Vec<f64> = (0..10).map(|i| i as f64 + 0.5).collect();
        assert_eq!(xs, expected);
    }

    #[test]
    fn bounds_over_solo_rank() {
        let mut g = grid([4, 4, 1], 1500.0);
        // Only two cells were molten before this step.
        g.previous_temperature_mut().fill(1000.0);
        *g.previous_temperature_mut().at_mut(2, 3, 1) = 2000.0;
        *g.previous_temperature_mut().at_mut(4, 1, 1) = 2000.0;
        let mut data = SolidificationData::new(LIQUIDUS, &g);
        data.update(&g, 1.0, 0.1);
        assert_eq!(data.len(), 2);

        let lo = data.lower_bounds(&SoloComm).unwrap();
        let hi = data.upper_bounds(&SoloComm).unwrap();
        assert_eq!(lo, [1.5, 0.5, 0.5]);
        assert_eq!(hi, [3.5, 2.5, 0.5]);
    }

    #[test]
    fn empty_rank_bounds_are_identities() {
        let g = grid([2, 2, 2], 1000.0);
        let data = SolidificationData::new(LIQUIDUS, &g);
        let lo = data.lower_bounds(&SoloComm).unwrap();
        let hi = data.upper_bounds(&SoloComm).unwrap();
        assert_eq!(lo, [f64::INFINITY; 3]);
        assert_eq!(hi, [f64::NEG_INFINITY; 3]);
    }
}

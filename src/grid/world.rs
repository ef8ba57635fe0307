//! WorldGrid - infinite 2-D grid of cells streamed around an observer.
//!
//! Items route to the cell owning their box's minimum corner. As the
//! observer moves, the grid keeps a fixed 3x3 window of cells resident:
//! cells entering the window are loaded on the worker pool, resident
//! cells that fall out of it are unloaded. Queries fan out to resident
//! cells only; a cell mid-load contributes nothing and never blocks the
//! caller.
//!
//! One mutex guards the cell map and every cell's state word. Load
//! bodies snapshot the staged queue under that mutex, build a fresh
//! index with no lock held, then re-lock to publish it, so the lock is
//! only ever held for short map-and-state work.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use glam::{DVec2, DVec3};

use super::cell::{Cell, CellState};
use super::coord::CellCoord;
use crate::error::SpatialError;
use crate::octree::{Aabb3, ItemHandle, OctreeIndex, TreeConfig};
use crate::pool::WorkerPool;

/// Radius of the residency window: the observer's cell plus its eight
/// neighbours stay resident.
const RESIDENCY_RADIUS: i32 = 1;

/// Handle to an item stored in one cell of a grid.
///
/// Valid while the owning cell stays resident; resolving it after the
/// cell unloaded yields `None`. Cells evolve independently, so a handle
/// never migrates between cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridHandle {
  pub cell: CellCoord,
  pub item: ItemHandle,
}

/// Residency snapshot of a grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GridStats {
  /// Cells the grid has created, in any state.
  pub cells_total: usize,
  /// Cells currently resident.
  pub cells_resident: usize,
  /// Cells with a load scheduled or running.
  pub cells_loading: usize,
  /// Load jobs queued or running on the pool.
  pub pending_loads: usize,
}

/// State shared between the grid and its load jobs.
struct GridShared<T> {
  cell_size: DVec2,
  tree: TreeConfig,
  cells: Mutex<HashMap<CellCoord, Cell<T>>>,
}

/// Streaming spatial store over an unbounded 2-D grid of cells.
pub struct WorldGrid<T: Clone + Send + 'static> {
  shared: Arc<GridShared<T>>,
  pool: WorkerPool,
}

impl<T: Clone + Send + 'static> WorldGrid<T> {
  /// Create a grid with the default per-cell tree configuration.
  ///
  /// Fails on degenerate cell sizes or a zero worker count.
  pub fn new(cell_size: DVec2, workers: usize) -> Result<Self, SpatialError> {
    Self::with_tree_config(cell_size, workers, TreeConfig::default())
  }

  /// Create a grid whose cells build their indices with `tree`.
  pub fn with_tree_config(
    cell_size: DVec2,
    workers: usize,
    tree: TreeConfig,
  ) -> Result<Self, SpatialError> {
    if !cell_size.is_finite() || cell_size.x <= 0.0 || cell_size.y <= 0.0 {
      return Err(SpatialError::InvalidCellSize(cell_size.x, cell_size.y));
    }
    tree.validate()?;
    let pool = WorkerPool::new(workers)?;
    Ok(Self {
      shared: Arc::new(GridShared {
        cell_size,
        tree,
        cells: Mutex::new(HashMap::new()),
      }),
      pool,
    })
  }

  /// Cell size in world units.
  pub fn cell_size(&self) -> DVec2 {
    self.shared.cell_size
  }

  /// Route a batch of items to their cells by the minimum corner of each
  /// item's box.
  pub fn insert<I>(&self, items: I)
  where
    I: IntoIterator<Item = (T, Aabb3)>,
  {
    let mut cells = self.shared.cells.lock().unwrap();
    for (payload, item_box) in items {
      let coord = CellCoord::of_position(item_box.min, self.shared.cell_size);
      let cell = cells
        .entry(coord)
        .or_insert_with(|| Cell::new(coord, self.shared.cell_size, self.shared.tree));
      cell.stage(payload, item_box);
    }
  }

  /// Drive residency around an observer position. Idempotent.
  ///
  /// Every window cell that is `Empty` or `Unloaded` gets a load
  /// scheduled; resident cells outside the window are unloaded. Cells
  /// already `Loading` or `Resident` are left alone.
  pub fn update(&self, observer: DVec3) {
    let center = CellCoord::of_position(observer, self.shared.cell_size);
    let mut to_load = Vec::new();
    {
      let mut cells = self.shared.cells.lock().unwrap();
      for dy in -RESIDENCY_RADIUS..=RESIDENCY_RADIUS {
        for dx in -RESIDENCY_RADIUS..=RESIDENCY_RADIUS {
          let coord = CellCoord::new(center.x + dx, center.y + dy);
          let cell = cells
            .entry(coord)
            .or_insert_with(|| Cell::new(coord, self.shared.cell_size, self.shared.tree));
          if matches!(cell.state, CellState::Empty | CellState::Unloaded) {
            cell.state = CellState::Loading;
            to_load.push(coord);
          }
        }
      }
      for cell in cells.values_mut() {
        if cell.state == CellState::Resident && cell.coord.chebyshev(center) > RESIDENCY_RADIUS {
          tracing::debug!(coord = ?cell.coord, "unloading cell");
          cell.unload();
        }
      }
    }
    for coord in to_load {
      tracing::debug!(?coord, "scheduling cell load");
      let shared = Arc::clone(&self.shared);
      if self.pool.enqueue(move || load_cell(&shared, coord)).is_err() {
        // lost the race against shutdown: the job will never run
        let mut cells = self.shared.cells.lock().unwrap();
        if let Some(cell) = cells.get_mut(&coord) {
          if cell.state == CellState::Loading {
            cell.state = CellState::Unloaded;
          }
        }
      }
    }
  }

  /// Collect handles of every resident item whose box overlaps `query`.
  ///
  /// Cells that are loading or unloaded contribute nothing; the call
  /// never waits for a load.
  pub fn query(&self, query: &Aabb3) -> Vec<GridHandle> {
    let cells = self.shared.cells.lock().unwrap();
    let mut out = Vec::new();
    for (coord, cell) in cells.iter() {
      if cell.state != CellState::Resident || !cell.footprint.overlaps(query) {
        continue;
      }
      out.extend(
        cell
          .search(query)
          .into_iter()
          .map(|item| GridHandle { cell: *coord, item }),
      );
    }
    out
  }

  /// Resolve a handle to a payload clone.
  ///
  /// `None` once the owning cell has unloaded or the item was removed.
  pub fn get(&self, handle: GridHandle) -> Option<T> {
    let cells = self.shared.cells.lock().unwrap();
    let cell = cells.get(&handle.cell)?;
    if cell.state != CellState::Resident {
      return None;
    }
    cell.index.get(handle.item).cloned()
  }

  /// Streaming state of one cell, if the grid has created it.
  pub fn cell_state(&self, coord: CellCoord) -> Option<CellState> {
    self.shared.cells.lock().unwrap().get(&coord).map(|cell| cell.state)
  }

  /// Coordinates of all currently resident cells.
  pub fn resident_cells(&self) -> Vec<CellCoord> {
    self
      .shared
      .cells
      .lock()
      .unwrap()
      .iter()
      .filter(|(_, cell)| cell.state == CellState::Resident)
      .map(|(coord, _)| *coord)
      .collect()
  }

  /// Load jobs queued or running.
  pub fn pending_loads(&self) -> usize {
    self.pool.pending_jobs()
  }

  /// Residency snapshot.
  pub fn stats(&self) -> GridStats {
    let cells = self.shared.cells.lock().unwrap();
    GridStats {
      cells_total: cells.len(),
      cells_resident: cells.values().filter(|c| c.state == CellState::Resident).count(),
      cells_loading: cells.values().filter(|c| c.state == CellState::Loading).count(),
      pending_loads: self.pool.pending_jobs(),
    }
  }

  /// Stop the worker pool. Terminal.
  ///
  /// Queued loads are discarded, a running load finishes before this
  /// returns, and later `update` calls schedule nothing.
  pub fn shutdown(&mut self) {
    self.pool.shutdown();
  }
}

/// Load body, run on a pool worker.
///
/// Builds the index off-lock from a snapshot of the staged queue, then
/// publishes it under the grid mutex, picking up whatever was staged
/// while the build ran. Bails out quietly if the cell left the `Loading`
/// state in the meantime.
fn load_cell<T: Clone + Send + 'static>(shared: &GridShared<T>, coord: CellCoord) {
  let start = Instant::now();
  let (snapshot, footprint) = {
    let cells = shared.cells.lock().unwrap();
    let Some(cell) = cells.get(&coord) else { return };
    if cell.state != CellState::Loading {
      return;
    }
    (cell.queue.clone(), cell.footprint)
  };

  let consumed = snapshot.len();
  let Ok(mut index) = OctreeIndex::new(footprint, shared.tree) else {
    return;
  };
  for (payload, item_box) in snapshot {
    index.insert(payload, item_box);
  }

  let mut cells = shared.cells.lock().unwrap();
  let Some(cell) = cells.get_mut(&coord) else { return };
  if cell.state != CellState::Loading {
    return;
  }
  for (payload, item_box) in &cell.queue[consumed..] {
    index.insert(payload.clone(), *item_box);
  }
  cell.index = index;
  cell.state = CellState::Resident;
  tracing::debug!(
    ?coord,
    items = cell.index.len(),
    elapsed_us = start.elapsed().as_micros() as u64,
    "cell load complete"
  );
}

#[cfg(test)]
#[path = "world_test.rs"]
mod world_test;

//! Cell - one streaming unit: an octree index plus its lazy-load state.

use glam::DVec2;

use super::coord::CellCoord;
use crate::octree::{Aabb3, ItemHandle, OctreeIndex, TreeConfig};

/// Lazy-load state of one cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellState {
  /// Created, never loaded. Staged items wait in the queue.
  Empty,
  /// A load job is scheduled or running. Searches return nothing.
  Loading,
  /// Index is populated; staged items are inserted directly.
  Resident,
  /// Index was dropped; the queue is retained for the next load.
  Unloaded,
}

/// One grid tile: a column of world space with its own octree index.
///
/// The queue holds every item ever staged into the cell so that
/// unload/load cycles replay the full population. The index only exists
/// while the cell is resident.
pub(crate) struct Cell<T> {
  pub coord: CellCoord,
  pub footprint: Aabb3,
  pub state: CellState,
  pub queue: Vec<(T, Aabb3)>,
  pub index: OctreeIndex<T>,
}

impl<T: Clone> Cell<T> {
  pub fn new(coord: CellCoord, cell_size: DVec2, tree: TreeConfig) -> Self {
    let footprint = coord.footprint(cell_size);
    Self {
      coord,
      footprint,
      state: CellState::Empty,
      queue: Vec::new(),
      // the grid validated the tree config at construction
      index: OctreeIndex::new(footprint, tree).expect("tree config validated by the grid"),
    }
  }

  /// Stage one item. Resident cells see it in the index at once; other
  /// states pick it up when their next load replays the queue.
  pub fn stage(&mut self, payload: T, item_box: Aabb3) {
    if self.state == CellState::Resident {
      self.index.insert(payload.clone(), item_box);
    }
    self.queue.push((payload, item_box));
  }

  /// Search the resident index. Non-resident cells contribute nothing.
  pub fn search(&self, query: &Aabb3) -> Vec<ItemHandle> {
    if self.state != CellState::Resident {
      return Vec::new();
    }
    self.index.search(query)
  }

  /// Drop the populated index, keeping the queue for a later reload.
  pub fn unload(&mut self) {
    self.index.clear();
    self.state = CellState::Unloaded;
  }
}

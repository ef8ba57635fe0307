//! Grid cell coordinates and footprints.

use glam::{DVec2, DVec3};

use crate::octree::Aabb3;

/// Half-extent of a cell footprint along Z.
///
/// Cells own a 2-D tile of the world extruded along the whole Z axis; a
/// large finite extent keeps octant midpoint arithmetic finite where
/// f64::MAX would overflow to infinity.
pub(crate) const Z_HALF_EXTENT: f64 = 1.0e12;

/// A 2-D cell coordinate in the world grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellCoord {
  pub x: i32,
  pub y: i32,
}

impl CellCoord {
  pub fn new(x: i32, y: i32) -> Self {
    Self { x, y }
  }

  /// Cell owning a world position.
  ///
  /// Floor division, not truncation: negative positions land in negative
  /// cells instead of piling up around cell (0, 0).
  pub fn of_position(pos: DVec3, cell_size: DVec2) -> Self {
    Self {
      x: (pos.x / cell_size.x).floor() as i32,
      y: (pos.y / cell_size.y).floor() as i32,
    }
  }

  /// World-space footprint of this cell: its 2-D tile extruded along Z.
  pub fn footprint(&self, cell_size: DVec2) -> Aabb3 {
    let min = DVec3::new(
      self.x as f64 * cell_size.x,
      self.y as f64 * cell_size.y,
      -Z_HALF_EXTENT,
    );
    let max = DVec3::new(min.x + cell_size.x, min.y + cell_size.y, Z_HALF_EXTENT);
    Aabb3::new(min, max)
  }

  /// Chebyshev distance to another cell: the square-window metric.
  pub fn chebyshev(&self, other: CellCoord) -> i32 {
    (self.x - other.x).abs().max((self.y - other.y).abs())
  }
}

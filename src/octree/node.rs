//! OctNode - one arena slot of the 8-way tree.
//!
//! Child subtrees are arena indices rather than owned boxes, so clearing
//! a whole tree is a single arena reset and nodes stay contiguous in
//! memory.

use super::bounds::Aabb3;
use super::index::ItemHandle;

/// Index of a node in the arena. The root always occupies slot 0.
pub(crate) type NodeId = u32;

/// Arena slot of the root node.
pub(crate) const ROOT: NodeId = 0;

/// One `(box, handle)` entry resident at a node.
#[derive(Clone, Copy, Debug)]
pub(crate) struct NodeEntry {
  pub item_box: Aabb3,
  pub handle: ItemHandle,
}

/// One node of the 8-way tree.
///
/// The eight child bounds are precomputed at construction; child subtrees
/// are created on demand. `depth` is the remaining subdivision budget,
/// inherited downward as `depth - 1`; a node with depth 0 never
/// subdivides.
pub(crate) struct OctNode {
  pub bounds: Aabb3,
  pub child_bounds: [Aabb3; 8],
  pub children: [Option<NodeId>; 8],
  pub entries: Vec<NodeEntry>,
  pub depth: u8,
}

impl OctNode {
  pub fn new(bounds: Aabb3, depth: u8) -> Self {
    Self {
      bounds,
      child_bounds: std::array::from_fn(|i| bounds.octant(i as u8)),
      children: [None; 8],
      entries: Vec::new(),
      depth,
    }
  }

  /// First octant whose bounds fully contain `item_box`, if any.
  ///
  /// Octants are disjoint up to shared faces, so "first" is unique for
  /// boxes with positive extent and deterministic for degenerate ones.
  pub fn first_child_containing(&self, item_box: &Aabb3) -> Option<u8> {
    (0u8..8).find(|&i| self.child_bounds[i as usize].contains(item_box))
  }
}

#[cfg(test)]
#[path = "node_test.rs"]
mod node_test;

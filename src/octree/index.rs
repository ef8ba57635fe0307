//! OctreeIndex - owning container over the node arena.
//!
//! Pairs every inserted item with a stable generational handle and a
//! `(node, slot)` back-link into the arena, so removal and relocation are
//! O(1) unlink plus re-descent. Payloads live in a slotmap; the tree only
//! ever reads the item boxes.

use slotmap::SlotMap;

use super::bounds::Aabb3;
use super::config::TreeConfig;
use super::node::{NodeEntry, NodeId, OctNode, ROOT};
use crate::error::SpatialError;

slotmap::new_key_type! {
  /// Stable handle to an item stored in an [`OctreeIndex`].
  ///
  /// Survives inserts and relocations of any item, including its own.
  /// Only `remove`, `clear`, and `resize` invalidate it; a stale handle
  /// fails the call, it never resolves to another item.
  pub struct ItemHandle;
}

/// Statistics from one search descent.
///
/// Useful for asserting that a query fully covering a subtree collects it
/// wholesale instead of re-testing every box inside.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QueryStats {
  /// Nodes whose local entries were intersection-tested.
  pub nodes_tested: usize,
  /// Subtrees fully covered by the query and collected without further
  /// intersection tests.
  pub subtrees_collected: usize,
}

/// Payload plus the back-link to the single node entry holding its box.
struct OwnedItem<T> {
  payload: T,
  item_box: Aabb3,
  node: NodeId,
  slot: usize,
}

/// Dynamic octree over axis-aligned boxes with stable handles.
///
/// Items are admitted at the shallowest node that fully contains their
/// box, subject to a soft per-node capacity: a full node first tries to
/// hand the new box to a containing child, then to migrate one of its own
/// entries down to make room. Boxes too large for any child stay put,
/// past the cap if need be, and boxes partly outside the root bounds
/// become root residents.
pub struct OctreeIndex<T> {
  nodes: Vec<OctNode>,
  items: SlotMap<ItemHandle, OwnedItem<T>>,
  config: TreeConfig,
}

impl<T> OctreeIndex<T> {
  /// Create an empty index over `bounds`.
  ///
  /// Fails if the configuration is unusable (capacity 0).
  pub fn new(bounds: Aabb3, config: TreeConfig) -> Result<Self, SpatialError> {
    config.validate()?;
    Ok(Self {
      nodes: vec![OctNode::new(bounds, config.depth)],
      items: SlotMap::with_key(),
      config,
    })
  }

  /// Create an empty index with the default capacity and depth.
  pub fn with_defaults(bounds: Aabb3) -> Self {
    Self {
      nodes: vec![OctNode::new(bounds, TreeConfig::default().depth)],
      items: SlotMap::with_key(),
      config: TreeConfig::default(),
    }
  }

  /// Bounds of the root node.
  pub fn bounds(&self) -> Aabb3 {
    self.nodes[ROOT as usize].bounds
  }

  /// Construction parameters of this index.
  pub fn config(&self) -> TreeConfig {
    self.config
  }

  /// Number of items in the index.
  pub fn len(&self) -> usize {
    self.items.len()
  }

  /// Check if the index holds no items.
  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  /// Insert an item with its box. Never fails.
  pub fn insert(&mut self, payload: T, item_box: Aabb3) -> ItemHandle {
    let handle = self.items.insert(OwnedItem {
      payload,
      item_box,
      node: ROOT,
      slot: 0,
    });
    let (node, slot) = self.place_from(ROOT, handle, item_box);
    let owned = &mut self.items[handle];
    owned.node = node;
    owned.slot = slot;
    handle
  }

  /// Read access to a payload. `None` for stale handles.
  pub fn get(&self, handle: ItemHandle) -> Option<&T> {
    self.items.get(handle).map(|owned| &owned.payload)
  }

  /// Write access to a payload. `None` for stale handles.
  pub fn get_mut(&mut self, handle: ItemHandle) -> Option<&mut T> {
    self.items.get_mut(handle).map(|owned| &mut owned.payload)
  }

  /// Current box of an item. `None` for stale handles.
  pub fn item_box(&self, handle: ItemHandle) -> Option<Aabb3> {
    self.items.get(handle).map(|owned| owned.item_box)
  }

  /// Iterate over all items in unspecified order.
  pub fn iter(&self) -> impl Iterator<Item = (ItemHandle, &T)> {
    self.items.iter().map(|(handle, owned)| (handle, &owned.payload))
  }

  /// Collect handles of every item whose box overlaps `query`.
  ///
  /// Each qualifying item appears exactly once; the order is unspecified
  /// but deterministic for a fixed tree state.
  pub fn search(&self, query: &Aabb3) -> Vec<ItemHandle> {
    self.search_with_stats(query).0
  }

  /// Like [`search`](Self::search), also reporting traversal statistics.
  pub fn search_with_stats(&self, query: &Aabb3) -> (Vec<ItemHandle>, QueryStats) {
    let mut out = Vec::new();
    let mut stats = QueryStats::default();
    self.search_node(ROOT, query, &mut out, &mut stats);
    (out, stats)
  }

  /// Move an item to a new box without invalidating its handle.
  ///
  /// Observationally equivalent to remove-then-insert, except the handle
  /// stays valid.
  pub fn relocate(&mut self, handle: ItemHandle, new_box: Aabb3) -> Result<(), SpatialError> {
    let (node, slot) = match self.items.get(handle) {
      Some(owned) => (owned.node, owned.slot),
      None => return Err(SpatialError::StaleHandle),
    };
    self.unlink_slot(node, slot);
    let (node, slot) = self.place_from(ROOT, handle, new_box);
    let owned = &mut self.items[handle];
    owned.item_box = new_box;
    owned.node = node;
    owned.slot = slot;
    Ok(())
  }

  /// Remove an item, returning its payload.
  pub fn remove(&mut self, handle: ItemHandle) -> Result<T, SpatialError> {
    let owned = self.items.remove(handle).ok_or(SpatialError::StaleHandle)?;
    self.unlink_slot(owned.node, owned.slot);
    Ok(owned.payload)
  }

  /// Drop every item and reset the tree to a bare root.
  ///
  /// All outstanding handles become stale.
  pub fn clear(&mut self) {
    let bounds = self.bounds();
    self.reset(bounds);
  }

  /// Replace the root bounds, clearing the tree.
  ///
  /// Items are not carried over; callers re-insert whatever survives the
  /// new bounds.
  pub fn resize(&mut self, new_bounds: Aabb3) {
    self.reset(new_bounds);
  }

  fn reset(&mut self, bounds: Aabb3) {
    self.nodes.clear();
    self.nodes.push(OctNode::new(bounds, self.config.depth));
    self.items.clear();
  }

  // ===========================================================================
  // Placement
  // ===========================================================================

  /// Descend from `start` and admit `(handle, item_box)` somewhere below
  /// it, returning the final `(node, slot)` location.
  ///
  /// A node takes the box directly while it has spare capacity or no
  /// depth budget left. Past capacity the box goes to the first child
  /// that fully contains it; if no child does, one resident entry that
  /// does fit a child is migrated down and the box stays here. When not
  /// even that is possible the capacity is exceeded: boxes that straddle
  /// every child boundary have nowhere else to live.
  fn place_from(&mut self, start: NodeId, handle: ItemHandle, item_box: Aabb3) -> (NodeId, usize) {
    let mut node_id = start;
    loop {
      let node = &self.nodes[node_id as usize];
      if node.depth == 0 || node.entries.len() < self.config.capacity {
        return self.admit(node_id, handle, item_box);
      }
      if let Some(octant) = node.first_child_containing(&item_box) {
        node_id = self.ensure_child(node_id, octant);
        continue;
      }
      if let Some((slot, octant)) = self.find_migratable(node_id) {
        self.migrate_down(node_id, slot, octant);
      }
      return self.admit(node_id, handle, item_box);
    }
  }

  /// Append an entry to a node's local list.
  fn admit(&mut self, node_id: NodeId, handle: ItemHandle, item_box: Aabb3) -> (NodeId, usize) {
    let entries = &mut self.nodes[node_id as usize].entries;
    entries.push(NodeEntry { item_box, handle });
    (node_id, entries.len() - 1)
  }

  /// First local entry that fits entirely inside some child bound,
  /// together with that child's octant. Entries are scanned in list
  /// order; the lowest matching octant wins.
  fn find_migratable(&self, node_id: NodeId) -> Option<(usize, u8)> {
    let node = &self.nodes[node_id as usize];
    node.entries.iter().enumerate().find_map(|(slot, entry)| {
      node
        .first_child_containing(&entry.item_box)
        .map(|octant| (slot, octant))
    })
  }

  /// Push the entry at `slot` down into the subtree under `octant`.
  fn migrate_down(&mut self, node_id: NodeId, slot: usize, octant: u8) {
    let entry = self.unlink_slot(node_id, slot);
    let child = self.ensure_child(node_id, octant);
    let (node, slot) = self.place_from(child, entry.handle, entry.item_box);
    let owned = &mut self.items[entry.handle];
    owned.node = node;
    owned.slot = slot;
  }

  /// Child arena slot under `octant`, created on demand.
  fn ensure_child(&mut self, node_id: NodeId, octant: u8) -> NodeId {
    if let Some(child) = self.nodes[node_id as usize].children[octant as usize] {
      return child;
    }
    let bounds = self.nodes[node_id as usize].child_bounds[octant as usize];
    let depth = self.nodes[node_id as usize].depth - 1;
    let child = self.nodes.len() as NodeId;
    self.nodes.push(OctNode::new(bounds, depth));
    self.nodes[node_id as usize].children[octant as usize] = Some(child);
    child
  }

  /// O(1) unlink of a node entry, fixing up the back-link of whichever
  /// entry `swap_remove` moved into the vacated slot.
  fn unlink_slot(&mut self, node_id: NodeId, slot: usize) -> NodeEntry {
    let entries = &mut self.nodes[node_id as usize].entries;
    let entry = entries.swap_remove(slot);
    if let Some(moved) = entries.get(slot) {
      self.items[moved.handle].slot = slot;
    }
    entry
  }

  // ===========================================================================
  // Traversal
  // ===========================================================================

  fn search_node(
    &self,
    node_id: NodeId,
    query: &Aabb3,
    out: &mut Vec<ItemHandle>,
    stats: &mut QueryStats,
  ) {
    stats.nodes_tested += 1;
    let node = &self.nodes[node_id as usize];

    for entry in &node.entries {
      if query.overlaps(&entry.item_box) {
        out.push(entry.handle);
      }
    }

    for octant in 0..8 {
      let Some(child) = node.children[octant] else {
        continue;
      };
      if query.contains(&node.child_bounds[octant]) {
        stats.subtrees_collected += 1;
        self.collect_subtree(child, out);
      } else if query.overlaps(&node.child_bounds[octant]) {
        self.search_node(child, query, out, stats);
      }
    }
  }

  /// Append every handle in a subtree, no intersection tests.
  fn collect_subtree(&self, node_id: NodeId, out: &mut Vec<ItemHandle>) {
    let node = &self.nodes[node_id as usize];
    out.extend(node.entries.iter().map(|entry| entry.handle));
    for child in node.children.iter().flatten() {
      self.collect_subtree(*child, out);
    }
  }
}

#[cfg(test)]
#[path = "index_test.rs"]
mod index_test;

//! spatial_stream - engine-independent spatial indexing and streaming.
//!
//! This crate answers two questions efficiently as an observer moves
//! through a world of axis-aligned volumes:
//!
//! - **Which objects intersect a query volume?** A dynamic octree
//!   ([`OctreeIndex`]) with a soft per-node capacity, stable generational
//!   handles, and O(1) removal/relocation.
//! - **Which regions should be resident right now?** A world-partition
//!   grid ([`WorldGrid`]) of lazily-loaded cells, each wrapping one
//!   octree, streamed around the observer by a fixed worker pool.
//!
//! # Features
//!
//! - **Stable handles**: inserts and relocations of other items never
//!   invalidate a handle; stale handles fail loudly instead of aliasing
//! - **Soft capacity**: oversized boxes stay at the shallowest node that
//!   contains them; full nodes migrate a resident box down before giving
//!   up on the cap
//! - **Non-blocking streaming**: cell loads build their index off-lock
//!   on a worker and publish under the grid mutex; queries against a
//!   loading cell return empty instead of waiting
//!
//! # Example
//!
//! ```ignore
//! use glam::{DVec2, DVec3};
//! use spatial_stream::{Aabb3, WorldGrid};
//!
//! let grid: WorldGrid<u64> = WorldGrid::new(DVec2::splat(100.0), 4)?;
//!
//! // Stage objects; they route to cells by their box's min corner.
//! grid.insert((0..1000).map(|i| {
//!     let origin = DVec3::new(i as f64, 0.0, 0.0);
//!     (i, Aabb3::from_origin_size(origin, DVec3::ONE))
//! }));
//!
//! // Each frame: drive residency, then query what is near the observer.
//! grid.update(DVec3::new(50.0, 50.0, 0.0));
//! let visible = grid.query(&Aabb3::from_center_half_extents(
//!     DVec3::new(50.0, 50.0, 0.0),
//!     DVec3::splat(25.0),
//! ));
//! ```

pub mod error;
pub mod grid;
pub mod octree;
pub mod pool;

// Re-export commonly used items
pub use error::SpatialError;
pub use grid::{CellCoord, CellState, GridHandle, GridStats, WorldGrid};
pub use octree::{Aabb3, ItemHandle, OctreeIndex, QueryStats, TreeConfig};
pub use pool::WorkerPool;

//! World-partition streaming layer.
//!
//! Composes many octree indices into an unbounded, lazily-loaded 2-D
//! grid of cells driven by an observer position.
//!
//! # Module Structure
//!
//! - [`coord`]: `CellCoord` - integer cell coordinates and footprints
//! - [`cell`]: `CellState` - per-cell streaming state machine
//! - [`world`]: `WorldGrid` - routing, residency window, query fan-out

pub mod cell;
pub mod coord;
pub mod world;

// Re-exports
pub use cell::CellState;
pub use coord::CellCoord;
pub use world::{GridHandle, GridStats, WorldGrid};

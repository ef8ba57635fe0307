//! Error types for index construction, handle use, and pool lifecycle.

/// Errors surfaced by the spatial index and streaming layers.
///
/// Transient streaming states are deliberately absent: searching a cell
/// that is still loading returns an empty result, it does not fail.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SpatialError {
  /// Node capacity must allow at least one item.
  #[error("node capacity must be at least 1, got {0}")]
  InvalidCapacity(usize),

  /// Cell sizes must be positive, finite numbers.
  #[error("cell size must be positive and finite, got ({0}, {1})")]
  InvalidCellSize(f64, f64),

  /// A pool needs at least one worker thread.
  #[error("worker count must be at least 1")]
  InvalidWorkerCount,

  /// The handle's item was removed, or its index was cleared or resized.
  #[error("stale handle: the item was removed or its index was cleared")]
  StaleHandle,

  /// The pool no longer accepts jobs.
  #[error("worker pool is shut down")]
  PoolShutdown,
}

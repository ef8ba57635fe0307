//! Axis-aligned bounding box with double precision for huge worlds.

use glam::DVec3;

/// Double-precision axis-aligned bounding box.
///
/// Corners are inclusive on every axis: two boxes that share a face
/// overlap, and a box contains itself.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb3 {
  /// Minimum corner (inclusive).
  pub min: DVec3,
  /// Maximum corner (inclusive).
  pub max: DVec3,
}

impl Aabb3 {
  /// Build a box from explicit corners.
  ///
  /// The caller promises the corners are ordered; this is checked in
  /// debug builds only. Use [`from_origin_size`](Self::from_origin_size)
  /// when the input may be unordered.
  pub fn new(min: DVec3, max: DVec3) -> Self {
    debug_assert!(
      min.cmple(max).all(),
      "corners out of order: min exceeds max on some axis"
    );
    Self { min, max }
  }

  /// Create an AABB from an origin corner and a size.
  ///
  /// Negative size components are accepted: corners are swapped so the
  /// stored min is the componentwise minimum.
  pub fn from_origin_size(origin: DVec3, size: DVec3) -> Self {
    let corner = origin + size;
    Self {
      min: origin.min(corner),
      max: origin.max(corner),
    }
  }

  /// A box centred on `center`, reaching `half_extents` out on each axis.
  pub fn from_center_half_extents(center: DVec3, half_extents: DVec3) -> Self {
    Self {
      min: center - half_extents,
      max: center + half_extents,
    }
  }

  /// True when the two boxes share at least one point.
  ///
  /// Each axis is a closed interval, and two boxes meet exactly when
  /// neither starts past the other's end on any axis. Face contact is
  /// enough.
  #[inline]
  pub fn overlaps(&self, other: &Aabb3) -> bool {
    self.min.cmple(other.max).all() && other.min.cmple(self.max).all()
  }

  /// True when `point` lies inside the box or on its boundary.
  #[inline]
  pub fn contains_point(&self, point: DVec3) -> bool {
    self.min.cmple(point).all() && point.cmple(self.max).all()
  }

  /// True when `other` lies entirely within this box.
  ///
  /// Corners count, so every box contains itself.
  #[inline]
  pub fn contains(&self, other: &Aabb3) -> bool {
    self.min.cmple(other.min).all() && other.max.cmple(self.max).all()
  }

  /// Edge lengths along each axis.
  #[inline]
  pub fn size(&self) -> DVec3 {
    self.max - self.min
  }

  /// Midpoint of the box.
  #[inline]
  pub fn center(&self) -> DVec3 {
    self.min + self.size() * 0.5
  }

  /// Extent along X.
  #[inline]
  pub fn width(&self) -> f64 {
    self.max.x - self.min.x
  }

  /// Extent along Y.
  #[inline]
  pub fn height(&self) -> f64 {
    self.max.y - self.min.y
  }

  /// Extent along Z.
  #[inline]
  pub fn depth(&self) -> f64 {
    self.max.z - self.min.z
  }

  /// AABB of one of the eight equal-size octants.
  ///
  /// Index bit layout: bit 0 = X, bit 1 = Y, bit 2 = Z (0 = low half,
  /// 1 = high half).
  pub fn octant(&self, index: u8) -> Aabb3 {
    debug_assert!(index < 8, "octant index must be 0..8");
    let half = (self.max - self.min) * 0.5;
    let offset = DVec3::new(
      if index & 1 == 0 { 0.0 } else { half.x },
      if index & 2 == 0 { 0.0 } else { half.y },
      if index & 4 == 0 { 0.0 } else { half.z },
    );
    let min = self.min + offset;
    Aabb3 { min, max: min + half }
  }
}

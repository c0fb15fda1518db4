use crate::core::axis::Axis;
use crate::core::grid::Grid2;

/// Relative inset applied when clamping at the upper edge, keeping the point strictly
/// inside the last cell.
pub const CLAMP_EPSILON: f64 = 1e-5;

/// What happens to a coordinate that leaves the grid along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryPolicy {
    /// Periodic re-entry at the opposite edge.
    Wrap,
    /// Saturate at the edge.
    #[default]
    Clamp,
}

impl BoundaryPolicy {
    /// `Wrap` when `repeat` is set, otherwise `Clamp`.
    pub fn from_repeat(repeat: bool) -> Self {
        if repeat {
            BoundaryPolicy::Wrap
        } else {
            BoundaryPolicy::Clamp
        }
    }
}

/// Map `value` back into `axis` according to `policy`.
///
/// Returns the new coordinate and whether a wrap took place.
#[inline]
pub fn clamp_or_wrap(value: f64, axis: &Axis, policy: BoundaryPolicy) -> (f64, bool) {
    if value > axis.max() {
        match policy {
            BoundaryPolicy::Wrap => (axis.min(), true),
            BoundaryPolicy::Clamp => (axis.max() - CLAMP_EPSILON * axis.max().abs(), false),
        }
    } else if value < axis.min() {
        match policy {
            BoundaryPolicy::Wrap => (axis.max(), true),
            BoundaryPolicy::Clamp => (axis.min(), false),
        }
    } else {
        (value, false)
    }
}

/// A boundary-checked planar point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Checked {
    pub point: [f64; 2],
    pub wrapped_x: bool,
    pub wrapped_y: bool,
}

/// Per-axis policies for the planar domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoundaryConditions {
    pub x: BoundaryPolicy,
    pub y: BoundaryPolicy,
}

impl BoundaryConditions {
    pub fn new(x: BoundaryPolicy, y: BoundaryPolicy) -> Self {
        Self { x, y }
    }

    /// Apply each axis policy independently. Wrap counting is left to the caller.
    pub fn apply(&self, point: [f64; 2], grid: &Grid2) -> Checked {
        let (px, wrapped_x) = clamp_or_wrap(point[0], grid.x_axis(), self.x);
        let (py, wrapped_y) = clamp_or_wrap(point[1], grid.y_axis(), self.y);
        Checked {
            point: [px, py],
            wrapped_x,
            wrapped_y,
        }
    }
}

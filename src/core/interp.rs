//! Bilinear (2D) and trilinear (3D) reconstruction of gridded fields.
//!
//! Both interpolators bracket each coordinate between `floor` and `ceil` of its
//! fractional index. When the two coincide (the point sits on a grid line) the lower
//! index is stepped down, or the upper one stepped up at index 0, so the enclosing
//! cell always has distinct corners.

use crate::core::field::FlatField;
use crate::core::grid::{FieldKind, Grid2, Grid3};
use crate::error::{Error, Result};

/// Flattened indices of the four corners around a planar point, ordered
/// `(i0,j0), (i1,j0), (i0,j1), (i1,j1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell2 {
    pub corners: [usize; 4],
}

/// Flattened indices of the eight corners around a point, ordered
/// `000, 100, 010, 110, 001, 101, 011, 111` (bits are i, j, k).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell3 {
    pub corners: [usize; 8],
}

/// Bracket a fractional index with two distinct sample indices in `[0, count)`.
///
/// Errors:
/// - `Error::OutOfBounds` if the bracket leaves the grid or `fractional` is not finite.
pub fn bracket(fractional: f64, count: usize) -> Result<(usize, usize)> {
    if !fractional.is_finite() {
        return Err(Error::OutOfBounds(format!(
            "fractional grid index {fractional} is not finite"
        )));
    }
    let mut lo = fractional.floor() as i64;
    let mut hi = fractional.ceil() as i64;
    if lo == hi {
        if lo > 0 {
            lo -= 1;
        } else {
            hi += 1;
        }
    }
    if lo < 0 || hi >= count as i64 {
        return Err(Error::OutOfBounds(format!(
            "grid index {fractional:.3} outside [0, {}]",
            count.saturating_sub(1)
        )));
    }
    Ok((lo as usize, hi as usize))
}

/// Weight of the upper corner for `v` in `[lo, hi]`. A zero-width cell puts all
/// weight on the lower corner.
#[inline]
fn upper_weight(v: f64, lo: f64, hi: f64) -> f64 {
    let width = hi - lo;
    if width == 0.0 {
        0.0
    } else {
        (v - lo) / width
    }
}

/// Bilinear interpolation over a [`Grid2`].
#[derive(Debug, Clone, Copy)]
pub struct Bilinear<'a> {
    grid: &'a Grid2,
}

impl<'a> Bilinear<'a> {
    pub fn new(grid: &'a Grid2) -> Self {
        Self { grid }
    }

    /// Find the cell enclosing `point`. The point should already be boundary checked.
    pub fn locate(&self, point: &[f64; 2]) -> Result<Cell2> {
        let (xa, ya) = (self.grid.x_axis(), self.grid.y_axis());
        let (i0, i1) = bracket(xa.fractional_index(point[0]), xa.count())?;
        let (j0, j1) = bracket(ya.fractional_index(point[1]), ya.count())?;
        let g = self.grid;
        Ok(Cell2 {
            corners: [
                g.flat_index(i0, j0),
                g.flat_index(i1, j0),
                g.flat_index(i0, j1),
                g.flat_index(i1, j1),
            ],
        })
    }

    /// Interpolate one of the grid's stored fields.
    #[inline]
    pub fn interpolate(&self, point: &[f64; 2], cell: &Cell2, kind: FieldKind) -> [f64; 2] {
        self.sample(point, cell, self.grid.field(kind))
    }

    /// Interpolate any field laid out on this grid (scalar or vector).
    ///
    /// `f(x,y) = [f00(x2-x)(y2-y) + f10(x-x1)(y2-y) + f01(x2-x)(y-y1) + f11(x-x1)(y-y1)]
    ///           / [(x2-x1)(y2-y1)]`
    pub fn sample<const N: usize>(
        &self,
        point: &[f64; 2],
        cell: &Cell2,
        field: &FlatField<N>,
    ) -> [f64; N] {
        let [c00, c10, c01, c11] = cell.corners;
        let (xs, ys) = (self.grid.xs(), self.grid.ys());
        let tx = upper_weight(point[0], xs[c00], xs[c10]);
        let ty = upper_weight(point[1], ys[c10], ys[c01]);

        let f = field.as_slice();
        let mut out = [0.0; N];
        for (k, o) in out.iter_mut().enumerate() {
            *o = f[c00][k] * (1.0 - tx) * (1.0 - ty)
                + f[c10][k] * tx * (1.0 - ty)
                + f[c01][k] * (1.0 - tx) * ty
                + f[c11][k] * tx * ty;
        }
        out
    }

    /// `locate` followed by `interpolate`.
    pub fn at(&self, point: &[f64; 2], kind: FieldKind) -> Result<[f64; 2]> {
        let cell = self.locate(point)?;
        Ok(self.interpolate(point, &cell, kind))
    }
}

/// Trilinear interpolation over a [`Grid3`].
///
/// No boundary handling happens on this path: points outside the grid are reported
/// as `Error::OutOfBounds` rather than wrapped or clamped.
#[derive(Debug, Clone, Copy)]
pub struct Trilinear<'a> {
    grid: &'a Grid3,
}

impl<'a> Trilinear<'a> {
    pub fn new(grid: &'a Grid3) -> Self {
        Self { grid }
    }

    pub fn locate(&self, point: &[f64; 3]) -> Result<Cell3> {
        let g = self.grid;
        let (i0, i1) = bracket(g.x_axis().fractional_index(point[0]), g.x_axis().count())?;
        let (j0, j1) = bracket(g.y_axis().fractional_index(point[1]), g.y_axis().count())?;
        let (k0, k1) = bracket(g.z_axis().fractional_index(point[2]), g.z_axis().count())?;
        Ok(Cell3 {
            corners: [
                g.flat_index(i0, j0, k0),
                g.flat_index(i1, j0, k0),
                g.flat_index(i0, j1, k0),
                g.flat_index(i1, j1, k0),
                g.flat_index(i0, j0, k1),
                g.flat_index(i1, j0, k1),
                g.flat_index(i0, j1, k1),
                g.flat_index(i1, j1, k1),
            ],
        })
    }

    #[inline]
    pub fn interpolate(&self, point: &[f64; 3], cell: &Cell3, kind: FieldKind) -> [f64; 3] {
        self.sample(point, cell, self.grid.field(kind))
    }

    /// Blend along X (8 -> 4), then Y (4 -> 2), then Z (2 -> 1).
    pub fn sample<const N: usize>(
        &self,
        point: &[f64; 3],
        cell: &Cell3,
        field: &FlatField<N>,
    ) -> [f64; N] {
        let c = cell.corners;
        let g = self.grid;
        let xd = upper_weight(point[0], g.xs()[c[0]], g.xs()[c[1]]);
        let yd = upper_weight(point[1], g.ys()[c[0]], g.ys()[c[2]]);
        let zd = upper_weight(point[2], g.zs()[c[0]], g.zs()[c[4]]);

        let f = field.as_slice();
        let lerp = |a: f64, b: f64, t: f64| a * (1.0 - t) + b * t;
        let mut out = [0.0; N];
        for (k, o) in out.iter_mut().enumerate() {
            let f00 = lerp(f[c[0]][k], f[c[1]][k], xd);
            let f10 = lerp(f[c[2]][k], f[c[3]][k], xd);
            let f01 = lerp(f[c[4]][k], f[c[5]][k], xd);
            let f11 = lerp(f[c[6]][k], f[c[7]][k], xd);
            let f0 = lerp(f00, f10, yd);
            let f1 = lerp(f01, f11, yd);
            *o = lerp(f0, f1, zd);
        }
        out
    }

    pub fn at(&self, point: &[f64; 3], kind: FieldKind) -> Result<[f64; 3]> {
        let cell = self.locate(point)?;
        Ok(self.interpolate(point, &cell, kind))
    }
}

//! Regular 2D and 3D sampling grids: axes, coordinate traces and the two fields
//! (fluid velocity and the gradient of the squared electric field).

use crate::core::axis::{quiver_length, strided_quiver_length, Axis};
use crate::core::field::{zero_nan, FlatField};
use crate::error::{Error, Result};

/// Which stored field an interpolation query reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Fluid velocity.
    Velocity,
    /// Gradient of |E|^2, driving the dielectrophoretic force.
    GradientSquared,
}

/// A planar grid with fields sampled at every node.
#[derive(Debug, Clone)]
pub struct Grid2 {
    x: Axis,
    y: Axis,
    xs: Vec<f64>,
    ys: Vec<f64>,
    velocity: FlatField<2>,
    gradient: FlatField<2>,
}

impl Grid2 {
    /// Build a grid from flattened coordinate traces and fields.
    ///
    /// The fast-axis sample count is detected by scanning `xs` for the first repeat of
    /// its leading value; the Y count is the remaining length divided by it.
    ///
    /// Errors:
    /// - `Error::Config` on empty or mismatched traces, an undetectable or
    ///   non-dividing row length, or a descending first row/column.
    pub fn new(
        mut xs: Vec<f64>,
        mut ys: Vec<f64>,
        velocity: FlatField<2>,
        gradient: FlatField<2>,
    ) -> Result<Self> {
        let len = xs.len();
        if len == 0 {
            return Err(Error::Config("grid has no samples".into()));
        }
        if ys.len() != len || velocity.len() != len || gradient.len() != len {
            return Err(Error::Config(format!(
                "grid traces differ in length: x={}, y={}, velocity={}, gradient={}",
                len,
                ys.len(),
                velocity.len(),
                gradient.len()
            )));
        }
        zero_nan(&mut xs);
        zero_nan(&mut ys);

        let nx = quiver_length(&xs);
        if nx == 0 {
            return Err(Error::Config(
                "x trace never repeats its first value; cannot detect the row length".into(),
            ));
        }
        if len % nx != 0 {
            return Err(Error::Config(format!(
                "{len} samples do not split into rows of {nx}"
            )));
        }
        let ny = len / nx;
        ensure_ascending(xs.iter().take(nx), "x")?;
        ensure_ascending(ys.iter().step_by(nx), "y")?;

        let x = Axis::from_trace(&xs, nx, 1)?;
        let y = Axis::from_trace(&ys, ny, nx)?;
        log::debug!(
            "grid 2D: {nx} x {ny} samples, x in [{}, {}], y in [{}, {}]",
            x.min(),
            x.max(),
            y.min(),
            y.max()
        );
        Ok(Self {
            x,
            y,
            xs,
            ys,
            velocity,
            gradient,
        })
    }

    /// A uniform grid over `[x0, x1] x [y0, y1]` with `nx * ny` nodes and zero fields.
    pub fn uniform(nx: usize, ny: usize, x_range: [f64; 2], y_range: [f64; 2]) -> Result<Self> {
        let (xs, ys) = uniform_traces(nx, ny, x_range, y_range);
        let len = xs.len();
        Self::new(xs, ys, FlatField::zeros(len), FlatField::zeros(len))
    }

    /// Replace the velocity field; the length must match the grid.
    pub fn with_velocity(mut self, velocity: FlatField<2>) -> Result<Self> {
        check_len(velocity.len(), self.len(), "velocity")?;
        self.velocity = velocity;
        Ok(self)
    }

    /// Replace the gradient field; the length must match the grid.
    pub fn with_gradient(mut self, gradient: FlatField<2>) -> Result<Self> {
        check_len(gradient.len(), self.len(), "gradient")?;
        self.gradient = gradient;
        Ok(self)
    }

    #[inline]
    pub fn x_axis(&self) -> &Axis {
        &self.x
    }

    #[inline]
    pub fn y_axis(&self) -> &Axis {
        &self.y
    }

    /// Flattened X coordinate of every node.
    #[inline]
    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    /// Flattened Y coordinate of every node.
    #[inline]
    pub fn ys(&self) -> &[f64] {
        &self.ys
    }

    #[inline]
    pub fn velocity(&self) -> &FlatField<2> {
        &self.velocity
    }

    #[inline]
    pub fn gradient(&self) -> &FlatField<2> {
        &self.gradient
    }

    #[inline]
    pub fn field(&self, kind: FieldKind) -> &FlatField<2> {
        match kind {
            FieldKind::Velocity => &self.velocity,
            FieldKind::GradientSquared => &self.gradient,
        }
    }

    /// Total number of nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.xs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    #[inline]
    pub fn flat_index(&self, i: usize, j: usize) -> usize {
        i + j * self.x.count()
    }

    /// Scale the velocity components (unit conversion of the imported field).
    pub fn scale_velocity(&mut self, factors: [f64; 2]) {
        self.velocity.scale(factors);
    }

    /// Duplicate the field once along X, extending the channel.
    ///
    /// Every row is followed by a copy of itself; the copied X coordinates are shifted
    /// by `max + min`. Axis parameters are then re-derived from the new traces with the
    /// same repeat-scan detection used at construction.
    pub fn repeat_x(&mut self) -> Result<()> {
        let nx = self.x.count();
        let shift = self.x.max() + self.x.min();
        let xs: Vec<f64> = self
            .xs
            .chunks(nx)
            .flat_map(|row| row.iter().copied().chain(row.iter().map(move |x| x + shift)))
            .collect();
        let ys = double_rows(&self.ys, nx);
        let velocity = FlatField::from_samples(double_rows(self.velocity.as_slice(), nx));
        let gradient = FlatField::from_samples(double_rows(self.gradient.as_slice(), nx));

        let grid = Self::new(xs, ys, velocity, gradient)?;
        if grid.x.count() != 2 * nx {
            log::warn!(
                "repeated field detected {} samples per row instead of {}; \
                 the shifted copy reproduces the leading x value",
                grid.x.count(),
                2 * nx
            );
        }
        *self = grid;
        Ok(())
    }
}

/// A volumetric grid with fields sampled at every node.
#[derive(Debug, Clone)]
pub struct Grid3 {
    x: Axis,
    y: Axis,
    z: Axis,
    xs: Vec<f64>,
    ys: Vec<f64>,
    zs: Vec<f64>,
    velocity: FlatField<3>,
    gradient: FlatField<3>,
}

impl Grid3 {
    /// Build a grid from flattened coordinate traces and fields.
    ///
    /// X count: first repeat of `xs[0]`. Y count: first repeat of `ys[0]` visiting every
    /// `nx`-th sample. Z count: what remains.
    pub fn new(
        mut xs: Vec<f64>,
        mut ys: Vec<f64>,
        mut zs: Vec<f64>,
        velocity: FlatField<3>,
        gradient: FlatField<3>,
    ) -> Result<Self> {
        let len = xs.len();
        if len == 0 {
            return Err(Error::Config("grid has no samples".into()));
        }
        if ys.len() != len || zs.len() != len || velocity.len() != len || gradient.len() != len
        {
            return Err(Error::Config(format!(
                "grid traces differ in length: x={}, y={}, z={}, velocity={}, gradient={}",
                len,
                ys.len(),
                zs.len(),
                velocity.len(),
                gradient.len()
            )));
        }
        zero_nan(&mut xs);
        zero_nan(&mut ys);
        zero_nan(&mut zs);

        let nx = quiver_length(&xs);
        if nx == 0 {
            return Err(Error::Config(
                "x trace never repeats its first value; cannot detect the row length".into(),
            ));
        }
        let ny = strided_quiver_length(&ys, nx);
        let layer = nx * ny;
        if ny == 0 || len % layer != 0 {
            return Err(Error::Config(format!(
                "{len} samples do not split into layers of {nx} x {ny}"
            )));
        }
        let nz = len / layer;
        ensure_ascending(xs.iter().take(nx), "x")?;
        ensure_ascending(ys.iter().step_by(nx).take(ny), "y")?;
        ensure_ascending(zs.iter().step_by(layer), "z")?;

        let x = Axis::from_trace(&xs, nx, 1)?;
        let y = Axis::from_trace(&ys, ny, nx)?;
        let z = Axis::from_trace(&zs, nz, layer)?;
        log::debug!("grid 3D: {nx} x {ny} x {nz} samples");
        Ok(Self {
            x,
            y,
            z,
            xs,
            ys,
            zs,
            velocity,
            gradient,
        })
    }

    /// A uniform grid with `n[0] * n[1] * n[2]` nodes and zero fields.
    pub fn uniform(n: [usize; 3], ranges: [[f64; 2]; 3]) -> Result<Self> {
        let mut xs = Vec::new();
        let mut ys = Vec::new();
        let mut zs = Vec::new();
        for k in 0..n[2] {
            for j in 0..n[1] {
                for i in 0..n[0] {
                    xs.push(node(ranges[0], n[0], i));
                    ys.push(node(ranges[1], n[1], j));
                    zs.push(node(ranges[2], n[2], k));
                }
            }
        }
        let len = xs.len();
        Self::new(xs, ys, zs, FlatField::zeros(len), FlatField::zeros(len))
    }

    /// Replace the velocity field; the length must match the grid.
    pub fn with_velocity(mut self, velocity: FlatField<3>) -> Result<Self> {
        check_len(velocity.len(), self.len(), "velocity")?;
        self.velocity = velocity;
        Ok(self)
    }

    pub fn scale_velocity(&mut self, factors: [f64; 3]) {
        self.velocity.scale(factors);
    }

    #[inline]
    pub fn x_axis(&self) -> &Axis {
        &self.x
    }

    #[inline]
    pub fn y_axis(&self) -> &Axis {
        &self.y
    }

    #[inline]
    pub fn z_axis(&self) -> &Axis {
        &self.z
    }

    #[inline]
    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    #[inline]
    pub fn ys(&self) -> &[f64] {
        &self.ys
    }

    #[inline]
    pub fn zs(&self) -> &[f64] {
        &self.zs
    }

    #[inline]
    pub fn velocity(&self) -> &FlatField<3> {
        &self.velocity
    }

    #[inline]
    pub fn gradient(&self) -> &FlatField<3> {
        &self.gradient
    }

    #[inline]
    pub fn field(&self, kind: FieldKind) -> &FlatField<3> {
        match kind {
            FieldKind::Velocity => &self.velocity,
            FieldKind::GradientSquared => &self.gradient,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.xs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    #[inline]
    pub fn flat_index(&self, i: usize, j: usize, k: usize) -> usize {
        i + j * self.x.count() + k * self.x.count() * self.y.count()
    }
}

// ============ Utility helpers ============

fn ensure_ascending<'a>(values: impl Iterator<Item = &'a f64>, name: &str) -> Result<()> {
    let mut prev = f64::NEG_INFINITY;
    for &v in values {
        if v < prev {
            return Err(Error::Config(format!(
                "{name} coordinates must be ascending ({v} follows {prev})"
            )));
        }
        prev = v;
    }
    Ok(())
}

fn check_len(found: usize, expected: usize, what: &str) -> Result<()> {
    if found != expected {
        return Err(Error::Config(format!(
            "{what} field has {found} samples, grid has {expected}"
        )));
    }
    Ok(())
}

fn double_rows<T: Copy>(trace: &[T], row: usize) -> Vec<T> {
    trace
        .chunks(row)
        .flat_map(|r| r.iter().chain(r.iter()).copied())
        .collect()
}

#[inline]
fn node(range: [f64; 2], n: usize, i: usize) -> f64 {
    range[0] + (range[1] - range[0]) * i as f64 / (n.max(2) - 1) as f64
}

fn uniform_traces(
    nx: usize,
    ny: usize,
    x_range: [f64; 2],
    y_range: [f64; 2],
) -> (Vec<f64>, Vec<f64>) {
    let mut xs = Vec::with_capacity(nx * ny);
    let mut ys = Vec::with_capacity(nx * ny);
    for j in 0..ny {
        for i in 0..nx {
            xs.push(node(x_range, nx, i));
            ys.push(node(y_range, ny, j));
        }
    }
    (xs, ys)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_row_length_and_axes() -> Result<()> {
        let grid = Grid2::uniform(4, 3, [0.0, 3.0], [-1.0, 1.0])?;
        assert_eq!(grid.x_axis().count(), 4);
        assert_eq!(grid.y_axis().count(), 3);
        assert_eq!(grid.x_axis().spacing(), 1.0);
        assert_eq!(grid.y_axis().spacing(), 1.0);
        assert_eq!(grid.y_axis().min(), -1.0);
        assert_eq!(grid.flat_index(2, 1), 6);
        assert_eq!(grid.xs()[6], 2.0);
        assert_eq!(grid.ys()[6], 0.0);
        Ok(())
    }

    #[test]
    fn rejects_traces_without_repeat() {
        let xs = vec![0.0, 1.0, 2.0];
        let ys = vec![0.0, 0.0, 0.0];
        let err = Grid2::new(xs, ys, FlatField::zeros(3), FlatField::zeros(3)).unwrap_err();
        assert!(err.to_string().contains("never repeats"));
    }

    #[test]
    fn rejects_descending_rows() {
        let xs = vec![1.0, 0.0, 1.0, 0.0];
        let ys = vec![0.0, 0.0, 1.0, 1.0];
        // first value repeats at index 2, but the row descends
        let err = Grid2::new(xs, ys, FlatField::zeros(4), FlatField::zeros(4)).unwrap_err();
        assert!(err.to_string().contains("ascending"));
    }

    #[test]
    fn rejects_mismatched_fields() -> Result<()> {
        let grid = Grid2::uniform(2, 2, [0.0, 1.0], [0.0, 1.0])?;
        assert!(grid.with_velocity(FlatField::zeros(3)).is_err());
        Ok(())
    }

    #[test]
    fn repeat_x_doubles_rows_and_keeps_flatten_order() -> Result<()> {
        // 3 x 2 grid over x in [0, 2]; u marks the column index, v the row index.
        let grid = Grid2::uniform(3, 2, [0.0, 2.0], [0.0, 1.0])?;
        let u: Vec<f64> = (0..6).map(|n| (n % 3) as f64).collect();
        let v: Vec<f64> = (0..6).map(|n| (n / 3) as f64).collect();
        let mut grid = grid.with_velocity(FlatField::from_components([&u, &v])?)?;
        grid.repeat_x()?;

        assert_eq!(grid.x_axis().count(), 6);
        assert_eq!(grid.y_axis().count(), 2);
        assert_eq!(grid.x_axis().max(), 4.0);
        assert_eq!(&grid.xs()[..6], &[0.0, 1.0, 2.0, 2.0, 3.0, 4.0]);
        assert_eq!(grid.velocity().component(0), vec![0., 1., 2., 0., 1., 2., 0., 1., 2., 0., 1., 2.]);
        assert_eq!(grid.velocity().component(1), vec![0., 0., 0., 0., 0., 0., 1., 1., 1., 1., 1., 1.]);
        Ok(())
    }

    #[test]
    fn grid3_counts_and_index() -> Result<()> {
        let grid = Grid3::uniform([3, 2, 4], [[0.0, 2.0], [0.0, 1.0], [0.0, 3.0]])?;
        assert_eq!(grid.x_axis().count(), 3);
        assert_eq!(grid.y_axis().count(), 2);
        assert_eq!(grid.z_axis().count(), 4);
        assert_eq!(grid.z_axis().spacing(), 1.0);
        let idx = grid.flat_index(1, 1, 2);
        assert_eq!(idx, 1 + 3 + 12);
        assert_eq!((grid.xs()[idx], grid.ys()[idx], grid.zs()[idx]), (1.0, 1.0, 2.0));
        Ok(())
    }
}

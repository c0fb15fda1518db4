use crate::error::{Error, Result};

/// One dimension of the regular sampling grid.
///
/// Fields:
/// - `min`, `max`: extrema of the coordinate trace
/// - `count`: number of samples along this axis (>= 2)
/// - `spacing`: distance between the first two distinct samples along this axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Axis {
    min: f64,
    max: f64,
    count: usize,
    spacing: f64,
}

impl Axis {
    /// Create an axis after validating invariants.
    ///
    /// Errors:
    /// - `Error::Config` if `count < 2`, `max <= min`, or any value is NaN/inf.
    pub fn new(min: f64, max: f64, count: usize, spacing: f64) -> Result<Self> {
        if count < 2 {
            return Err(Error::Config(format!(
                "an axis needs at least 2 samples, found {count}"
            )));
        }
        if !min.is_finite() || !max.is_finite() || !spacing.is_finite() {
            return Err(Error::Config("axis bounds must be finite".into()));
        }
        if max <= min {
            return Err(Error::Config(format!(
                "axis maximum {max} must exceed its minimum {min}"
            )));
        }
        Ok(Self {
            min,
            max,
            count,
            spacing,
        })
    }

    /// Derive an axis from a flattened coordinate trace.
    ///
    /// `stride` is the flat distance between neighbouring samples along this axis
    /// (1 for the fast X axis, `count_x` for Y, `count_x * count_y` for Z).
    pub fn from_trace(trace: &[f64], count: usize, stride: usize) -> Result<Self> {
        if stride == 0 || trace.len() <= stride {
            return Err(Error::Config(format!(
                "coordinate trace of length {} is too short for stride {stride}",
                trace.len()
            )));
        }
        let min = trace.iter().copied().fold(f64::INFINITY, f64::min);
        let max = trace.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let spacing = (trace[stride] - trace[0]).abs();
        Self::new(min, max, count, spacing)
    }

    #[inline]
    pub fn min(&self) -> f64 {
        self.min
    }

    #[inline]
    pub fn max(&self) -> f64 {
        self.max
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    /// Extent of the axis, `max - min`.
    #[inline]
    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    /// Map a coordinate to its fractional sample index, `(count - 1)(v - min)/(max - min)`.
    #[inline]
    pub fn fractional_index(&self, value: f64) -> f64 {
        (self.count - 1) as f64 * (value - self.min) / (self.max - self.min)
    }
}

/// Number of samples along the fast-varying axis of a flattened trace.
///
/// Scans forward from the second sample until the first value equal to `trace[0]`;
/// the index of that repeat is the count. Returns 0 when the first value never repeats.
pub fn quiver_length(trace: &[f64]) -> usize {
    let Some(&first) = trace.first() else {
        return 0;
    };
    trace
        .iter()
        .skip(1)
        .position(|&v| v == first)
        .map_or(0, |p| p + 1)
}

/// Like [`quiver_length`] but only visits every `stride`-th sample, returning the
/// repeat position in units of `stride`. Falls back to `trace.len() / stride` when
/// the first value never repeats (a single layer along the slower axes).
pub fn strided_quiver_length(trace: &[f64], stride: usize) -> usize {
    if stride == 0 {
        return 0;
    }
    let Some(&first) = trace.first() else {
        return 0;
    };
    trace
        .iter()
        .step_by(stride)
        .skip(1)
        .position(|&v| v == first)
        .map_or(trace.len() / stride, |p| p + 1)
}

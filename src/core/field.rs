use crate::error::{Error, Result};

/// A quantity sampled on the regular grid, stored in row-major flattened order
/// with the first axis varying fastest: `index = i + j*nx [+ k*nx*ny]`.
///
/// Each sample is an `N`-component value (`N = 1` for scalars). Undefined samples
/// (NaN in the source data) are stored as zero; a zero velocity marks an obstruction
/// for presentation, the interpolators treat it as an ordinary sample.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatField<const N: usize> {
    samples: Vec<[f64; N]>,
}

/// A scalar field.
pub type ScalarField = FlatField<1>;

impl<const N: usize> FlatField<N> {
    /// Build from already interleaved samples, zeroing NaN components.
    pub fn from_samples(mut samples: Vec<[f64; N]>) -> Self {
        let replaced: usize = samples
            .iter_mut()
            .map(|s| zero_nan(s.as_mut_slice()))
            .sum();
        if replaced > 0 {
            log::warn!("replaced {replaced} undefined field samples with zero");
        }
        Self { samples }
    }

    /// Build from one trace per component. All traces must share a length.
    pub fn from_components(components: [&[f64]; N]) -> Result<Self> {
        let len = components.first().map_or(0, |c| c.len());
        if let Some(bad) = components.iter().find(|c| c.len() != len) {
            return Err(Error::Config(format!(
                "field components differ in length ({} vs {len})",
                bad.len()
            )));
        }
        let samples = (0..len)
            .map(|idx| {
                let mut s = [0.0; N];
                for (sk, c) in s.iter_mut().zip(&components) {
                    *sk = c[idx];
                }
                s
            })
            .collect();
        Ok(Self::from_samples(samples))
    }

    /// An all-zero field of `len` samples.
    pub fn zeros(len: usize) -> Self {
        Self {
            samples: vec![[0.0; N]; len],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&[f64; N]> {
        self.samples.get(index)
    }

    #[inline]
    pub fn as_slice(&self) -> &[[f64; N]] {
        &self.samples
    }

    /// Copy out component `k` as its own trace.
    pub fn component(&self, k: usize) -> Vec<f64> {
        self.samples.iter().map(|s| s[k]).collect()
    }

    /// Multiply every sample component-wise by `factors`.
    pub fn scale(&mut self, factors: [f64; N]) {
        for s in &mut self.samples {
            for (sk, f) in s.iter_mut().zip(factors) {
                *sk *= f;
            }
        }
    }
}

/// Replace NaN entries with zero, returning how many were replaced.
pub(crate) fn zero_nan(values: &mut [f64]) -> usize {
    let mut n = 0;
    for v in values.iter_mut().filter(|v| v.is_nan()) {
        *v = 0.0;
        n += 1;
    }
    n
}

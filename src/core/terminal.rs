//! Component-wise velocity cap derived from the drag/dielectrophoresis force balance.
//!
//! This is a physical sanity bound, not an error condition: a velocity component
//! above its terminal value is simply lowered to it.

use crate::core::medium::FluidMedium;
use crate::core::vector::{self, Vector};

/// Terminal velocity of a sphere dragged by the fluid and pushed by dielectrophoresis:
///
/// `v_t = K eps_r eps_0 r^2 grad|E|^2 / (3 mu) + u`
pub fn terminal_velocity<const D: usize>(
    dep_factor: f64,
    radius: f64,
    fluid: &FluidMedium,
    vacuum_permittivity: f64,
    gradient: &Vector<D>,
    fluid_velocity: &Vector<D>,
) -> Vector<D> {
    let k = dep_factor * fluid.relative_permittivity * vacuum_permittivity * radius * radius
        / (3.0 * fluid.viscosity);
    vector::axpy(fluid_velocity, gradient, k)
}

/// Lower every component of `velocity` that exceeds `terminal`.
#[inline]
pub fn limit_velocity<const D: usize>(velocity: &Vector<D>, terminal: &Vector<D>) -> Vector<D> {
    let mut out = *velocity;
    for (v, &t) in out.iter_mut().zip(terminal) {
        if *v > t {
            *v = t;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn terminal_velocity_without_field_is_fluid_velocity() {
        let fluid = FluidMedium::default();
        let vt = terminal_velocity(1.0, 1e-6, &fluid, 8.85e-12, &[0.0, 0.0], &[0.3, -0.1]);
        assert_eq!(vt, [0.3, -0.1]);
    }

    #[test]
    fn terminal_velocity_formula() {
        let fluid = FluidMedium {
            viscosity: 1e-3,
            relative_permittivity: 80.0,
            ..FluidMedium::default()
        };
        let vt = terminal_velocity(0.5, 2e-6, &fluid, 8.85e-12, &[1e12, 0.0], &[0.0, 0.0]);
        let want = 0.5 * 80.0 * 8.85e-12 * 4e-12 * 1e12 / 3e-3;
        assert!((vt[0] - want).abs() < 1e-12 * want);
        assert_eq!(vt[1], 0.0);
    }

    #[test]
    fn limit_only_lowers_components() {
        let got = limit_velocity(&[2.0, -1.0, 0.5], &[1.0, 0.0, 0.5]);
        assert_eq!(got, [1.0, -1.0, 0.5]);
    }

    #[test]
    fn limited_velocity_never_exceeds_terminal() {
        let mut rng = StdRng::seed_from_u64(2024);
        for _ in 0..1000 {
            let v: [f64; 2] = [rng.random_range(-5.0..5.0), rng.random_range(-5.0..5.0)];
            let t: [f64; 2] = [rng.random_range(-5.0..5.0), rng.random_range(-5.0..5.0)];
            let out = limit_velocity(&v, &t);
            for k in 0..2 {
                assert!(out[k] <= t[k]);
                assert!(out[k] == v[k] || out[k] == t[k]);
            }
        }
    }
}

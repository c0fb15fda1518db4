use std::f64::consts::PI;

use crate::core::medium::PhysicalConstants;
use crate::core::vector::{self, Vector};

/// Which force terms contribute to the total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ForceToggles {
    pub gravitational: bool,
    pub stokes: bool,
    pub buoyant: bool,
    pub dielectrophoretic: bool,
}

impl ForceToggles {
    /// Every term active.
    pub fn all() -> Self {
        Self {
            gravitational: true,
            stokes: true,
            buoyant: true,
            dielectrophoretic: true,
        }
    }

    /// Only Stokes drag active.
    pub fn stokes_only() -> Self {
        Self {
            stokes: true,
            ..Self::default()
        }
    }
}

/// Everything the force terms read for one particle at one point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceSample<const D: usize> {
    pub mass: f64,
    pub radius: f64,
    /// Clausius-Mossotti factor of the particle.
    pub cm_factor: f64,
    pub fluid_density: f64,
    pub viscosity: f64,
    pub relative_permittivity: f64,
    /// Local fluid velocity minus particle velocity.
    pub relative_velocity: Vector<D>,
    /// Local grad |E|^2.
    pub gradient: Vector<D>,
}

/// Force terms acting on a spherical particle (SI units). Each term returns zero
/// when its toggle is off.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceModel<const D: usize> {
    pub constants: PhysicalConstants<D>,
    pub toggles: ForceToggles,
}

impl<const D: usize> ForceModel<D> {
    pub fn new(constants: PhysicalConstants<D>, toggles: ForceToggles) -> Self {
        Self { constants, toggles }
    }

    /// `F = g m`
    pub fn gravitational(&self, mass: f64) -> Vector<D> {
        if !self.toggles.gravitational {
            return [0.0; D];
        }
        vector::scale(&self.constants.gravity, mass)
    }

    /// `F = 6 pi mu r (u - v)`
    pub fn stokes(&self, radius: f64, viscosity: f64, relative_velocity: &Vector<D>) -> Vector<D> {
        if !self.toggles.stokes {
            return [0.0; D];
        }
        vector::scale(relative_velocity, 6.0 * PI * viscosity * radius)
    }

    /// `F = -g (4/3) pi r^3 rho` for a sphere displacing fluid of density `rho`.
    pub fn buoyant(&self, radius: f64, density: f64) -> Vector<D> {
        if !self.toggles.buoyant {
            return [0.0; D];
        }
        let displaced = 4.0 / 3.0 * PI * radius.powi(3) * density;
        vector::scale(&self.constants.gravity, -displaced)
    }

    /// `F = 2 pi K eps_r eps_0 r^3 grad|E|^2`
    pub fn dielectrophoretic(
        &self,
        cm_factor: f64,
        relative_permittivity: f64,
        radius: f64,
        gradient: &Vector<D>,
    ) -> Vector<D> {
        if !self.toggles.dielectrophoretic {
            return [0.0; D];
        }
        let k = 2.0
            * PI
            * cm_factor
            * relative_permittivity
            * self.constants.vacuum_permittivity
            * radius.powi(3);
        vector::scale(gradient, k)
    }

    /// Sum of the active terms.
    pub fn total(&self, s: &ForceSample<D>) -> Vector<D> {
        let mut f = self.gravitational(s.mass);
        f = vector::add(&f, &self.stokes(s.radius, s.viscosity, &s.relative_velocity));
        f = vector::add(&f, &self.buoyant(s.radius, s.fluid_density));
        vector::add(
            &f,
            &self.dielectrophoretic(s.cm_factor, s.relative_permittivity, s.radius, &s.gradient),
        )
    }

    /// `total / mass`
    pub fn acceleration(&self, s: &ForceSample<D>) -> Vector<D> {
        vector::scale(&self.total(s), 1.0 / s.mass)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ForceSample<2> {
        ForceSample {
            mass: 2.0e-12,
            radius: 2.0e-6,
            cm_factor: 0.5,
            fluid_density: 1000.0,
            viscosity: 1.0e-3,
            relative_permittivity: 81.0,
            relative_velocity: [1.0, 0.0],
            gradient: [3.0e10, -1.0e10],
        }
    }

    #[test]
    fn stokes_only_matches_drag_formula() {
        let model = ForceModel::new(PhysicalConstants::default(), ForceToggles::stokes_only());
        let s = sample();
        let f = model.total(&s);
        let want = 6.0 * PI * 1e-3 * 2e-6 * 1.0;
        assert!((f[0] - want).abs() < 1e-24);
        assert_eq!(f[1], 0.0);
        assert_eq!(model.gravitational(s.mass), [0.0, 0.0]);
        assert_eq!(model.buoyant(s.radius, s.fluid_density), [0.0, 0.0]);
        assert_eq!(
            model.dielectrophoretic(s.cm_factor, s.relative_permittivity, s.radius, &s.gradient),
            [0.0, 0.0]
        );
    }

    #[test]
    fn disabled_terms_contribute_nothing() {
        let model = ForceModel::new(PhysicalConstants::default(), ForceToggles::default());
        assert_eq!(model.total(&sample()), [0.0, 0.0]);
    }

    #[test]
    fn all_terms_superpose() {
        let model = ForceModel::new(PhysicalConstants::default(), ForceToggles::all());
        let s = sample();
        let parts = [
            model.gravitational(s.mass),
            model.stokes(s.radius, s.viscosity, &s.relative_velocity),
            model.buoyant(s.radius, s.fluid_density),
            model.dielectrophoretic(s.cm_factor, s.relative_permittivity, s.radius, &s.gradient),
        ];
        let total = model.total(&s);
        for k in 0..2 {
            let sum: f64 = parts.iter().map(|p| p[k]).sum();
            assert!((total[k] - sum).abs() <= 1e-12 * sum.abs().max(1e-30));
        }
    }

    #[test]
    fn buoyancy_opposes_gravity() {
        let model = ForceModel::new(PhysicalConstants::<2>::default(), ForceToggles::all());
        let fb = model.buoyant(1.0e-3, 1000.0);
        let fg = model.gravitational(1.0);
        assert!(fb[1] > 0.0);
        assert!(fg[1] < 0.0);
        let want = 9.8 * 4.0 / 3.0 * PI * 1e-9 * 1000.0;
        assert!((fb[1] - want).abs() < 1e-15);
    }

    #[test]
    fn dep_force_scales_with_radius_cubed() {
        let model = ForceModel::new(PhysicalConstants::<2>::default(), ForceToggles::all());
        let g = [1.0, 0.0];
        let f1 = model.dielectrophoretic(1.0, 81.0, 1.0e-6, &g);
        let f2 = model.dielectrophoretic(1.0, 81.0, 2.0e-6, &g);
        assert!((f2[0] / f1[0] - 8.0).abs() < 1e-9);
        let want = 2.0 * PI * 81.0 * 8.85e-12 * 1e-18;
        assert!((f1[0] - want).abs() < 1e-40);
    }
}

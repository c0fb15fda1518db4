//! Second-order Runge-Kutta (midpoint) steppers.
//!
//! All three variants share one skeleton per timestep:
//!
//! 1. sample the fields at the current position, cap the velocity at the terminal
//!    velocity and evaluate the acceleration;
//! 2. predict the midpoint `v_mid = v + a dt/2`, `x_mid = x + v dt/2`;
//! 3. sample again at `x_mid`, cap `v_mid` and evaluate the midpoint acceleration;
//! 4. commit `v = v_mid + a_mid dt`, `x = x + v_mid dt`.
//!
//! The planar steppers boundary-check every position before it is used for a lookup.
//! The volumetric stepper applies no boundary handling; leaving the grid is reported
//! as `Error::OutOfBounds`.

use crate::core::boundary::BoundaryConditions;
use crate::core::forces::ForceModel;
use crate::core::grid::{FieldKind, Grid2, Grid3};
use crate::core::interp::{Bilinear, Trilinear};
use crate::core::medium::FluidMedium;
use crate::core::particle::{Body, Particle, Tracker};
use crate::core::terminal::{limit_velocity, terminal_velocity};
use crate::core::vector::{self, Vector};
use crate::error::Result;

/// One integration variant. Chosen when the run is configured, never switched
/// inside the time loop.
pub trait Integrator: Sync {
    type Body: Body;

    /// Fixed timestep.
    fn dt(&self) -> f64;

    /// Advance `body` by one timestep.
    fn advance(&self, body: &mut Self::Body) -> Result<()>;
}

/// Passive tracer: velocity interpolation only.
#[derive(Debug, Clone, Copy)]
pub struct TrackerIntegrator<'a> {
    grid: &'a Grid2,
    boundary: BoundaryConditions,
    dt: f64,
}

impl<'a> TrackerIntegrator<'a> {
    pub fn new(grid: &'a Grid2, boundary: BoundaryConditions, dt: f64) -> Self {
        Self { grid, boundary, dt }
    }

    /// The position one step ahead of `position`.
    pub fn step(&self, position: Vector<2>) -> Result<Vector<2>> {
        let interp = Bilinear::new(self.grid);
        let dt = self.dt;

        let x = self.boundary.apply(position, self.grid).point;
        let u = interp.at(&x, FieldKind::Velocity)?;

        let x_mid = self.boundary.apply(vector::axpy(&x, &u, dt / 2.0), self.grid).point;
        let u_mid = interp.at(&x_mid, FieldKind::Velocity)?;

        Ok(self.boundary.apply(vector::axpy(&x, &u_mid, dt), self.grid).point)
    }
}

impl Integrator for TrackerIntegrator<'_> {
    type Body = Tracker;

    fn dt(&self) -> f64 {
        self.dt
    }

    fn advance(&self, tracker: &mut Tracker) -> Result<()> {
        tracker.position = self.step(tracker.position)?;
        Ok(())
    }
}

/// Fields sampled at one planar point.
#[derive(Debug, Clone, Copy)]
struct Sample2 {
    velocity: Vector<2>,
    gradient: Vector<2>,
}

/// Planar particle under Stokes drag and dielectrophoresis.
#[derive(Debug, Clone, Copy)]
pub struct ParticleIntegrator2<'a> {
    grid: &'a Grid2,
    fluid: &'a FluidMedium,
    forces: &'a ForceModel<2>,
    boundary: BoundaryConditions,
    dt: f64,
}

impl<'a> ParticleIntegrator2<'a> {
    pub fn new(
        grid: &'a Grid2,
        fluid: &'a FluidMedium,
        forces: &'a ForceModel<2>,
        boundary: BoundaryConditions,
        dt: f64,
    ) -> Self {
        Self {
            grid,
            fluid,
            forces,
            boundary,
            dt,
        }
    }

    fn sample(&self, point: &Vector<2>) -> Result<Sample2> {
        let interp = Bilinear::new(self.grid);
        let cell = interp.locate(point)?;
        Ok(Sample2 {
            velocity: interp.interpolate(point, &cell, FieldKind::Velocity),
            gradient: interp.interpolate(point, &cell, FieldKind::GradientSquared),
        })
    }

    /// Cap `velocity` at the local terminal velocity.
    fn limit(&self, p: &Particle<2>, velocity: &Vector<2>, s: &Sample2) -> Vector<2> {
        let terminal = terminal_velocity(
            p.dep_factor,
            p.radius,
            self.fluid,
            self.forces.constants.vacuum_permittivity,
            &s.gradient,
            &s.velocity,
        );
        limit_velocity(velocity, &terminal)
    }

    /// Stokes drag plus dielectrophoresis over mass. Gravity and buoyancy never act
    /// on this variant.
    fn acceleration(&self, p: &Particle<2>, velocity: &Vector<2>, s: &Sample2) -> Vector<2> {
        let relative = vector::sub(&s.velocity, velocity);
        let drag = self.forces.stokes(p.radius, self.fluid.viscosity, &relative);
        let dep = self.forces.dielectrophoretic(
            p.dep_factor,
            self.fluid.relative_permittivity,
            p.radius,
            &s.gradient,
        );
        vector::scale(&vector::add(&drag, &dep), 1.0 / p.mass)
    }
}

impl Integrator for ParticleIntegrator2<'_> {
    type Body = Particle<2>;

    fn dt(&self) -> f64 {
        self.dt
    }

    fn advance(&self, p: &mut Particle<2>) -> Result<()> {
        let dt = self.dt;

        // stage 1
        let x = self.boundary.apply(p.position, self.grid).point;
        let s1 = self.sample(&x)?;
        let v = self.limit(p, &p.velocity, &s1);
        let a = self.acceleration(p, &v, &s1);

        // midpoint
        let v_mid = vector::axpy(&v, &a, dt / 2.0);
        let x_mid = self.boundary.apply(vector::axpy(&x, &v, dt / 2.0), self.grid).point;

        // stage 2
        let s2 = self.sample(&x_mid)?;
        let v_mid = self.limit(p, &v_mid, &s2);
        let a_mid = self.acceleration(p, &v_mid, &s2);

        // commit
        let checked = self.boundary.apply(vector::axpy(&x, &v_mid, dt), self.grid);
        if checked.wrapped_x {
            p.bump_wrap_count();
        }
        p.position = checked.point;
        p.velocity = vector::axpy(&v_mid, &a_mid, dt);
        p.acceleration = a_mid;
        Ok(())
    }
}

/// Volumetric particle under Stokes drag only, capped at the local fluid velocity.
///
/// Unlike the planar variants no boundary policy is applied.
#[derive(Debug, Clone, Copy)]
pub struct ParticleIntegrator3<'a> {
    grid: &'a Grid3,
    fluid: &'a FluidMedium,
    forces: &'a ForceModel<3>,
    dt: f64,
}

impl<'a> ParticleIntegrator3<'a> {
    pub fn new(grid: &'a Grid3, fluid: &'a FluidMedium, forces: &'a ForceModel<3>, dt: f64) -> Self {
        Self {
            grid,
            fluid,
            forces,
            dt,
        }
    }

    fn acceleration(&self, p: &Particle<3>, velocity: &Vector<3>, fluid_velocity: &Vector<3>) -> Vector<3> {
        let relative = vector::sub(fluid_velocity, velocity);
        let f = self.forces.stokes(p.radius, self.fluid.viscosity, &relative);
        vector::scale(&f, 1.0 / p.mass)
    }
}

impl Integrator for ParticleIntegrator3<'_> {
    type Body = Particle<3>;

    fn dt(&self) -> f64 {
        self.dt
    }

    fn advance(&self, p: &mut Particle<3>) -> Result<()> {
        let interp = Trilinear::new(self.grid);
        let dt = self.dt;
        let x = p.position;

        let u = interp.at(&x, FieldKind::Velocity)?;
        let v = limit_velocity(&p.velocity, &u);
        let a = self.acceleration(p, &v, &u);

        let v_mid = vector::axpy(&v, &a, dt / 2.0);
        let x_mid = vector::axpy(&x, &v, dt / 2.0);

        let u_mid = interp.at(&x_mid, FieldKind::Velocity)?;
        let v_mid = limit_velocity(&v_mid, &u_mid);
        let a_mid = self.acceleration(p, &v_mid, &u_mid);

        p.position = vector::axpy(&x, &v_mid, dt);
        p.velocity = vector::axpy(&v_mid, &a_mid, dt);
        p.acceleration = a_mid;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::boundary::BoundaryPolicy;
    use crate::core::field::FlatField;
    use crate::core::forces::ForceToggles;
    use crate::core::medium::PhysicalConstants;
    use crate::error::Error;

    fn uniform_flow(u: [f64; 2]) -> Result<Grid2> {
        let grid = Grid2::uniform(11, 6, [0.0, 10.0], [0.0, 5.0])?;
        let n = grid.len();
        grid.with_velocity(FlatField::from_samples(vec![u; n]))
    }

    fn wrap_x() -> BoundaryConditions {
        BoundaryConditions::new(BoundaryPolicy::Wrap, BoundaryPolicy::Clamp)
    }

    #[test]
    fn tracker_moves_with_uniform_flow() -> Result<()> {
        let grid = uniform_flow([0.5, -0.25])?;
        for dt in [0.01, 0.3, 2.0] {
            let stepper = TrackerIntegrator::new(&grid, wrap_x(), dt);
            let next = stepper.step([3.0, 4.0])?;
            assert!((next[0] - (3.0 + 0.5 * dt)).abs() < 1e-12);
            assert!((next[1] - (4.0 - 0.25 * dt)).abs() < 1e-12);
        }
        Ok(())
    }

    #[test]
    fn tracker_wraps_at_channel_end() -> Result<()> {
        let grid = uniform_flow([1.0, 0.0])?;
        let stepper = TrackerIntegrator::new(&grid, wrap_x(), 1.0);
        let next = stepper.step([9.8, 2.0])?;
        assert_eq!(next, [0.0, 2.0]);
        Ok(())
    }

    #[test]
    fn particle_in_quiescent_fluid_stays_at_rest() -> Result<()> {
        let grid = uniform_flow([0.0, 0.0])?;
        let fluid = FluidMedium::new("water", 1000.0, 1e-3, 81.0)?;
        let forces = ForceModel::new(PhysicalConstants::default(), ForceToggles::stokes_only());
        let stepper = ParticleIntegrator2::new(&grid, &fluid, &forces, wrap_x(), 1e-3);
        let mut p = Particle::new(0, [5.0, 2.5], 1e-6, 1e-15)?;
        for _ in 0..10 {
            stepper.advance(&mut p)?;
        }
        assert_eq!(p.position, [5.0, 2.5]);
        assert_eq!(p.velocity, [0.0, 0.0]);
        assert_eq!(p.acceleration, [0.0, 0.0]);
        Ok(())
    }

    #[test]
    fn planar_particle_ignores_body_forces() -> Result<()> {
        let grid = uniform_flow([0.0, 0.0])?;
        let fluid = FluidMedium::new("water", 1000.0, 1e-3, 81.0)?;
        let forces = ForceModel::new(PhysicalConstants::default(), ForceToggles::all());
        let stepper = ParticleIntegrator2::new(&grid, &fluid, &forces, wrap_x(), 1e-3);
        let mut p = Particle::new(0, [0.5, 0.5], 1e-6, 1e-12)?;
        stepper.advance(&mut p)?;
        assert_eq!(p.acceleration, [0.0, 0.0]);
        assert_eq!(p.velocity, [0.0, 0.0]);
        assert_eq!(p.position, [0.5, 0.5]);
        Ok(())
    }

    #[test]
    fn tracker_clamps_inside_negative_channel() -> Result<()> {
        let grid = Grid2::uniform(3, 3, [0.0, 2.0], [-2.0, -1.0])?;
        let n = grid.len();
        let grid = grid.with_velocity(FlatField::from_samples(vec![[0.0, 1.0]; n]))?;
        let stepper = TrackerIntegrator::new(&grid, BoundaryConditions::default(), 1.0);
        let mut x = [1.0, -1.5];
        for _ in 0..3 {
            x = stepper.step(x)?;
            assert!(x[1] < -1.0 && x[1] > -1.0 - 1e-4, "y = {}", x[1]);
        }
        Ok(())
    }

    #[test]
    fn fast_particle_is_capped_at_fluid_velocity() -> Result<()> {
        let grid = uniform_flow([1.0, 0.0])?;
        let fluid = FluidMedium::new("water", 1000.0, 1e-3, 81.0)?;
        let forces = ForceModel::new(PhysicalConstants::default(), ForceToggles::stokes_only());
        let stepper = ParticleIntegrator2::new(&grid, &fluid, &forces, wrap_x(), 0.1);
        let mut p = Particle::new(0, [1.0, 2.0], 1e-6, 1e-12)?.with_velocity([5.0, 0.0])?;
        stepper.advance(&mut p)?;
        // capped to the fluid velocity, so drag vanishes and the particle is carried along
        assert!((p.velocity[0] - 1.0).abs() < 1e-12);
        assert!((p.position[0] - 1.1).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn particle_wrap_is_counted() -> Result<()> {
        let grid = uniform_flow([1.0, 0.0])?;
        let fluid = FluidMedium::new("water", 1000.0, 1e-3, 81.0)?;
        let forces = ForceModel::new(PhysicalConstants::default(), ForceToggles::stokes_only());
        let stepper = ParticleIntegrator2::new(&grid, &fluid, &forces, wrap_x(), 0.5);
        let mut p = Particle::new(0, [9.9, 2.0], 1e-6, 1e-12)?.with_velocity([1.0, 0.0])?;
        stepper.advance(&mut p)?;
        assert_eq!(p.position[0], 0.0);
        assert_eq!(p.wrap_count, 1);
        Ok(())
    }

    #[test]
    fn clamp_policy_does_not_count() -> Result<()> {
        let grid = uniform_flow([1.0, 0.0])?;
        let fluid = FluidMedium::new("water", 1000.0, 1e-3, 81.0)?;
        let forces = ForceModel::new(PhysicalConstants::default(), ForceToggles::stokes_only());
        let stepper = ParticleIntegrator2::new(&grid, &fluid, &forces, BoundaryConditions::default(), 0.5);
        let mut p = Particle::new(0, [9.9, 2.0], 1e-6, 1e-12)?.with_velocity([1.0, 0.0])?;
        stepper.advance(&mut p)?;
        assert!(p.position[0] < 10.0);
        assert!(p.position[0] > 9.99);
        assert_eq!(p.wrap_count, 0);
        Ok(())
    }

    #[test]
    fn volumetric_particle_follows_flow_and_reports_exit() -> Result<()> {
        let grid = Grid3::uniform([5, 3, 3], [[0.0, 4.0], [0.0, 2.0], [0.0, 2.0]])?;
        let n = grid.len();
        let grid = grid.with_velocity(FlatField::from_samples(vec![[1.0, 0.0, 0.0]; n]))?;
        let fluid = FluidMedium::new("water", 1000.0, 1e-3, 81.0)?;
        let forces = ForceModel::new(PhysicalConstants::<3>::default(), ForceToggles::stokes_only());
        let stepper = ParticleIntegrator3::new(&grid, &fluid, &forces, 1.0);
        let mut p = Particle::new(0, [0.5, 1.0, 1.0], 1e-6, 1e-12)?.with_velocity([1.0, 0.0, 0.0])?;
        for _ in 0..3 {
            stepper.advance(&mut p)?;
        }
        assert!((p.position[0] - 3.5).abs() < 1e-12);
        stepper.advance(&mut p)?;
        // now at x = 4.5: nothing wraps or clamps on this path
        assert!((p.position[0] - 4.5).abs() < 1e-12);
        let err = stepper.advance(&mut p).unwrap_err();
        assert!(matches!(err, Error::OutOfBounds(_)));
        Ok(())
    }
}

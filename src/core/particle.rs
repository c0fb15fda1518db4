use crate::core::vector::{self, Vector};
use crate::error::{Error, Result};

/// Append-only record of a body's state, one entry per completed timestep.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History<const D: usize> {
    pub positions: Vec<Vector<D>>,
    pub velocities: Vec<Vector<D>>,
    pub accelerations: Vec<Vector<D>>,
}

impl<const D: usize> History<D> {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    fn reserve(&mut self, steps: usize) {
        self.positions.reserve(steps);
        self.velocities.reserve(steps);
        self.accelerations.reserve(steps);
    }
}

/// Anything the simulation loop can advance and record.
pub trait Body: Send {
    /// Append the current state to the trajectory history.
    fn record(&mut self);
    /// Pre-allocate history for `steps` more entries.
    fn reserve_history(&mut self, _steps: usize) {}
}

/// A spherical particle with mass, in D dimensions (SI units).
///
/// Fields:
/// - `dep_factor`: Clausius-Mossotti factor (typically in [-0.5, 1.0]), already scaled
///   by the electrode voltage factor
/// - `wrap_count`: number of periodic re-entries along X
#[derive(Debug, Clone, PartialEq)]
pub struct Particle<const D: usize> {
    pub id: u32,
    pub position: Vector<D>,
    pub velocity: Vector<D>,
    pub acceleration: Vector<D>,
    /// Mass (> 0).
    pub mass: f64,
    /// Radius (> 0).
    pub radius: f64,
    /// Particle material density.
    pub density: f64,
    pub dep_factor: f64,
    pub wrap_count: u32,
    pub history: History<D>,
}

impl<const D: usize> Particle<D> {
    /// Create a new particle at rest after validating invariants.
    ///
    /// Errors:
    /// - `Error::InvalidParam` if `radius` or `mass` is non-positive or any component is NaN/inf.
    pub fn new(id: u32, position: Vector<D>, radius: f64, mass: f64) -> Result<Self> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(Error::InvalidParam("radius must be finite and > 0".into()));
        }
        if !mass.is_finite() || mass <= 0.0 {
            return Err(Error::InvalidParam("mass must be finite and > 0".into()));
        }
        if !vector::is_finite(&position) {
            return Err(Error::InvalidParam("position must be finite".into()));
        }
        Ok(Self {
            id,
            position,
            velocity: [0.0; D],
            acceleration: [0.0; D],
            mass,
            radius,
            density: 1.0,
            dep_factor: 1.0,
            wrap_count: 0,
            history: History::default(),
        })
    }

    /// Set the initial velocity (validated as finite).
    pub fn with_velocity(mut self, velocity: Vector<D>) -> Result<Self> {
        if !vector::is_finite(&velocity) {
            return Err(Error::InvalidParam("velocity must be finite".into()));
        }
        self.velocity = velocity;
        Ok(self)
    }

    /// Set the initial acceleration (validated as finite).
    pub fn with_acceleration(mut self, acceleration: Vector<D>) -> Result<Self> {
        if !vector::is_finite(&acceleration) {
            return Err(Error::InvalidParam("acceleration must be finite".into()));
        }
        self.acceleration = acceleration;
        Ok(self)
    }

    pub fn with_density(mut self, density: f64) -> Self {
        self.density = density;
        self
    }

    pub fn with_dep_factor(mut self, dep_factor: f64) -> Self {
        self.dep_factor = dep_factor;
        self
    }

    /// Increment the X wrap counter.
    #[inline]
    pub fn bump_wrap_count(&mut self) {
        self.wrap_count = self.wrap_count.saturating_add(1);
    }
}

impl<const D: usize> Body for Particle<D> {
    fn record(&mut self) {
        self.history.positions.push(self.position);
        self.history.velocities.push(self.velocity);
        self.history.accelerations.push(self.acceleration);
    }

    fn reserve_history(&mut self, steps: usize) {
        self.history.reserve(steps);
    }
}

/// A massless passive tracer following streamlines of the planar velocity field.
#[derive(Debug, Clone, PartialEq)]
pub struct Tracker {
    pub id: u32,
    pub position: Vector<2>,
    pub positions: Vec<Vector<2>>,
}

impl Tracker {
    pub fn new(id: u32, position: Vector<2>) -> Result<Self> {
        if !vector::is_finite(&position) {
            return Err(Error::InvalidParam("position must be finite".into()));
        }
        Ok(Self {
            id,
            position,
            positions: Vec::new(),
        })
    }
}

impl Body for Tracker {
    fn record(&mut self) {
        self.positions.push(self.position);
    }

    fn reserve_history(&mut self, steps: usize) {
        self.positions.reserve(steps);
    }
}

//! Numerical kernel: grids and fields, boundary handling, interpolation, the force
//! model and the midpoint integrators driven by the time loop.

pub mod axis;
pub mod boundary;
pub mod field;
pub mod forces;
pub mod grid;
pub mod integrator;
pub mod interp;
pub mod medium;
pub mod particle;
pub mod sim;
pub mod terminal;
pub mod vector;

pub use axis::Axis;
pub use boundary::{BoundaryConditions, BoundaryPolicy};
pub use field::{FlatField, ScalarField};
pub use forces::{ForceModel, ForceSample, ForceToggles};
pub use grid::{FieldKind, Grid2, Grid3};
pub use integrator::{Integrator, ParticleIntegrator2, ParticleIntegrator3, TrackerIntegrator};
pub use interp::{Bilinear, Trilinear};
pub use medium::{FluidMedium, PhysicalConstants};
pub use particle::{Body, History, Particle, Tracker};
pub use sim::{Simulation, TimeRange};
pub use terminal::{limit_velocity, terminal_velocity};
pub use vector::Vector;

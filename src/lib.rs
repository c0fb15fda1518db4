//! Particle trajectory simulation through steady gridded flow and electric fields.
//!
//! A run is described by a [`Scenario`]: a planar or volumetric grid carrying the fluid
//! velocity and the gradient of |E|^2, a set of bodies, the fluid, the physical
//! constants, the active forces, the boundary policy and the time range. Bodies are
//! advanced with a second-order midpoint scheme and every step is recorded.
//!
//! ```no_run
//! # fn main() -> ptsim::Result<()> {
//! let scenario = ptsim::load_scenario(std::path::Path::new("run.json"))?;
//! let run = scenario.run()?;
//! ptsim::export::write_trajectories_to_path(&run, std::path::Path::new("out.csv"))?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod export;
pub mod scenario;

#[cfg(feature = "python")]
mod python;

pub use config::{load_scenario, Config};
pub use error::{Error, Result};
pub use scenario::{Bodies, Domain, Mode, Run, Scenario};

//! JSON run configuration and the comma separated field and particle files it points at.
//!
//! The configuration keeps the section and key names of the `ptspy` layout:
//!
//! ```json
//! {
//!   "file_locations": { "vectorFieldFile": "field.csv", "particleFile": "particles.csv" },
//!   "fluid_data": { "name": "water", "density": 1000.0, "viscosity": 1e-3,
//!                   "relativePermittivity": 81.0, "scaleX": 1.0, "scaleY": 1.0 },
//!   "physicalConstants_data": { "gravitationalAcceleration": [0.0, -9.8] },
//!   "forces_data": { "includeStokes": "True", "includeDEP": "True" },
//!   "time_data": { "start": 0.0, "stop": 1.0, "step": 0.001 },
//!   "config": { "repeatX": "True", "repeatY": "False", "multiplyFieldX": 0,
//!               "mode": "particle2d" },
//!   "electrode_data": { "voltageScale": 1.0 }
//! }
//! ```
//!
//! Data files have no header; lines starting with `%` are comments.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};

use crate::core::{
    BoundaryConditions, BoundaryPolicy, FlatField, FluidMedium, ForceToggles, Grid2, Grid3,
    Particle, PhysicalConstants, TimeRange, Tracker, Vector,
};
use crate::error::{Error, Result};
use crate::scenario::{Bodies, Domain, Mode, Scenario};

/// Parsed configuration file.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub file_locations: FileLocations,
    #[serde(default)]
    pub fluid_data: FluidData,
    #[serde(rename = "physicalConstants_data", default)]
    pub physical_constants: ConstantsData,
    #[serde(default)]
    pub forces_data: ForcesData,
    pub time_data: TimeData,
    #[serde(default)]
    pub config: RunOptions,
    #[serde(default)]
    pub electrode_data: ElectrodeData,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileLocations {
    pub vector_field_file: PathBuf,
    pub particle_file: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FluidData {
    pub name: String,
    pub density: f64,
    pub viscosity: f64,
    pub relative_permittivity: f64,
    /// Unit factors applied to the imported velocity components.
    pub scale_x: f64,
    pub scale_y: f64,
}

impl Default for FluidData {
    fn default() -> Self {
        let fluid = FluidMedium::default();
        Self {
            name: fluid.name,
            density: fluid.density,
            viscosity: fluid.viscosity,
            relative_permittivity: fluid.relative_permittivity,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConstantsData {
    pub gravitational_acceleration: Vec<f64>,
    pub boltzmann_constant: f64,
    pub vacuum_permittivity: f64,
}

impl Default for ConstantsData {
    fn default() -> Self {
        let c = PhysicalConstants::<2>::default();
        Self {
            gravitational_acceleration: c.gravity.to_vec(),
            boltzmann_constant: c.boltzmann,
            vacuum_permittivity: c.vacuum_permittivity,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForcesData {
    #[serde(default, deserialize_with = "flag")]
    pub include_gravitational: bool,
    #[serde(default = "enabled", deserialize_with = "flag")]
    pub include_stokes: bool,
    #[serde(default, deserialize_with = "flag")]
    pub include_buoyant: bool,
    #[serde(rename = "includeDEP", default, deserialize_with = "flag")]
    pub include_dep: bool,
}

impl Default for ForcesData {
    fn default() -> Self {
        Self {
            include_gravitational: false,
            include_stokes: true,
            include_buoyant: false,
            include_dep: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TimeData {
    #[serde(default)]
    pub start: f64,
    pub stop: f64,
    pub step: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOptions {
    #[serde(default, deserialize_with = "flag")]
    pub repeat_x: bool,
    #[serde(default, deserialize_with = "flag")]
    pub repeat_y: bool,
    /// How many times the field is duplicated along X.
    #[serde(default)]
    pub multiply_field_x: u32,
    #[serde(default)]
    pub mode: Mode,
    #[serde(default = "enabled", deserialize_with = "flag")]
    pub parallel: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            repeat_x: false,
            repeat_y: false,
            multiply_field_x: 0,
            mode: Mode::default(),
            parallel: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ElectrodeData {
    /// Multiplies every particle's dielectrophoretic factor.
    pub voltage_scale: f64,
}

impl Default for ElectrodeData {
    fn default() -> Self {
        Self { voltage_scale: 1.0 }
    }
}

fn enabled() -> bool {
    true
}

/// A JSON boolean or one of the strings `"True"` / `"False"`.
fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }
    match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => Ok(b),
        Flag::Text(s) => match s.as_str() {
            "True" | "true" => Ok(true),
            "False" | "false" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "expected \"True\" or \"False\", found {other:?}"
            ))),
        },
    }
}

impl Config {
    /// Parse configuration text.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read and parse a configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let config: Config = serde_json::from_reader(reader)?;
        log::debug!("loaded configuration {}", path.display());
        Ok(config)
    }

    pub fn toggles(&self) -> ForceToggles {
        let f = &self.forces_data;
        ForceToggles {
            gravitational: f.include_gravitational,
            stokes: f.include_stokes,
            buoyant: f.include_buoyant,
            dielectrophoretic: f.include_dep,
        }
    }

    pub fn boundary(&self) -> BoundaryConditions {
        BoundaryConditions::new(
            BoundaryPolicy::from_repeat(self.config.repeat_x),
            BoundaryPolicy::from_repeat(self.config.repeat_y),
        )
    }

    pub fn fluid(&self) -> Result<FluidMedium> {
        let f = &self.fluid_data;
        FluidMedium::new(
            f.name.clone(),
            f.density,
            f.viscosity,
            f.relative_permittivity,
        )
    }

    pub fn constants(&self) -> Result<PhysicalConstants<3>> {
        let c = &self.physical_constants;
        let g = &c.gravitational_acceleration;
        if g.is_empty() || g.len() > 3 {
            return Err(Error::Config(format!(
                "gravitationalAcceleration needs 1 to 3 components, found {}",
                g.len()
            )));
        }
        Ok(PhysicalConstants {
            gravity: crate::core::vector::from_slice(g),
            boltzmann: c.boltzmann_constant,
            vacuum_permittivity: c.vacuum_permittivity,
        })
    }

    pub fn time(&self) -> Result<TimeRange> {
        let t = self.time_data;
        TimeRange::new(t.start, t.stop, t.step)
    }

    /// Load the referenced data files and assemble the run. Relative file paths are
    /// resolved against `base_dir`.
    pub fn into_scenario(self, base_dir: &Path) -> Result<Scenario> {
        let field_path = base_dir.join(&self.file_locations.vector_field_file);
        let particle_path = base_dir.join(&self.file_locations.particle_file);
        let mode = self.config.mode;

        let (domain, bodies) = match mode {
            Mode::Tracker | Mode::Particle2 => {
                let mut grid = load_grid2(&field_path)?;
                for _ in 0..self.config.multiply_field_x {
                    grid.repeat_x()?;
                }
                grid.scale_velocity([self.fluid_data.scale_x, self.fluid_data.scale_y]);
                let bodies = if mode == Mode::Tracker {
                    Bodies::Trackers(load_trackers(&particle_path)?)
                } else {
                    Bodies::Particles2(load_particles2(
                        &particle_path,
                        self.electrode_data.voltage_scale,
                    )?)
                };
                (Domain::Planar(grid), bodies)
            }
            Mode::Particle3 => {
                if self.config.multiply_field_x > 0 {
                    log::warn!("multiplyFieldX only applies to planar fields; ignored");
                }
                let mut grid = load_grid3(&field_path)?;
                grid.scale_velocity([self.fluid_data.scale_x, self.fluid_data.scale_y, 1.0]);
                let bodies = Bodies::Particles3(load_particles3(
                    &particle_path,
                    self.electrode_data.voltage_scale,
                )?);
                (Domain::Volume(grid), bodies)
            }
        };
        if bodies.is_empty() {
            log::warn!("{} lists no bodies", particle_path.display());
        }

        Ok(Scenario {
            domain,
            bodies,
            fluid: self.fluid()?,
            constants: self.constants()?,
            toggles: self.toggles(),
            boundary: self.boundary(),
            time: self.time()?,
            parallel: self.config.parallel,
        })
    }
}

/// Read a configuration file and everything it references.
pub fn load_scenario(path: &Path) -> Result<Scenario> {
    let config = Config::from_file(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
    config.into_scenario(base_dir)
}

// ============ Data files ============

/// One numeric row together with its 1-based line number.
struct Row {
    line: u64,
    values: Vec<f64>,
}

fn read_rows(path: &Path) -> Result<Vec<Row>> {
    let file = File::open(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .comment(Some(b'%'))
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(BufReader::new(file));

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let line = record.position().map_or(0, |p| p.line());
        let values = record
            .iter()
            .map(|field| {
                field.parse::<f64>().map_err(|e| Error::Parse {
                    path: path.to_path_buf(),
                    line,
                    message: format!("{field:?} is not a number ({e})"),
                })
            })
            .collect::<Result<Vec<f64>>>()?;
        rows.push(Row { line, values });
    }
    log::debug!("read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

fn require_columns(path: &Path, row: &Row, needed: usize, layout: &str) -> Result<()> {
    if row.values.len() < needed {
        return Err(Error::Parse {
            path: path.to_path_buf(),
            line: row.line,
            message: format!(
                "expected {needed} columns ({layout}), found {}",
                row.values.len()
            ),
        });
    }
    Ok(())
}

fn at_line(path: &Path, line: u64) -> impl Fn(Error) -> Error + '_ {
    move |e| Error::Parse {
        path: path.to_path_buf(),
        line,
        message: e.to_string(),
    }
}

/// Planar field file: `x, y, u, v, gradE2x, gradE2y` per node.
pub fn load_grid2(path: &Path) -> Result<Grid2> {
    const LAYOUT: &str = "x, y, u, v, gradE2x, gradE2y";
    let rows = read_rows(path)?;
    let n = rows.len();
    let mut xs = Vec::with_capacity(n);
    let mut ys = Vec::with_capacity(n);
    let mut velocity = Vec::with_capacity(n);
    let mut gradient = Vec::with_capacity(n);
    for row in &rows {
        require_columns(path, row, 6, LAYOUT)?;
        let v = &row.values;
        xs.push(v[0]);
        ys.push(v[1]);
        velocity.push([v[2], v[3]]);
        gradient.push([v[4], v[5]]);
    }
    Grid2::new(
        xs,
        ys,
        FlatField::from_samples(velocity),
        FlatField::from_samples(gradient),
    )
}

/// Volumetric field file: `x, y, z, u, v, w` per node, optionally followed by
/// `gradE2x, gradE2y, gradE2z`.
pub fn load_grid3(path: &Path) -> Result<Grid3> {
    const LAYOUT: &str = "x, y, z, u, v, w[, gradE2x, gradE2y, gradE2z]";
    let rows = read_rows(path)?;
    let n = rows.len();
    let mut xs = Vec::with_capacity(n);
    let mut ys = Vec::with_capacity(n);
    let mut zs = Vec::with_capacity(n);
    let mut velocity = Vec::with_capacity(n);
    let mut gradient = Vec::with_capacity(n);
    for row in &rows {
        require_columns(path, row, 6, LAYOUT)?;
        let v = &row.values;
        xs.push(v[0]);
        ys.push(v[1]);
        zs.push(v[2]);
        velocity.push([v[3], v[4], v[5]]);
        gradient.push(if v.len() >= 9 {
            [v[6], v[7], v[8]]
        } else {
            [0.0; 3]
        });
    }
    Grid3::new(
        xs,
        ys,
        zs,
        FlatField::from_samples(velocity),
        FlatField::from_samples(gradient),
    )
}

/// Tracker starting positions: the first two columns of a planar particle file.
pub fn load_trackers(path: &Path) -> Result<Vec<Tracker>> {
    read_rows(path)?
        .iter()
        .enumerate()
        .map(|(id, row)| {
            require_columns(path, row, 2, "px, py, ...")?;
            Tracker::new(id as u32, [row.values[0], row.values[1]]).map_err(at_line(path, row.line))
        })
        .collect()
}

/// Planar particles: `px, py, vx, vy, ax, ay, radius, density, mass, depFactor`.
pub fn load_particles2(path: &Path, voltage_scale: f64) -> Result<Vec<Particle<2>>> {
    read_particles(path, voltage_scale)
}

/// Volumetric particles:
/// `px, py, pz, vx, vy, vz, ax, ay, az, radius, density, mass, depFactor`.
pub fn load_particles3(path: &Path, voltage_scale: f64) -> Result<Vec<Particle<3>>> {
    read_particles(path, voltage_scale)
}

fn read_particles<const D: usize>(path: &Path, voltage_scale: f64) -> Result<Vec<Particle<D>>> {
    let layout = if D == 3 {
        "px, py, pz, vx, vy, vz, ax, ay, az, radius, density, mass, depFactor"
    } else {
        "px, py, vx, vy, ax, ay, radius, density, mass, depFactor"
    };
    read_rows(path)?
        .iter()
        .enumerate()
        .map(|(id, row)| {
            require_columns(path, row, 3 * D + 4, layout)?;
            let v = &row.values;
            let vector = |k: usize| -> Vector<D> { crate::core::vector::from_slice(&v[k * D..(k + 1) * D]) };
            let [radius, density, mass, dep_factor] = [v[3 * D], v[3 * D + 1], v[3 * D + 2], v[3 * D + 3]];
            Particle::new(id as u32, vector(0), radius, mass)
                .and_then(|p| p.with_velocity(vector(1)))
                .and_then(|p| p.with_acceleration(vector(2)))
                .map(|p| p.with_density(density).with_dep_factor(dep_factor * voltage_scale))
                .map_err(at_line(path, row.line))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "file_locations": { "vectorFieldFile": "f.csv", "particleFile": "p.csv" },
        "time_data": { "start": 0.0, "stop": 1.0, "step": 0.1 }
    }"#;

    #[test]
    fn minimal_config_uses_defaults() -> Result<()> {
        let c = Config::from_json(MINIMAL)?;
        assert_eq!(c.config.mode, Mode::Particle2);
        assert!(c.config.parallel);
        assert_eq!(c.config.multiply_field_x, 0);
        assert_eq!(c.toggles(), ForceToggles::stokes_only());
        assert_eq!(c.boundary(), BoundaryConditions::default());
        assert_eq!(c.fluid()?, FluidMedium::default());
        assert_eq!(c.constants()?.gravity, [0.0, -9.8, 0.0]);
        assert_eq!(c.electrode_data.voltage_scale, 1.0);
        assert_eq!(c.time()?.len(), 10);
        Ok(())
    }

    #[test]
    fn flags_accept_strings_and_booleans() -> Result<()> {
        let c = Config::from_json(
            r#"{
            "file_locations": { "vectorFieldFile": "f.csv", "particleFile": "p.csv" },
            "forces_data": { "includeGravitational": "True", "includeStokes": "False",
                             "includeBuoyant": true, "includeDEP": "True" },
            "time_data": { "stop": 1.0, "step": 0.5 },
            "config": { "repeatX": "True", "repeatY": false, "mode": "tracker",
                        "parallel": "False" },
            "plot_data": { "plotTrajectory": "True" }
        }"#,
        )?;
        let t = c.toggles();
        assert!(t.gravitational && !t.stokes && t.buoyant && t.dielectrophoretic);
        assert_eq!(c.boundary().x, BoundaryPolicy::Wrap);
        assert_eq!(c.boundary().y, BoundaryPolicy::Clamp);
        assert_eq!(c.config.mode, Mode::Tracker);
        assert!(!c.config.parallel);
        Ok(())
    }

    #[test]
    fn malformed_flag_is_rejected() {
        let err = Config::from_json(
            r#"{
            "file_locations": { "vectorFieldFile": "f.csv", "particleFile": "p.csv" },
            "forces_data": { "includeStokes": "yes" },
            "time_data": { "stop": 1.0, "step": 0.5 }
        }"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("True"));
    }

    #[test]
    fn empty_time_range_is_a_config_error() -> Result<()> {
        let c = Config::from_json(
            r#"{
            "file_locations": { "vectorFieldFile": "f.csv", "particleFile": "p.csv" },
            "time_data": { "start": 1.0, "stop": 1.0, "step": 0.5 }
        }"#,
        )?;
        assert!(matches!(c.time(), Err(Error::Config(_))));
        Ok(())
    }
}

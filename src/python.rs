//! Python bindings (`import ptsim`), built with `--features python`.

use std::path::PathBuf;

use numpy::ndarray::Array2;
use numpy::{IntoPyArray, PyArray1, PyArray2};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::config::load_scenario;
use crate::core::Vector;
use crate::scenario::{Bodies, Run, Scenario};

fn py_err<E: ToString>(e: E) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn to_array<const D: usize>(rows: &[Vector<D>]) -> Array2<f64> {
    let mut arr = Array2::<f64>::zeros((rows.len(), D));
    for (i, row) in rows.iter().enumerate() {
        for k in 0..D {
            arr[[i, k]] = row[k];
        }
    }
    arr
}

/// Which per-step quantity to export.
#[derive(Clone, Copy)]
enum Series {
    Position,
    Velocity,
    Acceleration,
}

/// A configured particle tracking run.
///
/// API:
/// - __new__(config_path)
/// - run()
/// - times() -> np.ndarray, shape (steps,)
/// - positions(i) / velocities(i) / accelerations(i) -> np.ndarray, shape (steps, D)
/// - wrap_counts() -> np.ndarray, shape (N,)
/// - num_bodies() -> int
#[pyclass(name = "Simulation")]
pub struct PySimulation {
    scenario: Scenario,
    run: Option<Run>,
}

impl PySimulation {
    fn finished(&self) -> PyResult<&Run> {
        self.run
            .as_ref()
            .ok_or_else(|| py_err("simulation has not been run yet; call run() first"))
    }

    fn series(&self, py: Python<'_>, index: usize, series: Series) -> PyResult<Py<PyArray2<f64>>> {
        let run = self.finished()?;
        let n = run.bodies.len();
        if index >= n {
            return Err(py_err(format!("body index {index} out of range for {n} bodies")));
        }
        let arr = match (&run.bodies, series) {
            (Bodies::Trackers(t), Series::Position) => to_array(&t[index].positions),
            (Bodies::Trackers(_), _) => {
                return Err(py_err("trackers record positions only"));
            }
            (Bodies::Particles2(p), s) => {
                let h = &p[index].history;
                to_array(match s {
                    Series::Position => &h.positions,
                    Series::Velocity => &h.velocities,
                    Series::Acceleration => &h.accelerations,
                })
            }
            (Bodies::Particles3(p), s) => {
                let h = &p[index].history;
                to_array(match s {
                    Series::Position => &h.positions,
                    Series::Velocity => &h.velocities,
                    Series::Acceleration => &h.accelerations,
                })
            }
        };
        Ok(arr.into_pyarray(py).to_owned().into())
    }
}

#[pymethods]
impl PySimulation {
    /// Load a JSON configuration and the field and particle files it references.
    ///
    /// Errors: raises ValueError on unreadable or invalid input.
    #[new]
    fn new(config_path: PathBuf) -> PyResult<Self> {
        let scenario = load_scenario(&config_path).map_err(py_err)?;
        Ok(Self {
            scenario,
            run: None,
        })
    }

    /// Integrate every body over the configured time range (releases the GIL).
    fn run(&mut self, py: Python<'_>) -> PyResult<()> {
        let scenario = &self.scenario;
        let run = py.detach(|| scenario.run()).map_err(py_err)?;
        self.run = Some(run);
        Ok(())
    }

    /// Number of bodies in the run.
    fn num_bodies(&self) -> usize {
        self.scenario.bodies.len()
    }

    /// Time value of every recorded step.
    fn times<'py>(&self, py: Python<'py>) -> PyResult<Py<PyArray1<f64>>> {
        let run = self.finished()?;
        Ok(run.times.clone().into_pyarray(py).to_owned().into())
    }

    fn positions<'py>(&self, py: Python<'py>, index: usize) -> PyResult<Py<PyArray2<f64>>> {
        self.series(py, index, Series::Position)
    }

    fn velocities<'py>(&self, py: Python<'py>, index: usize) -> PyResult<Py<PyArray2<f64>>> {
        self.series(py, index, Series::Velocity)
    }

    fn accelerations<'py>(&self, py: Python<'py>, index: usize) -> PyResult<Py<PyArray2<f64>>> {
        self.series(py, index, Series::Acceleration)
    }

    /// Number of periodic re-entries along X of every body.
    fn wrap_counts<'py>(&self, py: Python<'py>) -> PyResult<Py<PyArray1<u32>>> {
        let run = self.finished()?;
        Ok(run.bodies.wrap_counts().into_pyarray(py).to_owned().into())
    }
}

#[pymodule]
fn ptsim(_py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PySimulation>()?;
    Ok(())
}

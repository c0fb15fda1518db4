use rayon::prelude::*;

use crate::core::integrator::Integrator;
use crate::core::particle::Body;
use crate::error::{Error, Result};

/// Discrete time values `start + k * step` for every `k` with the value `< stop`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeRange {
    start: f64,
    stop: f64,
    step: f64,
}

impl TimeRange {
    /// Errors:
    /// - `Error::Config` if any bound is not finite, `step <= 0` or `stop <= start`.
    pub fn new(start: f64, stop: f64, step: f64) -> Result<Self> {
        if !(start.is_finite() && stop.is_finite() && step.is_finite()) {
            return Err(Error::Config("time range must be finite".into()));
        }
        if step <= 0.0 {
            return Err(Error::Config(format!("time step must be > 0, got {step}")));
        }
        if stop <= start {
            return Err(Error::Config(format!(
                "time range is empty: stop {stop} <= start {start}"
            )));
        }
        Ok(Self { start, stop, step })
    }

    #[inline]
    pub fn start(&self) -> f64 {
        self.start
    }

    #[inline]
    pub fn stop(&self) -> f64 {
        self.stop
    }

    #[inline]
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Number of timesteps in the range.
    pub fn len(&self) -> usize {
        let mut n = ((self.stop - self.start) / self.step).ceil() as usize;
        // guard against rounding in the division
        while n > 0 && self.value(n - 1) >= self.stop {
            n -= 1;
        }
        while self.value(n) < self.stop {
            n += 1;
        }
        n
    }

    /// Never true for a validated range; kept for the `len` convention.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The `k`-th time value.
    #[inline]
    pub fn value(&self, k: usize) -> f64 {
        self.start + k as f64 * self.step
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.len()).map(move |k| self.value(k))
    }
}

/// Fixed-step time loop over independent bodies.
///
/// Bodies never interact, so within one timestep they are stepped in any order (on the
/// rayon pool when `parallel` is set); timesteps themselves run strictly in sequence.
pub struct Simulation<I: Integrator> {
    integrator: I,
    time: TimeRange,
    times: Vec<f64>,
    bodies: Vec<I::Body>,
    parallel: bool,
}

impl<I: Integrator> Simulation<I> {
    /// Errors:
    /// - `Error::InvalidParam` if the integrator's timestep differs from the range step.
    pub fn new(integrator: I, time: TimeRange, bodies: Vec<I::Body>) -> Result<Self> {
        if integrator.dt() != time.step() {
            return Err(Error::InvalidParam(format!(
                "integrator timestep {} does not match time range step {}",
                integrator.dt(),
                time.step()
            )));
        }
        Ok(Self {
            integrator,
            time,
            times: Vec::new(),
            bodies,
            parallel: true,
        })
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Step every body through the whole time range, recording one history entry per
    /// body per timestep.
    ///
    /// The first integration error aborts the run.
    pub fn run(&mut self) -> Result<()> {
        let steps = self.time.len();
        log::info!(
            "running {} bodies over {steps} steps of {} ({})",
            self.bodies.len(),
            self.time.step(),
            if self.parallel { "parallel" } else { "sequential" }
        );
        self.times.reserve(steps);
        for body in &mut self.bodies {
            body.reserve_history(steps);
        }

        for k in 0..steps {
            let t = self.time.value(k);
            log::trace!("step {k}: t = {t}");
            let integrator = &self.integrator;
            let advance = |body: &mut I::Body| -> Result<()> {
                integrator.advance(body)?;
                body.record();
                Ok(())
            };
            if self.parallel {
                self.bodies.par_iter_mut().try_for_each(advance)?;
            } else {
                self.bodies.iter_mut().try_for_each(advance)?;
            }
            self.times.push(t);
        }
        log::info!("run complete at t = {}", self.times.last().copied().unwrap_or(self.time.start()));
        Ok(())
    }

    /// Time value of every completed step.
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn bodies(&self) -> &[I::Body] {
        &self.bodies
    }

    pub fn into_bodies(self) -> Vec<I::Body> {
        self.bodies
    }

    /// Consume the loop, returning the recorded times and the bodies.
    pub fn into_parts(self) -> (Vec<f64>, Vec<I::Body>) {
        (self.times, self.bodies)
    }
}

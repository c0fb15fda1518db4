//! Trajectory export for external plotting: one CSV row per body per timestep.
//!
//! Columns are `body, step, time, x, y[, z], vx, vy[, vz], ax, ay[, az], wraps`;
//! tracker runs carry no velocity or acceleration columns.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::core::{Particle, Tracker};
use crate::error::Result;
use crate::scenario::{Bodies, Run};

const AXES: [&str; 3] = ["x", "y", "z"];

fn header(dim: usize, kinematics: bool) -> Vec<String> {
    let mut cols: Vec<String> = ["body", "step", "time"].iter().map(|s| s.to_string()).collect();
    cols.extend(AXES[..dim].iter().map(|a| a.to_string()));
    if kinematics {
        cols.extend(AXES[..dim].iter().map(|a| format!("v{a}")));
        cols.extend(AXES[..dim].iter().map(|a| format!("a{a}")));
    }
    cols.push("wraps".into());
    cols
}

/// Write `run` as CSV to any writer.
pub fn write_trajectories<W: Write>(run: &Run, out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    match &run.bodies {
        Bodies::Trackers(trackers) => {
            writer.write_record(header(2, false))?;
            for t in trackers {
                write_tracker(&mut writer, t, &run.times)?;
            }
        }
        Bodies::Particles2(particles) => {
            writer.write_record(header(2, true))?;
            for p in particles {
                write_particle(&mut writer, p, &run.times)?;
            }
        }
        Bodies::Particles3(particles) => {
            writer.write_record(header(3, true))?;
            for p in particles {
                write_particle(&mut writer, p, &run.times)?;
            }
        }
    }
    writer.flush()?;
    Ok(())
}

/// Write `run` to a CSV file at `path`.
pub fn write_trajectories_to_path(run: &Run, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    write_trajectories(run, file)?;
    log::info!("wrote {} trajectories to {}", run.bodies.len(), path.display());
    Ok(())
}

fn write_tracker<W: Write>(writer: &mut csv::Writer<W>, t: &Tracker, times: &[f64]) -> Result<()> {
    for (step, (time, pos)) in times.iter().zip(&t.positions).enumerate() {
        let mut row = vec![t.id.to_string(), step.to_string(), time.to_string()];
        row.extend(pos.iter().map(f64::to_string));
        row.push("0".into());
        writer.write_record(&row)?;
    }
    Ok(())
}

fn write_particle<W: Write, const D: usize>(
    writer: &mut csv::Writer<W>,
    p: &Particle<D>,
    times: &[f64],
) -> Result<()> {
    let h = &p.history;
    for (step, time) in times.iter().enumerate().take(h.len()) {
        let mut row = vec![p.id.to_string(), step.to_string(), time.to_string()];
        for v in [&h.positions[step], &h.velocities[step], &h.accelerations[step]] {
            row.extend(v.iter().map(f64::to_string));
        }
        row.push(p.wrap_count.to_string());
        writer.write_record(&row)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::particle::Body;

    #[test]
    fn particle_rows_follow_header() -> Result<()> {
        let mut p = Particle::new(4, [1.0, 2.0], 1.0, 1.0)?.with_velocity([0.5, 0.0])?;
        p.record();
        p.wrap_count = 2;
        let run = Run {
            times: vec![0.25],
            bodies: Bodies::Particles2(vec![p]),
        };
        let mut buf = Vec::new();
        write_trajectories(&run, &mut buf)?;
        let text = String::from_utf8(buf).map_err(|e| crate::error::Error::Config(e.to_string()))?;
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "body,step,time,x,y,vx,vy,ax,ay,wraps");
        assert_eq!(lines[1], "4,0,0.25,1,2,0.5,0,0,0,2");
        assert_eq!(lines.len(), 2);
        Ok(())
    }

    #[test]
    fn tracker_rows_have_positions_only() -> Result<()> {
        let mut t = Tracker::new(0, [0.0, 1.5])?;
        t.record();
        t.position = [1.0, 1.5];
        t.record();
        let run = Run {
            times: vec![0.0, 0.1],
            bodies: Bodies::Trackers(vec![t]),
        };
        let mut buf = Vec::new();
        write_trajectories(&run, &mut buf)?;
        let text = String::from_utf8(buf).map_err(|e| crate::error::Error::Config(e.to_string()))?;
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "body,step,time,x,y,wraps");
        assert_eq!(lines[2], "0,1,0.1,1,1.5,0");
        Ok(())
    }
}

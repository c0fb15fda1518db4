//! Command line front end: run a configured simulation or summarise its inputs.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;

use ptsim::core::Axis;
use ptsim::export::{write_trajectories, write_trajectories_to_path};
use ptsim::{load_scenario, Domain};

/// Particle trajectory simulator
#[derive(Parser)]
#[command(name = "ptsim")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Track particles through steady gridded flow and DEP fields", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation and export the trajectories
    Run(RunArgs),
    /// Print the grid and body summary of a configuration
    Info(InfoArgs),
}

#[derive(Args)]
struct RunArgs {
    /// JSON configuration file
    config: PathBuf,

    /// Trajectory CSV output; stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Step bodies on one thread
    #[arg(long)]
    sequential: bool,
}

#[derive(Args)]
struct InfoArgs {
    /// JSON configuration file
    config: PathBuf,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn run(args: RunArgs) -> Result<()> {
    let mut scenario = load_scenario(&args.config)
        .with_context(|| format!("failed to load {}", args.config.display()))?;
    if args.sequential {
        scenario.parallel = false;
    }

    let started = Instant::now();
    let run = scenario.run().context("simulation failed")?;
    info!(
        "{} steps for {} bodies in {:.2?}",
        run.times.len(),
        run.bodies.len(),
        started.elapsed()
    );

    match &args.output {
        Some(path) => write_trajectories_to_path(&run, path)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => write_trajectories(&run, std::io::stdout().lock())
            .context("failed to write trajectories")?,
    }
    Ok(())
}

fn describe(name: &str, axis: &Axis) -> String {
    format!(
        "  {name}: [{}, {}], {} samples, spacing {}",
        axis.min(),
        axis.max(),
        axis.count(),
        axis.spacing()
    )
}

fn show_info(args: InfoArgs) -> Result<()> {
    let scenario = load_scenario(&args.config)
        .with_context(|| format!("failed to load {}", args.config.display()))?;

    println!("mode: {}", scenario.mode().name());
    match &scenario.domain {
        Domain::Planar(grid) => {
            println!("planar grid, {} nodes", grid.len());
            println!("{}", describe("x", grid.x_axis()));
            println!("{}", describe("y", grid.y_axis()));
        }
        Domain::Volume(grid) => {
            println!("volumetric grid, {} nodes", grid.len());
            println!("{}", describe("x", grid.x_axis()));
            println!("{}", describe("y", grid.y_axis()));
            println!("{}", describe("z", grid.z_axis()));
        }
    }
    println!("boundary: x {:?}, y {:?}", scenario.boundary.x, scenario.boundary.y);
    println!("forces: {:?}", scenario.toggles);
    println!("fluid: {:?}", scenario.fluid);
    println!(
        "time: [{}, {}) step {} ({} steps)",
        scenario.time.start(),
        scenario.time.stop(),
        scenario.time.step(),
        scenario.time.len()
    );
    println!("bodies: {}", scenario.bodies.len());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run(args) => run(args),
        Commands::Info(args) => show_info(args),
    }
}

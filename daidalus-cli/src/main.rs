#[macro_use]
extern crate log;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use daidalus::geometry::Vec3;
use daidalus::{AircraftState, Daidalus, Dimension, Parameters, Position, StateSource, StepInputs, WindVector};

/// Demo driver for the daidalus detect-and-avoid engine: loads a parameter
/// file, replays a small synthetic head-on encounter, and prints alerts and
/// bands at each step.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Path to a daidalus parameter file (`key = value [unit]` lines, §6.2).
    /// If omitted, runs with library defaults.
    #[clap(long)]
    config_file: Option<PathBuf>,

    /// Path to write a YAML run manifest summarising the replay.
    #[clap(long)]
    manifest_out: Option<PathBuf>,
}

/// A fixed in-memory encounter: ownship flying north, traffic closing
/// head-on, sampled once per second for ten seconds. Stands in for a real
/// `StateSource` (CSV/PVS ingestion is out of scope here).
struct FixedEncounter {
    next_time: f64,
    steps_remaining: usize,
}

impl FixedEncounter {
    fn new() -> Self {
        FixedEncounter {
            next_time: 0.0,
            steps_remaining: 10,
        }
    }
}

impl StateSource for FixedEncounter {
    fn next_step(&mut self) -> Option<StepInputs> {
        if self.steps_remaining == 0 {
            return None;
        }
        let t = self.next_time;
        self.steps_remaining -= 1;
        self.next_time += 1.0;

        let own_speed = daidalus::units::Unit::Knot.to_internal(150.0);
        let traffic_speed = daidalus::units::Unit::Knot.to_internal(150.0);

        let ownship = AircraftState::new(
            "own",
            Position::Euclidean(Vec3::new(0.0, own_speed * t, 3000.0)),
            Vec3::new(0.0, own_speed, 0.0),
            t,
        );
        let traffic = AircraftState::new(
            "t1",
            Position::Euclidean(Vec3::new(0.0, 9_260.0 - traffic_speed * t, 3000.0)),
            Vec3::new(0.0, -traffic_speed, 0.0),
            t,
        );

        Some(StepInputs {
            time: t,
            ownship,
            traffic: vec![traffic],
            wind: WindVector::ZERO,
            ownship_uncertainty: Default::default(),
        })
    }
}

#[derive(Debug, Serialize)]
struct StepSummary {
    time: f64,
    alert_levels: Vec<(String, usize)>,
    corrective_band_count: usize,
}

#[derive(Debug, Serialize)]
struct RunManifest {
    config_file: Option<String>,
    steps: Vec<StepSummary>,
}

fn main() -> Result<()> {
    std::env::set_var("RUST_LOG", std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()));
    pretty_env_logger::init();
    let args = Args::parse();

    let mut daa = Daidalus::new();

    if let Some(path) = &args.config_file {
        info!("reading config file {}", path.display());
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let mut params = Parameters::default();
        params.load(&text).with_context(|| format!("parsing config file {}", path.display()))?;
        *daa.parameters_mut() = params;
    } else {
        debug!("no --config-file given, using library defaults");
    }

    let mut source = FixedEncounter::new();
    let mut manifest = RunManifest {
        config_file: args.config_file.as_ref().map(|p| p.display().to_string()),
        steps: Vec::new(),
    };

    while let Some(step) = source.next_step() {
        daa.set_wind(step.wind);
        daa.set_ownship(step.ownship);
        daa.set_traffic(step.traffic.clone());

        let mut alert_levels = Vec::new();
        for traffic in &step.traffic {
            let level = daa.alert_level(&traffic.id, step.time);
            alert_levels.push((traffic.id.clone(), level));
            if level > 0 {
                info!("t={:.1}s: {} alert level {}", step.time, traffic.id, level);
            } else {
                debug!("t={:.1}s: {} clear", step.time, traffic.id);
            }
        }

        let corrective_band_count = Dimension::ALL
            .iter()
            .filter_map(|dim| daa.bands(*dim, step.time))
            .flat_map(|d| d.bands)
            .filter(|b| b.region.is_conflict())
            .count();

        manifest.steps.push(StepSummary {
            time: step.time,
            alert_levels,
            corrective_band_count,
        });

        if daa.log().has_message() {
            for message in daa.log().messages() {
                warn!("{:?}: {}", message.severity, message.error);
            }
        }
    }

    if let Some(path) = &args.manifest_out {
        let yaml = serde_yaml::to_string(&manifest).context("serialising run manifest")?;
        std::fs::write(path, yaml).with_context(|| format!("writing manifest to {}", path.display()))?;
        info!("wrote run manifest to {}", path.display());
    }

    info!("replay complete, {} steps", manifest.steps.len());
    Ok(())
}

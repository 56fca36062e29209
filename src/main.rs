//! Bubble Fusion
//!
//! Headless driver: runs a two-body merge to completion and optionally streams
//! every frame snapshot to a JSON-lines file.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use bubble_fusion_sim::config::{FusionConfig, PRESET_NAMES};
use bubble_fusion_sim::export::{ExportError, SnapshotWriter};
use bubble_fusion_sim::simulation::FusionSimulation;

/// Two-body contact, merge and shockwave choreography
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Named scene preset, used when no config file is given
    #[arg(short, long, default_value = "classic")]
    preset: String,

    /// Write frame snapshots to this JSON-lines file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Stop after this many frames
    #[arg(long)]
    max_frames: Option<u64>,

    /// Override the fixed time step (seconds)
    #[arg(long)]
    dt: Option<f32>,
}

fn load_config(args: &Args) -> FusionConfig {
    if let Some(ref path) = args.config {
        return match FusionConfig::from_file(path) {
            Ok(cfg) => {
                log::info!("Loaded config from {}", path);
                cfg
            }
            Err(e) => {
                log::warn!("Failed to load config: {}, using defaults", e);
                FusionConfig::default()
            }
        };
    }

    match FusionConfig::preset(&args.preset) {
        Some(cfg) => {
            log::info!("Using preset '{}'", args.preset);
            cfg
        }
        None => {
            log::warn!(
                "Unknown preset '{}' (expected one of {}), using defaults",
                args.preset,
                PRESET_NAMES.join(", ")
            );
            FusionConfig::default()
        }
    }
}

fn main() -> ExitCode {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // put id:'cli_parse_args', label:'Parse CLI arguments', output:'cli_args.internal'
    let args = Args::parse();

    // put id:'cfg_load', label:'Load config JSON', input:'cli_args.internal', output:'config.json'
    let mut config = load_config(&args);

    // put id:'cfg_merge_cli', label:'Merge CLI overrides', input:'config.json', output:'final_config.internal'
    if let Some(dt) = args.dt {
        config.dt = dt;
    }
    if let Some(max_frames) = args.max_frames {
        config.max_frames = Some(max_frames);
    }

    log::info!(
        "Starting simulation: radii {} / {}, separation {:.2}, {:?} mode",
        config.body_a.radius,
        config.body_b.radius,
        glam::Vec3::from(config.body_a.position).distance(glam::Vec3::from(config.body_b.position)),
        config.mode
    );

    let mut simulation = match FusionSimulation::try_new(config) {
        Ok(simulation) => simulation,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut writer = match args.output.as_ref().map(SnapshotWriter::create).transpose() {
        Ok(writer) => writer,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    // put id:'cli_run_loop', label:'Run tick loop', input:'final_config.internal', output:'frame_snapshot.internal'
    let mut export_error: Option<ExportError> = None;
    let summary = simulation.run(|snapshot| {
        if export_error.is_some() {
            return;
        }
        if let Some(writer) = writer.as_mut()
            && let Err(e) = writer.write(snapshot)
        {
            log::error!("{}", e);
            export_error = Some(e);
        }
    });

    match summary.merge_time {
        Some(t) => log::info!("Bodies merged at t={:.2}s", t),
        None => log::info!("Bodies never touched"),
    }
    log::info!(
        "Finished in phase {:?} after {} frames ({:.2}s simulated)",
        summary.final_phase,
        summary.frames,
        summary.time
    );

    if export_error.is_some() {
        return ExitCode::FAILURE;
    }
    if let Some(writer) = writer
        && let Err(e) = writer.finish()
    {
        log::error!("{}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

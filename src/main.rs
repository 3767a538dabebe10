//! Oxidized-Retro - headless frontend
//!
//! Main entry point: loads a configuration, boots the reference core and
//! runs content for a number of frames.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use ox_core::{Config, Core};
use ox_integration::FrontendRunner;
use ox_nullcore::NullCore;
use serde::Serialize;

#[derive(Debug, Parser)]
#[command(name = "oxidized-retro", version, about = "Drive a core headless for N frames")]
struct Args {
    /// Content file to load
    #[arg(long)]
    content: Option<PathBuf>,

    /// Frames to run (overrides general.frame_limit)
    #[arg(long)]
    frames: Option<u64>,

    /// Configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Use the core variant that reads content from its path
    #[arg(long)]
    full_path: bool,

    /// Print core information as JSON and exit
    #[arg(long)]
    info: bool,

    /// Write a save state here after the run
    #[arg(long)]
    save_state: Option<PathBuf>,
}

#[derive(Serialize)]
struct CoreReport {
    api_version: u32,
    system: ox_core::SystemInfo,
    av: Option<ox_core::SystemAvInfo>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("loading configuration")?;

    ox_core::logging::init(&config.debug).context("initializing logging")?;
    tracing::info!("Starting Oxidized-Retro");

    let core = if args.full_path {
        NullCore::with_full_path()
    } else {
        NullCore::new()
    };

    if args.info && args.content.is_none() {
        let report = CoreReport {
            api_version: core.api_version(),
            system: core.system_info(),
            av: None,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let Some(content) = args.content.as_ref() else {
        bail!("no content given (use --content <path>)");
    };

    let frame_limit = args
        .frames
        .unwrap_or(config.general.frame_limit as u64);

    let mut runner = FrontendRunner::new(core, config)?;
    runner.boot()?;
    let av = runner
        .load_content(content)
        .with_context(|| format!("loading {}", content.display()))?;

    if args.info {
        let report = CoreReport {
            api_version: runner.host().api_version(),
            system: runner.host().system_info().clone(),
            av: Some(av),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    let ran = if frame_limit == 0 {
        let mut ran = 0;
        while runner.run_frame()?.is_some() {
            ran += 1;
        }
        ran
    } else {
        runner.run_frames(frame_limit)?
    };

    let stats = runner.stats();
    tracing::info!(
        "Ran {} frames ({} dupes, {} audio frames, {} violations)",
        ran,
        stats.dupes,
        stats.audio_frames,
        stats.violations
    );

    if let Some(path) = &args.save_state {
        runner
            .save_state_to_file(path)
            .with_context(|| format!("writing state to {}", path.display()))?;
    }

    runner.shutdown()?;
    Ok(())
}

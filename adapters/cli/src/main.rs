#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs Jungle Escape headlessly.

mod config;
mod headless;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use jungle_escape_core::{Event, GAME_TITLE};
use jungle_escape_rendering::{FrameControl, Presentation, RenderFrame, RenderingBackend};
use jungle_escape_system_simulation::{CommandOutcome, Session};
use log::{debug, info};

use crate::headless::HeadlessBackend;

/// Runs generated Jungle Escape levels with an autopilot and reports the outcome.
#[derive(Debug, Parser)]
#[command(name = "jungle-escape", version, about)]
struct Args {
    /// Seed for the first level; later levels derive from it. Random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Maximum number of frames to simulate.
    #[arg(long, default_value_t = 3_600)]
    ticks: u64,

    /// TOML file with tuning overrides.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Level width in tiles, overriding the config.
    #[arg(long)]
    columns: Option<u32>,

    /// Level height in tiles, overriding the config.
    #[arg(long)]
    rows: Option<u32>,

    /// New levels to generate after the first one ends.
    #[arg(long, default_value_t = 0)]
    retries: u32,

    /// Print the generated layout before running.
    #[arg(long)]
    print_level: bool,
}

/// Entry point for the Jungle Escape command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut tuning = config::load_tuning(args.config.as_deref())?;
    if let Some(columns) = args.columns {
        tuning.level_columns = columns;
    }
    if let Some(rows) = args.rows {
        tuning.level_rows = rows;
    }
    let seed = args.seed.unwrap_or_else(rand::random);

    let mut events = Vec::new();
    let mut session = Session::start(tuning.clone(), seed, &mut events)
        .with_context(|| format!("failed to start {GAME_TITLE} with seed {seed}"))?;
    report(&events);
    if args.print_level {
        print!("{}", session.grid());
    }

    let backend = HeadlessBackend::new(args.ticks, args.retries);
    backend.run(Presentation::for_tuning(&tuning), |input, frame| {
        let mut events = Vec::new();
        if let Some(command) = input.host_command {
            let outcome = session
                .execute(command, &mut events)
                .context("failed to execute host command")?;
            if outcome == CommandOutcome::Quit {
                return Ok(FrameControl::Exit);
            }
            if args.print_level {
                print!("{}", session.grid());
            }
        } else {
            session.tick(input.controls, &mut events);
        }
        report(&events);
        *frame = RenderFrame::capture(&session);
        Ok(FrameControl::Continue)
    })?;

    let frame = RenderFrame::capture(&session);
    println!(
        "level seed {:#x}: {:?}",
        session.level_seed(),
        session.state()
    );
    for line in frame.text() {
        println!("{}", line.text);
    }
    Ok(())
}

fn report(events: &[Event]) {
    for event in events {
        match event {
            Event::TimeAdvanced { .. } => {}
            Event::PlayerDied { cause } => info!("player died: {cause:?}"),
            Event::PlayerWon { gems_collected } => {
                info!("door unlocked with {gems_collected} gems");
            }
            other => debug!("{other:?}"),
        }
    }
}

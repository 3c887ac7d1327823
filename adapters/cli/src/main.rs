#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Dungeon Defence session.

mod layout;
mod presenter;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use dungeon_defence_core::Command;
use dungeon_defence_rendering::Stage;
use dungeon_defence_system_builder::{Builder, BuilderInput};
use dungeon_defence_system_spawning::{self as spawning, Spawning};
use dungeon_defence_system_targeting::StructureTargeting;
use dungeon_defence_world::{self as world, query, World};
use rand::Rng;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{layout::LayoutFile, presenter::TracingPresenter};

/// Command-line arguments accepted by the Dungeon Defence binary.
#[derive(Debug, Parser)]
#[command(name = "dungeon-defence")]
#[command(about = "Runs a headless dungeon defence session")]
#[command(version)]
struct Args {
    /// Dungeon layout TOML file; the built-in dungeon is used when omitted
    #[arg(long)]
    layout: Option<PathBuf>,

    /// Seed for combat randomness; a random seed is drawn when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Number of simulation ticks to run
    #[arg(long, default_value_t = 3_000)]
    ticks: u32,

    /// Simulated milliseconds per tick
    #[arg(long, default_value_t = 16)]
    tick_ms: u64,

    /// Number of heroes in the wave
    #[arg(long, default_value_t = 5)]
    heroes: u32,

    /// Milliseconds between consecutive hero spawns
    #[arg(long, default_value_t = 4_000)]
    spawn_interval_ms: u64,
}

/// Entry point for the Dungeon Defence command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    run(&args)
}

fn run(args: &Args) -> Result<()> {
    let file = match &args.layout {
        Some(path) => LayoutFile::load(path)?,
        None => LayoutFile::embedded()?,
    };
    let seed = args.seed.unwrap_or_else(|| rand::thread_rng().gen());
    let mut world = World::new(&file.dungeon, world::Config::with_seed(seed))
        .context("dungeon layout is not playable")?;
    info!(seed, ticks = args.ticks, heroes = args.heroes, "session started");

    let mut script = file.script(query::grid(&world));
    let mut builder = Builder::new();
    let mut spawning = Spawning::new(spawning::Config::new(
        Duration::from_millis(args.spawn_interval_ms),
        args.heroes,
    ));
    let mut targeting = StructureTargeting::new();
    let mut stage = Stage::new();
    let mut presenter = TracingPresenter::default();

    let dt = Duration::from_millis(args.tick_ms);
    let mut idle = BuilderInput::default();
    let mut previous = Vec::new();
    let mut commands = Vec::new();

    for _ in 0..args.ticks {
        let mut events = Vec::new();
        world::apply(&mut world, Command::Tick { dt }, &mut events);

        let input = match script.pop_front() {
            Some(input) => {
                idle.pointer = input.pointer;
                input
            }
            None => idle,
        };
        builder.handle(&previous, input, &mut commands);
        spawning.handle(&events, &mut commands);
        targeting.handle(
            &query::structure_view(&world),
            &query::hero_view(&world),
            &mut commands,
        );
        for command in commands.drain(..) {
            world::apply(&mut world, command, &mut events);
        }

        stage
            .present(&events, &mut presenter)
            .context("presenter rejected a frame")?;
        previous = events;
    }

    info!(
        elapsed_ms = query::elapsed(&world).as_millis() as u64,
        gold = query::gold(&world),
        heroes_inside = query::hero_view(&world).iter().count(),
        heroes_waiting = spawning.remaining(),
        structures = query::structure_view(&world).iter().count(),
        visuals = presenter.live_visuals(),
        sounds = presenter.sounds_played(),
        "session finished"
    );
    Ok(())
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave spawning system responsible for emitting hero spawn commands.

use std::time::Duration;

use dungeon_defence_core::{Command, Event};

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    spawn_interval: Duration,
    wave_size: u32,
}

impl Config {
    /// Creates a new configuration using the provided cadence and wave size.
    #[must_use]
    pub const fn new(spawn_interval: Duration, wave_size: u32) -> Self {
        Self {
            spawn_interval,
            wave_size,
        }
    }
}

/// Pure system that releases one wave of heroes at a fixed cadence.
///
/// The first hero enters as soon as simulated time starts moving; the rest
/// follow every `spawn_interval`.
#[derive(Debug)]
pub struct Spawning {
    spawn_interval: Duration,
    accumulator: Duration,
    remaining: u32,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            spawn_interval: config.spawn_interval,
            accumulator: config.spawn_interval,
            remaining: config.wave_size,
        }
    }

    /// Number of heroes still waiting to enter the dungeon.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Consumes world events and emits the spawn commands that fell due.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        if self.remaining == 0 {
            return;
        }

        let mut accumulated = Duration::ZERO;
        let mut advanced = false;
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                accumulated = accumulated.saturating_add(*dt);
                advanced = true;
            }
        }

        if !advanced {
            return;
        }

        self.accumulator = self.accumulator.saturating_add(accumulated);
        for _ in 0..self.resolve_spawn_attempts() {
            out.push(Command::SpawnHero);
        }
    }

    fn resolve_spawn_attempts(&mut self) -> u32 {
        if self.spawn_interval.is_zero() {
            return std::mem::take(&mut self.remaining);
        }

        let mut attempts = 0;
        while self.remaining > 0 && self.accumulator >= self.spawn_interval {
            self.accumulator -= self.spawn_interval;
            self.remaining -= 1;
            attempts += 1;
        }
        attempts
    }
}

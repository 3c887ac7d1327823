#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative dungeon state management for Dungeon Defence.
//!
//! The [`World`] owns the grid, the hero path, every hero and structure, the
//! scheduler and the combat resolver. It is mutated exclusively through
//! [`apply`], which executes a [`Command`] and reports what happened as
//! [`Event`] values.

pub mod hero;
pub mod path;
mod scheduler;
pub mod structures;

use std::time::Duration;

use dungeon_defence_core::{
    CellClass, Command, DespawnCause, DungeonLayout, Event, Grid, HeroId, LayoutError,
    PlacementError, SoundId, StructureId, StructureKind, WorldPoint,
};
use dungeon_defence_system_combat::{CombatResolver, CombatTuning};
use dungeon_defence_system_placement::PlacementValidator;
use tracing::{debug, info};

use crate::{
    hero::{Hero, HeroContext},
    path::Path,
    scheduler::Scheduler,
    structures::{Candidate, StructureRegistry, TOWER_REFRESH},
};

const DEFAULT_RNG_SEED: u64 = 0x4c44_3434_d00d_f00d;

/// Configuration parameters required to construct the world.
#[derive(Clone, Debug)]
pub struct Config {
    rng_seed: u64,
    combat: CombatTuning,
}

impl Config {
    /// Creates a new configuration using the provided seed and combat tuning.
    #[must_use]
    pub const fn new(rng_seed: u64, combat: CombatTuning) -> Self {
        Self { rng_seed, combat }
    }

    /// Default configuration with a different random seed.
    #[must_use]
    pub fn with_seed(rng_seed: u64) -> Self {
        Self::new(rng_seed, CombatTuning::default())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::with_seed(DEFAULT_RNG_SEED)
    }
}

/// Deferred work registered against the world's scheduler.
///
/// Every task names its actor by identifier and is re-validated when it
/// fires, so a task outliving its actor does nothing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Task {
    SlowExpired {
        hero: HeroId,
    },
    AttackCycle {
        hero: HeroId,
    },
    Strike {
        hero: HeroId,
        damage: u32,
        hit_variant: u8,
    },
    SequenceComplete {
        hero: HeroId,
        cause: DespawnCause,
    },
    Rearm {
        structure: StructureId,
    },
}

/// Represents the authoritative dungeon state.
#[derive(Debug)]
pub struct World {
    grid: Grid,
    path: Path,
    heroes: Vec<Hero>,
    structures: StructureRegistry,
    candidate: Option<Candidate>,
    scheduler: Scheduler<Task>,
    resolver: CombatResolver,
    validator: PlacementValidator,
    gold: u32,
    next_hero_id: HeroId,
    tick_index: u64,
}

impl World {
    /// Creates a dungeon from authored layout data.
    pub fn new(layout: &DungeonLayout, config: Config) -> Result<Self, LayoutError> {
        let grid = Grid::from_layout(layout)?;
        let path = Path::from_layout(layout)?;
        Ok(Self {
            grid,
            path,
            heroes: Vec::new(),
            structures: StructureRegistry::new(),
            candidate: None,
            scheduler: Scheduler::new(),
            resolver: CombatResolver::new(config.combat, config.rng_seed),
            validator: PlacementValidator::new(),
            gold: 0,
            next_hero_id: HeroId::new(0),
            tick_index: 0,
        })
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.tick_index = self.tick_index.saturating_add(1);
        self.scheduler.advance(dt);
        out_events.push(Event::TimeAdvanced { dt });

        while let Some(task) = self.scheduler.pop_due() {
            self.run_task(task, out_events);
        }

        let elapsed_ms = dt.as_secs_f32() * 1_000.0;
        let mut ctx = HeroContext {
            path: &self.path,
            grid: &self.grid,
            scheduler: &mut self.scheduler,
            resolver: &mut self.resolver,
            events: out_events,
        };
        for hero in &mut self.heroes {
            hero.tick(elapsed_ms, &mut ctx);
        }
    }

    fn run_task(&mut self, task: Task, out_events: &mut Vec<Event>) {
        debug!(?task, now = ?self.scheduler.now(), "task fired");
        match task {
            Task::SlowExpired { hero } => {
                if let Some(hero) = self.heroes.iter_mut().find(|entry| entry.id == hero) {
                    hero.recover(out_events);
                }
            }
            Task::AttackCycle { hero } => {
                let Some(hero) = self.heroes.iter_mut().find(|entry| entry.id == hero) else {
                    return;
                };
                let mut ctx = HeroContext {
                    path: &self.path,
                    grid: &self.grid,
                    scheduler: &mut self.scheduler,
                    resolver: &mut self.resolver,
                    events: out_events,
                };
                hero.attack_cycle(&mut ctx);
            }
            Task::Strike {
                hero,
                damage,
                hit_variant,
            } => {
                if self.hero_index(hero).is_none() {
                    return;
                }
                out_events.push(Event::SoundRequested {
                    sound: SoundId::HeroHit(hit_variant),
                });
                out_events.push(Event::HeroStruck { hero, damage });
                self.set_gold(self.gold.saturating_sub(damage), out_events);
            }
            Task::SequenceComplete { hero, cause } => {
                let Some(index) = self.hero_index(hero) else {
                    return;
                };
                if !self.heroes[index].completes(cause) {
                    return;
                }
                let _ = self.heroes.remove(index);
                info!(hero = hero.get(), ?cause, "hero despawned");
                out_events.push(Event::HeroDespawned { hero, cause });
            }
            Task::Rearm { structure } => {
                if let Some(entry) = self.structures.get_mut(structure) {
                    if entry.refresh_attack() {
                        out_events.push(Event::StructureRearmed { structure });
                    }
                }
            }
        }
    }

    fn spawn_hero(&mut self, out_events: &mut Vec<Event>) {
        let id = self.next_hero_id;
        self.next_hero_id = HeroId::new(id.get().saturating_add(1));

        let hero = Hero::spawn(id, &self.path, &self.grid);
        info!(hero = id.get(), "hero entered the dungeon");
        out_events.push(Event::HeroSpawned {
            hero: id,
            position: hero.position(),
        });
        out_events.push(Event::HeroAnimationChanged {
            hero: id,
            animation: hero.animation(),
        });
        self.heroes.push(hero);
    }

    fn commit_placement(&mut self, position: WorldPoint, out_events: &mut Vec<Event>) {
        let Some(candidate) = self.candidate.take() else {
            debug!("placement committed without a candidate");
            return;
        };

        let structures = &self.structures;
        let decision = self
            .grid
            .cell_at(position)
            .ok_or(PlacementError::OutOfBounds)
            .and_then(|cell| {
                self.validator
                    .validate(candidate.kind, cell, &self.grid, |cell| {
                        structures.is_occupied(cell)
                    })
            });

        match decision {
            Ok(cell) => {
                let structure = self.structures.insert(candidate.kind, cell);
                if candidate.kind == StructureKind::Tower {
                    let _ = self
                        .scheduler
                        .schedule(TOWER_REFRESH, true, Task::Rearm { structure });
                }
                debug!(structure = structure.get(), kind = ?candidate.kind, ?cell, "structure placed");
                out_events.push(Event::StructurePlaced {
                    structure,
                    kind: candidate.kind,
                    cell,
                    position: self.grid.cell_center(cell),
                });
            }
            Err(reason) => {
                debug!(kind = ?candidate.kind, %reason, "placement rejected");
                out_events.push(Event::CandidateDiscarded {
                    kind: candidate.kind,
                    reason,
                });
            }
        }
    }

    fn trigger_structure(
        &mut self,
        structure: StructureId,
        hero: HeroId,
        out_events: &mut Vec<Event>,
    ) {
        let Some(entry) = self.structures.get_mut(structure) else {
            return;
        };
        let Some(target) = self.heroes.iter_mut().find(|entry| entry.id == hero) else {
            return;
        };

        let mut ctx = HeroContext {
            path: &self.path,
            grid: &self.grid,
            scheduler: &mut self.scheduler,
            resolver: &mut self.resolver,
            events: out_events,
        };
        let Some(dealt) = entry.trigger(target, &mut ctx) else {
            return;
        };
        debug!(
            structure = structure.get(),
            kind = ?entry.kind(),
            hero = hero.get(),
            dealt,
            "structure triggered"
        );

        let loot = dealt.round() as u32;
        if loot > 0 {
            self.set_gold(self.gold.saturating_add(loot), out_events);
        }
    }

    fn set_gold(&mut self, gold: u32, out_events: &mut Vec<Event>) {
        if gold != self.gold {
            self.gold = gold;
            out_events.push(Event::GoldChanged { gold });
        }
    }

    fn hero_index(&self, hero: HeroId) -> Option<usize> {
        self.heroes.iter().position(|entry| entry.id == hero)
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::SpawnHero => world.spawn_hero(out_events),
        Command::BeginPlacement { kind } => {
            world.candidate = Some(Candidate::new(kind));
            out_events.push(Event::CandidateCreated { kind });
        }
        Command::TrackCandidate { position } => {
            if let Some(candidate) = world.candidate.as_mut() {
                candidate.position = position;
                out_events.push(Event::CandidateMoved { position });
            }
        }
        Command::CommitPlacement { position } => world.commit_placement(position, out_events),
        Command::TriggerStructure { structure, hero } => {
            world.trigger_structure(structure, hero, out_events);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use dungeon_defence_core::{
        Grid, HeroId, HeroSnapshot, HeroView, StructureKind, StructureView, WorldPoint,
    };

    use super::World;

    /// Provides read-only access to the placement grid.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.grid
    }

    /// Captures a read-only view of the heroes inside the dungeon.
    #[must_use]
    pub fn hero_view(world: &World) -> HeroView {
        HeroView::from_snapshots(world.heroes.iter().map(|hero| hero.snapshot()).collect())
    }

    /// Captures the state of a single hero.
    #[must_use]
    pub fn hero(world: &World, hero: HeroId) -> Option<HeroSnapshot> {
        world
            .heroes
            .iter()
            .find(|entry| entry.id == hero)
            .map(|entry| entry.snapshot())
    }

    /// Captures a read-only view of the placed structures.
    #[must_use]
    pub fn structure_view(world: &World) -> StructureView {
        StructureView::from_snapshots(world.structures.iter().map(|entry| entry.snapshot()).collect())
    }

    /// Kind and pointer position of the active placement candidate, if any.
    #[must_use]
    pub fn candidate(world: &World) -> Option<(StructureKind, WorldPoint)> {
        world
            .candidate
            .map(|candidate| (candidate.kind, candidate.position))
    }

    /// Current gold balance.
    #[must_use]
    pub fn gold(world: &World) -> u32 {
        world.gold
    }

    /// Simulated time elapsed since the world was created.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.scheduler.now()
    }

    /// Number of ticks processed so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }
}

/// Layout of the reference dungeon: an 11x6 grid with a winding path.
#[must_use]
pub fn reference_layout() -> DungeonLayout {
    const MAP: [[u8; 6]; 11] = [
        [1, 1, 1, 1, 1, 2],
        [1, 0, 0, 0, 1, 0],
        [1, 0, 1, 0, 1, 0],
        [1, 0, 1, 0, 1, 0],
        [1, 0, 1, 0, 1, 0],
        [1, 0, 1, 0, 1, 0],
        [1, 0, 1, 0, 1, 0],
        [1, 0, 1, 0, 0, 0],
        [1, 0, 1, 1, 1, 0],
        [2, 0, 1, 1, 1, 1],
        [1, 1, 1, 1, 1, 1],
    ];
    const WAYPOINTS: [(f32, f32); 7] = [
        (855.0, -45.0),
        (855.0, 135.0),
        (135.0, 135.0),
        (135.0, 315.0),
        (675.0, 315.0),
        (675.0, 495.0),
        (45.0, 495.0),
    ];

    let columns = MAP
        .iter()
        .map(|column| {
            column
                .iter()
                .map(|&class| match class {
                    0 => CellClass::TrapPlaceable,
                    1 => CellClass::TowerPlaceable,
                    _ => CellClass::NotPlaceable,
                })
                .collect()
        })
        .collect();

    DungeonLayout {
        columns,
        cell_size: 90.0,
        offset: WorldPoint::new(145.0, 35.0),
        waypoints: WAYPOINTS
            .iter()
            .map(|&(x, y)| WorldPoint::new(x, y))
            .collect(),
    }
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Dungeon Defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative dungeon, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the dungeon executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems and
//! presenters to react to. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

mod grid;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use grid::Grid;

/// Commands that express all permissible dungeon mutations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that a new hero enters the dungeon at the start of the path.
    SpawnHero,
    /// Creates an unplaced placement candidate of the provided kind.
    BeginPlacement {
        /// Kind of structure the candidate will become once placed.
        kind: StructureKind,
    },
    /// Moves the active placement candidate so it follows the pointer.
    TrackCandidate {
        /// Pointer location expressed in world units.
        position: WorldPoint,
    },
    /// Attempts to place the active candidate at the provided pointer location.
    CommitPlacement {
        /// Pointer location expressed in world units.
        position: WorldPoint,
    },
    /// Requests that a placed structure reacts to a hero inside its range.
    TriggerStructure {
        /// Structure whose trigger should run.
        structure: StructureId,
        /// Hero that entered the structure's range.
        hero: HeroId,
    },
}

/// Events broadcast by the dungeon after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a hero entered the dungeon.
    HeroSpawned {
        /// Identifier assigned to the new hero.
        hero: HeroId,
        /// World position sampled at the start of the path.
        position: WorldPoint,
    },
    /// Reports the hero's new path-sampled world position.
    HeroMoved {
        /// Hero that moved.
        hero: HeroId,
        /// World position after the move.
        position: WorldPoint,
    },
    /// Announces the visual sequence a hero should now play.
    HeroAnimationChanged {
        /// Hero whose animation changed.
        hero: HeroId,
        /// Animation that should play.
        animation: HeroAnimation,
    },
    /// Announces a hero state machine transition.
    HeroActionChanged {
        /// Hero that transitioned.
        hero: HeroId,
        /// State before the transition.
        from: HeroAction,
        /// State after the transition.
        to: HeroAction,
    },
    /// Damage emitted by a hero's attack cycle once the strike lands.
    HeroStruck {
        /// Hero that performed the attack.
        hero: HeroId,
        /// Damage rolled for the strike.
        damage: u32,
    },
    /// Confirms that damage was applied to a hero.
    HeroDamaged {
        /// Hero that took the damage.
        hero: HeroId,
        /// Damage actually dealt, clamped to the health the hero had left.
        dealt: f32,
        /// Health remaining after the hit. Drops below zero on a killing blow.
        health: f32,
    },
    /// Confirms that a hero became slowed.
    HeroSlowed {
        /// Hero that was slowed.
        hero: HeroId,
    },
    /// Confirms that a hero's slow effect expired.
    HeroRecovered {
        /// Hero that recovered.
        hero: HeroId,
    },
    /// Announces that a hero's health was exhausted.
    HeroDied {
        /// Hero that died.
        hero: HeroId,
        /// Death reaction selected for the hero.
        reaction: DeathReaction,
    },
    /// Confirms that a hero was removed from the dungeon.
    HeroDespawned {
        /// Hero that was removed.
        hero: HeroId,
        /// Terminal sequence that completed.
        cause: DespawnCause,
    },
    /// Requests fire-and-forget playback of a sound.
    SoundRequested {
        /// Sound that should play.
        sound: SoundId,
    },
    /// Confirms that a placement candidate now follows the pointer.
    CandidateCreated {
        /// Kind of the candidate.
        kind: StructureKind,
    },
    /// Reports the candidate's pointer-tracked position.
    CandidateMoved {
        /// Pointer location expressed in world units.
        position: WorldPoint,
    },
    /// Reports that a candidate was discarded without being placed.
    CandidateDiscarded {
        /// Kind of the discarded candidate.
        kind: StructureKind,
        /// Reason the placement was rejected.
        reason: PlacementError,
    },
    /// Confirms that a structure was placed into the dungeon.
    StructurePlaced {
        /// Identifier allocated to the structure.
        structure: StructureId,
        /// Kind of the structure.
        kind: StructureKind,
        /// Grid cell the structure occupies.
        cell: CellCoord,
        /// World position snapped to the centre of the cell.
        position: WorldPoint,
    },
    /// Confirms that a structure reacted to a hero.
    StructureTriggered {
        /// Structure that triggered.
        structure: StructureId,
        /// Hero affected by the trigger.
        hero: HeroId,
    },
    /// Confirms that a structure's cooldown gate reopened.
    StructureRearmed {
        /// Structure whose gate reopened.
        structure: StructureId,
    },
    /// Reports the dungeon's updated gold balance.
    GoldChanged {
        /// Balance after the change.
        gold: u32,
    },
}

/// Unique identifier assigned to a hero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HeroId(u32);

impl HeroId {
    /// Creates a new hero identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a placed structure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StructureId(u32);

impl StructureId {
    /// Creates a new structure identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the structure identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Continuous location expressed in world units.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldPoint {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate, growing downwards.
    pub y: f32,
}

impl WorldPoint {
    /// Creates a new world point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Linearly interpolates towards `other` by `fraction`.
    #[must_use]
    pub fn lerp(self, other: WorldPoint, fraction: f32) -> Self {
        Self {
            x: self.x + (other.x - self.x) * fraction,
            y: self.y + (other.y - self.y) * fraction,
        }
    }

    /// Euclidean distance between two points.
    #[must_use]
    pub fn distance(self, other: WorldPoint) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Logical position measured in grid cells, used for range checks.
///
/// The centre of cell `(column, row)` maps to `(column, row)`, so positions
/// between cells are fractional and positions outside the grid may be negative.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct MapPosition {
    /// Horizontal coordinate in cells.
    pub x: f32,
    /// Vertical coordinate in cells.
    pub y: f32,
}

impl MapPosition {
    /// Creates a new map position.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Map position of the centre of the provided cell.
    #[must_use]
    pub fn from_cell(cell: CellCoord) -> Self {
        Self {
            x: cell.column() as f32,
            y: cell.row() as f32,
        }
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Placement classification authored for every grid cell.
///
/// Layout files encode the classes as `0`, `1` and `2` respectively.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum CellClass {
    /// Only traps may be placed on the cell.
    TrapPlaceable,
    /// Only towers may be placed on the cell.
    TowerPlaceable,
    /// Nothing may be placed on the cell.
    NotPlaceable,
}

impl TryFrom<u8> for CellClass {
    type Error = LayoutError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::TrapPlaceable),
            1 => Ok(Self::TowerPlaceable),
            2 => Ok(Self::NotPlaceable),
            other => Err(LayoutError::UnknownCellClass(other)),
        }
    }
}

impl From<CellClass> for u8 {
    fn from(class: CellClass) -> Self {
        match class {
            CellClass::TrapPlaceable => 0,
            CellClass::TowerPlaceable => 1,
            CellClass::NotPlaceable => 2,
        }
    }
}

/// Types of structures the player can place in the dungeon.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureKind {
    /// Single-use floor trap that damages the first hero stepping on it.
    Trap,
    /// Tower that periodically slows heroes walking past.
    Tower,
}

impl StructureKind {
    /// Returns the axis-aligned attack range measured in cells.
    ///
    /// A hero is in range when both axis distances between continuous map
    /// positions are strictly below it. A trap therefore reaches up to one
    /// cell width from its centre, which spills into neighbouring cells.
    #[must_use]
    pub const fn attack_range(self) -> f32 {
        match self {
            Self::Trap => 1.0,
            Self::Tower => 2.0,
        }
    }

    /// Cell classification the kind requires for placement.
    #[must_use]
    pub const fn required_class(self) -> CellClass {
        match self {
            Self::Trap => CellClass::TrapPlaceable,
            Self::Tower => CellClass::TowerPlaceable,
        }
    }
}

/// States of the hero behaviour state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HeroAction {
    /// Following the path towards its end.
    Walking,
    /// Standing at the end of the path attacking the dungeon keeper.
    Attacking,
    /// Teleporting out after running out of stamina.
    Leaving,
    /// Playing the death sequence after running out of health.
    Dying,
}

impl HeroAction {
    /// Reports whether the state ends with the hero being removed.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Leaving | Self::Dying)
    }
}

/// Horizontal facing derived from path lookahead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Facing {
    /// Walking towards decreasing x.
    Left,
    /// Walking towards increasing x.
    Right,
    /// Walking straight down (no horizontal motion).
    Down,
}

/// Semantic animation a presenter should play for a hero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HeroAnimation {
    /// Looping walk cycle in the provided direction.
    Walk(Facing),
    /// Attack swing.
    Attack,
    /// Teleport-out sequence followed by a fade.
    Teleport,
    /// Death sequence followed by a fade.
    Death,
}

/// Reaction played when a hero dies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeathReaction {
    /// One of the equally weighted common reactions, numbered from 1.
    Common(u8),
    /// The rare reaction.
    Rare,
}

impl DeathReaction {
    /// Number of common reactions available.
    pub const COMMON_VARIANTS: u8 = 3;

    /// Sound that accompanies the reaction.
    #[must_use]
    pub const fn sound(self) -> SoundId {
        match self {
            Self::Common(variant) => SoundId::HeroDeath(variant),
            Self::Rare => SoundId::HeroDeath(Self::COMMON_VARIANTS + 1),
        }
    }
}

/// Terminal sequence that removed a hero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DespawnCause {
    /// The hero teleported out.
    Left,
    /// The hero died.
    Died,
}

/// Sounds the core asks the audio collaborator to play.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SoundId {
    /// Hero teleporting out of the dungeon.
    HeroTeleport,
    /// Hero strike landing, numbered variant.
    HeroHit(u8),
    /// Hero death reaction, numbered variant.
    HeroDeath(u8),
    /// Trap springing.
    TrapSprung,
    /// Tower slowing a hero.
    TowerPulse,
}

/// Reasons a placement candidate may be discarded by the dungeon.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PlacementError {
    /// The committed location lies outside the grid.
    #[error("placement lies outside the grid")]
    OutOfBounds,
    /// The cell's classification does not accept the structure kind.
    #[error("cell does not accept this kind of structure")]
    WrongClassification,
    /// Another structure already occupies the cell.
    #[error("cell is already occupied")]
    Occupied,
}

/// Reasons authored dungeon data may be rejected at construction.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum LayoutError {
    /// The grid has no columns or no rows.
    #[error("grid must contain at least one cell")]
    EmptyGrid,
    /// Grid columns have differing lengths.
    #[error("grid column {column} has {found} rows, expected {expected}")]
    RaggedGrid {
        /// Offending column index.
        column: usize,
        /// Rows the first column established.
        expected: usize,
        /// Rows found in the offending column.
        found: usize,
    },
    /// A cell class value is not one of the known encodings.
    #[error("unknown cell class {0}")]
    UnknownCellClass(u8),
    /// The cell size is zero, negative or not finite.
    #[error("cell size must be positive, got {0}")]
    InvalidCellSize(f32),
    /// The path has fewer than two waypoints.
    #[error("path needs at least two waypoints, got {0}")]
    TooFewWaypoints(usize),
}

/// Authored dungeon data loaded once at construction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DungeonLayout {
    /// Cell classes indexed as `columns[column][row]`.
    pub columns: Vec<Vec<CellClass>>,
    /// Side length of a square cell in world units.
    pub cell_size: f32,
    /// World position of the grid's upper-left corner.
    pub offset: WorldPoint,
    /// Path waypoints relative to the grid offset.
    pub waypoints: Vec<WorldPoint>,
}

/// Immutable representation of a single hero's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeroSnapshot {
    /// Unique identifier assigned to the hero.
    pub id: HeroId,
    /// Current state machine state.
    pub action: HeroAction,
    /// Normalized progress along the path.
    pub progress: f32,
    /// Path-sampled world position.
    pub position: WorldPoint,
    /// Last logical cell-space position refreshed by the dungeon.
    pub map_position: MapPosition,
    /// Remaining health.
    pub health: f32,
    /// Remaining stamina.
    pub stamina: f32,
    /// Whether the slow penalty is active.
    pub slowed: bool,
    /// Whether structures may still target the hero.
    pub targetable: bool,
}

/// Read-only snapshot describing all heroes within the dungeon.
#[derive(Clone, Debug, Default)]
pub struct HeroView {
    snapshots: Vec<HeroSnapshot>,
}

impl HeroView {
    /// Creates a new hero view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<HeroSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured hero snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &HeroSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up a single hero by identifier.
    #[must_use]
    pub fn get(&self, hero: HeroId) -> Option<&HeroSnapshot> {
        self.snapshots
            .binary_search_by_key(&hero, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }
}

/// Immutable representation of a single placed structure.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StructureSnapshot {
    /// Identifier allocated to the structure by the dungeon.
    pub id: StructureId,
    /// Kind of structure that was placed.
    pub kind: StructureKind,
    /// Cell occupied by the structure.
    pub cell: CellCoord,
    /// Logical position used for range checks.
    pub map_position: MapPosition,
    /// Whether the cooldown gate currently allows a trigger.
    pub armed: bool,
}

/// Read-only snapshot describing all placed structures.
#[derive(Clone, Debug, Default)]
pub struct StructureView {
    snapshots: Vec<StructureSnapshot>,
}

impl StructureView {
    /// Creates a new structure view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<StructureSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured structure snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &StructureSnapshot> {
        self.snapshots.iter()
    }
}

//! Authoritative structure state and kind-specific triggers.

use std::{collections::BTreeMap, time::Duration};

use dungeon_defence_core::{
    CellCoord, Event, MapPosition, SoundId, StructureId, StructureKind, StructureSnapshot,
    WorldPoint,
};

use crate::hero::{Hero, HeroContext};

/// Damage a trap deals when it springs.
pub const TRAP_DAMAGE: f32 = 35.0;
/// Interval at which a tower's cooldown gate reopens.
pub const TOWER_REFRESH: Duration = Duration::from_millis(2_000);

/// Structure following the pointer before it is committed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Candidate {
    pub(crate) kind: StructureKind,
    pub(crate) position: WorldPoint,
}

impl Candidate {
    pub(crate) const fn new(kind: StructureKind) -> Self {
        Self {
            kind,
            position: WorldPoint::new(0.0, 0.0),
        }
    }
}

/// A placed structure. Its cell and position never change after placement.
#[derive(Clone, Debug)]
pub(crate) struct StructureState {
    id: StructureId,
    kind: StructureKind,
    cell: CellCoord,
    map_position: MapPosition,
    armed: bool,
}

impl StructureState {
    pub(crate) const fn kind(&self) -> StructureKind {
        self.kind
    }

    pub(crate) fn snapshot(&self) -> StructureSnapshot {
        StructureSnapshot {
            id: self.id,
            kind: self.kind,
            cell: self.cell,
            map_position: self.map_position,
            armed: self.armed,
        }
    }

    /// Reopens the cooldown gate. Returns whether the gate was closed.
    pub(crate) fn refresh_attack(&mut self) -> bool {
        let was_closed = !self.armed;
        self.armed = true;
        was_closed
    }

    /// Runs the kind-specific reaction against `hero`.
    ///
    /// Returns the damage dealt, or `None` when the gate is closed or the
    /// hero can no longer be targeted.
    pub(crate) fn trigger(&mut self, hero: &mut Hero, ctx: &mut HeroContext<'_>) -> Option<f32> {
        if !self.armed || !hero.targetable() {
            return None;
        }

        self.armed = false;
        ctx.events.push(Event::StructureTriggered {
            structure: self.id,
            hero: hero.id,
        });

        match self.kind {
            StructureKind::Trap => {
                ctx.events.push(Event::SoundRequested {
                    sound: SoundId::TrapSprung,
                });
                Some(hero.apply_damage(TRAP_DAMAGE, ctx))
            }
            StructureKind::Tower => {
                ctx.events.push(Event::SoundRequested {
                    sound: SoundId::TowerPulse,
                });
                hero.apply_slow(ctx);
                Some(0.0)
            }
        }
    }
}

/// Registry that stores placed structures and allocates identifiers.
#[derive(Debug)]
pub(crate) struct StructureRegistry {
    entries: BTreeMap<StructureId, StructureState>,
    next_structure_id: StructureId,
}

impl StructureRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_structure_id: StructureId::new(0),
        }
    }

    pub(crate) fn insert(&mut self, kind: StructureKind, cell: CellCoord) -> StructureId {
        let id = self.next_structure_id;
        self.next_structure_id = StructureId::new(id.get().saturating_add(1));
        let _ = self.entries.insert(
            id,
            StructureState {
                id,
                kind,
                cell,
                map_position: MapPosition::from_cell(cell),
                armed: true,
            },
        );
        id
    }

    pub(crate) fn get_mut(&mut self, id: StructureId) -> Option<&mut StructureState> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn is_occupied(&self, cell: CellCoord) -> bool {
        self.entries.values().any(|structure| structure.cell == cell)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &StructureState> {
        self.entries.values()
    }
}

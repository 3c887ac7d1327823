#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that pairs armed structures with heroes inside their range.

use dungeon_defence_core::{
    Command, HeroId, HeroSnapshot, HeroView, MapPosition, StructureSnapshot, StructureView,
};

/// Structure targeting system that reuses a scratch buffer between frames.
#[derive(Debug, Default)]
pub struct StructureTargeting {
    hero_workspace: Vec<HeroCandidate>,
}

impl StructureTargeting {
    /// Creates a new targeting system with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `Command::TriggerStructure` for every armed structure that has a
    /// targetable hero in range.
    ///
    /// Each structure triggers on at most one hero per frame, the lowest
    /// identifier winning, because every trigger closes the structure's gate.
    pub fn handle(&mut self, structures: &StructureView, heroes: &HeroView, out: &mut Vec<Command>) {
        self.prepare_hero_workspace(heroes);
        if self.hero_workspace.is_empty() {
            return;
        }

        for structure in structures.iter().filter(|structure| structure.armed) {
            let target = self
                .hero_workspace
                .iter()
                .find(|hero| within_range(structure, hero.map_position));

            if let Some(hero) = target {
                out.push(Command::TriggerStructure {
                    structure: structure.id,
                    hero: hero.id,
                });
            }
        }
    }

    fn prepare_hero_workspace(&mut self, heroes: &HeroView) {
        self.hero_workspace.clear();
        self.hero_workspace.extend(
            heroes
                .iter()
                .filter(|hero| hero.targetable)
                .map(|hero| HeroCandidate {
                    id: hero.id,
                    map_position: hero.map_position,
                }),
        );
    }
}

/// Reports whether `hero` stands inside the structure's square range.
///
/// Heroes that are no longer targetable are never in range.
#[must_use]
pub fn is_in_range(structure: &StructureSnapshot, hero: &HeroSnapshot) -> bool {
    hero.targetable && within_range(structure, hero.map_position)
}

fn within_range(structure: &StructureSnapshot, hero: MapPosition) -> bool {
    let range = structure.kind.attack_range();
    (hero.x - structure.map_position.x).abs() < range
        && (hero.y - structure.map_position.y).abs() < range
}

#[derive(Clone, Copy, Debug)]
struct HeroCandidate {
    id: HeroId,
    map_position: MapPosition,
}

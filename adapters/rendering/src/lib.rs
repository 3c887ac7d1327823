#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared presentation contracts for Dungeon Defence adapters.
//!
//! The simulation never draws or plays audio itself. It emits semantic
//! events; the [`Stage`] translates them into calls on a [`Presenter`]
//! implemented by the concrete backend.

use std::collections::BTreeMap;

use anyhow::Result as AnyResult;
use dungeon_defence_core::{
    Event, HeroAnimation, HeroId, SoundId, StructureId, StructureKind, WorldPoint,
};
use glam::Vec2;

/// Opaque handle to a visual owned by a presenter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VisualHandle(u32);

impl VisualHandle {
    /// Creates a new handle with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the handle.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Actor a visual represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VisualKind {
    /// A hero walking the path.
    Hero,
    /// A placed structure.
    Structure(StructureKind),
    /// A structure still following the pointer.
    Candidate(StructureKind),
}

/// Semantic state a visual should display.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VisualState {
    /// Hero animation to play.
    Hero(HeroAnimation),
    /// Structure ready to trigger.
    Armed,
    /// Structure whose trigger has fired and not yet reopened.
    Spent,
}

/// Backend surface that owns visuals and audio.
pub trait Presenter {
    /// Creates a visual for `kind` at `position` and returns its handle.
    fn spawn_visual(&mut self, kind: VisualKind, position: Vec2) -> AnyResult<VisualHandle>;

    /// Moves an existing visual.
    fn set_visual_position(&mut self, handle: VisualHandle, position: Vec2) -> AnyResult<()>;

    /// Switches the state displayed by an existing visual.
    fn set_visual_state(&mut self, handle: VisualHandle, state: VisualState) -> AnyResult<()>;

    /// Removes a visual. The handle is not reused afterwards.
    fn destroy_visual(&mut self, handle: VisualHandle) -> AnyResult<()>;

    /// Plays a one-shot sound effect.
    fn play_sound(&mut self, sound: SoundId) -> AnyResult<()>;
}

/// Converts a world point into the vector type used by presenters.
#[must_use]
pub fn to_vec2(point: WorldPoint) -> Vec2 {
    Vec2::new(point.x, point.y)
}

/// Tracks which visual belongs to which simulation actor.
#[derive(Debug, Default)]
pub struct Stage {
    heroes: BTreeMap<HeroId, VisualHandle>,
    structures: BTreeMap<StructureId, VisualHandle>,
    candidate: Option<VisualHandle>,
}

impl Stage {
    /// Creates an empty stage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Visual currently representing `hero`, if any.
    #[must_use]
    pub fn hero_visual(&self, hero: HeroId) -> Option<VisualHandle> {
        self.heroes.get(&hero).copied()
    }

    /// Visual currently representing `structure`, if any.
    #[must_use]
    pub fn structure_visual(&self, structure: StructureId) -> Option<VisualHandle> {
        self.structures.get(&structure).copied()
    }

    /// Visual following the pointer, if a candidate is active.
    #[must_use]
    pub const fn candidate_visual(&self) -> Option<VisualHandle> {
        self.candidate
    }

    /// Forwards the presentation-relevant part of `events` to `presenter`.
    pub fn present<P>(&mut self, events: &[Event], presenter: &mut P) -> AnyResult<()>
    where
        P: Presenter + ?Sized,
    {
        for event in events {
            self.present_event(event, presenter)?;
        }
        Ok(())
    }

    fn present_event<P>(&mut self, event: &Event, presenter: &mut P) -> AnyResult<()>
    where
        P: Presenter + ?Sized,
    {
        match *event {
            Event::HeroSpawned { hero, position } => {
                let handle = presenter.spawn_visual(VisualKind::Hero, to_vec2(position))?;
                if let Some(stale) = self.heroes.insert(hero, handle) {
                    presenter.destroy_visual(stale)?;
                }
            }
            Event::HeroMoved { hero, position } => {
                if let Some(handle) = self.hero_visual(hero) {
                    presenter.set_visual_position(handle, to_vec2(position))?;
                }
            }
            Event::HeroAnimationChanged { hero, animation } => {
                if let Some(handle) = self.hero_visual(hero) {
                    presenter.set_visual_state(handle, VisualState::Hero(animation))?;
                }
            }
            Event::HeroDespawned { hero, .. } => {
                if let Some(handle) = self.heroes.remove(&hero) {
                    presenter.destroy_visual(handle)?;
                }
            }
            Event::SoundRequested { sound } => presenter.play_sound(sound)?,
            Event::CandidateCreated { kind } => {
                self.clear_candidate(presenter)?;
                self.candidate =
                    Some(presenter.spawn_visual(VisualKind::Candidate(kind), Vec2::ZERO)?);
            }
            Event::CandidateMoved { position } => {
                if let Some(handle) = self.candidate {
                    presenter.set_visual_position(handle, to_vec2(position))?;
                }
            }
            Event::CandidateDiscarded { .. } => self.clear_candidate(presenter)?,
            Event::StructurePlaced {
                structure,
                kind,
                position,
                ..
            } => {
                self.clear_candidate(presenter)?;
                let handle =
                    presenter.spawn_visual(VisualKind::Structure(kind), to_vec2(position))?;
                let _ = self.structures.insert(structure, handle);
            }
            Event::StructureTriggered { structure, .. } => {
                if let Some(handle) = self.structure_visual(structure) {
                    presenter.set_visual_state(handle, VisualState::Spent)?;
                }
            }
            Event::StructureRearmed { structure } => {
                if let Some(handle) = self.structure_visual(structure) {
                    presenter.set_visual_state(handle, VisualState::Armed)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn clear_candidate<P>(&mut self, presenter: &mut P) -> AnyResult<()>
    where
        P: Presenter + ?Sized,
    {
        match self.candidate.take() {
            Some(handle) => presenter.destroy_visual(handle),
            None => Ok(()),
        }
    }
}

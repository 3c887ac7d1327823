#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure builder system translating pointer input into placement commands.

use dungeon_defence_core::{Command, Event, StructureKind, WorldPoint};

/// Input snapshot distilled from adapter-provided frame input data.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct BuilderInput {
    /// Structure picked from the build menu on this frame, if any.
    pub picked: Option<StructureKind>,
    /// Indicates whether the pointer was released on this frame.
    pub released: bool,
    /// Pointer location expressed in world units.
    pub pointer: WorldPoint,
}

impl BuilderInput {
    /// Creates a new input descriptor with explicit field values.
    #[must_use]
    pub const fn new(picked: Option<StructureKind>, released: bool, pointer: WorldPoint) -> Self {
        Self {
            picked,
            released,
            pointer,
        }
    }
}

/// Builder system that drags a placement candidate with the pointer.
///
/// The system learns about the candidate's lifecycle from world events, so a
/// release is only forwarded once the world acknowledged the candidate.
#[derive(Debug, Clone, Default)]
pub struct Builder {
    dragging: Option<StructureKind>,
    last_pointer: Option<WorldPoint>,
}

impl Builder {
    /// Creates a new builder system instance.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            dragging: None,
            last_pointer: None,
        }
    }

    /// Kind of the candidate currently being dragged, if any.
    #[must_use]
    pub const fn dragging(&self) -> Option<StructureKind> {
        self.dragging
    }

    /// Consumes world events and adapter-derived input to emit builder commands.
    pub fn handle(&mut self, events: &[Event], input: BuilderInput, out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::CandidateCreated { kind } => self.dragging = Some(*kind),
                Event::StructurePlaced { .. } | Event::CandidateDiscarded { .. } => {
                    self.dragging = None;
                    self.last_pointer = None;
                }
                _ => {}
            }
        }

        if let Some(kind) = input.picked {
            out.push(Command::BeginPlacement { kind });
            out.push(Command::TrackCandidate {
                position: input.pointer,
            });
            self.last_pointer = Some(input.pointer);
            return;
        }

        if self.dragging.is_none() {
            return;
        }

        if input.released {
            out.push(Command::CommitPlacement {
                position: input.pointer,
            });
            self.dragging = None;
            self.last_pointer = None;
            return;
        }

        if self.last_pointer != Some(input.pointer) {
            out.push(Command::TrackCandidate {
                position: input.pointer,
            });
            self.last_pointer = Some(input.pointer);
        }
    }
}

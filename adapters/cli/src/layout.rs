//! Authored dungeon layouts and scripted placements loaded from TOML.

use std::{collections::VecDeque, fs, path::Path};

use anyhow::{Context, Result};
use dungeon_defence_core::{CellCoord, DungeonLayout, Grid, StructureKind};
use dungeon_defence_system_builder::BuilderInput;
use serde::Deserialize;

const EMBEDDED_LAYOUT: &str = include_str!("../assets/dungeon.toml");

/// Layout file contents: the dungeon itself plus optional opening placements.
#[derive(Debug, Deserialize)]
pub(crate) struct LayoutFile {
    pub(crate) dungeon: DungeonLayout,
    #[serde(default)]
    placements: Vec<ScriptedPlacement>,
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
struct ScriptedPlacement {
    kind: StructureKind,
    column: u32,
    row: u32,
}

impl LayoutFile {
    /// Loads the layout shipped with the binary.
    pub(crate) fn embedded() -> Result<Self> {
        parse(EMBEDDED_LAYOUT).context("embedded dungeon layout is invalid")
    }

    /// Loads a layout from disk.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read dungeon layout at {}", path.display()))?;
        parse(&contents)
            .with_context(|| format!("failed to load dungeon layout at {}", path.display()))
    }

    /// Expands the scripted placements into per-frame pointer input.
    ///
    /// Every placement takes two frames: one picking the structure with the
    /// pointer over the target cell and one releasing it there.
    pub(crate) fn script(&self, grid: &Grid) -> VecDeque<BuilderInput> {
        self.placements
            .iter()
            .flat_map(|placement| {
                let pointer = grid.cell_center(CellCoord::new(placement.column, placement.row));
                [
                    BuilderInput::new(Some(placement.kind), false, pointer),
                    BuilderInput::new(None, true, pointer),
                ]
            })
            .collect()
    }
}

fn parse(contents: &str) -> Result<LayoutFile> {
    toml::from_str(contents).context("failed to parse dungeon layout toml contents")
}

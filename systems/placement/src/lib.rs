#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure placement validation for structures on the dungeon grid.

use dungeon_defence_core::{CellCoord, Grid, PlacementError, StructureKind};

/// Stateless validator deciding whether a structure may occupy a cell.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlacementValidator;

impl PlacementValidator {
    /// Creates a new validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Reports whether `kind` may be placed on `cell` judging by the grid alone.
    ///
    /// Out-of-bounds cells are never placeable. Occupancy is not considered;
    /// use [`PlacementValidator::validate`] for the full check.
    #[must_use]
    pub fn can_place(&self, kind: StructureKind, cell: CellCoord, grid: &Grid) -> bool {
        grid.class_at(cell) == Some(kind.required_class())
    }

    /// Performs the full placement check, including occupancy.
    ///
    /// `occupied` reports whether a placed structure already holds the cell.
    pub fn validate<F>(
        &self,
        kind: StructureKind,
        cell: CellCoord,
        grid: &Grid,
        occupied: F,
    ) -> Result<CellCoord, PlacementError>
    where
        F: FnOnce(CellCoord) -> bool,
    {
        let Some(class) = grid.class_at(cell) else {
            return Err(PlacementError::OutOfBounds);
        };

        if class != kind.required_class() {
            return Err(PlacementError::WrongClassification);
        }

        if occupied(cell) {
            return Err(PlacementError::Occupied);
        }

        Ok(cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dungeon_defence_core::{CellClass, WorldPoint};

    fn grid() -> Grid {
        Grid::new(
            &[
                vec![CellClass::TrapPlaceable, CellClass::TowerPlaceable],
                vec![CellClass::NotPlaceable, CellClass::TrapPlaceable],
            ],
            90.0,
            WorldPoint::default(),
        )
        .expect("valid grid")
    }

    #[test]
    fn trap_cells_accept_only_traps() {
        let validator = PlacementValidator::new();
        let cell = CellCoord::new(0, 0);
        assert!(validator.can_place(StructureKind::Trap, cell, &grid()));
        assert!(!validator.can_place(StructureKind::Tower, cell, &grid()));
    }

    #[test]
    fn tower_cells_accept_only_towers() {
        let validator = PlacementValidator::new();
        let cell = CellCoord::new(0, 1);
        assert!(validator.can_place(StructureKind::Tower, cell, &grid()));
        assert!(!validator.can_place(StructureKind::Trap, cell, &grid()));
    }

    #[test]
    fn blocked_cells_accept_nothing() {
        let validator = PlacementValidator::new();
        let cell = CellCoord::new(1, 0);
        assert!(!validator.can_place(StructureKind::Tower, cell, &grid()));
        assert!(!validator.can_place(StructureKind::Trap, cell, &grid()));
        assert_eq!(
            validator.validate(StructureKind::Trap, cell, &grid(), |_| false),
            Err(PlacementError::WrongClassification)
        );
    }

    #[test]
    fn out_of_bounds_cells_are_rejected() {
        let validator = PlacementValidator::new();
        let cell = CellCoord::new(2, 0);
        assert!(!validator.can_place(StructureKind::Trap, cell, &grid()));
        assert_eq!(
            validator.validate(StructureKind::Trap, cell, &grid(), |_| false),
            Err(PlacementError::OutOfBounds)
        );
    }

    #[test]
    fn occupied_cells_are_rejected_after_classification() {
        let validator = PlacementValidator::new();
        let cell = CellCoord::new(1, 1);
        assert_eq!(
            validator.validate(StructureKind::Trap, cell, &grid(), |_| true),
            Err(PlacementError::Occupied)
        );
        assert_eq!(
            validator.validate(StructureKind::Trap, cell, &grid(), |_| false),
            Ok(cell)
        );
    }
}

//! Fixed placement grid and the transforms between world space and cells.

use crate::{CellClass, CellCoord, DungeonLayout, LayoutError, MapPosition, WorldPoint};

/// Immutable matrix of cell classifications anchored in world space.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    columns: u32,
    rows: u32,
    cells: Vec<CellClass>,
    cell_size: f32,
    offset: WorldPoint,
}

impl Grid {
    /// Builds a grid from column-major cell classes.
    ///
    /// Every column must hold the same number of rows and the cell size must
    /// be a positive, finite number of world units.
    pub fn new(
        columns: &[Vec<CellClass>],
        cell_size: f32,
        offset: WorldPoint,
    ) -> Result<Self, LayoutError> {
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(LayoutError::InvalidCellSize(cell_size));
        }

        let expected = columns.first().map_or(0, Vec::len);
        if expected == 0 {
            return Err(LayoutError::EmptyGrid);
        }

        let mut cells = Vec::with_capacity(columns.len() * expected);
        for (column, classes) in columns.iter().enumerate() {
            if classes.len() != expected {
                return Err(LayoutError::RaggedGrid {
                    column,
                    expected,
                    found: classes.len(),
                });
            }
            cells.extend_from_slice(classes);
        }

        Ok(Self {
            columns: u32::try_from(columns.len()).map_err(|_| LayoutError::EmptyGrid)?,
            rows: u32::try_from(expected).map_err(|_| LayoutError::EmptyGrid)?,
            cells,
            cell_size,
            offset,
        })
    }

    /// Builds the grid described by an authored layout.
    pub fn from_layout(layout: &DungeonLayout) -> Result<Self, LayoutError> {
        Self::new(&layout.columns, layout.cell_size, layout.offset)
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Side length of a single square cell in world units.
    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// World position of the grid's upper-left corner.
    #[must_use]
    pub const fn offset(&self) -> WorldPoint {
        self.offset
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Classification of the provided cell, or `None` outside the grid.
    #[must_use]
    pub fn class_at(&self, cell: CellCoord) -> Option<CellClass> {
        if !self.contains(cell) {
            return None;
        }
        let column = usize::try_from(cell.column()).ok()?;
        let row = usize::try_from(cell.row()).ok()?;
        let height = usize::try_from(self.rows).ok()?;
        self.cells.get(column * height + row).copied()
    }

    /// Converts a world point into cell indices using
    /// `floor((world - offset) / cell_size)`.
    ///
    /// Points left of or above the grid have no non-negative index and yield
    /// `None`. Points right of or below the grid yield indices that fail
    /// [`Grid::contains`].
    #[must_use]
    pub fn cell_at(&self, point: WorldPoint) -> Option<CellCoord> {
        let column = ((point.x - self.offset.x) / self.cell_size).floor();
        let row = ((point.y - self.offset.y) / self.cell_size).floor();
        if !(column.is_finite() && row.is_finite()) || column < 0.0 || row < 0.0 {
            return None;
        }
        if column > u32::MAX as f32 || row > u32::MAX as f32 {
            return None;
        }
        Some(CellCoord::new(column as u32, row as u32))
    }

    /// World position of the centre of the provided cell.
    #[must_use]
    pub fn cell_center(&self, cell: CellCoord) -> WorldPoint {
        let half = self.cell_size / 2.0;
        WorldPoint::new(
            cell.column() as f32 * self.cell_size + half + self.offset.x,
            cell.row() as f32 * self.cell_size + half + self.offset.y,
        )
    }

    /// Converts a world point into cell-centre space used for range checks.
    #[must_use]
    pub fn map_position(&self, point: WorldPoint) -> MapPosition {
        MapPosition::new(
            (point.x - self.offset.x) / self.cell_size - 0.5,
            (point.y - self.offset.y) / self.cell_size - 0.5,
        )
    }
}

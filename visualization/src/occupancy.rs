//! Dense occupancy buffer of the grid
//!
//! The buffer holds one [`Cell`] per grid location. The renderer fills a
//! base buffer with the static cells once and copies it into the frame
//! buffer before every snapshot; belief cells are layered on top while a
//! snapshot is drawn.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::fmt;

use image::Rgba;
use ndarray::Array2;
use thiserror::Error;

use crate::palette;

/// Content of a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    #[default]
    Empty,
    Trap,
    Goal,
    Landmark,
    AdversaryBelief,
    EgoBelief,
    AdversaryGoal,
    GoalArea,
}

impl Cell {
    pub fn color(self) -> Rgba<u8> {
        match self {
            Self::Empty => palette::WHITE,
            Self::Trap => palette::CRIMSON,
            Self::Goal => palette::GREEN,
            Self::Landmark => palette::GOLD,
            Self::AdversaryBelief => palette::VIOLET,
            Self::EgoBelief => palette::LIGHT_SKY_BLUE,
            Self::AdversaryGoal => palette::ORANGE,
            Self::GoalArea => palette::GREEN_YELLOW,
        }
    }
}

/// Inclusive bounds of the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridBounds {
    pub xmin: i64,
    pub ymin: i64,
    pub xmax: i64,
    pub ymax: i64,
}

impl GridBounds {
    pub fn new(xmin: i64, ymin: i64, xmax: i64, ymax: i64) -> Self {
        Self { xmin, ymin, xmax, ymax }
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        usize::try_from(self.xmax - self.xmin + 1).unwrap_or(0)
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        usize::try_from(self.ymax - self.ymin + 1).unwrap_or(0)
    }

    pub fn contains(&self, x: i64, y: i64) -> bool {
        (self.xmin..=self.xmax).contains(&x) && (self.ymin..=self.ymax).contains(&y)
    }

    /// Error unless `(x, y)` lies on the grid
    pub fn check(&self, x: i64, y: i64) -> Result<(i64, i64), OffGrid> {
        if self.contains(x, y) {
            Ok((x, y))
        } else {
            Err(OffGrid { x, y, bounds: *self })
        }
    }
}

impl fmt::Display for GridBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}..={}] x [{}..={}]", self.xmin, self.xmax, self.ymin, self.ymax)
    }
}

/// A location outside the configured grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Location x={x}, y={y} should be on the grid {bounds}")]
pub struct OffGrid {
    pub x: i64,
    pub y: i64,
    pub bounds: GridBounds,
}

/// Row-major cell buffer, row `y - ymin`, column `x - xmin`
#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    bounds: GridBounds,
    cells: Array2<Cell>,
}

impl OccupancyGrid {
    pub fn new(bounds: GridBounds) -> Self {
        Self {
            bounds,
            cells: Array2::from_elem((bounds.height(), bounds.width()), Cell::Empty),
        }
    }

    pub fn bounds(&self) -> GridBounds {
        self.bounds
    }

    pub fn get(&self, x: i64, y: i64) -> Option<Cell> {
        let index = self.index(x, y)?;
        self.cells.get(index).copied()
    }

    pub fn set(&mut self, x: i64, y: i64, cell: Cell) -> Result<(), OffGrid> {
        let index = self.index(x, y).ok_or(OffGrid {
            x,
            y,
            bounds: self.bounds,
        })?;
        self.cells[index] = cell;
        Ok(())
    }

    /// Cells with their grid coordinates, row by row
    pub fn cells(&self) -> impl Iterator<Item = (i64, i64, Cell)> + '_ {
        self.cells.indexed_iter().map(move |((row, column), cell)| {
            (self.bounds.xmin + column as i64, self.bounds.ymin + row as i64, *cell)
        })
    }

    fn index(&self, x: i64, y: i64) -> Option<(usize, usize)> {
        if !self.bounds.contains(x, y) {
            return None;
        }
        Some(((y - self.bounds.ymin) as usize, (x - self.bounds.xmin) as usize))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions() {
        let grid = OccupancyGrid::new(GridBounds::new(0, 0, 4, 2));
        assert_eq!(grid.bounds().width(), 5);
        assert_eq!(grid.bounds().height(), 3);
        assert_eq!(grid.cells().count(), 15);
        assert!(grid.cells().all(|(_, _, cell)| cell == Cell::Empty));
    }

    #[test]
    fn test_set_and_copy_from_base() {
        let mut base = OccupancyGrid::new(GridBounds::new(0, 0, 3, 3));
        base.set(3, 1, Cell::Trap).unwrap();
        assert_eq!(base.get(3, 1), Some(Cell::Trap));
        assert_eq!(base.get(1, 3), Some(Cell::Empty));

        let mut frame = base.clone();
        frame.set(1, 3, Cell::EgoBelief).unwrap();
        frame.clone_from(&base);
        assert_eq!(frame.get(1, 3), Some(Cell::Empty));
        assert_eq!(frame.get(3, 1), Some(Cell::Trap));
    }

    #[test]
    fn test_offset_bounds() {
        let mut grid = OccupancyGrid::new(GridBounds::new(1, 2, 3, 4));
        grid.set(1, 2, Cell::Goal).unwrap();
        let first = grid.cells().next().unwrap();
        assert_eq!(first, (1, 2, Cell::Goal));
        assert!(grid.set(0, 2, Cell::Goal).is_err());
    }

    #[test]
    fn test_off_grid() {
        let mut grid = OccupancyGrid::new(GridBounds::new(0, 0, 2, 2));
        let error = grid.set(3, 0, Cell::Goal).unwrap_err();
        assert_eq!(error.x, 3);
        assert!(grid.get(-1, 0).is_none());
        assert_eq!(GridBounds::new(0, 0, 2, 2).check(1, 2), Ok((1, 2)));
        assert!(GridBounds::new(0, 0, 2, 2).check(1, 5).is_err());
    }
}

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::{GameBoard, SpaceError};
use crate::tile::Tile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlacementError {
    #[error("placement cell ({x}, {y}) is outside the board")]
    OutOfBounds { x: i32, y: i32 },
    #[error(transparent)]
    Space(#[from] SpaceError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rotation {
    R0,
    R90,
    R180,
    R270,
}

impl Rotation {
    pub fn degrees(self) -> u16 {
        match self {
            Rotation::R0 => 0,
            Rotation::R90 => 90,
            Rotation::R180 => 180,
            Rotation::R270 => 270,
        }
    }

    fn next(self) -> Self {
        match self {
            Rotation::R0 => Rotation::R90,
            Rotation::R90 => Rotation::R180,
            Rotation::R180 => Rotation::R270,
            Rotation::R270 => Rotation::R0,
        }
    }

    /// Offset from the anchor cell to the second cell.
    fn offset(self) -> (i32, i32) {
        match self {
            Rotation::R0 => (1, 0),
            Rotation::R90 => (0, 1),
            Rotation::R180 => (-1, 0),
            Rotation::R270 => (0, -1),
        }
    }
}

/// A rigid two-cell placement piece.
///
/// `first` always denotes the top-left-most visual cell: rotating through
/// the 0 and 180 boundaries swaps the logical slots, while 90/270 only
/// flip the piece vertical. Either slot may be empty; placing an empty
/// slot clears the board cell it lands on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileBlock {
    first: Option<Tile>,
    second: Option<Tile>,
    rotation: Rotation,
}

impl TileBlock {
    pub fn new(first: Option<Tile>, second: Option<Tile>) -> Self {
        Self {
            first,
            second,
            rotation: Rotation::R0,
        }
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// The two tile slots, independent of rotation.
    pub fn tiles(&self) -> (Option<&Tile>, Option<&Tile>) {
        (self.first.as_ref(), self.second.as_ref())
    }

    pub fn is_vertical(&self) -> bool {
        matches!(self.rotation, Rotation::R90 | Rotation::R270)
    }

    /// Rotate 90 degrees clockwise.
    pub fn rotate(&mut self) {
        self.rotation = self.rotation.next();
        if matches!(self.rotation, Rotation::R0 | Rotation::R180) {
            std::mem::swap(&mut self.first, &mut self.second);
        }
    }

    /// The two board cells the block would occupy anchored at `(x, y)`.
    pub fn cells(&self, x: i32, y: i32) -> ((i32, i32), (i32, i32)) {
        let (dx, dy) = self.rotation.offset();
        ((x, y), (x + dx, y + dy))
    }

    /// Write the block onto the board, anchor at `(x, y)`.
    ///
    /// Fails without touching the board when either cell is out of bounds
    /// or a tile-bearing slot would land on an occupied space.
    pub fn place_on_grid(&self, x: i32, y: i32, board: &mut GameBoard) -> Result<(), PlacementError> {
        let (anchor, other) = self.cells(x, y);
        for (cx, cy) in [anchor, other] {
            if !board.in_bounds(cx, cy) {
                return Err(PlacementError::OutOfBounds { x: cx, y: cy });
            }
        }
        for (slot, (cx, cy)) in [(&self.first, anchor), (&self.second, other)] {
            if slot.is_some() {
                if let Some(space) = board.get_space(cx, cy) {
                    if space.is_occupied() {
                        return Err(SpaceError::Occupied { x: cx, y: cy }.into());
                    }
                }
            }
        }
        for (slot, (cx, cy)) in [(&self.first, anchor), (&self.second, other)] {
            match slot {
                Some(tile) => {
                    board.place_tile_at(cx, cy, tile.clone());
                }
                None => {
                    board.remove_tile_at(cx, cy);
                }
            }
        }
        Ok(())
    }
}

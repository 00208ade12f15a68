use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::tile::{Tile, TileKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SpaceError {
    #[error("space ({x}, {y}) is already occupied")]
    Occupied { x: i32, y: i32 },
    #[error("space ({x}, {y}) is empty")]
    Empty { x: i32, y: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpaceAction {
    Placed,
    Removed,
}

/// One entry in a space's append-only action log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub action: SpaceAction,
    pub timestamp: DateTime<Utc>,
    pub tile_kind: TileKind,
}

/// One grid cell. Owns at most one tile; coordinates are fixed at creation.
///
/// The history log grows on every successful place/remove and is never
/// trimmed; fine for a single session.
#[derive(Debug, Clone)]
pub struct BoardSpace {
    x: i32,
    y: i32,
    tile: Option<Tile>,
    highlighted: bool,
    history: Vec<HistoryEntry>,
}

impl BoardSpace {
    pub fn new(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            tile: None,
            highlighted: false,
            history: Vec::new(),
        }
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn is_occupied(&self) -> bool {
        self.tile.is_some()
    }

    pub fn tile(&self) -> Option<&Tile> {
        self.tile.as_ref()
    }

    pub fn tile_mut(&mut self) -> Option<&mut Tile> {
        self.tile.as_mut()
    }

    pub fn place_tile(&mut self, tile: Tile) -> Result<(), SpaceError> {
        if self.tile.is_some() {
            return Err(SpaceError::Occupied {
                x: self.x,
                y: self.y,
            });
        }
        self.history.push(HistoryEntry {
            action: SpaceAction::Placed,
            timestamp: Utc::now(),
            tile_kind: tile.kind(),
        });
        self.tile = Some(tile);
        Ok(())
    }

    pub fn remove_tile(&mut self) -> Result<Tile, SpaceError> {
        match self.tile.take() {
            Some(tile) => {
                self.history.push(HistoryEntry {
                    action: SpaceAction::Removed,
                    timestamp: Utc::now(),
                    tile_kind: tile.kind(),
                });
                Ok(tile)
            }
            None => Err(SpaceError::Empty {
                x: self.x,
                y: self.y,
            }),
        }
    }

    pub fn highlighted(&self) -> bool {
        self.highlighted
    }

    /// Flip the highlight flag, or force it when `force` is given. Purely
    /// cosmetic; the simulation never reads it.
    pub fn toggle_highlight(&mut self, force: Option<bool>) -> bool {
        self.highlighted = force.unwrap_or(!self.highlighted);
        self.highlighted
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }
}

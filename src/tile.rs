use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MIN_LEVEL: u8 = 1;
pub const MAX_LEVEL: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileKind {
    Tree,
    Farm,
    People,
    Power,
    Waste,
}

impl TileKind {
    pub const ALL: [TileKind; 5] = [
        TileKind::Tree,
        TileKind::Farm,
        TileKind::People,
        TileKind::Power,
        TileKind::Waste,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TileKind::Tree => "tree",
            TileKind::Farm => "farm",
            TileKind::People => "people",
            TileKind::Power => "power",
            TileKind::Waste => "waste",
        }
    }
}

impl fmt::Display for TileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileState {
    Neutral,
    Healthy,
    Unhealthy,
    Dead,
}

impl fmt::Display for TileState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TileState::Neutral => "neutral",
            TileState::Healthy => "healthy",
            TileState::Unhealthy => "unhealthy",
            TileState::Dead => "dead",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TileError {
    #[error("level {0} outside the allowed range {MIN_LEVEL}..={MAX_LEVEL}")]
    LevelOutOfRange(u8),
    #[error("state '{state}' is not reachable for {kind} tiles")]
    InvalidState { kind: TileKind, state: TileState },
}

/// A single placeable unit on the board.
///
/// Level stays clamped to `MIN_LEVEL..=MAX_LEVEL` and `Dead` is reachable
/// only by `Power` tiles; both invariants are enforced at construction and
/// on every mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    kind: TileKind,
    level: u8,
    state: TileState,
    age: u32,
}

impl Tile {
    pub fn new(kind: TileKind, level: u8, state: TileState) -> Result<Self, TileError> {
        if !(MIN_LEVEL..=MAX_LEVEL).contains(&level) {
            return Err(TileError::LevelOutOfRange(level));
        }
        if state == TileState::Dead && kind != TileKind::Power {
            return Err(TileError::InvalidState { kind, state });
        }
        Ok(Self {
            kind,
            level,
            state,
            age: 0,
        })
    }

    /// Fresh level-1 neutral tile, the form every spawned tile starts in.
    pub fn seedling(kind: TileKind) -> Self {
        Self {
            kind,
            level: MIN_LEVEL,
            state: TileState::Neutral,
            age: 0,
        }
    }

    pub fn kind(&self) -> TileKind {
        self.kind
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn state(&self) -> TileState {
        self.state
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn is_dead(&self) -> bool {
        self.state == TileState::Dead
    }

    pub fn set_state(&mut self, state: TileState) -> Result<(), TileError> {
        if state == TileState::Dead && self.kind != TileKind::Power {
            return Err(TileError::InvalidState {
                kind: self.kind,
                state,
            });
        }
        self.state = state;
        Ok(())
    }

    /// Whether `upgrade` would succeed, without mutating.
    pub fn can_upgrade(&self) -> bool {
        !self.is_dead() && self.level < MAX_LEVEL
    }

    /// Whether `downgrade` would succeed, without mutating.
    pub fn can_downgrade(&self) -> bool {
        !self.is_dead() && self.level > MIN_LEVEL
    }

    pub fn upgrade(&mut self) -> bool {
        if !self.can_upgrade() {
            return false;
        }
        self.level += 1;
        true
    }

    pub fn downgrade(&mut self) -> bool {
        if !self.can_downgrade() {
            return false;
        }
        self.level -= 1;
        true
    }

    pub fn age_up(&mut self) {
        self.age += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_triples_round_trip() {
        for kind in TileKind::ALL {
            for level in MIN_LEVEL..=MAX_LEVEL {
                for state in [TileState::Neutral, TileState::Healthy, TileState::Unhealthy] {
                    let tile = Tile::new(kind, level, state).unwrap();
                    assert_eq!(tile.kind(), kind);
                    assert_eq!(tile.level(), level);
                    assert_eq!(tile.state(), state);
                    assert_eq!(tile.age(), 0);
                }
            }
        }
        assert!(Tile::new(TileKind::Power, 2, TileState::Dead).is_ok());
    }

    #[test]
    fn invalid_triples_rejected() {
        assert_eq!(
            Tile::new(TileKind::Tree, 0, TileState::Neutral),
            Err(TileError::LevelOutOfRange(0))
        );
        assert_eq!(
            Tile::new(TileKind::Tree, 4, TileState::Neutral),
            Err(TileError::LevelOutOfRange(4))
        );
        for kind in [TileKind::Tree, TileKind::Farm, TileKind::People, TileKind::Waste] {
            assert!(Tile::new(kind, 1, TileState::Dead).is_err());
        }
    }

    #[test]
    fn dead_is_power_only_on_set_state() {
        let mut power = Tile::seedling(TileKind::Power);
        assert!(power.set_state(TileState::Dead).is_ok());

        let mut tree = Tile::seedling(TileKind::Tree);
        assert!(tree.set_state(TileState::Dead).is_err());
        assert_eq!(tree.state(), TileState::Neutral);
    }

    #[test]
    fn upgrade_clamps_at_max_level() {
        let mut tile = Tile::seedling(TileKind::Tree);
        assert!(tile.upgrade());
        assert!(tile.upgrade());
        assert_eq!(tile.level(), MAX_LEVEL);
        assert!(!tile.can_upgrade());
        assert!(!tile.upgrade());
        assert_eq!(tile.level(), MAX_LEVEL);
    }

    #[test]
    fn downgrade_clamps_at_min_level() {
        let mut tile = Tile::new(TileKind::Farm, 2, TileState::Neutral).unwrap();
        assert!(tile.downgrade());
        assert_eq!(tile.level(), MIN_LEVEL);
        assert!(!tile.can_downgrade());
        assert!(!tile.downgrade());
    }

    #[test]
    fn dead_tiles_never_change_level() {
        let mut tile = Tile::new(TileKind::Power, 2, TileState::Dead).unwrap();
        assert!(!tile.upgrade());
        assert!(!tile.downgrade());
        assert_eq!(tile.level(), 2);
    }

    #[test]
    fn preview_does_not_mutate() {
        let tile = Tile::new(TileKind::Tree, 3, TileState::Healthy).unwrap();
        assert!(!tile.can_upgrade());
        assert!(tile.can_downgrade());
        assert_eq!(tile.level(), 3);
    }

    #[test]
    fn age_up_is_unconditional() {
        let mut tile = Tile::new(TileKind::Power, 1, TileState::Dead).unwrap();
        tile.age_up();
        tile.age_up();
        assert_eq!(tile.age(), 2);
    }
}

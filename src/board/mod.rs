//! The game board: a square grid of spaces plus the per-turn update pass.

mod space;

use std::collections::HashMap;

use serde::Serialize;

use crate::handlers::{HandlerRegistry, SpaceUpdate, TileHandler};
use crate::rules::{evaluate_rules, NeighborCounts, RuleConfigSet, RuleOutcome, RuleTarget};
use crate::tile::{Tile, TileError, TileKind, TileState};

pub use space::{BoardSpace, HistoryEntry, SpaceAction, SpaceError};

/// The 8 surrounding cells, cardinals and diagonals.
const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// An occupied neighbor of a space, with its coordinates.
#[derive(Debug, Clone, Copy)]
pub struct Neighbor<'a> {
    pub x: i32,
    pub y: i32,
    pub tile: &'a Tile,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpaceSnapshot {
    pub x: i32,
    pub y: i32,
    pub tile: Option<Tile>,
    pub highlighted: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct BoardSnapshot {
    pub size: i32,
    pub spaces: Vec<SpaceSnapshot>,
}

/// A `size × size` grid of `BoardSpace`, owned exclusively.
///
/// Coordinates are valid iff `0 <= x, y < size`. The update pass walks the
/// board row-major and dispatches every space through the handler registry;
/// only the render projection is column-major.
pub struct GameBoard {
    size: i32,
    spaces: Vec<BoardSpace>,
    registry: HandlerRegistry,
}

impl GameBoard {
    pub fn new(size: i32) -> Self {
        debug_assert!(size > 0, "board size must be positive");
        let mut spaces = Vec::with_capacity((size * size) as usize);
        for y in 0..size {
            for x in 0..size {
                spaces.push(BoardSpace::new(x, y));
            }
        }
        Self {
            size,
            spaces,
            registry: HandlerRegistry::with_defaults(),
        }
    }

    pub fn size(&self) -> i32 {
        self.size
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        (0..self.size).contains(&x) && (0..self.size).contains(&y)
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if self.in_bounds(x, y) {
            Some((y * self.size + x) as usize)
        } else {
            None
        }
    }

    /// The space at `(x, y)`, or `None` out of bounds.
    pub fn get_space(&self, x: i32, y: i32) -> Option<&BoardSpace> {
        self.index(x, y).map(|i| &self.spaces[i])
    }

    pub fn get_space_mut(&mut self, x: i32, y: i32) -> Option<&mut BoardSpace> {
        self.index(x, y).map(move |i| &mut self.spaces[i])
    }

    /// Row-major traversal of all spaces.
    pub fn spaces(&self) -> impl Iterator<Item = &BoardSpace> {
        self.spaces.iter()
    }

    /// Replace a custom handler for `target`, overriding the default.
    pub fn register_handler(&mut self, target: RuleTarget, handler: Box<dyn TileHandler>) {
        self.registry.register(target, handler);
    }

    pub fn place_tile_at(&mut self, x: i32, y: i32, tile: Tile) -> bool {
        match self.get_space_mut(x, y) {
            Some(space) => space.place_tile(tile).is_ok(),
            None => false,
        }
    }

    pub fn remove_tile_at(&mut self, x: i32, y: i32) -> bool {
        match self.get_space_mut(x, y) {
            Some(space) => space.remove_tile().is_ok(),
            None => false,
        }
    }

    /// Remove every tile from the board. Histories record the removals.
    pub fn clear(&mut self) {
        for space in &mut self.spaces {
            if space.is_occupied() {
                space.remove_tile().ok();
            }
        }
    }

    /// Deterministic opening layout: Tree at center, Farm one cell north of
    /// center and People one cell west, where those fit on the board.
    pub fn set_starting_condition(&mut self) {
        self.clear();
        let center = self.size / 2;
        self.place_tile_at(center, center, Tile::seedling(TileKind::Tree));
        if self.in_bounds(center, center - 1) {
            self.place_tile_at(center, center - 1, Tile::seedling(TileKind::Farm));
        }
        if self.in_bounds(center - 1, center) {
            self.place_tile_at(center - 1, center, Tile::seedling(TileKind::People));
        }
    }

    /// Column-major projection of the grid for render collaborators.
    pub fn render_grid<T>(&self, mut render: impl FnMut(&BoardSpace) -> T) -> Vec<T> {
        let mut cells = Vec::with_capacity(self.spaces.len());
        for col in 0..self.size {
            for row in 0..self.size {
                if let Some(space) = self.get_space(col, row) {
                    cells.push(render(space));
                }
            }
        }
        cells
    }

    /// Set or flip a space's highlight flag. Out-of-bounds coordinates
    /// report `false`.
    pub fn toggle_space_highlight(&mut self, x: i32, y: i32, force: Option<bool>) -> bool {
        match self.get_space_mut(x, y) {
            Some(space) => space.toggle_highlight(force),
            None => false,
        }
    }

    pub fn clear_highlights(&mut self) {
        for space in &mut self.spaces {
            space.toggle_highlight(Some(false));
        }
    }

    /// Per-type tile counts across the whole board. With `weighted` each
    /// tile contributes its level, otherwise 1.
    pub fn count_tile_types(&self, weighted: bool) -> HashMap<TileKind, u32> {
        let mut totals = HashMap::new();
        for space in &self.spaces {
            if let Some(tile) = space.tile() {
                let weight = if weighted { u32::from(tile.level()) } else { 1 };
                *totals.entry(tile.kind()).or_insert(0) += weight;
            }
        }
        totals
    }

    /// Tally the occupied 8-neighborhood of `(x, y)`. Dead tiles are not
    /// counted.
    pub fn neighbor_counts(&self, x: i32, y: i32) -> NeighborCounts {
        let mut counts = NeighborCounts::default();
        for (dx, dy) in NEIGHBOR_OFFSETS {
            if let Some(space) = self.get_space(x + dx, y + dy) {
                if let Some(tile) = space.tile() {
                    if !tile.is_dead() {
                        counts.record(tile.kind(), tile.level());
                    }
                }
            }
        }
        counts
    }

    /// Every occupied neighbor of `(x, y)` with its coordinates.
    pub fn neighbors_with_coords(&self, x: i32, y: i32) -> Vec<Neighbor<'_>> {
        let mut neighbors = Vec::new();
        for (dx, dy) in NEIGHBOR_OFFSETS {
            if let Some(space) = self.get_space(x + dx, y + dy) {
                if let Some(tile) = space.tile() {
                    neighbors.push(Neighbor {
                        x: space.x(),
                        y: space.y(),
                        tile,
                    });
                }
            }
        }
        neighbors
    }

    /// Sum of neighbor tallies across `kinds`, raw or level-weighted.
    pub fn count_neighbors(&self, x: i32, y: i32, kinds: &[TileKind], weighted: bool) -> u32 {
        let counts = self.neighbor_counts(x, y);
        kinds
            .iter()
            .map(|&kind| {
                if weighted {
                    counts.calculated(kind)
                } else {
                    counts.raw(kind)
                }
            })
            .sum()
    }

    /// Evaluate the declarative rules for the space at `(x, y)`: occupied
    /// spaces use their tile kind's rule list, empty spaces the "empty" one.
    pub fn space_action(&self, x: i32, y: i32, rules: &RuleConfigSet) -> Option<RuleOutcome> {
        let space = self.get_space(x, y)?;
        let target = match space.tile() {
            Some(tile) => RuleTarget::from(tile.kind()),
            None => RuleTarget::Empty,
        };
        let config = rules.get(target)?;
        let counts = self.neighbor_counts(x, y);
        evaluate_rules(&counts, config)
    }

    /// The per-turn core pass. For every space in row-major order: age an
    /// occupied tile, resolve the handler for its target, and apply the
    /// returned update to that space before moving on.
    pub fn update_board(&mut self, rules: &RuleConfigSet) -> Result<(), TileError> {
        for y in 0..self.size {
            for x in 0..self.size {
                if let Some(tile) = self.get_space_mut(x, y).and_then(BoardSpace::tile_mut) {
                    tile.age_up();
                }

                let target = match self.get_space(x, y).and_then(BoardSpace::tile) {
                    Some(tile) => RuleTarget::from(tile.kind()),
                    None => RuleTarget::Empty,
                };
                let update = match (self.registry.get(target), self.get_space(x, y)) {
                    (Some(handler), Some(space)) => handler.update_state(space, self, rules),
                    _ => None,
                };
                if let Some(update) = update {
                    self.apply_update(x, y, update)?;
                }
            }
        }
        Ok(())
    }

    fn apply_update(&mut self, x: i32, y: i32, update: SpaceUpdate) -> Result<(), TileError> {
        let Some(space) = self.get_space_mut(x, y) else {
            return Ok(());
        };
        match update {
            SpaceUpdate::ChangeState(state) => {
                if let Some(tile) = space.tile_mut() {
                    tile.set_state(state)?;
                }
            }
            SpaceUpdate::Upgrade => {
                if let Some(tile) = space.tile_mut() {
                    if tile.upgrade() {
                        tile.set_state(TileState::Neutral)?;
                    }
                }
            }
            SpaceUpdate::Downgrade => {
                if let Some(tile) = space.tile_mut() {
                    if tile.downgrade() {
                        tile.set_state(TileState::Neutral)?;
                    }
                }
            }
            SpaceUpdate::Remove => {
                space.remove_tile().ok();
            }
            SpaceUpdate::Replace(tile) => {
                if space.is_occupied() {
                    space.remove_tile().ok();
                }
                space.place_tile(tile).ok();
            }
        }
        Ok(())
    }

    /// Ages of all People tiles, in board order.
    pub fn habitat_ages(&self) -> Vec<u32> {
        self.spaces
            .iter()
            .filter_map(BoardSpace::tile)
            .filter(|tile| tile.kind() == TileKind::People)
            .map(Tile::age)
            .collect()
    }

    /// Maximum age among Tree tiles, 0 when there are none.
    pub fn oldest_tree(&self) -> u32 {
        self.spaces
            .iter()
            .filter_map(BoardSpace::tile)
            .filter(|tile| tile.kind() == TileKind::Tree)
            .map(Tile::age)
            .max()
            .unwrap_or(0)
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            size: self.size,
            spaces: self
                .spaces
                .iter()
                .map(|space| SpaceSnapshot {
                    x: space.x(),
                    y: space.y(),
                    tile: space.tile().cloned(),
                    highlighted: space.highlighted(),
                })
                .collect(),
        }
    }
}

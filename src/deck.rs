use std::collections::VecDeque;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::block::TileBlock;
use crate::rng::GameRng;
use crate::tile::{Tile, TileKind, TileState};

/// Chance that a generated block slot stays empty.
pub const DEFAULT_EMPTY_SLOT_CHANCE: f64 = 0.1;

/// Kinds the generator deals out; Waste only ever appears through decay.
const DRAWABLE_KINDS: [TileKind; 4] = [
    TileKind::Tree,
    TileKind::Farm,
    TileKind::People,
    TileKind::Power,
];

/// Anything the player can hold in their hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HandItem {
    Block(TileBlock),
}

/// The draw pile: an ordered queue of hand items over a deterministic PRNG.
///
/// Finite decks run dry and report `None`; infinite decks synthesize a
/// fresh block on demand without growing the backing store.
pub struct Deck {
    items: VecDeque<HandItem>,
    infinite: bool,
    rng: GameRng,
    empty_slot_chance: f64,
    random_states: bool,
}

impl Deck {
    pub fn new(seed: Option<&str>, infinite: bool) -> Self {
        Self {
            items: VecDeque::new(),
            infinite,
            rng: GameRng::new(seed),
            empty_slot_chance: DEFAULT_EMPTY_SLOT_CHANCE,
            random_states: false,
        }
    }

    pub fn with_empty_slot_chance(mut self, chance: f64) -> Self {
        self.empty_slot_chance = chance.clamp(0.0, 1.0);
        self
    }

    /// Generated tiles get a random (non-Dead) starting state instead of
    /// Neutral.
    pub fn with_random_states(mut self, enabled: bool) -> Self {
        self.random_states = enabled;
        self
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn infinite(&self) -> bool {
        self.infinite
    }

    pub fn push_item(&mut self, item: HandItem) {
        self.items.push_back(item);
    }

    /// Pop the head of the pile. Empty finite decks yield `None`; empty
    /// infinite decks synthesize a block.
    pub fn draw_item(&mut self) -> Option<HandItem> {
        match self.items.pop_front() {
            Some(item) => Some(item),
            None if self.infinite => Some(HandItem::Block(self.generate_block())),
            None => None,
        }
    }

    /// Push `count` freshly generated blocks.
    pub fn fill_initial_deck(&mut self, count: usize) {
        for _ in 0..count {
            let block = self.generate_block();
            self.items.push_back(HandItem::Block(block));
        }
    }

    /// Fisher-Yates shuffle, repeated until the visible order actually
    /// changes. Decks too small (or too uniform) to ever look different
    /// get a single pass.
    pub fn shuffle(&mut self) {
        if self.items.len() < 2 {
            return;
        }
        let slice = self.items.make_contiguous();
        let uniform = slice.windows(2).all(|pair| pair[0] == pair[1]);
        let before: Vec<HandItem> = slice.to_vec();
        loop {
            slice.shuffle(&mut self.rng);
            if uniform || slice != &before[..] {
                break;
            }
        }
    }

    /// Each slot is independently empty with the configured probability,
    /// otherwise a level-1 tile of a uniformly chosen drawable kind.
    pub fn generate_block(&mut self) -> TileBlock {
        let first = self.generate_slot();
        let second = self.generate_slot();
        TileBlock::new(first, second)
    }

    fn generate_slot(&mut self) -> Option<Tile> {
        if self.rng.gen::<f64>() < self.empty_slot_chance {
            return None;
        }
        let kind = DRAWABLE_KINDS[self.rng.gen_range(0..DRAWABLE_KINDS.len())];
        let mut tile = Tile::seedling(kind);
        if self.random_states {
            let state = match self.rng.gen_range(0..3) {
                0 => TileState::Neutral,
                1 => TileState::Healthy,
                _ => TileState::Unhealthy,
            };
            // Non-Dead states are valid for every kind.
            tile.set_state(state).ok();
        }
        Some(tile)
    }
}

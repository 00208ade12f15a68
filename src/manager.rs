//! Game lifecycle: options, phases, turn sequencing and scoring.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::board::{GameBoard, Neighbor};
use crate::deck::{Deck, HandItem};
use crate::hand::PlayerHand;
use crate::handlers::TileHandler;
use crate::rng::GameRng;
use crate::rules::{RuleConfigSet, RuleTarget};
use crate::score::{score_breakdown, ScoreLine, ScoreObject};
use crate::tile::{TileError, TileKind};

pub const DEFAULT_BOARD_SIZE: i32 = 9;
pub const DEFAULT_DECK_SIZE: usize = 20;
pub const DEFAULT_HAND_SIZE: usize = 3;

const ECOLOGY: &str = "ecology";
const POPULATION: &str = "population";
const WASTE: &str = "waste";

#[derive(Debug, Error)]
pub enum GameError {
    #[error("rule set is missing targets: {0:?}")]
    IncompleteRules(Vec<RuleTarget>),
    #[error("board size {0} is not positive")]
    InvalidBoardSize(i32),
    #[error(transparent)]
    Tile(#[from] TileError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum GamePhase {
    Ready,
    Playing,
    GameOver,
    Complete,
}

/// Knobs for a game. `Default` gives the standard finite 9x9 game with an
/// entropy-seeded deck.
#[derive(Debug, Clone)]
pub struct GameOptions {
    pub size: i32,
    pub initial_deck_size: usize,
    pub max_hand_size: usize,
    pub seed: Option<String>,
    pub infinite_deck: bool,
    pub random_tile_states: bool,
    /// Freeplay suspends win/loss checks; the game stays in Playing.
    pub freeplay: bool,
    pub logging: bool,
}

impl Default for GameOptions {
    fn default() -> Self {
        Self {
            size: DEFAULT_BOARD_SIZE,
            initial_deck_size: DEFAULT_DECK_SIZE,
            max_hand_size: DEFAULT_HAND_SIZE,
            seed: None,
            infinite_deck: false,
            random_tile_states: false,
            freeplay: false,
            logging: false,
        }
    }
}

/// What one call to `advance_turn` did.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnSummary {
    pub turn: u32,
    pub phase: GamePhase,
    pub ecology: i64,
    pub population: i64,
    pub waste: i64,
    pub hand_size: usize,
    pub deck_size: usize,
}

/// Owns the board, deck, hand, rules and score tracks, and drives them
/// through the fixed turn sequence.
pub struct GameManager {
    options: GameOptions,
    rules: RuleConfigSet,
    board: GameBoard,
    deck: Deck,
    hand: PlayerHand,
    scores: HashMap<String, ScoreObject>,
    phase: GamePhase,
    turn: u32,
    started_at: Option<DateTime<Utc>>,
    rng: GameRng,
}

impl GameManager {
    /// Rejects rule sets that leave any target without a rule list, and
    /// board sizes below one.
    pub fn new(options: GameOptions, rules: RuleConfigSet) -> Result<Self, GameError> {
        if options.size < 1 {
            return Err(GameError::InvalidBoardSize(options.size));
        }
        let missing = rules.missing_targets();
        if !missing.is_empty() {
            return Err(GameError::IncompleteRules(missing));
        }

        let board = GameBoard::new(options.size);
        let deck = Self::build_deck(&options);
        let hand = PlayerHand::new(options.max_hand_size);
        let rng = GameRng::new(options.seed.as_deref());

        let mut scores = HashMap::new();
        for name in [ECOLOGY, POPULATION, WASTE] {
            scores.insert(name.to_string(), ScoreObject::new(name));
        }

        Ok(Self {
            options,
            rules,
            board,
            deck,
            hand,
            scores,
            phase: GamePhase::Ready,
            turn: 0,
            started_at: None,
            rng,
        })
    }

    fn build_deck(options: &GameOptions) -> Deck {
        let mut deck = Deck::new(options.seed.as_deref(), options.infinite_deck)
            .with_random_states(options.random_tile_states);
        deck.fill_initial_deck(options.initial_deck_size);
        deck.shuffle();
        deck
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn options(&self) -> &GameOptions {
        &self.options
    }

    pub fn board(&self) -> &GameBoard {
        &self.board
    }

    pub fn deck_size(&self) -> usize {
        self.deck.len()
    }

    pub fn hand(&self) -> &PlayerHand {
        &self.hand
    }

    pub fn rules(&self) -> &RuleConfigSet {
        &self.rules
    }

    pub fn register_handler(&mut self, target: RuleTarget, handler: Box<dyn TileHandler>) {
        self.board.register_handler(target, handler);
    }

    /// Move from Ready into Playing: settle the board, deal the opening
    /// hand, lay the starting tiles and take the first score reading.
    pub fn start_game(&mut self) -> Result<(), GameError> {
        if self.phase != GamePhase::Ready {
            return Ok(());
        }
        self.board.update_board(&self.rules)?;
        self.fill_hand();
        self.board.set_starting_condition();
        self.update_player_score();
        self.phase = GamePhase::Playing;
        self.started_at = Some(Utc::now());
        if self.options.logging {
            info!(
                size = self.options.size,
                deck = self.deck.len(),
                hand = self.hand.len(),
                "game started"
            );
        }
        Ok(())
    }

    /// One full turn: board pass, score reading, hand refill, then the
    /// win/loss check. Order is fixed.
    pub fn advance_turn(&mut self) -> Result<TurnSummary, GameError> {
        self.board.update_board(&self.rules)?;
        self.update_player_score();
        self.fill_hand();
        self.check_win_loss_conditions();
        self.turn += 1;

        let summary = TurnSummary {
            turn: self.turn,
            phase: self.phase,
            ecology: self.get_player_score(ECOLOGY),
            population: self.get_player_score(POPULATION),
            waste: self.get_player_score(WASTE),
            hand_size: self.hand.len(),
            deck_size: self.deck.len(),
        };
        if self.options.logging {
            info!(
                turn = summary.turn,
                phase = ?summary.phase,
                ecology = summary.ecology,
                population = summary.population,
                waste = summary.waste,
                "turn advanced"
            );
        }
        Ok(summary)
    }

    /// Loss beats win: extinction is GameOver even on the turn the hand
    /// empties out. Runs after the hand refill, so an empty hand means the
    /// deck had nothing left. Freeplay games never leave Playing here.
    pub fn check_win_loss_conditions(&mut self) {
        if self.options.freeplay || self.phase != GamePhase::Playing {
            return;
        }
        if self.get_player_score(POPULATION) <= 0 {
            self.phase = GamePhase::GameOver;
        } else if self.hand.is_empty() {
            self.phase = GamePhase::Complete;
        }
    }

    /// Re-read the board into the three score tracks.
    pub fn update_player_score(&mut self) {
        let weighted = self.board.count_tile_types(true);
        let ecology = i64::from(*weighted.get(&TileKind::Tree).unwrap_or(&0));
        let population = 5 * i64::from(*weighted.get(&TileKind::People).unwrap_or(&0));
        let waste = i64::from(*weighted.get(&TileKind::Waste).unwrap_or(&0));
        for (name, value) in [(ECOLOGY, ecology), (POPULATION, population), (WASTE, waste)] {
            if let Some(score) = self.scores.get_mut(name) {
                score.update(value);
            }
        }
    }

    pub fn get_player_score(&self, name: &str) -> i64 {
        self.scores.get(name).map_or(0, ScoreObject::value)
    }

    pub fn get_player_score_obj(&self, name: &str) -> Option<&ScoreObject> {
        self.scores.get(name)
    }

    /// The itemized end-of-game score.
    pub fn get_final_player_score_elements(&self) -> Vec<ScoreLine> {
        score_breakdown(
            self.get_player_score(ECOLOGY),
            self.get_player_score(POPULATION),
            self.get_player_score(WASTE),
            self.deck.len(),
            &self.board.habitat_ages(),
            self.board.oldest_tree(),
        )
    }

    pub fn get_calculated_player_score(&self) -> i64 {
        self.get_final_player_score_elements()
            .last()
            .map_or(0, |line| line.amount)
    }

    /// Place the hand item at `hand_index` anchored at `(x, y)`. On success
    /// the item leaves the hand; on failure the hand is untouched.
    pub fn place_tile_block(&mut self, x: i32, y: i32, hand_index: usize) -> bool {
        let Some(HandItem::Block(block)) = self.hand.item(hand_index) else {
            return false;
        };
        match block.place_on_grid(x, y, &mut self.board) {
            Ok(()) => {
                self.hand.remove_item(hand_index);
                true
            }
            Err(err) => {
                debug!(x, y, hand_index, error = %err, "placement rejected");
                false
            }
        }
    }

    pub fn draw_item_to_hand(&mut self) -> bool {
        if self.hand.is_full() {
            return false;
        }
        match self.deck.draw_item() {
            Some(item) => self.hand.add_item(item),
            None => false,
        }
    }

    /// Top the hand up to capacity from the deck.
    pub fn fill_hand(&mut self) {
        while !self.hand.is_full() {
            if !self.draw_item_to_hand() {
                break;
            }
        }
    }

    pub fn select_item_from_hand(&mut self, index: usize) -> bool {
        self.hand.select_item(index)
    }

    pub fn get_selected_item_index(&self) -> usize {
        self.hand.selected_index()
    }

    pub fn get_selected_item(&self) -> Option<&HandItem> {
        self.hand.selected_item()
    }

    pub fn rotate_selected_item(&mut self) -> bool {
        self.hand.rotate_selected()
    }

    pub fn add_board_highlight(&mut self, x: i32, y: i32) -> bool {
        self.board.toggle_space_highlight(x, y, Some(true))
    }

    pub fn remove_board_highlight(&mut self, x: i32, y: i32) -> bool {
        self.board.toggle_space_highlight(x, y, Some(false))
    }

    pub fn clear_highlights(&mut self) {
        self.board.clear_highlights();
    }

    pub fn count_neighbors(&self, x: i32, y: i32, kinds: &[TileKind], weighted: bool) -> u32 {
        self.board.count_neighbors(x, y, kinds, weighted)
    }

    pub fn get_neighbors(&self, x: i32, y: i32) -> Vec<Neighbor<'_>> {
        self.board.neighbors_with_coords(x, y)
    }

    pub fn update_board(&mut self) -> Result<(), GameError> {
        self.board.update_board(&self.rules)?;
        Ok(())
    }

    /// Tear the game back down to Ready with fresh board, deck and hand
    /// built from the same options.
    pub fn reset_game(&mut self) {
        self.board = GameBoard::new(self.options.size);
        self.deck = Self::build_deck(&self.options);
        self.hand = PlayerHand::new(self.options.max_hand_size);
        for score in self.scores.values_mut() {
            score.reset();
        }
        self.rng = GameRng::new(self.options.seed.as_deref());
        self.phase = GamePhase::Ready;
        self.turn = 0;
        self.started_at = None;
    }

    /// Drive the game by itself: each turn, try to land the selected item
    /// somewhere (random probes first, then an exhaustive sweep over
    /// anchors and rotations) and advance. Stops when the game leaves
    /// Playing or `max_turns` runs out; returns turns taken.
    pub fn autoplay(&mut self, max_turns: u32) -> Result<u32, GameError> {
        if self.phase == GamePhase::Ready {
            self.start_game()?;
        }
        let mut turns = 0;
        while self.phase == GamePhase::Playing && turns < max_turns {
            self.autoplace_selected();
            self.advance_turn()?;
            turns += 1;
        }
        Ok(turns)
    }

    fn autoplace_selected(&mut self) -> bool {
        if self.hand.is_empty() {
            return false;
        }
        let index = self.hand.selected_index();
        let size = self.board.size();
        for _ in 0..32 {
            let x = self.rng.gen_range(0..size);
            let y = self.rng.gen_range(0..size);
            if self.place_tile_block(x, y, index) {
                return true;
            }
        }
        for _ in 0..4 {
            for y in 0..size {
                for x in 0..size {
                    if self.place_tile_block(x, y, index) {
                        return true;
                    }
                }
            }
            self.hand.rotate_selected();
        }
        // No legal anchor for this item; discard so the game can drain.
        self.hand.remove_item(index);
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleConfigSet;

    fn manager(options: GameOptions) -> GameManager {
        GameManager::new(options, RuleConfigSet::builtin()).unwrap()
    }

    fn seeded_options() -> GameOptions {
        GameOptions {
            seed: Some("manager-test".to_string()),
            ..GameOptions::default()
        }
    }

    #[test]
    fn incomplete_rules_rejected() {
        let err = GameManager::new(GameOptions::default(), RuleConfigSet::new());
        match err {
            Err(GameError::IncompleteRules(missing)) => {
                assert_eq!(missing.len(), RuleTarget::ALL.len());
            }
            _ => panic!("expected IncompleteRules"),
        }
    }

    #[test]
    fn non_positive_board_size_rejected() {
        for size in [0, -3] {
            let err = GameManager::new(
                GameOptions {
                    size,
                    ..GameOptions::default()
                },
                RuleConfigSet::builtin(),
            );
            assert!(
                matches!(err, Err(GameError::InvalidBoardSize(reported)) if reported == size),
                "size {size} was not rejected"
            );
        }
    }

    #[test]
    fn start_game_deals_hand_and_lays_opening_tiles() {
        let mut game = manager(seeded_options());
        assert_eq!(game.phase(), GamePhase::Ready);

        game.start_game().unwrap();
        assert_eq!(game.phase(), GamePhase::Playing);
        assert!(game.started_at().is_some());
        assert_eq!(game.hand().len(), DEFAULT_HAND_SIZE);
        assert_eq!(game.deck_size(), DEFAULT_DECK_SIZE - DEFAULT_HAND_SIZE);

        // Opening layout gives a Tree and a People tile, so both tracks
        // read non-zero.
        assert!(game.get_player_score("ecology") >= 1);
        assert!(game.get_player_score("population") >= 5);
    }

    #[test]
    fn start_game_is_idempotent() {
        let mut game = manager(seeded_options());
        game.start_game().unwrap();
        let deck_before = game.deck_size();
        game.start_game().unwrap();
        assert_eq!(game.deck_size(), deck_before);
    }

    #[test]
    fn advance_turn_reports_and_counts() {
        let mut game = manager(seeded_options());
        game.start_game().unwrap();

        let summary = game.advance_turn().unwrap();
        assert_eq!(summary.turn, 1);
        assert_eq!(game.turn(), 1);
        assert_eq!(summary.hand_size, game.hand().len());
        assert_eq!(summary.deck_size, game.deck_size());
    }

    #[test]
    fn score_history_grows_with_readings() {
        let mut game = manager(seeded_options());
        game.start_game().unwrap();
        game.advance_turn().unwrap();
        game.advance_turn().unwrap();

        let ecology = game.get_player_score_obj("ecology").unwrap();
        // One reading at start plus one per turn; history holds the
        // superseded values including the initial zero.
        assert_eq!(ecology.history().len(), 3);
    }

    #[test]
    fn extinction_beats_completion() {
        // A 1x1 board only fits the opening Tree, so population is 0 at
        // the first check while the deck and hand are also empty.
        let mut game = manager(GameOptions {
            size: 1,
            initial_deck_size: 0,
            ..seeded_options()
        });
        game.start_game().unwrap();
        assert_eq!(game.get_player_score("population"), 0);

        let summary = game.advance_turn().unwrap();
        assert_eq!(summary.phase, GamePhase::GameOver);
    }

    #[test]
    fn terminal_phases_are_sticky() {
        let mut game = manager(GameOptions {
            size: 1,
            initial_deck_size: 0,
            ..seeded_options()
        });
        game.start_game().unwrap();
        game.advance_turn().unwrap();
        assert_eq!(game.phase(), GamePhase::GameOver);

        // Hand and deck are empty too; a later public check must not flip
        // the finished game over to Complete.
        game.check_win_loss_conditions();
        assert_eq!(game.phase(), GamePhase::GameOver);
    }

    #[test]
    fn empty_deck_and_hand_complete_the_game() {
        let mut game = manager(GameOptions {
            size: 3,
            initial_deck_size: 0,
            ..seeded_options()
        });
        game.start_game().unwrap();
        // Opening People tile is still alive on the first check.
        let summary = game.advance_turn().unwrap();
        assert_eq!(summary.phase, GamePhase::Complete);
    }

    #[test]
    fn freeplay_never_ends() {
        let mut game = manager(GameOptions {
            size: 3,
            initial_deck_size: 0,
            freeplay: true,
            ..seeded_options()
        });
        game.start_game().unwrap();
        for _ in 0..10 {
            game.advance_turn().unwrap();
        }
        assert_eq!(game.phase(), GamePhase::Playing);
    }

    #[test]
    fn placement_consumes_the_hand_item() {
        let mut game = manager(seeded_options());
        game.start_game().unwrap();
        let before = game.hand().len();

        // (0, 0) and (1, 0) are empty after the opening layout on a 9x9.
        assert!(game.place_tile_block(0, 0, 0));
        assert_eq!(game.hand().len(), before - 1);
    }

    #[test]
    fn failed_placement_keeps_the_hand() {
        let mut game = manager(seeded_options());
        game.start_game().unwrap();
        let before = game.hand().len();

        assert!(!game.place_tile_block(-1, 0, 0));
        assert!(!game.place_tile_block(0, 0, 99));
        assert_eq!(game.hand().len(), before);
    }

    #[test]
    fn reset_returns_to_ready() {
        let mut game = manager(seeded_options());
        game.start_game().unwrap();
        game.advance_turn().unwrap();

        game.reset_game();
        assert_eq!(game.phase(), GamePhase::Ready);
        assert_eq!(game.turn(), 0);
        assert_eq!(game.deck_size(), DEFAULT_DECK_SIZE);
        assert!(game.hand().is_empty());
        assert_eq!(game.get_player_score("ecology"), 0);
        assert!(game
            .get_player_score_obj("ecology")
            .unwrap()
            .history()
            .is_empty());
    }

    #[test]
    fn final_score_ends_with_total() {
        let mut game = manager(seeded_options());
        game.start_game().unwrap();
        let lines = game.get_final_player_score_elements();
        assert_eq!(lines.last().unwrap().label, "Total");
        assert_eq!(
            game.get_calculated_player_score(),
            lines.last().unwrap().amount
        );
    }
}

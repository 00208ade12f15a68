pub mod block;
pub mod board;
pub mod config;
pub mod deck;
pub mod hand;
pub mod handlers;
pub mod manager;
pub mod rng;
pub mod rules;
pub mod score;
pub mod tile;

pub use board::GameBoard;
pub use config::RuleConfigLoader;
pub use manager::{GameManager, GameOptions, GamePhase, TurnSummary};
pub use rules::RuleConfigSet;
pub use tile::{Tile, TileKind, TileState};

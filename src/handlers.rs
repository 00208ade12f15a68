//! Per-type state-transition policies.
//!
//! Handlers are strategy objects looked up through a type-keyed registry;
//! they read the declarative rule outcome for their space and translate it
//! into a `SpaceUpdate`. Tree, Farm and People share one transition
//! routine; Power and the empty-space spawner are special-cased.

use std::collections::HashMap;

use crate::board::{BoardSpace, GameBoard};
use crate::rules::{RuleConfigSet, RuleOutcome, RuleTarget};
use crate::tile::{Tile, TileKind, TileState};

/// The change a handler wants applied to its space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpaceUpdate {
    ChangeState(TileState),
    Upgrade,
    Downgrade,
    Remove,
    Replace(Tile),
}

/// State-transition policy for one rule target.
pub trait TileHandler: Send + Sync {
    fn update_state(
        &self,
        space: &BoardSpace,
        board: &GameBoard,
        rules: &RuleConfigSet,
    ) -> Option<SpaceUpdate>;
}

/// What happens when a struggling level-1 tile can no longer downgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeathBehavior {
    Remove,
    ReplaceWithWaste,
}

/// One step of the shared thriving/struggling ladder.
///
/// Thriving climbs Unhealthy -> Neutral -> Healthy -> upgrade (level up,
/// back to Neutral). Struggling descends Healthy -> Neutral -> Unhealthy ->
/// downgrade, with removal (or waste replacement) once level 1 can fall no
/// further. Anything else settles back to Neutral.
fn growth_transition(
    tile: &Tile,
    thriving: bool,
    struggling: bool,
    on_death: DeathBehavior,
) -> Option<SpaceUpdate> {
    if tile.is_dead() {
        return None;
    }
    if thriving {
        return match tile.state() {
            TileState::Unhealthy => Some(SpaceUpdate::ChangeState(TileState::Neutral)),
            TileState::Neutral => Some(SpaceUpdate::ChangeState(TileState::Healthy)),
            TileState::Healthy => {
                if tile.can_upgrade() {
                    Some(SpaceUpdate::Upgrade)
                } else {
                    None
                }
            }
            TileState::Dead => None,
        };
    }
    if struggling {
        return match tile.state() {
            TileState::Healthy => Some(SpaceUpdate::ChangeState(TileState::Neutral)),
            TileState::Neutral => Some(SpaceUpdate::ChangeState(TileState::Unhealthy)),
            TileState::Unhealthy => {
                if tile.can_downgrade() {
                    Some(SpaceUpdate::Downgrade)
                } else {
                    match on_death {
                        DeathBehavior::Remove => Some(SpaceUpdate::Remove),
                        DeathBehavior::ReplaceWithWaste => {
                            Some(SpaceUpdate::Replace(Tile::seedling(TileKind::Waste)))
                        }
                    }
                }
            }
            TileState::Dead => None,
        };
    }
    if tile.state() != TileState::Neutral {
        return Some(SpaceUpdate::ChangeState(TileState::Neutral));
    }
    None
}

/// Generic handler for the leveling tile kinds (Tree, Farm, People).
struct GrowthHandler {
    target: RuleTarget,
    on_death: DeathBehavior,
}

impl TileHandler for GrowthHandler {
    fn update_state(
        &self,
        space: &BoardSpace,
        board: &GameBoard,
        rules: &RuleConfigSet,
    ) -> Option<SpaceUpdate> {
        let tile = space.tile()?;
        debug_assert_eq!(RuleTarget::from(tile.kind()), self.target);
        let outcome = board.space_action(space.x(), space.y(), rules);
        growth_transition(
            tile,
            outcome == Some(RuleOutcome::Thriving),
            outcome == Some(RuleOutcome::Struggling),
            self.on_death,
        )
    }
}

/// Power never levels; it brightens to Healthy when fed and decays through
/// Unhealthy into Dead when starved. Dead is absorbing.
struct PowerHandler;

impl TileHandler for PowerHandler {
    fn update_state(
        &self,
        space: &BoardSpace,
        board: &GameBoard,
        rules: &RuleConfigSet,
    ) -> Option<SpaceUpdate> {
        let tile = space.tile()?;
        if tile.is_dead() {
            return None;
        }
        match board.space_action(space.x(), space.y(), rules) {
            Some(RuleOutcome::Thriving) => {
                if tile.state() != TileState::Healthy {
                    Some(SpaceUpdate::ChangeState(TileState::Healthy))
                } else {
                    None
                }
            }
            Some(RuleOutcome::Struggling) => match tile.state() {
                TileState::Unhealthy => Some(SpaceUpdate::ChangeState(TileState::Dead)),
                TileState::Neutral => Some(SpaceUpdate::ChangeState(TileState::Unhealthy)),
                TileState::Healthy => Some(SpaceUpdate::ChangeState(TileState::Neutral)),
                TileState::Dead => None,
            },
            _ => {
                if tile.state() != TileState::Neutral {
                    Some(SpaceUpdate::ChangeState(TileState::Neutral))
                } else {
                    None
                }
            }
        }
    }
}

/// Waste decays away once enough forest surrounds it.
struct WasteHandler;

impl TileHandler for WasteHandler {
    fn update_state(
        &self,
        space: &BoardSpace,
        board: &GameBoard,
        rules: &RuleConfigSet,
    ) -> Option<SpaceUpdate> {
        space.tile()?;
        match board.space_action(space.x(), space.y(), rules) {
            Some(RuleOutcome::Remove) => Some(SpaceUpdate::Remove),
            _ => None,
        }
    }
}

/// Empty spaces can sprout a tile when their surroundings call for it.
struct EmptyHandler;

impl TileHandler for EmptyHandler {
    fn update_state(
        &self,
        space: &BoardSpace,
        board: &GameBoard,
        rules: &RuleConfigSet,
    ) -> Option<SpaceUpdate> {
        if space.is_occupied() {
            return None;
        }
        let spawned = match board.space_action(space.x(), space.y(), rules)? {
            RuleOutcome::SpawnTree => TileKind::Tree,
            RuleOutcome::SpawnPeople => TileKind::People,
            RuleOutcome::SpawnWaste => TileKind::Waste,
            _ => return None,
        };
        Some(SpaceUpdate::Replace(Tile::seedling(spawned)))
    }
}

/// Type-keyed lookup table of handlers. Defaults cover every target;
/// callers may override any of them at runtime.
pub struct HandlerRegistry {
    handlers: HashMap<RuleTarget, Box<dyn TileHandler>>,
}

impl HandlerRegistry {
    pub fn with_defaults() -> Self {
        let mut registry = Self {
            handlers: HashMap::new(),
        };
        registry.register(
            RuleTarget::Tree,
            Box::new(GrowthHandler {
                target: RuleTarget::Tree,
                on_death: DeathBehavior::Remove,
            }),
        );
        registry.register(
            RuleTarget::Farm,
            Box::new(GrowthHandler {
                target: RuleTarget::Farm,
                on_death: DeathBehavior::ReplaceWithWaste,
            }),
        );
        registry.register(
            RuleTarget::People,
            Box::new(GrowthHandler {
                target: RuleTarget::People,
                on_death: DeathBehavior::Remove,
            }),
        );
        registry.register(RuleTarget::Power, Box::new(PowerHandler));
        registry.register(RuleTarget::Waste, Box::new(WasteHandler));
        registry.register(RuleTarget::Empty, Box::new(EmptyHandler));
        registry
    }

    pub fn register(&mut self, target: RuleTarget, handler: Box<dyn TileHandler>) {
        self.handlers.insert(target, handler);
    }

    pub fn get(&self, target: RuleTarget) -> Option<&dyn TileHandler> {
        self.handlers.get(&target).map(Box::as_ref)
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

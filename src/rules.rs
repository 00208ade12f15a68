//! Declarative tile rules.
//!
//! Tile behavior is tuned through data: every board target (each tile kind
//! plus "empty") carries an ordered list of prioritized rules whose
//! conditions are evaluated against the neighbor counts of a space. The
//! handlers in `crate::handlers` only translate the winning outcome into a
//! concrete space update.

use std::cmp::Reverse;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::tile::TileKind;

/// What a rule list is attached to: a tile kind or an empty space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleTarget {
    Tree,
    Farm,
    People,
    Power,
    Waste,
    Empty,
}

impl RuleTarget {
    pub const ALL: [RuleTarget; 6] = [
        RuleTarget::Tree,
        RuleTarget::Farm,
        RuleTarget::People,
        RuleTarget::Power,
        RuleTarget::Waste,
        RuleTarget::Empty,
    ];
}

impl From<TileKind> for RuleTarget {
    fn from(kind: TileKind) -> Self {
        match kind {
            TileKind::Tree => RuleTarget::Tree,
            TileKind::Farm => RuleTarget::Farm,
            TileKind::People => RuleTarget::People,
            TileKind::Power => RuleTarget::Power,
            TileKind::Waste => RuleTarget::Waste,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleOutcome {
    Thriving,
    Struggling,
    SpawnTree,
    SpawnPeople,
    SpawnWaste,
    Remove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Evaluation {
    Eq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl Evaluation {
    fn compare(self, left: i64, right: i64) -> bool {
        match self {
            Evaluation::Eq => left == right,
            Evaluation::Lt => left < right,
            Evaluation::LtEq => left <= right,
            Evaluation::Gt => left > right,
            Evaluation::GtEq => left >= right,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Combine {
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Condition {
    #[serde(rename_all = "camelCase")]
    Single {
        #[serde(rename = "type")]
        kind: TileKind,
        count: i64,
        evaluation: Evaluation,
    },
    #[serde(rename_all = "camelCase")]
    Comparison {
        left_type: TileKind,
        right_type: TileKind,
        difference: i64,
        evaluation: Evaluation,
    },
}

impl Condition {
    fn evaluate(&self, counts: &NeighborCounts) -> bool {
        match *self {
            Condition::Single {
                kind,
                count,
                evaluation,
            } => evaluation.compare(i64::from(counts.raw(kind)), count),
            Condition::Comparison {
                left_type,
                right_type,
                difference,
                evaluation,
            } => {
                let delta = i64::from(counts.raw(left_type)) - i64::from(counts.raw(right_type));
                evaluation.compare(delta, difference)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileRule {
    pub result: RuleOutcome,
    pub priority: i32,
    pub combine_conditions: Combine,
    pub conditions: Vec<Condition>,
}

/// The rule list for one target, as carried by a single config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileRuleConfig {
    #[serde(rename = "type")]
    pub target: RuleTarget,
    pub rules: Vec<TileRule>,
}

/// Per-type tally of the 8-adjacent occupied cells around a space.
///
/// `raw` counts neighbors of the type (Dead tiles excluded), `calculated`
/// sums their levels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NeighborTally {
    pub raw: u32,
    pub calculated: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NeighborCounts {
    tallies: HashMap<TileKind, NeighborTally>,
}

impl NeighborCounts {
    pub fn record(&mut self, kind: TileKind, level: u8) {
        let tally = self.tallies.entry(kind).or_default();
        tally.raw += 1;
        tally.calculated += u32::from(level);
    }

    /// Count of neighbors of `kind`; types with no neighbors read as 0.
    pub fn raw(&self, kind: TileKind) -> u32 {
        self.tallies.get(&kind).map_or(0, |t| t.raw)
    }

    /// Level-weighted count of neighbors of `kind`.
    pub fn calculated(&self, kind: TileKind) -> u32 {
        self.tallies.get(&kind).map_or(0, |t| t.calculated)
    }

    pub fn get(&self, kind: TileKind) -> Option<NeighborTally> {
        self.tallies.get(&kind).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TileKind, NeighborTally)> + '_ {
        self.tallies.iter().map(|(kind, tally)| (*kind, *tally))
    }

    pub fn is_empty(&self) -> bool {
        self.tallies.is_empty()
    }
}

/// Evaluate a rule list against neighbor counts.
///
/// Rules run in descending priority (stable on ties, preserving list
/// order). Every condition of a rule is evaluated before combining; there
/// is no short-circuiting. The first rule whose combination holds wins.
pub fn evaluate_rules(counts: &NeighborCounts, config: &TileRuleConfig) -> Option<RuleOutcome> {
    let mut ordered: Vec<&TileRule> = config.rules.iter().collect();
    ordered.sort_by_key(|rule| Reverse(rule.priority));

    for rule in ordered {
        let results: Vec<bool> = rule
            .conditions
            .iter()
            .map(|condition| condition.evaluate(counts))
            .collect();
        let matched = match rule.combine_conditions {
            Combine::And => results.iter().all(|&r| r),
            Combine::Or => results.iter().any(|&r| r),
        };
        if matched {
            return Some(rule.result);
        }
    }
    None
}

/// The full rule set for a game: one `TileRuleConfig` per target.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleConfigSet {
    configs: HashMap<RuleTarget, TileRuleConfig>,
}

impl RuleConfigSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, config: TileRuleConfig) -> Option<TileRuleConfig> {
        self.configs.insert(config.target, config)
    }

    pub fn get(&self, target: RuleTarget) -> Option<&TileRuleConfig> {
        self.configs.get(&target)
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    /// Targets with no rule list attached.
    pub fn missing_targets(&self) -> Vec<RuleTarget> {
        RuleTarget::ALL
            .into_iter()
            .filter(|target| !self.configs.contains_key(target))
            .collect()
    }

    /// The engine's default rule content. Bit-identical to parsing the
    /// shipped `configs/*.json` files.
    pub fn builtin() -> Self {
        let mut set = Self::new();
        set.insert(TileRuleConfig {
            target: RuleTarget::Tree,
            rules: vec![
                rule(
                    RuleOutcome::Thriving,
                    10,
                    Combine::And,
                    vec![
                        single(TileKind::Tree, Evaluation::GtEq, 3),
                        single(TileKind::Tree, Evaluation::Lt, 5),
                        single(TileKind::People, Evaluation::Lt, 5),
                        single(TileKind::Power, Evaluation::Lt, 2),
                    ],
                ),
                rule(
                    RuleOutcome::Struggling,
                    5,
                    Combine::Or,
                    vec![
                        single(TileKind::Tree, Evaluation::Eq, 0),
                        single(TileKind::Tree, Evaluation::GtEq, 5),
                        single(TileKind::People, Evaluation::GtEq, 5),
                        single(TileKind::Power, Evaluation::GtEq, 2),
                    ],
                ),
            ],
        });
        set.insert(TileRuleConfig {
            target: RuleTarget::Farm,
            rules: vec![
                rule(
                    RuleOutcome::Thriving,
                    10,
                    Combine::And,
                    vec![
                        single(TileKind::People, Evaluation::GtEq, 1),
                        single(TileKind::Tree, Evaluation::GtEq, 1),
                        single(TileKind::Waste, Evaluation::LtEq, 1),
                    ],
                ),
                rule(
                    RuleOutcome::Struggling,
                    5,
                    Combine::Or,
                    vec![
                        single(TileKind::People, Evaluation::Eq, 0),
                        single(TileKind::Waste, Evaluation::GtEq, 2),
                        single(TileKind::Farm, Evaluation::GtEq, 4),
                    ],
                ),
            ],
        });
        set.insert(TileRuleConfig {
            target: RuleTarget::People,
            rules: vec![
                rule(
                    RuleOutcome::Thriving,
                    10,
                    Combine::And,
                    vec![
                        single(TileKind::Farm, Evaluation::GtEq, 1),
                        single(TileKind::Power, Evaluation::GtEq, 1),
                        single(TileKind::Waste, Evaluation::Lt, 2),
                    ],
                ),
                rule(
                    RuleOutcome::Struggling,
                    5,
                    Combine::Or,
                    vec![
                        single(TileKind::Farm, Evaluation::Eq, 0),
                        single(TileKind::Power, Evaluation::Eq, 0),
                        single(TileKind::Waste, Evaluation::GtEq, 3),
                        single(TileKind::People, Evaluation::GtEq, 6),
                    ],
                ),
            ],
        });
        set.insert(TileRuleConfig {
            target: RuleTarget::Power,
            rules: vec![
                rule(
                    RuleOutcome::Thriving,
                    10,
                    Combine::And,
                    vec![
                        single(TileKind::People, Evaluation::GtEq, 1),
                        single(TileKind::Power, Evaluation::LtEq, 2),
                    ],
                ),
                rule(
                    RuleOutcome::Struggling,
                    5,
                    Combine::Or,
                    vec![
                        single(TileKind::People, Evaluation::Lt, 1),
                        single(TileKind::Power, Evaluation::Gt, 3),
                    ],
                ),
            ],
        });
        set.insert(TileRuleConfig {
            target: RuleTarget::Waste,
            rules: vec![rule(
                RuleOutcome::Remove,
                10,
                Combine::And,
                vec![single(TileKind::Tree, Evaluation::GtEq, 4)],
            )],
        });
        set.insert(TileRuleConfig {
            target: RuleTarget::Empty,
            rules: vec![
                rule(
                    RuleOutcome::SpawnTree,
                    30,
                    Combine::And,
                    vec![single(TileKind::Tree, Evaluation::GtEq, 4)],
                ),
                rule(
                    RuleOutcome::SpawnPeople,
                    20,
                    Combine::And,
                    vec![
                        single(TileKind::People, Evaluation::GtEq, 1),
                        single(TileKind::Power, Evaluation::GtEq, 1),
                        single(TileKind::Farm, Evaluation::GtEq, 2),
                    ],
                ),
                rule(
                    RuleOutcome::SpawnWaste,
                    10,
                    Combine::And,
                    vec![single(TileKind::Waste, Evaluation::GtEq, 3)],
                ),
            ],
        });
        set
    }
}

fn rule(
    result: RuleOutcome,
    priority: i32,
    combine_conditions: Combine,
    conditions: Vec<Condition>,
) -> TileRule {
    TileRule {
        result,
        priority,
        combine_conditions,
        conditions,
    }
}

fn single(kind: TileKind, evaluation: Evaluation, count: i64) -> Condition {
    Condition::Single {
        kind,
        count,
        evaluation,
    }
}

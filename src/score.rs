use serde::{Deserialize, Serialize};

/// A named score track with the trail of values it has held.
///
/// Every `update` records the value being replaced, so the history reads
/// oldest-first and never contains the current value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreObject {
    name: String,
    value: i64,
    history: Vec<i64>,
}

impl ScoreObject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: 0,
            history: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn history(&self) -> &[i64] {
        &self.history
    }

    pub fn update(&mut self, value: i64) {
        self.history.push(self.value);
        self.value = value;
    }

    pub fn reset(&mut self) {
        self.value = 0;
        self.history.clear();
    }
}

/// One line of the itemized final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreLine {
    pub label: &'static str,
    pub amount: i64,
}

/// Build the itemized final score from the end-of-game metrics.
///
/// The last line is always the grand total of the lines before it.
pub fn score_breakdown(
    ecology: i64,
    population: i64,
    waste: i64,
    deck_count: usize,
    habitat_ages: &[u32],
    oldest_tree_age: u32,
) -> Vec<ScoreLine> {
    let base = 100 * (ecology + population);
    let ratio_bonus = if population > 0 {
        (1000.0 * ecology as f64 / population as f64).round() as i64
    } else {
        100
    };
    let deck_penalty = -(deck_count as i64);
    let waste_penalty = -10 * waste;
    let habitat_bonus: i64 = habitat_ages.iter().map(|age| i64::from(*age) * 10).sum();
    let old_growth_bonus = if oldest_tree_age > 20 {
        i64::from(oldest_tree_age) * 10
    } else {
        0
    };

    let mut lines = vec![
        ScoreLine { label: "Base", amount: base },
        ScoreLine { label: "EcologyRatioBonus", amount: ratio_bonus },
        ScoreLine { label: "RemainingDeckPenalty", amount: deck_penalty },
        ScoreLine { label: "WastePenalty", amount: waste_penalty },
        ScoreLine { label: "HabitatSurvivalBonus", amount: habitat_bonus },
        ScoreLine { label: "OldGrowthBonus", amount: old_growth_bonus },
    ];
    let total: i64 = lines.iter().map(|line| line.amount).sum();
    lines.push(ScoreLine { label: "Total", amount: total });
    lines
}

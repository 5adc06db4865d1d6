use crate::deck::MAX_CARDS;
use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Parameters of the closed-form model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Library size the draws come from (99 for Commander)
    pub deck_size: i64,
    pub starting_hand_size: i64,
    pub on_the_play: bool,
    /// Share of a tapped source counted towards early availability
    pub tapped_weight: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            deck_size: 99,
            starting_hand_size: 7,
            on_the_play: true,
            tapped_weight: 0.65,
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<()> {
        if self.deck_size <= 0 || self.deck_size > MAX_CARDS {
            return Err(AnalysisError::InvalidArgument(format!(
                "deck size must lie in 1..={}, got {}",
                MAX_CARDS, self.deck_size
            )));
        }
        if self.starting_hand_size < 0 {
            return Err(AnalysisError::InvalidArgument(format!(
                "starting hand size must not be negative, got {}",
                self.starting_hand_size
            )));
        }
        if !(0.0..=1.0).contains(&self.tapped_weight) {
            return Err(AnalysisError::InvalidArgument(format!(
                "tapped weight must lie in [0, 1], got {}",
                self.tapped_weight
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub runs: usize,
    pub turns: usize,
    pub seed: u64,
    /// Redraw once when the opening hand has fewer than 2 or more than 5 lands
    pub mulligan: bool,
    /// Number of games whose turn-by-turn trace is kept
    pub traces: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            runs: 10_000,
            turns: 10,
            seed: 0,
            mulligan: true,
            traces: 3,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<()> {
        if self.runs == 0 || self.turns == 0 {
            return Err(AnalysisError::InvalidArgument(
                "simulation needs at least one run and one turn".to_string(),
            ));
        }
        Ok(())
    }
}

/// On-disk configuration; both sections are optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub analysis: AnalysisConfig,
    pub simulation: SimConfig,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let cfg: Config = serde_json::from_str(r#"{"analysis": {"deck_size": 59}}"#).unwrap();
        assert_eq!(cfg.analysis.deck_size, 59);
        assert_eq!(cfg.analysis.starting_hand_size, 7);
        assert_eq!(cfg.analysis.tapped_weight, 0.65);
        assert_eq!(cfg.simulation, SimConfig::default());
    }

    #[test]
    fn test_validation() {
        assert!(AnalysisConfig::default().validate().is_ok());
        let bad = AnalysisConfig {
            deck_size: 0,
            ..Default::default()
        };
        assert!(matches!(bad.validate(), Err(AnalysisError::InvalidArgument(_))));
        let bad = AnalysisConfig {
            deck_size: i64::MAX,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
        let bad = AnalysisConfig {
            tapped_weight: 1.5,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
        let bad = SimConfig {
            runs: 0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}

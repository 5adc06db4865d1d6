#[cfg(feature = "python")]
use pyo3::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnSnapshot {
    pub turn: usize,
    pub hand_size: usize,
    pub lands_in_play: usize,
    pub sources_in_play: usize,
    pub colors_available: String, // e.g. "WG"
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameTrace {
    pub mulliganed: bool,
    pub turns: Vec<TurnSnapshot>,
}

#[cfg_attr(feature = "python", pyclass)]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimStats {
    #[cfg_attr(feature = "python", pyo3(get))]
    pub runs: usize,
    #[cfg_attr(feature = "python", pyo3(get))]
    pub turns: usize,

    /// Share of games with each colour available, per turn (index 0 = turn 1)
    #[cfg_attr(feature = "python", pyo3(get))]
    pub availability: BTreeMap<String, Vec<f64>>,
    #[cfg_attr(feature = "python", pyo3(get))]
    pub avg_lands_in_play: Vec<f64>,
    #[cfg_attr(feature = "python", pyo3(get))]
    pub mulligan_rate: f64,

    pub example_traces: Vec<GameTrace>,
}

impl SimStats {
    pub fn new(runs: usize, turns: usize, colors: &[&str]) -> Self {
        Self {
            runs,
            turns,
            availability: colors.iter().map(|c| (c.to_string(), vec![0.0; turns])).collect(),
            avg_lands_in_play: vec![0.0; turns],
            mulligan_rate: 0.0,
            example_traces: Vec::new(),
        }
    }

    /// Probability of `color` being available on `turn` (1-based).
    pub fn availability_at(&self, color: &str, turn: usize) -> Option<f64> {
        let by_turn = self.availability.get(color)?;
        by_turn.get(turn.checked_sub(1)?).copied()
    }
}

pub mod analysis;
pub mod config;
pub mod deck;
pub mod error;
pub mod hypergeometric;
pub mod mana;
pub mod sim;
pub mod stats;

pub use analysis::{analyze, DeckManaAnalysis};
pub use error::{AnalysisError, Result};

#[cfg(feature = "python")]
mod python {
    use crate::analysis::analyze;
    use crate::config::{AnalysisConfig, SimConfig};
    use crate::deck::DeckFile;
    use crate::error::AnalysisError;
    use crate::sim::run;
    use crate::stats::SimStats;
    use pyo3::prelude::*;

    fn to_py_err(e: AnalysisError) -> PyErr {
        match e {
            AnalysisError::Io(e) => pyo3::exceptions::PyIOError::new_err(e.to_string()),
            other => pyo3::exceptions::PyValueError::new_err(other.to_string()),
        }
    }

    #[pyfunction]
    fn analyze_deck(deck_path: &str) -> PyResult<String> {
        let deck = DeckFile::load(deck_path).map_err(to_py_err)?;
        let analysis = analyze(&deck.cards, &AnalysisConfig::default()).map_err(to_py_err)?;
        serde_json::to_string(&analysis).map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))
    }

    #[pyfunction]
    fn run_sim(deck_path: &str, runs: usize, turns: usize, seed: u64) -> PyResult<SimStats> {
        let deck = DeckFile::load(deck_path).map_err(to_py_err)?;
        let sim = SimConfig {
            runs,
            turns,
            seed,
            ..SimConfig::default()
        };
        run(&deck.cards, &AnalysisConfig::default(), &sim).map_err(to_py_err)
    }

    #[pymodule]
    fn mana_health(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(analyze_deck, m)?)?;
        m.add_function(wrap_pyfunction!(run_sim, m)?)?;
        m.add_class::<SimStats>()?;
        Ok(())
    }
}

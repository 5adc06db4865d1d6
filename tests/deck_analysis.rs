//! End-to-end analysis of a deck file from disk.

use mana_health::analysis::{analyze, ColorStatus, Grade};
use mana_health::config::{AnalysisConfig, SimConfig};
use mana_health::deck::{Color, DeckFile};
use mana_health::hypergeometric::at_least_one;
use mana_health::sim;
use serde_json::json;
use similar_asserts::assert_eq;

fn simic_deck() -> DeckFile {
    DeckFile::load(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/simic.json")).expect("fixture deck")
}

#[test]
fn test_simic_deck_report() {
    let deck = simic_deck();
    assert_eq!(deck.physical_count(), 99);

    let analysis = analyze(&deck.cards, &AnalysisConfig::default()).unwrap();
    let colors: Vec<Color> = analysis.color_requirements.iter().map(|r| r.color).collect();
    assert_eq!(colors, vec![Color::W, Color::U, Color::G]);

    let w = &analysis.color_requirements[0];
    assert_eq!(w.pips_required, 1.0);
    assert_eq!(w.sources_in_deck, 0);
    assert_eq!(w.status, ColorStatus::Insufficient);

    let u = &analysis.color_requirements[1];
    assert_eq!((u.pips_required, u.sources_in_deck), (7.0, 17));
    assert_eq!(u.prob_turn_3, at_least_one(99, 17, 9));
    assert_eq!(u.status, ColorStatus::Optimal);

    let g = &analysis.color_requirements[2];
    assert_eq!((g.pips_required, g.sources_in_deck), (13.0, 24));
    assert!((g.effective_sources - 23.3).abs() < 1e-9);
    assert_eq!(g.prob_turn_3, at_least_one(99, 23, 9));
    assert_eq!(g.status, ColorStatus::Optimal);

    let score = &analysis.health_score;
    assert_eq!(score.total_lands, 35);
    assert_eq!(score.unique_mana_sources, 10);
    assert_eq!(score.fixing_lands, 5);
    assert_eq!(score.colors_insufficient, 1);
    assert!((score.overall_score - 2000.0 / 21.0).abs() < 1e-9);
    assert_eq!(score.grade, Grade::A);
    assert_eq!(
        score.recommendations,
        vec!["Add 7 more White sources: 0.0% chance by turn 3, target 60%".to_string()]
    );

    assert_eq!(analysis.diagnostics.len(), 1);
    assert_eq!(analysis.diagnostics[0].card.as_deref(), Some("Misprint"));
}

#[test]
fn test_report_json_shape() {
    let deck = simic_deck();
    let analysis = analyze(&deck.cards, &AnalysisConfig::default()).unwrap();
    let json = serde_json::to_value(&analysis).unwrap();

    let first = &json["colorRequirements"][0];
    assert_eq!(first["color"], json!("W"));
    assert_eq!(first["status"], json!("❌ Insufficient"));
    assert!(first.get("probTurn3").is_some());
    assert_eq!(json["colorRequirements"][2]["status"], json!("✅ Optimal"));
    assert_eq!(json["healthScore"]["grade"], json!("A"));
    assert_eq!(json["healthScore"]["colorsInsufficient"], json!(1));
}

#[test]
fn test_analysis_is_deterministic() {
    let deck = simic_deck();
    let config = AnalysisConfig::default();
    let first = serde_json::to_string(&analyze(&deck.cards, &config).unwrap()).unwrap();
    for _ in 0..5 {
        let again = serde_json::to_string(&analyze(&deck.cards, &config).unwrap()).unwrap();
        assert_eq!(first, again);
    }
}

#[test]
fn test_simulation_tracks_closed_form_order() {
    let deck = simic_deck();
    let sim_config = SimConfig {
        runs: 2_000,
        turns: 5,
        seed: 42,
        mulligan: true,
        traces: 0,
    };
    let stats = sim::run(&deck.cards, &AnalysisConfig::default(), &sim_config).unwrap();

    assert_eq!(stats.availability_at("W", 5), Some(0.0));
    assert!(stats.example_traces.is_empty());
    for color in ["U", "G"] {
        let mut last = 0.0;
        for turn in 1..=5 {
            let p = stats.availability_at(color, turn).unwrap();
            assert!(p >= last, "{} availability fell on turn {}", color, turn);
            last = p;
        }
    }
    // green has more sources than blue
    assert!(stats.availability_at("G", 3).unwrap() > stats.availability_at("U", 3).unwrap());
}

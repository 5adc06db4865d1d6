//! Closed-form mana availability analysis.
//!
//! For every colour the deck's spells ask for, counts pips and sources, then
//! uses the hypergeometric distribution to estimate the chance of holding a
//! source of that colour by turns 1, 3 and 5. Turn 3 is judged against a
//! threshold that grows with how heavily the deck leans on the colour, and
//! the per-colour results fold into a pip-weighted health score and grade.

use crate::config::AnalysisConfig;
use crate::deck::{self, Color, DeckCardEntry};
use crate::error::{AnalysisError, Result};
use crate::hypergeometric::{at_least_one, cards_seen};
use crate::mana::parse_cost;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

/// Turn checkpoints reported for each colour.
pub const CHECKPOINTS: [u32; 3] = [1, 3, 5];

const ADEQUATE_MARGIN: f64 = 0.10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorStatus {
    #[serde(rename = "✅ Optimal")]
    Optimal,
    #[serde(rename = "⚠️ Adequate")]
    Adequate,
    #[serde(rename = "❌ Insufficient")]
    Insufficient,
}

impl ColorStatus {
    /// Same text as the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            ColorStatus::Optimal => "✅ Optimal",
            ColorStatus::Adequate => "⚠️ Adequate",
            ColorStatus::Insufficient => "❌ Insufficient",
        }
    }
}

impl fmt::Display for ColorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A-")]
    AMinus,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "B-")]
    BMinus,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "C-")]
    CMinus,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "F")]
    F,
}

impl Grade {
    /// Half-open bands: 90.0 is an A-, 89.999 a B+.
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 97.0 => Grade::APlus,
            s if s >= 93.0 => Grade::A,
            s if s >= 90.0 => Grade::AMinus,
            s if s >= 87.0 => Grade::BPlus,
            s if s >= 83.0 => Grade::B,
            s if s >= 80.0 => Grade::BMinus,
            s if s >= 77.0 => Grade::CPlus,
            s if s >= 73.0 => Grade::C,
            s if s >= 70.0 => Grade::CMinus,
            s if s >= 60.0 => Grade::D,
            _ => Grade::F,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::AMinus => "A-",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::BMinus => "B-",
            Grade::CPlus => "C+",
            Grade::C => "C",
            Grade::CMinus => "C-",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorRequirement {
    pub color: Color,
    pub pips_required: f64,
    pub sources_in_deck: i64,
    /// Sources after tapped weighting, before rounding
    pub effective_sources: f64,
    pub prob_turn_1: f64,
    pub prob_turn_3: f64,
    pub prob_turn_5: f64,
    pub threshold: f64,
    pub status: ColorStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManaHealthScore {
    pub total_lands: i64,
    pub unique_mana_sources: usize,
    pub fixing_lands: i64,
    pub overall_score: f64,
    pub grade: Grade,
    pub colors_insufficient: usize,
    pub recommendations: Vec<String>,
}

/// Input problem that was recovered from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckManaAnalysis {
    pub color_requirements: Vec<ColorRequirement>,
    pub health_score: ManaHealthScore,
    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,
}

impl DeckManaAnalysis {
    fn empty() -> Self {
        Self {
            color_requirements: Vec::new(),
            health_score: ManaHealthScore {
                total_lands: 0,
                unique_mana_sources: 0,
                fixing_lands: 0,
                overall_score: 0.0,
                grade: Grade::F,
                colors_insufficient: 0,
                recommendations: vec!["No deck data available for mana analysis".to_string()],
            },
            diagnostics: Vec::new(),
        }
    }
}

/// Turn-3 target for a colour given how many pips ask for it.
pub fn threshold(pips: f64) -> f64 {
    if pips >= 8.0 {
        0.90
    } else if pips >= 3.0 {
        0.75
    } else {
        0.60
    }
}

fn status(prob: f64, threshold: f64) -> ColorStatus {
    if prob >= threshold {
        ColorStatus::Optimal
    } else if prob >= threshold - ADEQUATE_MARGIN {
        ColorStatus::Adequate
    } else {
        ColorStatus::Insufficient
    }
}

/// Draw model shared by every colour of one analysis.
#[derive(Debug, Clone, Copy)]
struct DrawModel {
    population: u32,
    hand_size: u32,
    on_the_play: bool,
}

impl DrawModel {
    fn from_config(config: &AnalysisConfig) -> Result<Self> {
        let population = u32::try_from(config.deck_size)
            .map_err(|_| AnalysisError::InvalidArgument(format!("deck size {} out of range", config.deck_size)))?;
        let hand_size = u32::try_from(config.starting_hand_size).map_err(|_| {
            AnalysisError::InvalidArgument(format!(
                "starting hand size {} out of range",
                config.starting_hand_size
            ))
        })?;
        Ok(Self {
            population,
            hand_size,
            on_the_play: config.on_the_play,
        })
    }

    fn prob_by_turn(&self, sources: u32, turn: u32) -> f64 {
        at_least_one(
            self.population,
            sources.min(self.population),
            cards_seen(self.hand_size, turn, self.on_the_play),
        )
    }
}

/// Computes colour availability and the health score for a mainboard.
///
/// Only non-positive quantities and unusable configuration are errors;
/// unreadable costs are skipped and reported in `diagnostics`.
pub fn analyze(cards: &[DeckCardEntry], config: &AnalysisConfig) -> Result<DeckManaAnalysis> {
    config.validate()?;
    deck::validate(cards)?;
    let model = DrawModel::from_config(config)?;

    if cards.is_empty() {
        return Ok(DeckManaAnalysis::empty());
    }

    let mut diagnostics = Vec::new();
    let mut pips = [0.0; 5];
    for card in cards.iter().filter(|c| !c.is_land()) {
        let Some(cost) = card.mana_cost.as_deref() else {
            continue;
        };
        match parse_cost(cost) {
            Ok(parsed) => {
                for color in Color::COLORED {
                    pips[color.index()] += parsed.pips(color) * card.quantity as f64;
                }
            }
            Err(message) => {
                warn!(card = %card.name, "skipping mana cost: {}", message);
                diagnostics.push(Diagnostic {
                    card: Some(card.name.clone()),
                    message,
                });
            }
        }
    }

    let physical = deck::physical_count(cards);
    if physical != config.deck_size {
        diagnostics.push(Diagnostic {
            card: None,
            message: format!(
                "deck lists {} cards but the model draws from {}",
                physical, config.deck_size
            ),
        });
    }

    let analyzed: Vec<Color> = Color::COLORED
        .into_iter()
        .filter(|c| pips[c.index()] > 0.0)
        .collect();

    let color_requirements: Vec<ColorRequirement> = analyzed
        .iter()
        .map(|&color| analyze_color(color, pips[color.index()], cards, &model, config.tapped_weight))
        .collect();

    let health_score = health_score(cards, &analyzed, &color_requirements);

    Ok(DeckManaAnalysis {
        color_requirements,
        health_score,
        diagnostics,
    })
}

fn analyze_color(
    color: Color,
    pips_required: f64,
    cards: &[DeckCardEntry],
    model: &DrawModel,
    tapped_weight: f64,
) -> ColorRequirement {
    let mut sources_in_deck = 0;
    let mut effective_sources = 0.0;
    for card in cards.iter().filter(|c| c.produces(color)) {
        sources_in_deck += card.quantity;
        let weight = if card.enters_untapped { 1.0 } else { tapped_weight };
        effective_sources += card.quantity as f64 * weight;
    }

    // tapped weighting only applies to the early checkpoints
    let k = (effective_sources.round() as u32).min(model.population);
    let raw = u32::try_from(sources_in_deck).map_or(model.population, |n| n.min(model.population));
    let [prob_turn_1, prob_turn_3, prob_turn_5] = CHECKPOINTS.map(|t| {
        let sources = if t <= 3 { k } else { raw };
        model.prob_by_turn(sources, t)
    });
    let threshold = threshold(pips_required);
    let status = status(prob_turn_3, threshold);

    let recommendation = match status {
        ColorStatus::Optimal => None,
        ColorStatus::Adequate => Some(format!(
            "Consider one more {} source: {:.1}% by turn 3 is just under the {:.0}% target",
            color,
            prob_turn_3 * 100.0,
            threshold * 100.0
        )),
        ColorStatus::Insufficient => Some(insufficient_recommendation(color, k, prob_turn_3, threshold, model)),
    };

    debug!(
        color = color.symbol(),
        pips_required,
        sources_in_deck,
        effective_sources,
        prob_turn_3,
        %status,
        "analyzed color"
    );

    ColorRequirement {
        color,
        pips_required,
        sources_in_deck,
        effective_sources,
        prob_turn_1,
        prob_turn_3,
        prob_turn_5,
        threshold,
        status,
        recommendation,
    }
}

/// Sources to add, from the turn-3 gain of one extra source.
fn sources_needed(model: &DrawModel, sources: u32, prob: f64, threshold: f64) -> Option<u32> {
    if prob >= threshold {
        return Some(0);
    }
    if sources >= model.population {
        return None;
    }
    let delta = model.prob_by_turn(sources + 1, 3) - prob;
    if delta <= 0.0 {
        return None;
    }
    Some(((threshold - prob) / delta).ceil().max(1.0) as u32)
}

fn insufficient_recommendation(color: Color, sources: u32, prob: f64, threshold: f64, model: &DrawModel) -> String {
    match sources_needed(model, sources, prob, threshold) {
        Some(n) => format!(
            "Add {} more {} source{}: {:.1}% chance by turn 3, target {:.0}%",
            n,
            color,
            if n == 1 { "" } else { "s" },
            prob * 100.0,
            threshold * 100.0
        ),
        None => format!(
            "{} cannot reach the {:.0}% turn-3 target at this deck size; cut {} pips",
            color,
            threshold * 100.0,
            color
        ),
    }
}

fn health_score(cards: &[DeckCardEntry], analyzed: &[Color], reqs: &[ColorRequirement]) -> ManaHealthScore {
    let total_lands: i64 = cards.iter().filter(|c| c.is_land()).map(|c| c.quantity).sum();
    let sources: Vec<&DeckCardEntry> = cards.iter().filter(|c| c.is_mana_source()).collect();
    let unique_mana_sources = sources.len();
    let fixing_lands: i64 = sources
        .iter()
        .filter(|c| analyzed.iter().filter(|&&col| c.produces(col)).count() >= 2)
        .map(|c| c.quantity)
        .sum();

    let overall_score = if reqs.is_empty() {
        100.0
    } else {
        let weight: f64 = reqs.iter().map(|r| r.pips_required).sum();
        let weighted: f64 = reqs
            .iter()
            .map(|r| r.pips_required * (100.0 * r.prob_turn_3 / r.threshold).min(100.0))
            .sum();
        (weighted / weight).clamp(0.0, 100.0)
    };
    let colors_insufficient = reqs
        .iter()
        .filter(|r| r.status == ColorStatus::Insufficient)
        .count();

    let mut recommendations: Vec<String> = reqs.iter().filter_map(|r| r.recommendation.clone()).collect();
    if reqs.is_empty() {
        recommendations.push("No colored mana requirements found".to_string());
    } else {
        if analyzed.len() >= 2 && fixing_lands == 0 {
            recommendations.push(format!(
                "No sources produce two or more of the deck's {} colors; add dual lands or fixing rocks",
                analyzed.len()
            ));
        }
        let source_copies: i64 = sources.iter().map(|c| c.quantity).sum();
        let tapped: i64 = sources
            .iter()
            .filter(|c| !c.enters_untapped)
            .map(|c| c.quantity)
            .sum();
        if tapped * 3 > source_copies {
            recommendations.push(format!(
                "{} of {} mana sources enter tapped; swap some for untapped alternatives",
                tapped, source_copies
            ));
        }
        if recommendations.is_empty() {
            recommendations.push("Mana base meets every color target".to_string());
        }
    }

    ManaHealthScore {
        total_lands,
        unique_mana_sources,
        fixing_lands,
        overall_score,
        grade: Grade::from_score(overall_score),
        colors_insufficient,
        recommendations,
    }
}

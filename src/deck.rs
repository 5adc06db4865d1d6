use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

/// Mana symbols a source can produce. `C` is colorless and never analysed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Color {
    W,
    U,
    B,
    R,
    G,
    C,
}

impl Color {
    /// The five colours a deck can require, in WUBRG order.
    pub const COLORED: [Color; 5] = [Color::W, Color::U, Color::B, Color::R, Color::G];

    pub fn from_symbol(s: &str) -> Option<Self> {
        match s {
            "W" => Some(Color::W),
            "U" => Some(Color::U),
            "B" => Some(Color::B),
            "R" => Some(Color::R),
            "G" => Some(Color::G),
            "C" => Some(Color::C),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Color::W => "W",
            Color::U => "U",
            Color::B => "B",
            Color::R => "R",
            Color::G => "G",
            Color::C => "C",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Color::W => "White",
            Color::U => "Blue",
            Color::B => "Black",
            Color::R => "Red",
            Color::G => "Green",
            Color::C => "Colorless",
        };
        write!(f, "{}", name)
    }
}

fn one() -> i64 {
    1
}

fn yes() -> bool {
    true
}

/// One distinct card in a deck's mainboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckCardEntry {
    pub name: String,
    #[serde(default)]
    pub mana_cost: Option<String>,
    #[serde(default)]
    pub produces_mana: BTreeSet<Color>,
    #[serde(default = "one")]
    pub quantity: i64,
    #[serde(default = "yes")]
    pub enters_untapped: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_land: Option<bool>,
}

impl DeckCardEntry {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            mana_cost: None,
            produces_mana: BTreeSet::new(),
            quantity: 1,
            enters_untapped: true,
            is_land: None,
        }
    }

    /// A land producing the given colours.
    pub fn land(name: &str, colors: &[Color]) -> Self {
        Self {
            produces_mana: colors.iter().copied().collect(),
            is_land: Some(true),
            ..Self::new(name)
        }
    }

    /// A nonland card with a mana cost.
    pub fn spell(name: &str, cost: &str) -> Self {
        Self {
            mana_cost: Some(cost.to_string()),
            ..Self::new(name)
        }
    }

    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn tapped(mut self) -> Self {
        self.enters_untapped = false;
        self
    }

    pub fn producing(mut self, colors: &[Color]) -> Self {
        self.produces_mana = colors.iter().copied().collect();
        self
    }

    pub fn is_mana_source(&self) -> bool {
        !self.produces_mana.is_empty()
    }

    /// Explicit flag wins; otherwise a mana source with no cost is a land.
    pub fn is_land(&self) -> bool {
        self.is_land.unwrap_or_else(|| {
            self.is_mana_source()
                && self
                    .mana_cost
                    .as_deref()
                    .map_or(true, |c| c.trim().is_empty())
        })
    }

    pub fn produces(&self, color: Color) -> bool {
        self.produces_mana.contains(&color)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeckFile {
    pub name: String,
    pub cards: Vec<DeckCardEntry>,
}

impl DeckFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let f = std::fs::File::open(path)?;
        let deck: DeckFile = serde_json::from_reader(std::io::BufReader::new(f))?;
        Ok(deck)
    }

    /// Number of physical cards, counting every copy.
    pub fn physical_count(&self) -> i64 {
        physical_count(&self.cards)
    }
}

pub fn physical_count(cards: &[DeckCardEntry]) -> i64 {
    cards.iter().fold(0i64, |total, c| total.saturating_add(c.quantity.max(0)))
}

/// Upper bound on physical cards in one list, across all entries.
pub const MAX_CARDS: i64 = 100_000;

/// Rejects entries no real decklist can contain.
pub fn validate(cards: &[DeckCardEntry]) -> Result<()> {
    let mut total: i64 = 0;
    for card in cards {
        if card.quantity < 1 {
            return Err(AnalysisError::InvalidArgument(format!(
                "card '{}' has quantity {}, expected at least 1",
                card.name, card.quantity
            )));
        }
        total = total
            .checked_add(card.quantity)
            .filter(|t| *t <= MAX_CARDS)
            .ok_or_else(|| {
                AnalysisError::InvalidArgument(format!(
                    "deck exceeds {} cards at '{}' (quantity {})",
                    MAX_CARDS, card.name, card.quantity
                ))
            })?;
    }
    Ok(())
}

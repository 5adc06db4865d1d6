use crate::config::{AnalysisConfig, SimConfig};
use crate::deck::{self, Color, DeckCardEntry};
use crate::error::{AnalysisError, Result};
use crate::mana::parse_cost;
use crate::stats::{GameTrace, SimStats, TurnSnapshot};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use tracing::{info, warn};

const OPENING_HAND: usize = 7;
const MAX_HAND: usize = 7;

/// Per-copy view of a deck entry; colours as a WUBRG bitmask.
#[derive(Debug, Clone)]
struct SimCard {
    colors: u8,
    is_land: bool,
    is_source: bool,
    enters_untapped: bool,
    mana_value: u32,
}

impl SimCard {
    fn blank() -> Self {
        SimCard {
            colors: 0,
            is_land: false,
            is_source: false,
            enters_untapped: true,
            mana_value: 0,
        }
    }

    fn from_entry(entry: &DeckCardEntry) -> Self {
        let colors = Color::COLORED
            .iter()
            .filter(|c| entry.produces(**c))
            .fold(0u8, |mask, c| mask | bit(*c));
        let mana_value = match entry.mana_cost.as_deref() {
            None => 0,
            Some(cost) => match parse_cost(cost) {
                Ok(parsed) => parsed.mana_value,
                Err(e) => {
                    // never castable
                    warn!(card = %entry.name, "unreadable cost in simulation: {}", e);
                    u32::MAX
                }
            },
        };
        SimCard {
            colors,
            is_land: entry.is_land(),
            is_source: entry.is_mana_source(),
            enters_untapped: entry.enters_untapped,
            mana_value,
        }
    }
}

fn bit(c: Color) -> u8 {
    1 << c.index()
}

fn mask_symbols(mask: u8) -> String {
    Color::COLORED
        .iter()
        .filter(|c| mask & bit(**c) != 0)
        .map(|c| c.symbol())
        .collect()
}

#[derive(Debug, Clone, Copy)]
struct Permanent {
    card: usize,
    active_from: usize,
}

/// One simulated turn: colours usable and lands on the battlefield.
#[derive(Debug, Clone, Copy)]
struct TurnResult {
    colors: u8,
    lands: usize,
}

struct GameResult {
    turns: Vec<TurnResult>,
    mulliganed: bool,
    trace: Option<GameTrace>,
}

fn draw(library: &mut Vec<usize>, hand: &mut Vec<usize>, n: usize) {
    for _ in 0..n {
        if let Some(c) = library.pop() {
            hand.push(c);
        }
    }
}

/// Index in `hand` of the land to play: one adding a missing colour first,
/// untapped before tapped.
fn choose_land(hand: &[usize], cards: &[SimCard], available: u8) -> Option<usize> {
    hand.iter()
        .enumerate()
        .filter(|(_, &c)| cards[c].is_land)
        .max_by_key(|(i, &c)| {
            let adds_color = cards[c].colors & !available != 0;
            (adds_color, cards[c].enters_untapped, std::cmp::Reverse(*i))
        })
        .map(|(i, _)| i)
}

fn play_game(
    cards: &[SimCard],
    deck: &[usize],
    analysis: &AnalysisConfig,
    sim: &SimConfig,
    seed: u64,
    capture: bool,
) -> GameResult {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut library = deck.to_vec();
    library.shuffle(&mut rng);

    let mut hand = Vec::with_capacity(MAX_HAND + 1);
    draw(&mut library, &mut hand, OPENING_HAND);

    let mut mulliganed = false;
    if sim.mulligan {
        let land_count = hand.iter().filter(|&&c| cards[c].is_land).count();
        if !(2..=5).contains(&land_count) {
            library.append(&mut hand);
            library.shuffle(&mut rng);
            draw(&mut library, &mut hand, OPENING_HAND);
            mulliganed = true;
        }
    }

    let mut battlefield: Vec<Permanent> = Vec::new();
    let mut turns = Vec::with_capacity(sim.turns);
    let mut snapshots = Vec::new();

    for turn in 1..=sim.turns {
        if turn > 1 || !analysis.on_the_play {
            draw(&mut library, &mut hand, 1);
        }

        let active = |bf: &[Permanent]| -> u8 {
            bf.iter()
                .filter(|p| p.active_from <= turn)
                .fold(0, |mask, p| mask | cards[p.card].colors)
        };

        // Play one land per turn
        if let Some(pos) = choose_land(&hand, cards, active(&battlefield)) {
            let card = hand.remove(pos);
            let delay = usize::from(!cards[card].enters_untapped);
            battlefield.push(Permanent {
                card,
                active_from: turn + delay,
            });
        }

        // Cast nonland sources, cheapest first, with whatever mana is up
        let mut mana = battlefield
            .iter()
            .filter(|p| p.active_from <= turn && cards[p.card].is_source)
            .count() as u32;
        loop {
            let castable = hand
                .iter()
                .enumerate()
                .filter(|(_, &c)| cards[c].is_source && !cards[c].is_land && cards[c].mana_value <= mana)
                .min_by_key(|(_, &c)| cards[c].mana_value)
                .map(|(i, _)| i);
            let Some(pos) = castable else { break };
            let card = hand.remove(pos);
            mana -= cards[card].mana_value;
            let delay = usize::from(!cards[card].enters_untapped);
            if delay == 0 {
                mana += 1;
            }
            battlefield.push(Permanent {
                card,
                active_from: turn + delay,
            });
        }

        let colors = active(&battlefield);
        let lands = battlefield.iter().filter(|p| cards[p.card].is_land).count();
        turns.push(TurnResult { colors, lands });

        // Discard down to hand size at end of turn
        hand.truncate(MAX_HAND);

        if capture {
            snapshots.push(TurnSnapshot {
                turn,
                hand_size: hand.len(),
                lands_in_play: lands,
                sources_in_play: battlefield.iter().filter(|p| cards[p.card].is_source).count(),
                colors_available: mask_symbols(colors),
            });
        }
    }

    GameResult {
        turns,
        mulliganed,
        trace: capture.then(|| GameTrace {
            mulliganed,
            turns: snapshots,
        }),
    }
}

/// Plays `sim.runs` seeded games and reports how often each colour is
/// available on each turn.
///
/// Unlike the closed-form model this tracks land drops, tapped lands and
/// casting mana rocks turn by turn. Game `i` uses seed `sim.seed + i`, so
/// the result does not depend on how rayon schedules the games.
pub fn run(entries: &[DeckCardEntry], analysis: &AnalysisConfig, sim: &SimConfig) -> Result<SimStats> {
    analysis.validate()?;
    sim.validate()?;
    deck::validate(entries)?;

    let deck_size = usize::try_from(analysis.deck_size)
        .map_err(|_| AnalysisError::InvalidArgument(format!("deck size {} out of range", analysis.deck_size)))?;

    // index 0 is the filler used to pad short lists up to the deck size
    let mut cards = vec![SimCard::blank()];
    let mut deck = Vec::with_capacity(deck_size);
    for entry in entries {
        cards.push(SimCard::from_entry(entry));
        let idx = cards.len() - 1;
        deck.extend(std::iter::repeat(idx).take(entry.quantity as usize));
    }
    if deck.len() < deck_size {
        deck.resize(deck_size, 0);
    }

    let results: Vec<GameResult> = (0..sim.runs)
        .into_par_iter()
        .map(|game| {
            play_game(
                &cards,
                &deck,
                analysis,
                sim,
                sim.seed.wrapping_add(game as u64),
                game < sim.traces,
            )
        })
        .collect();

    let symbols: Vec<&str> = Color::COLORED.iter().map(|c| c.symbol()).collect();
    let mut stats = SimStats::new(sim.runs, sim.turns, &symbols);
    let n = sim.runs as f64;

    for t in 0..sim.turns {
        let mut total_lands = 0usize;
        let mut seen = [0usize; 5];
        for r in &results {
            let turn = r.turns[t];
            total_lands += turn.lands;
            for c in Color::COLORED {
                if turn.colors & bit(c) != 0 {
                    seen[c.index()] += 1;
                }
            }
        }
        stats.avg_lands_in_play[t] = total_lands as f64 / n;
        for c in Color::COLORED {
            if let Some(by_turn) = stats.availability.get_mut(c.symbol()) {
                by_turn[t] = seen[c.index()] as f64 / n;
            }
        }
    }

    stats.mulligan_rate = results.iter().filter(|r| r.mulliganed).count() as f64 / n;
    stats.example_traces = results.into_iter().filter_map(|r| r.trace).collect();

    info!(
        runs = sim.runs,
        turns = sim.turns,
        mulligan_rate = stats.mulligan_rate,
        "simulation finished"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hypergeometric::at_least_one;

    fn no_mulligan(runs: usize) -> SimConfig {
        SimConfig {
            runs,
            turns: 5,
            seed: 7,
            mulligan: false,
            traces: 1,
        }
    }

    #[test]
    fn test_single_color_matches_closed_form() {
        let cards = vec![DeckCardEntry::land("Forest", &[Color::G]).with_quantity(10)];
        let stats = run(&cards, &AnalysisConfig::default(), &no_mulligan(20_000)).unwrap();
        for turn in [1, 3, 5] {
            let expected = at_least_one(99, 10, 7 + turn as u32 - 1);
            let got = stats.availability_at("G", turn).unwrap();
            assert!((got - expected).abs() < 0.02, "turn {}: {} vs {}", turn, got, expected);
        }
        assert_eq!(stats.availability_at("W", 3), Some(0.0));
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let cards = vec![
            DeckCardEntry::land("Forest", &[Color::G]).with_quantity(20),
            DeckCardEntry::land("Temple Garden", &[Color::G, Color::W]).with_quantity(5).tapped(),
            DeckCardEntry::spell("Arcane Signet", "{2}").producing(&[Color::W]),
        ];
        let sim = SimConfig {
            runs: 500,
            ..SimConfig::default()
        };
        let a = run(&cards, &AnalysisConfig::default(), &sim).unwrap();
        let b = run(&cards, &AnalysisConfig::default(), &sim).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.example_traces.len(), 3);
        assert_eq!(a.example_traces[0].turns.len(), sim.turns);
    }

    #[test]
    fn test_tapped_land_is_not_usable_on_turn_one() {
        let cards = vec![DeckCardEntry::land("Guildgate", &[Color::U, Color::R]).with_quantity(99).tapped()];
        let stats = run(&cards, &AnalysisConfig::default(), &no_mulligan(50)).unwrap();
        assert_eq!(stats.availability_at("U", 1), Some(0.0));
        assert_eq!(stats.availability_at("R", 2), Some(1.0));
        assert_eq!(stats.avg_lands_in_play, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_rock_needs_mana_to_cast() {
        let cards = vec![
            DeckCardEntry::land("Wastes", &[Color::C]).with_quantity(50),
            DeckCardEntry::spell("Fellwar Stone", "{2}").producing(&[Color::B]).with_quantity(49),
        ];
        let stats = run(&cards, &AnalysisConfig::default(), &no_mulligan(200)).unwrap();
        assert_eq!(stats.availability_at("B", 1), Some(0.0));
        assert!(stats.availability_at("B", 3).unwrap() > 0.5);
    }

    #[test]
    fn test_invalid_settings() {
        let cards = vec![DeckCardEntry::land("Forest", &[Color::G])];
        let sim = SimConfig {
            turns: 0,
            ..SimConfig::default()
        };
        assert!(run(&cards, &AnalysisConfig::default(), &sim).is_err());
    }

    #[test]
    fn test_huge_quantity_is_rejected_before_allocating() {
        let cards = vec![DeckCardEntry::land("Forest", &[Color::G]).with_quantity(i64::MAX)];
        assert!(matches!(
            run(&cards, &AnalysisConfig::default(), &no_mulligan(10)),
            Err(AnalysisError::InvalidArgument(_))
        ));
    }
}

use anyhow::Context;
use clap::Parser;
use mana_health::analysis::analyze;
use mana_health::config::Config;
use mana_health::deck::DeckFile;
use mana_health::sim;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mana_health")]
#[command(about = "MTG Commander mana base analysis", long_about = None)]
struct Args {
    /// Deck JSON file path
    #[arg(short, long)]
    deck: PathBuf,

    /// JSON config file with "analysis" and "simulation" sections
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Library size the model draws from
    #[arg(long)]
    deck_size: Option<i64>,

    /// Opening hand size
    #[arg(long)]
    hand_size: Option<i64>,

    /// Draw on turn 1
    #[arg(long)]
    on_the_draw: bool,

    /// Also run this many simulated games
    #[arg(short, long)]
    simulate: Option<usize>,

    /// Number of turns to simulate
    #[arg(short, long)]
    turns: Option<usize>,

    /// Seed for the simulated games
    #[arg(long)]
    seed: Option<u64>,

    /// Keep every opening hand
    #[arg(long)]
    no_mulligan: bool,

    /// Output JSON file (optional)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print detailed statistics
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut config = match &args.config {
        Some(path) => Config::load(path).with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(n) = args.deck_size {
        config.analysis.deck_size = n;
    }
    if let Some(n) = args.hand_size {
        config.analysis.starting_hand_size = n;
    }
    if args.on_the_draw {
        config.analysis.on_the_play = false;
    }
    if let Some(t) = args.turns {
        config.simulation.turns = t;
    }
    if let Some(s) = args.seed {
        config.simulation.seed = s;
    }
    if args.no_mulligan {
        config.simulation.mulligan = false;
    }

    tracing::info!(deck = %args.deck.display(), "loading deck");
    let deck = DeckFile::load(&args.deck).with_context(|| format!("Failed to load deck {}", args.deck.display()))?;

    let analysis = analyze(&deck.cards, &config.analysis).context("Mana analysis failed")?;
    let score = &analysis.health_score;

    println!("=== Mana Analysis: {} ===", deck.name);
    println!("{:<6} {:>6} {:>8} {:>7} {:>7} {:>7}  Status", "Color", "Pips", "Sources", "T1", "T3", "T5");
    for req in &analysis.color_requirements {
        println!(
            "{:<6} {:>6.1} {:>8} {:>6.1}% {:>6.1}% {:>6.1}%  {}",
            req.color.symbol(),
            req.pips_required,
            req.sources_in_deck,
            req.prob_turn_1 * 100.0,
            req.prob_turn_3 * 100.0,
            req.prob_turn_5 * 100.0,
            req.status
        );
    }
    println!(
        "\nScore: {:.1} ({})  lands: {}  sources: {}  fixing: {}",
        score.overall_score, score.grade, score.total_lands, score.unique_mana_sources, score.fixing_lands
    );
    for rec in &score.recommendations {
        println!("  - {}", rec);
    }
    if args.verbose {
        for d in &analysis.diagnostics {
            println!("  ! {}{}", d.card.as_deref().map(|c| format!("{}: ", c)).unwrap_or_default(), d.message);
        }
    }

    let stats = match args.simulate {
        Some(runs) => {
            config.simulation.runs = runs;
            println!("\nRunning {} simulations over {} turns...", runs, config.simulation.turns);
            let start = std::time::Instant::now();
            let stats = sim::run(&deck.cards, &config.analysis, &config.simulation).context("Simulation failed")?;
            println!("Completed in {:.2}s", start.elapsed().as_secs_f64());
            for req in &analysis.color_requirements {
                let symbol = req.color.symbol();
                let by_turn: Vec<String> = (1..=stats.turns)
                    .filter_map(|t| stats.availability_at(symbol, t))
                    .map(|p| format!("{:.0}%", p * 100.0))
                    .collect();
                println!("{:<6} {}", symbol, by_turn.join(" "));
            }
            Some(stats)
        }
        None => None,
    };

    if let Some(output_path) = args.output {
        let json = serde_json::json!({
            "deck": deck.name,
            "analysis": analysis,
            "simulation": stats,
        });
        std::fs::write(&output_path, serde_json::to_string_pretty(&json)?)
            .with_context(|| format!("Failed to write output {}", output_path.display()))?;
    }

    Ok(())
}

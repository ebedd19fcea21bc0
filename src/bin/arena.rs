//! Arena CLI: run bot-vs-bot experiments from the command line.
//!
//! Usage:
//!   cargo run --release --bin arena -- --games 200 --p1 hard --p2 easy
//!   cargo run --release --bin arena -- --games 100 --p1 medium --p2 random --p2-temperature 0.5

use std::collections::HashMap;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use tictactoe_engine::engine::arena::run_arena;
use tictactoe_engine::engine::bot_profiles::{load_default_profiles, load_profiles, BotProfilesFile};
use tictactoe_engine::engine::bot_strategy::{
    BotStrategy, OptimalStrategy, RandomStrategy, SamplingParams, SamplingStrategy,
};
use tictactoe_engine::engine::policy::Difficulty;

#[derive(Parser)]
#[command(name = "arena", about = "Run bot-vs-bot arena experiments for tic-tac-toe")]
struct Cli {
    /// Number of games to play
    #[arg(long, default_value = "100")]
    games: usize,

    /// Random seed
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Alternate X and O between games
    #[arg(long, default_value = "true")]
    alternate_seats: bool,

    /// Path to bot_profiles.toml
    #[arg(long)]
    profiles: Option<PathBuf>,

    // --- Player 1 ---
    /// P1 strategy: "easy", "medium", "hard", "random" or a profile name
    #[arg(long, default_value = "hard")]
    p1: String,

    /// P1 display name
    #[arg(long, default_value = "p1")]
    p1_name: String,

    /// P1 softmax temperature override
    #[arg(long)]
    p1_temperature: Option<f64>,

    /// P1 avoid-best probability override
    #[arg(long)]
    p1_avoid_best: Option<f64>,

    /// P1 random-move probability override
    #[arg(long)]
    p1_random_move: Option<f64>,

    // --- Player 2 ---
    /// P2 strategy: "easy", "medium", "hard", "random" or a profile name
    #[arg(long, default_value = "easy")]
    p2: String,

    /// P2 display name
    #[arg(long, default_value = "p2")]
    p2_name: String,

    /// P2 softmax temperature override
    #[arg(long)]
    p2_temperature: Option<f64>,

    /// P2 avoid-best probability override
    #[arg(long)]
    p2_avoid_best: Option<f64>,

    /// P2 random-move probability override
    #[arg(long)]
    p2_random_move: Option<f64>,
}

enum StrategyKind {
    Random,
    Optimal,
    Sampling(SamplingParams),
}

struct PlayerConfig {
    name: String,
    kind: StrategyKind,
}

struct Overrides {
    temperature: Option<f64>,
    avoid_best: Option<f64>,
    random_move: Option<f64>,
}

fn build_player_config(
    name: &str,
    strategy: &str,
    overrides: Overrides,
    profiles: &BotProfilesFile,
) -> PlayerConfig {
    let kind = match strategy {
        "random" => StrategyKind::Random,
        "hard" | "optimal" => StrategyKind::Optimal,
        other => {
            let base = match other.parse::<Difficulty>() {
                Ok(difficulty) => profiles.sampling_params(difficulty),
                Err(_) => match profiles.profiles.get(other) {
                    Some(profile) => profile.to_sampling_params(SamplingParams::EASY),
                    None => {
                        eprintln!("Error: unknown strategy or profile '{}'", other);
                        eprintln!("Available profiles: {:?}", profiles.profiles.keys().collect::<Vec<_>>());
                        std::process::exit(1);
                    }
                },
            };
            StrategyKind::Sampling(SamplingParams {
                temperature: overrides.temperature.unwrap_or(base.temperature),
                avoid_best_probability: overrides.avoid_best.unwrap_or(base.avoid_best_probability),
                random_move_probability: overrides.random_move.unwrap_or(base.random_move_probability),
            })
        }
    };

    let display_name = if name == "p1" || name == "p2" {
        format!("{}:{}", name, strategy)
    } else {
        name.to_string()
    };
    PlayerConfig { name: display_name, kind }
}

fn build_strategy(config: &PlayerConfig) -> Box<dyn BotStrategy> {
    match config.kind {
        StrategyKind::Random => Box::new(RandomStrategy),
        StrategyKind::Optimal => Box::new(OptimalStrategy::default()),
        StrategyKind::Sampling(params) => Box::new(SamplingStrategy::new(params)),
    }
}

fn print_config(config: &PlayerConfig) {
    match &config.kind {
        StrategyKind::Random => eprintln!("  {}: type=random", config.name),
        StrategyKind::Optimal => eprintln!("  {}: type=optimal", config.name),
        StrategyKind::Sampling(p) => eprintln!(
            "  {}: type=sampling, temperature={}, avoid_best={}, random_move={}",
            config.name, p.temperature, p.avoid_best_probability, p.random_move_probability,
        ),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(LevelFilter::INFO.into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let profiles = match &cli.profiles {
        Some(path) => load_profiles(path).unwrap_or_else(|e| {
            eprintln!("Error loading profiles: {}", e);
            std::process::exit(1);
        }),
        None => load_default_profiles(),
    };

    let p1_config = build_player_config(
        &cli.p1_name,
        &cli.p1,
        Overrides {
            temperature: cli.p1_temperature,
            avoid_best: cli.p1_avoid_best,
            random_move: cli.p1_random_move,
        },
        &profiles,
    );
    let p2_config = build_player_config(
        &cli.p2_name,
        &cli.p2,
        Overrides {
            temperature: cli.p2_temperature,
            avoid_best: cli.p2_avoid_best,
            random_move: cli.p2_random_move,
        },
        &profiles,
    );
    if p1_config.name == p2_config.name {
        eprintln!("Error: both players are named '{}'", p1_config.name);
        std::process::exit(1);
    }

    eprintln!("Arena: {} games, seed={}, alternate_seats={}", cli.games, cli.seed, cli.alternate_seats);
    print_config(&p1_config);
    print_config(&p2_config);
    eprintln!();

    let mut strategies: HashMap<String, Box<dyn BotStrategy>> = HashMap::new();
    strategies.insert(p1_config.name.clone(), build_strategy(&p1_config));
    strategies.insert(p2_config.name.clone(), build_strategy(&p2_config));

    let total = cli.games;
    let progress_cb = move |done: usize, _total: usize| {
        eprint!("\r  [{}/{}] games completed", done, total);
    };

    let result = run_arena(&strategies, cli.games, cli.seed, cli.alternate_seats, Some(&progress_cb));

    eprintln!("\r                                    ");
    println!("{}", result.summary());
}

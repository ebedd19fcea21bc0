//! Bot-vs-bot diagnostic simulations.
//!
//! The `#[ignore]`d runs are NOT run in CI. Use them locally to check that
//! the difficulty tiers stay ordered after tuning bot_profiles.toml.
//!
//! Run with:
//!     cargo test --release --test bot_diagnostics -- --ignored --nocapture

use std::collections::HashMap;

use tictactoe_engine::engine::arena::{play_one_game, run_arena};
use tictactoe_engine::engine::bot_profiles::parse_profiles;
use tictactoe_engine::engine::bot_strategy::{
    BotStrategy, OptimalStrategy, RandomStrategy, SamplingParams, SamplingStrategy,
};
use tictactoe_engine::engine::policy::Difficulty;
use tictactoe_engine::engine::scoring::Outcome;
use tictactoe_engine::games::tictactoe::Side;

fn pair(
    a: (&str, Box<dyn BotStrategy>),
    b: (&str, Box<dyn BotStrategy>),
) -> HashMap<String, Box<dyn BotStrategy>> {
    let mut strategies = HashMap::new();
    strategies.insert(a.0.to_string(), a.1);
    strategies.insert(b.0.to_string(), b.1);
    strategies
}

/// Quick smoke run that does go through CI.
#[test]
fn medium_vs_random_smoke() {
    let s = pair(
        ("medium", Box::new(SamplingStrategy::new(SamplingParams::MEDIUM))),
        ("random", Box::new(RandomStrategy)),
    );
    let result = run_arena(&s, 4, 3, true, None);
    assert_eq!(result.decisive() + result.draws, 4);
    for tally in result.per_strategy.values() {
        assert_eq!(tally.games(), 4);
        assert_eq!(tally.games_as_x, 2);
        assert!(tally.scores.iter().all(|s| (0.0..=10.0).contains(s)));
    }
}

/// Losing side's session score always sits in the loss band.
#[test]
fn loss_scores_stay_in_band() {
    let easy = SamplingStrategy::new(SamplingParams::EASY);
    let hard = OptimalStrategy::default();
    for seed in 0..4 {
        let record = play_one_game(&hard, &easy, seed);
        assert_ne!(record.winner, Some(Side::O));
        if record.winner == Some(Side::X) {
            assert_eq!(record.outcome_for(Side::O), Outcome::Loss);
            let score = record.session_score(Side::O);
            assert!((1.0..=5.0).contains(&score), "loss score {score}");
        }
    }
}

/// Hard vs Easy. Baseline: hard never loses and wins most games.
#[test]
#[ignore]
fn hard_vs_easy() {
    let s = pair(
        ("hard", Box::new(OptimalStrategy::default())),
        ("easy", Box::new(SamplingStrategy::new(SamplingParams::EASY))),
    );
    let result = run_arena(
        &s,
        200,
        42,
        true,
        Some(&|done: usize, total: usize| {
            if done % 50 == 0 {
                eprintln!("  game {}/{}", done, total);
            }
        }),
    );
    println!("\n{}", result.summary());

    let (hard, easy) = (&result.per_strategy["hard"], &result.per_strategy["easy"]);
    assert_eq!(easy.wins, 0, "easy beat the hard tier");
    assert!(hard.win_rate() >= 0.5, "hard win rate {:.0}% is too low", hard.win_rate() * 100.0);
    assert!(hard.mean_score() > easy.mean_score());
}

/// Medium should beat Easy head to head.
#[test]
#[ignore]
fn medium_vs_easy() {
    let s = pair(
        ("medium", Box::new(SamplingStrategy::new(SamplingParams::MEDIUM))),
        ("easy", Box::new(SamplingStrategy::new(SamplingParams::EASY))),
    );
    let result = run_arena(&s, 400, 7, true, None);
    println!("\n{}", result.summary());

    let (medium, easy) = (&result.per_strategy["medium"], &result.per_strategy["easy"]);
    assert!(
        medium.win_rate() > easy.win_rate(),
        "medium {:.0}% vs easy {:.0}%",
        medium.win_rate() * 100.0,
        easy.win_rate() * 100.0
    );
}

/// Ladder over every tier from the shipped profile file against random play.
#[test]
#[ignore]
fn shipped_profiles_ladder() {
    let content = std::fs::read_to_string(concat!(env!("CARGO_MANIFEST_DIR"), "/bot_profiles.toml"))
        .unwrap();
    let profiles = parse_profiles(&content).unwrap();

    let mut rates = Vec::new();
    for difficulty in Difficulty::ALL {
        let bot: Box<dyn BotStrategy> = match difficulty {
            Difficulty::Hard => Box::new(OptimalStrategy::default()),
            d => Box::new(SamplingStrategy::new(profiles.sampling_params(d))),
        };
        let s = pair((difficulty.as_str(), bot), ("random", Box::new(RandomStrategy)));
        let result = run_arena(&s, 200, 11, true, None);
        let tier = &result.per_strategy[difficulty.as_str()];
        let rate = tier.win_rate();
        let (lo, hi) = tier.win_interval();
        println!(
            "  {:>6}: win {:5.1}% [{:.1}, {:.1}]  lost {:3}  avg score {:.2}",
            difficulty,
            rate * 100.0,
            lo * 100.0,
            hi * 100.0,
            tier.losses,
            tier.mean_score()
        );
        rates.push(rate);
    }
    assert!(rates[0] <= rates[1] && rates[1] <= rates[2], "tiers out of order: {:?}", rates);
}

//! Bot-vs-bot arena runner.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::engine::bot_strategy::BotStrategy;
use crate::engine::minimax::MinimaxEngine;
use crate::engine::scoring::{compute_session_score, Outcome};
use crate::engine::telemetry::{evaluate_committed_move, EvaluationRecord};
use crate::games::tictactoe::rules;
use crate::games::tictactoe::{Board, CheckResult, Side};

/// z for a two-sided 95% interval.
pub const Z_95: f64 = 1.96;

/// Wilson score bounds on a success rate observed as `successes` out of `trials`.
pub fn wilson_interval(successes: usize, trials: usize, z: f64) -> (f64, f64) {
    if trials == 0 {
        return (0.0, 1.0);
    }
    let n = trials as f64;
    let rate = successes as f64 / n;
    let z2 = z * z;
    let scale = 1.0 + z2 / n;
    let mid = (rate + z2 / (2.0 * n)) / scale;
    let half = z / scale * (rate * (1.0 - rate) / n + z2 / (4.0 * n * n)).sqrt();
    ((mid - half).max(0.0), (mid + half).min(1.0))
}

/// Everything one strategy accumulated over an arena run.
#[derive(Debug, Clone, Default)]
pub struct StrategyTally {
    pub wins: usize,
    pub losses: usize,
    pub draws: usize,
    pub games_as_x: usize,
    /// Session score per game, in play order.
    pub scores: Vec<f64>,
}

impl StrategyTally {
    pub fn games(&self) -> usize {
        self.wins + self.losses + self.draws
    }

    pub fn win_rate(&self) -> f64 {
        match self.games() {
            0 => 0.0,
            n => self.wins as f64 / n as f64,
        }
    }

    pub fn win_interval(&self) -> (f64, f64) {
        wilson_interval(self.wins, self.games(), Z_95)
    }

    pub fn mean_score(&self) -> f64 {
        if self.scores.is_empty() {
            return 0.0;
        }
        self.scores.iter().sum::<f64>() / self.scores.len() as f64
    }

    /// Sample standard deviation of the session scores; 0 below two games.
    pub fn score_spread(&self) -> f64 {
        if self.scores.len() < 2 {
            return 0.0;
        }
        let mean = self.mean_score();
        let sq: f64 = self.scores.iter().map(|s| (s - mean) * (s - mean)).sum();
        (sq / (self.scores.len() - 1) as f64).sqrt()
    }

    fn record(&mut self, outcome: Outcome, side: Side, score: f64) {
        match outcome {
            Outcome::Win => self.wins += 1,
            Outcome::Loss => self.losses += 1,
            Outcome::Draw => self.draws += 1,
        }
        if side == Side::X {
            self.games_as_x += 1;
        }
        self.scores.push(score);
    }
}

/// Outcome of a two-strategy arena run, keyed by strategy name.
#[derive(Debug, Clone, Default)]
pub struct ArenaResult {
    pub games: usize,
    pub draws: usize,
    pub per_strategy: BTreeMap<String, StrategyTally>,
    pub wall_time: Duration,
}

impl ArenaResult {
    pub fn decisive(&self) -> usize {
        self.games - self.draws
    }

    pub fn summary(&self) -> String {
        let mut out = format!("{} games, {} drawn, {:.2}s wall\n", self.games, self.draws, self.wall_time.as_secs_f64());
        out.push_str(&format!(
            "{:<16} {:>5} {:>5} {:>5} {:>7}  {:<15}  {:<13}  {:>4}\n",
            "strategy", "won", "lost", "drew", "win%", "wilson 95%", "score", "as X"
        ));
        for (name, t) in &self.per_strategy {
            let (lo, hi) = t.win_interval();
            out.push_str(&format!(
                "{:<16} {:>5} {:>5} {:>5} {:>6.1}%  [{:>5.1}, {:>5.1}]  {:>5.2} sd {:<4.2}  {:>4}\n",
                name,
                t.wins,
                t.losses,
                t.draws,
                t.win_rate() * 100.0,
                lo * 100.0,
                hi * 100.0,
                t.mean_score(),
                t.score_spread(),
                t.games_as_x,
            ));
        }
        out
    }
}

/// One finished arena game.
pub struct GameRecord {
    pub winner: Option<Side>,
    pub moves: usize,
    pub x_record: EvaluationRecord,
    pub o_record: EvaluationRecord,
}

impl GameRecord {
    pub fn outcome_for(&self, side: Side) -> Outcome {
        match self.winner {
            Some(w) if w == side => Outcome::Win,
            Some(_) => Outcome::Loss,
            None => Outcome::Draw,
        }
    }

    pub fn session_score(&self, side: Side) -> f64 {
        let (own, opp) = match side {
            Side::X => (&self.x_record, &self.o_record),
            Side::O => (&self.o_record, &self.x_record),
        };
        compute_session_score(own, opp, self.outcome_for(side))
    }
}

/// Play a single game to completion. `x` moves first.
pub fn play_one_game(x: &dyn BotStrategy, o: &dyn BotStrategy, seed: u64) -> GameRecord {
    let engine = MinimaxEngine::new();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut board = Board::new();
    let mut x_record = EvaluationRecord::new();
    let mut o_record = EvaluationRecord::new();
    let mut side = Side::X;
    let mut winner = None;

    loop {
        let strategy = match side {
            Side::X => x,
            Side::O => o,
        };
        let Some(mv) = strategy.choose_move(&board, side, &mut rng) else {
            break;
        };
        if let Some(entry) = evaluate_committed_move(&engine, &board, mv, side) {
            match side {
                Side::X => x_record.push(entry),
                Side::O => o_record.push(entry),
            }
        }
        match rules::commit_move(&mut board, mv, side) {
            Ok(CheckResult::Continue) => side = side.opponent(),
            Ok(CheckResult::Win(w)) => {
                winner = Some(w);
                break;
            }
            Ok(CheckResult::Draw) => break,
            Err(e) => {
                tracing::warn!(%side, cell = %mv, error = %e, "strategy produced an illegal move");
                winner = Some(side.opponent());
                break;
            }
        }
    }

    GameRecord {
        winner,
        moves: rules::moves_played(&board),
        x_record,
        o_record,
    }
}

/// Run `num_games` between exactly two strategies, in parallel over games.
///
/// Game `i` uses seed `base_seed + i`. With `alternate_seats` the strategies
/// swap X and O on odd games; otherwise the first name (sorted) always plays X.
pub fn run_arena(
    strategies: &HashMap<String, Box<dyn BotStrategy>>,
    num_games: usize,
    base_seed: u64,
    alternate_seats: bool,
    progress_callback: Option<&(dyn Fn(usize, usize) + Sync)>,
) -> ArenaResult {
    let mut names: Vec<String> = strategies.keys().cloned().collect();
    names.sort();
    assert_eq!(names.len(), 2, "arena needs exactly two strategies");

    let started = Instant::now();
    let completed = AtomicUsize::new(0);
    let games: Vec<(usize, GameRecord)> = (0..num_games)
        .into_par_iter()
        .map(|game_idx| {
            let seat_x = if alternate_seats { game_idx % 2 } else { 0 };
            let x = strategies[&names[seat_x]].as_ref();
            let o = strategies[&names[1 - seat_x]].as_ref();
            let record = play_one_game(x, o, base_seed + game_idx as u64);

            let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(cb) = progress_callback {
                cb(done, num_games);
            }
            (seat_x, record)
        })
        .collect();

    let mut result = ArenaResult {
        games: num_games,
        per_strategy: names.iter().map(|n| (n.clone(), StrategyTally::default())).collect(),
        ..Default::default()
    };
    for (seat_x, record) in games {
        if record.winner.is_none() {
            result.draws += 1;
        }
        for (seat, side) in [(seat_x, Side::X), (1 - seat_x, Side::O)] {
            if let Some(tally) = result.per_strategy.get_mut(&names[seat]) {
                tally.record(record.outcome_for(side), side, record.session_score(side));
            }
        }
    }
    result.wall_time = started.elapsed();

    tracing::info!(games = num_games, draws = result.draws, elapsed_ms = result.wall_time.as_millis() as u64, "arena run finished");
    result
}

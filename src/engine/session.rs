//! One human-vs-bot game context: board, telemetry, RNG and the
//! cancellable thinking pause before the bot commits.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::engine::bot_profiles::GameSettings;
use crate::engine::error::EngineError;
use crate::engine::minimax::MinimaxEngine;
use crate::engine::policy::{move_probabilities, DecisionPolicy, Difficulty, MoveProbabilities};
use crate::engine::scoring::{compute_session_score, Outcome, SessionSummary};
use crate::engine::telemetry::{evaluate_committed_move, EvaluationRecord};
use crate::games::tictactoe::rules;
use crate::games::tictactoe::{Board, CheckResult, Move, Side};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    InProgress,
    /// Outcome from the human's perspective.
    Finished(Outcome),
}

/// Running win / draw / loss counts across games of one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
}

impl Tally {
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Win => self.wins += 1,
            Outcome::Draw => self.draws += 1,
            Outcome::Loss => self.losses += 1,
        }
    }

    pub fn games(&self) -> u32 {
        self.wins + self.draws + self.losses
    }
}

/// Cloneable handle that resigns the current game from another task.
#[derive(Clone)]
pub struct ResignHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl ResignHandle {
    pub fn resign(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_resigned(&self) -> bool {
        *self.tx.borrow()
    }
}

/// A bot move that has been decided but not yet committed.
#[derive(Debug, Clone)]
pub struct PendingMove {
    pub mv: Move,
    pub hints: MoveProbabilities,
}

pub struct GameSession {
    board: Board,
    human: Side,
    opponent: Side,
    to_move: Side,
    status: GameStatus,
    policy: DecisionPolicy,
    engine: MinimaxEngine,
    human_record: EvaluationRecord,
    opponent_record: EvaluationRecord,
    rng: StdRng,
    tally: Tally,
    hint_temperature: f64,
    thinking_delay: Duration,
    cancel: Arc<watch::Sender<bool>>,
}

impl GameSession {
    /// Create a session and start its first game.
    pub fn new(policy: DecisionPolicy, settings: &GameSettings, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        let (tx, _rx) = watch::channel(false);
        let mut session = Self {
            board: Board::new(),
            human: Side::X,
            opponent: Side::O,
            to_move: Side::X,
            status: GameStatus::InProgress,
            policy,
            engine: MinimaxEngine::new(),
            human_record: EvaluationRecord::new(),
            opponent_record: EvaluationRecord::new(),
            rng,
            tally: Tally::default(),
            hint_temperature: settings.hint_temperature,
            thinking_delay: settings.thinking_delay(),
            cancel: Arc::new(tx),
        };
        session.start_game();
        session
    }

    /// Reset for a new game; a fair coin decides who opens. The opener plays X.
    pub fn start_game(&mut self) {
        let human_first = self.rng.gen_bool(0.5);
        self.start_game_with(human_first);
    }

    pub fn start_game_with(&mut self, human_first: bool) {
        self.board = Board::new();
        self.human_record.reset();
        self.opponent_record.reset();
        self.cancel.send_replace(false);

        (self.human, self.opponent) = if human_first { (Side::X, Side::O) } else { (Side::O, Side::X) };
        self.to_move = Side::X;
        self.status = GameStatus::InProgress;
        tracing::info!(
            human = %self.human,
            difficulty = %self.policy.difficulty(),
            human_first,
            "game started"
        );
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn human_side(&self) -> Side {
        self.human
    }

    pub fn opponent_side(&self) -> Side {
        self.opponent
    }

    pub fn to_move(&self) -> Side {
        self.to_move
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == GameStatus::InProgress
    }

    pub fn is_human_turn(&self) -> bool {
        self.is_running() && self.to_move == self.human
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.status {
            GameStatus::Finished(outcome) => Some(outcome),
            GameStatus::InProgress => None,
        }
    }

    pub fn human_record(&self) -> &EvaluationRecord {
        &self.human_record
    }

    pub fn opponent_record(&self) -> &EvaluationRecord {
        &self.opponent_record
    }

    pub fn tally(&self) -> Tally {
        self.tally
    }

    pub fn difficulty(&self) -> Difficulty {
        self.policy.difficulty()
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.policy.set_difficulty(difficulty);
    }

    pub fn thinking_delay(&self) -> Duration {
        self.thinking_delay
    }

    pub fn resign_handle(&self) -> ResignHandle {
        ResignHandle { tx: Arc::clone(&self.cancel) }
    }

    /// Validate, record telemetry, then apply. Rejections leave everything untouched.
    pub fn commit(&mut self, mv: Move, side: Side) -> Result<CheckResult, EngineError> {
        self.apply_pending_resignation();
        if !self.is_running() {
            return Err(EngineError::GameOver);
        }
        if side != self.to_move {
            return Err(EngineError::NotYourTurn { side });
        }
        if !mv.in_bounds() {
            return Err(EngineError::OutOfBounds { row: mv.row, col: mv.col });
        }
        if let Some(owner) = self.board.at(mv) {
            tracing::debug!(%side, cell = %mv, %owner, "rejected move onto occupied cell");
            return Err(EngineError::CellOccupied { row: mv.row, col: mv.col, owner });
        }

        // Telemetry reflects the position before the move lands.
        if let Some(entry) = evaluate_committed_move(&self.engine, &self.board, mv, side) {
            if side == self.human {
                self.human_record.push(entry);
            } else {
                self.opponent_record.push(entry);
            }
        }

        let result = rules::commit_move(&mut self.board, mv, side)?;
        tracing::info!(%side, cell = %mv, ?result, "move committed");
        match result {
            CheckResult::Win(winner) => {
                self.finish(if winner == self.human { Outcome::Win } else { Outcome::Loss });
            }
            CheckResult::Draw => self.finish(Outcome::Draw),
            CheckResult::Continue => self.to_move = side.opponent(),
        }
        Ok(result)
    }

    pub fn human_move(&mut self, mv: Move) -> Result<CheckResult, EngineError> {
        self.commit(mv, self.human)
    }

    /// Hint distribution over the bot's options in the current position.
    pub fn preview_opponent(&self) -> MoveProbabilities {
        move_probabilities(&self.board, self.opponent, self.hint_temperature)
    }

    /// Decide the bot's move without committing it.
    pub fn prepare_opponent_turn(&mut self) -> Result<PendingMove, EngineError> {
        self.apply_pending_resignation();
        if !self.is_running() {
            return Err(EngineError::GameOver);
        }
        if self.to_move != self.opponent {
            return Err(EngineError::NotYourTurn { side: self.opponent });
        }
        let hints = self.preview_opponent();
        let mv = self
            .policy
            .select_move(&self.board, self.opponent, &mut self.rng)
            .ok_or(EngineError::GameOver)?;
        tracing::debug!(cell = %mv, difficulty = %self.policy.difficulty(), "opponent decided");
        Ok(PendingMove { mv, hints })
    }

    /// Wait out the thinking pause, then commit `pending` unless the game was
    /// resigned or ended meanwhile. `Ok(None)` means the move was discarded.
    pub async fn complete_opponent_turn(
        &mut self,
        pending: PendingMove,
        delay: Duration,
    ) -> Result<Option<CheckResult>, EngineError> {
        if !delay.is_zero() {
            let mut cancelled = self.cancel.subscribe();
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = cancelled.wait_for(|resigned| *resigned) => {}
            }
        }

        if *self.cancel.borrow() {
            tracing::info!(cell = %pending.mv, "resigned during thinking pause, discarding move");
            self.resign();
            return Ok(None);
        }
        if !self.is_running() {
            tracing::info!(cell = %pending.mv, "game ended during thinking pause, discarding move");
            return Ok(None);
        }
        self.commit(pending.mv, self.opponent).map(Some)
    }

    /// Decide, pause for `delay`, commit.
    pub async fn opponent_turn(&mut self, delay: Duration) -> Result<Option<CheckResult>, EngineError> {
        let pending = self.prepare_opponent_turn()?;
        self.complete_opponent_turn(pending, delay).await
    }

    /// End the current game as a human loss. No-op once the game is over.
    pub fn resign(&mut self) {
        if self.is_running() {
            tracing::info!(human = %self.human, "human resigned");
            self.finish(Outcome::Loss);
        }
    }

    pub fn session_score(&self) -> Option<f64> {
        self.outcome()
            .map(|outcome| compute_session_score(&self.human_record, &self.opponent_record, outcome))
    }

    pub fn summary(&self) -> Option<SessionSummary> {
        self.outcome()
            .map(|outcome| SessionSummary::new(&self.human_record, &self.opponent_record, outcome))
    }

    /// A resignation raised through a [`ResignHandle`] ends the game before
    /// anything else touches the board.
    fn apply_pending_resignation(&mut self) {
        if *self.cancel.borrow() && self.is_running() {
            tracing::info!("resignation raised from another task");
            self.resign();
        }
    }

    fn finish(&mut self, outcome: Outcome) {
        self.status = GameStatus::Finished(outcome);
        self.tally.record(outcome);
        tracing::info!(?outcome, moves = rules::moves_played(&self.board), "game finished");
    }
}

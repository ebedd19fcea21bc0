//! Post-game scoring: telemetry in, one bounded session score out.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::engine::telemetry::EvaluationRecord;

pub const MAX_SCORE: f64 = 10.0;

/// Efficiency scores closer than this are reported as similar.
pub const EFFICIENCY_TOLERANCE: f64 = 0.1;

/// Result of a game from the scored side's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Loss,
    Draw,
    Win,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Outcome::Loss => "You Lost!",
            Outcome::Draw => "Draw!",
            Outcome::Win => "You Win!",
        })
    }
}

fn clamp01(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

/// Weighted play-quality estimate in [0, 1].
pub fn performance(own: &EvaluationRecord, opponent: &EvaluationRecord) -> f64 {
    let opt = if own.is_empty() { 0.5 } else { clamp01(own.average_optimality_ratio()) };
    let depth_factor = (own.average_depth() / 6.0).tanh();
    let node_factor = clamp01((own.average_node_count() + 10.0).log10() / 3.0);
    let rel = if own.is_empty() || opponent.is_empty() {
        0.0
    } else {
        ((own.average_value() - opponent.average_value()) / 6.0).tanh()
    };

    clamp01(0.5 * opt + 0.25 * depth_factor + 0.18 * node_factor + 0.02 * rel)
}

/// Map a performance value onto the outcome's score band, rounded to two decimals.
///
/// Bands: loss 1.0..=5.0, draw 7.0..=10.0, win 7.5..=10.0.
pub fn score_for_performance(performance: f64, outcome: Outcome) -> f64 {
    let p = clamp01(performance);
    let score = match outcome {
        Outcome::Draw => 7.0 + 3.0 * p,
        Outcome::Win => 7.5 + 2.5 * p,
        Outcome::Loss => 1.0 + 4.0 * p,
    };
    ((score * 100.0).round() / 100.0).clamp(0.0, MAX_SCORE)
}

pub fn compute_session_score(own: &EvaluationRecord, opponent: &EvaluationRecord, outcome: Outcome) -> f64 {
    score_for_performance(performance(own, opponent), outcome)
}

/// Average value times average optimality ratio.
pub fn efficiency_score(record: &EvaluationRecord) -> f64 {
    record.average_value() * record.average_optimality_ratio()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EfficiencyComparison {
    Similar,
    SelfAhead,
    OpponentAhead,
}

/// Read-only snapshot of one side's record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecordSummary {
    pub average_value: f64,
    pub average_best_value: f64,
    pub average_depth: f64,
    pub average_node_count: f64,
    pub average_optimality_ratio: f64,
    pub move_count: usize,
}

impl From<&EvaluationRecord> for RecordSummary {
    fn from(record: &EvaluationRecord) -> Self {
        Self {
            average_value: record.average_value(),
            average_best_value: record.average_best_value(),
            average_depth: record.average_depth(),
            average_node_count: record.average_node_count(),
            average_optimality_ratio: record.average_optimality_ratio(),
            move_count: record.move_count(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyReport {
    pub own: f64,
    pub opponent: f64,
    pub comparison: EfficiencyComparison,
}

/// Everything a results screen needs after a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub outcome: Outcome,
    pub own: RecordSummary,
    pub opponent: RecordSummary,
    pub efficiency: Option<EfficiencyReport>,
    pub session_score: f64,
}

impl SessionSummary {
    pub fn new(own: &EvaluationRecord, opponent: &EvaluationRecord, outcome: Outcome) -> Self {
        let efficiency = if own.is_empty() || opponent.is_empty() {
            None
        } else {
            let own_eff = efficiency_score(own);
            let opp_eff = efficiency_score(opponent);
            let comparison = if (own_eff - opp_eff).abs() < EFFICIENCY_TOLERANCE {
                EfficiencyComparison::Similar
            } else if own_eff > opp_eff {
                EfficiencyComparison::SelfAhead
            } else {
                EfficiencyComparison::OpponentAhead
            };
            Some(EfficiencyReport { own: own_eff, opponent: opp_eff, comparison })
        };

        Self {
            outcome,
            own: own.into(),
            opponent: opponent.into(),
            efficiency,
            session_score: compute_session_score(own, opponent, outcome),
        }
    }
}

fn write_side(f: &mut fmt::Formatter<'_>, label: &str, s: &RecordSummary) -> fmt::Result {
    writeln!(f, "[{}]", label)?;
    if s.move_count == 0 {
        return writeln!(f, "No data\n");
    }
    writeln!(f, "Average minimax value (chosen): {:.2}", s.average_value)?;
    writeln!(f, "Average optimal minimax value: {:.2}", s.average_best_value)?;
    writeln!(f, "Average tree depth: {:.1}", s.average_depth)?;
    writeln!(f, "Average node count: {:.1}", s.average_node_count)?;
    writeln!(f, "Average optimality ratio: {:.1}%", s.average_optimality_ratio * 100.0)?;
    writeln!(f, "Total moves: {}\n", s.move_count)
}

impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.outcome)?;
        writeln!(f, "=== Minimax evaluation ===\n")?;
        if self.own.move_count == 0 && self.opponent.move_count == 0 {
            writeln!(f, "No evaluation data\n")?;
        } else {
            write_side(f, "Player", &self.own)?;
            write_side(f, "Opponent", &self.opponent)?;
            if let Some(eff) = &self.efficiency {
                writeln!(f, "[Efficiency]")?;
                writeln!(f, "Player: {:.2}", eff.own)?;
                writeln!(f, "Opponent: {:.2}", eff.opponent)?;
                writeln!(
                    f,
                    "{}",
                    match eff.comparison {
                        EfficiencyComparison::Similar => "-> similar efficiency",
                        EfficiencyComparison::SelfAhead => "-> player played more efficiently",
                        EfficiencyComparison::OpponentAhead => "-> opponent played more efficiently",
                    }
                )?;
                writeln!(f)?;
            }
        }
        write!(f, "[Session score] {:.2} / 10", self.session_score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::telemetry::{optimality_ratio, MoveTelemetry};

    fn record(entries: &[(f64, f64, u32, u64)]) -> EvaluationRecord {
        let mut r = EvaluationRecord::new();
        for &(chosen, best, depth, nodes) in entries {
            r.push(MoveTelemetry {
                chosen_value: chosen,
                best_value: best,
                max_depth: depth,
                node_count: nodes,
                optimality_ratio: optimality_ratio(chosen, best),
            });
        }
        r
    }

    #[test]
    fn test_empty_records_use_neutral_defaults() {
        let empty = EvaluationRecord::new();
        // opt = 0.5, depth = 0, nodes = log10(10)/3 = 1/3, rel = 0
        let expected = 0.5 * 0.5 + 0.18 / 3.0;
        assert!((performance(&empty, &empty) - expected).abs() < 1e-12);
        assert_eq!(compute_session_score(&empty, &empty, Outcome::Loss), 2.24);
    }

    #[test]
    fn test_outcome_ordering_at_equal_performance() {
        for i in 0..=20 {
            let p = i as f64 / 20.0;
            let win = score_for_performance(p, Outcome::Win);
            let draw = score_for_performance(p, Outcome::Draw);
            let loss = score_for_performance(p, Outcome::Loss);
            assert!(loss < draw, "p={p}");
            assert!(draw <= win, "p={p}");
            if p < 1.0 {
                assert!(draw < win, "p={p}");
            }
        }
    }

    #[test]
    fn test_monotonic_in_performance() {
        for outcome in [Outcome::Loss, Outcome::Draw, Outcome::Win] {
            let mut last = f64::NEG_INFINITY;
            for i in 0..=100 {
                let s = score_for_performance(i as f64 / 100.0, outcome);
                assert!(s >= last);
                assert!((0.0..=10.0).contains(&s));
                last = s;
            }
        }
    }

    #[test]
    fn test_band_edges() {
        assert_eq!(score_for_performance(0.0, Outcome::Loss), 1.0);
        assert_eq!(score_for_performance(1.0, Outcome::Loss), 5.0);
        assert_eq!(score_for_performance(0.0, Outcome::Draw), 7.0);
        assert_eq!(score_for_performance(1.0, Outcome::Win), 10.0);
        assert_eq!(score_for_performance(7.0, Outcome::Win), 10.0);
    }

    #[test]
    fn test_skillful_loss_beats_careless_loss() {
        let careful = record(&[(-7.0, -7.0, 6, 900), (-8.0, -8.0, 4, 60)]);
        let careless = record(&[(-9.0, 0.0, 6, 900), (-9.0, 0.0, 4, 60)]);
        let opp = record(&[(9.0, 9.0, 5, 200)]);
        assert!(
            compute_session_score(&careful, &opp, Outcome::Loss)
                > compute_session_score(&careless, &opp, Outcome::Loss)
        );
    }

    #[test]
    fn test_summary_efficiency() {
        let own = record(&[(0.0, 0.0, 8, 7000), (0.0, 0.0, 6, 900)]);
        let opp = record(&[(0.0, 0.0, 7, 8000), (-9.0, 0.0, 5, 200)]);
        let summary = SessionSummary::new(&own, &opp, Outcome::Draw);
        let eff = summary.efficiency.unwrap();
        // own: 0.0 * 1.0, opponent: -4.5 * 0.5
        assert_eq!(eff.own, 0.0);
        assert_eq!(eff.opponent, -2.25);
        assert_eq!(eff.comparison, EfficiencyComparison::SelfAhead);

        let mirrored = SessionSummary::new(&own, &own, Outcome::Draw);
        assert_eq!(mirrored.efficiency.unwrap().comparison, EfficiencyComparison::Similar);
        assert_eq!(summary.own.move_count, 2);
        assert!(summary.session_score >= 7.0);

        let text = summary.to_string();
        assert!(text.starts_with("Draw!"));
        assert!(text.contains("[Session score]"));
    }

    #[test]
    fn test_summary_without_data() {
        let empty = EvaluationRecord::new();
        let summary = SessionSummary::new(&empty, &empty, Outcome::Draw);
        assert!(summary.efficiency.is_none());
        assert!(summary.to_string().contains("No evaluation data"));
    }
}

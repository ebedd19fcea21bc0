//! Persistent top-N table of session scores.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::engine::error::EngineError;
use crate::engine::scoring::MAX_SCORE;

pub const DEFAULT_MAX_ENTRIES: usize = 10;
pub const DEFAULT_PLAYER_NAME: &str = "Player";
const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: f64,
    pub date: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LeaderboardData {
    #[serde(default)]
    entries: Vec<LeaderboardEntry>,
}

/// Entries sorted by descending score and capped at `max_entries`.
pub struct Leaderboard {
    data: LeaderboardData,
    max_entries: usize,
    path: Option<PathBuf>,
}

impl Leaderboard {
    /// A leaderboard that is never written to disk.
    pub fn in_memory(max_entries: usize) -> Self {
        Self {
            data: LeaderboardData::default(),
            max_entries,
            path: None,
        }
    }

    /// Load from `path`. A missing file starts empty; an unreadable or corrupt
    /// one is logged and also starts empty.
    pub fn open(path: impl Into<PathBuf>, max_entries: usize) -> Self {
        let path = path.into();
        let data = match load_data(&path) {
            Ok(Some(data)) => {
                tracing::info!(path = %path.display(), count = data.entries.len(), "loaded leaderboard");
                data
            }
            Ok(None) => LeaderboardData::default(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to load leaderboard");
                LeaderboardData::default()
            }
        };
        let mut board = Self { data, max_entries, path: Some(path) };
        board.sort_and_trim();
        board
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.data.entries
    }

    pub fn len(&self) -> usize {
        self.data.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.entries.is_empty()
    }

    /// Insert a score stamped with the current local time.
    ///
    /// Returns the new entry's rank (0-based), or `None` if it did not make
    /// the cut. Ties keep earlier entries ahead.
    pub fn add_entry(&mut self, name: &str, score: f64) -> Option<usize> {
        let date = chrono::Local::now().format(DATE_FORMAT).to_string();
        self.add_entry_at(name, score, date)
    }

    pub fn add_entry_at(&mut self, name: &str, score: f64, date: String) -> Option<usize> {
        let name = match name.trim() {
            "" => DEFAULT_PLAYER_NAME.to_string(),
            trimmed => trimmed.to_string(),
        };
        let score = if score.is_finite() { score.clamp(0.0, MAX_SCORE) } else { 0.0 };

        // Stable sort below keeps the new entry after existing equal scores.
        let rank = self.data.entries.iter().filter(|e| e.score >= score).count();
        self.data.entries.push(LeaderboardEntry { name: name.clone(), score, date });
        self.sort_and_trim();
        self.persist();

        let inserted = (rank < self.max_entries).then_some(rank);
        tracing::info!(%name, score, rank = ?inserted, "leaderboard entry added");
        inserted
    }

    pub fn clear(&mut self) {
        self.data.entries.clear();
        self.persist();
    }

    /// Write to the backing file, if any.
    pub fn save(&self) -> Result<(), EngineError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(&self.data)
            .map_err(|source| EngineError::Json { path: path.clone(), source })?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|source| EngineError::Io { path: parent.to_path_buf(), source })?;
        }
        std::fs::write(path, json).map_err(|source| EngineError::Io { path: path.clone(), source })
    }

    fn persist(&self) {
        if let Err(e) = self.save() {
            tracing::warn!(error = %e, "failed to save leaderboard");
        }
    }

    fn sort_and_trim(&mut self) {
        self.data.entries.sort_by(|a, b| b.score.total_cmp(&a.score));
        self.data.entries.truncate(self.max_entries);
    }
}

fn load_data(path: &Path) -> Result<Option<LeaderboardData>, EngineError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)
        .map_err(|source| EngineError::Io { path: path.to_path_buf(), source })?;
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|source| EngineError::Json { path: path.to_path_buf(), source })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stamp(n: u32) -> String {
        format!("2026-01-01 00:{:02}", n)
    }

    #[test]
    fn test_sorted_descending_with_rank() {
        let mut board = Leaderboard::in_memory(DEFAULT_MAX_ENTRIES);
        assert_eq!(board.add_entry_at("a", 5.0, stamp(0)), Some(0));
        assert_eq!(board.add_entry_at("b", 9.0, stamp(1)), Some(0));
        assert_eq!(board.add_entry_at("c", 7.0, stamp(2)), Some(1));
        let scores: Vec<f64> = board.entries().iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![9.0, 7.0, 5.0]);
        assert_eq!(board.entries()[1].name, "c");
    }

    #[test]
    fn test_ties_rank_after_existing() {
        let mut board = Leaderboard::in_memory(DEFAULT_MAX_ENTRIES);
        board.add_entry_at("first", 8.0, stamp(0));
        assert_eq!(board.add_entry_at("second", 8.0, stamp(1)), Some(1));
        assert_eq!(board.entries()[0].name, "first");
        assert_eq!(board.entries()[1].name, "second");
    }

    #[test]
    fn test_capped_and_low_score_dropped() {
        let mut board = Leaderboard::in_memory(3);
        for (i, s) in [9.0, 8.0, 7.0].into_iter().enumerate() {
            board.add_entry_at("p", s, stamp(i as u32));
        }
        assert_eq!(board.add_entry_at("late", 1.0, stamp(9)), None);
        assert_eq!(board.len(), 3);
        assert_eq!(board.add_entry_at("top", 9.5, stamp(10)), Some(0));
        assert_eq!(board.len(), 3);
        assert_eq!(board.entries().last().unwrap().score, 8.0);
    }

    #[test]
    fn test_blank_name_and_score_clamp() {
        let mut board = Leaderboard::in_memory(DEFAULT_MAX_ENTRIES);
        board.add_entry_at("   ", 42.0, stamp(0));
        board.add_entry_at("neg", -3.0, stamp(1));
        assert_eq!(board.entries()[0].name, DEFAULT_PLAYER_NAME);
        assert_eq!(board.entries()[0].score, 10.0);
        assert_eq!(board.entries()[1].score, 0.0);
    }

    #[test]
    fn test_persists_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores").join("leaderboard.json");

        let mut board = Leaderboard::open(&path, 5);
        assert!(board.is_empty());
        board.add_entry("ada", 8.25);
        board.add_entry("bob", 9.5);

        let reloaded = Leaderboard::open(&path, 5);
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.entries()[0].name, "bob");
        assert_eq!(reloaded.entries()[1].score, 8.25);
        assert_eq!(reloaded.entries()[0].date.len(), "2026-01-01 00:00".len());
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leaderboard.json");
        std::fs::write(&path, "{not json").unwrap();
        let board = Leaderboard::open(&path, 5);
        assert!(board.is_empty());
    }

    #[test]
    fn test_clear_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leaderboard.json");
        let mut board = Leaderboard::open(&path, 5);
        board.add_entry("x", 3.0);
        board.clear();
        assert!(Leaderboard::open(&path, 5).is_empty());
    }
}

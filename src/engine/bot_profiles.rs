//! Named bot profiles and game settings.
//! Loaded from TOML at runtime for the CLI and the arena.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::engine::bot_strategy::SamplingParams;
use crate::engine::error::EngineError;
use crate::engine::leaderboard::DEFAULT_MAX_ENTRIES;
use crate::engine::policy::{DecisionPolicy, Difficulty, HINT_TEMPERATURE};

/// Sampling knobs for one named profile. Unset fields fall back to the tier defaults.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct BotProfile {
    pub description: Option<String>,
    pub temperature: Option<f64>,
    pub avoid_best_probability: Option<f64>,
    pub random_move_probability: Option<f64>,
}

impl BotProfile {
    pub fn to_sampling_params(&self, defaults: SamplingParams) -> SamplingParams {
        SamplingParams {
            temperature: self.temperature.unwrap_or(defaults.temperature),
            avoid_best_probability: self.avoid_best_probability.unwrap_or(defaults.avoid_best_probability),
            random_move_probability: self.random_move_probability.unwrap_or(defaults.random_move_probability),
        }
    }
}

/// Maps difficulty tiers to profile names.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ProductionConfig {
    pub easy: Option<String>,
    pub medium: Option<String>,
    pub hard: Option<String>,
    pub default: Option<String>,
}

impl ProductionConfig {
    /// Resolve a difficulty tier to a profile name.
    pub fn resolve(&self, difficulty: Difficulty) -> Option<&str> {
        let named = match difficulty {
            Difficulty::Easy => self.easy.as_deref(),
            Difficulty::Medium => self.medium.as_deref(),
            Difficulty::Hard => self.hard.as_deref(),
        };
        named.or(self.default.as_deref())
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GameSettings {
    /// Pause before the opponent commits its move.
    pub thinking_delay_ms: u64,
    pub hint_temperature: f64,
    pub leaderboard_max: usize,
    pub leaderboard_path: PathBuf,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            thinking_delay_ms: 1500,
            hint_temperature: HINT_TEMPERATURE,
            leaderboard_max: DEFAULT_MAX_ENTRIES,
            leaderboard_path: PathBuf::from("leaderboard.json"),
        }
    }
}

impl GameSettings {
    pub fn thinking_delay(&self) -> Duration {
        Duration::from_millis(self.thinking_delay_ms)
    }
}

/// Top-level TOML file structure.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct BotProfilesFile {
    #[serde(default)]
    pub profiles: HashMap<String, BotProfile>,
    #[serde(default)]
    pub production: ProductionConfig,
    #[serde(default)]
    pub settings: GameSettings,
}

impl BotProfilesFile {
    fn tier_defaults(difficulty: Difficulty) -> SamplingParams {
        match difficulty {
            Difficulty::Medium => SamplingParams::MEDIUM,
            _ => SamplingParams::EASY,
        }
    }

    /// Sampling parameters for a tier: the mapped profile, else a profile named
    /// after the tier, else the built-in defaults.
    pub fn sampling_params(&self, difficulty: Difficulty) -> SamplingParams {
        let defaults = Self::tier_defaults(difficulty);
        let name = self.production.resolve(difficulty).unwrap_or(difficulty.as_str());
        match self.profiles.get(name) {
            Some(profile) => profile.to_sampling_params(defaults),
            None => defaults,
        }
    }

    pub fn policy(&self, difficulty: Difficulty) -> DecisionPolicy {
        DecisionPolicy::with_params(
            difficulty,
            self.sampling_params(Difficulty::Easy),
            self.sampling_params(Difficulty::Medium),
        )
    }
}

/// Load profiles from a TOML file at the given path.
pub fn load_profiles(path: &Path) -> Result<BotProfilesFile, EngineError> {
    let content = std::fs::read_to_string(path)
        .map_err(|source| EngineError::Io { path: path.to_path_buf(), source })?;
    parse_profiles(&content).map_err(|source| EngineError::Toml { path: path.to_path_buf(), source })
}

pub fn parse_profiles(content: &str) -> Result<BotProfilesFile, toml::de::Error> {
    toml::from_str(content)
}

/// Try to load profiles from well-known paths, returning defaults if none found.
pub fn load_default_profiles() -> BotProfilesFile {
    let candidates = [
        "bot_profiles.toml",
        "../bot_profiles.toml",
        "/etc/tictactoe/bot_profiles.toml",
    ];
    for path in &candidates {
        let p = Path::new(path);
        if p.exists() {
            match load_profiles(p) {
                Ok(profiles) => {
                    tracing::info!(path = %p.display(), count = profiles.profiles.len(), "loaded bot profiles");
                    return profiles;
                }
                Err(e) => {
                    tracing::warn!(path = %p.display(), error = %e, "failed to load bot profiles");
                }
            }
        }
    }
    tracing::info!("no bot_profiles.toml found, using built-in defaults");
    BotProfilesFile::default()
}

pub mod arena;
pub mod bot_profiles;
pub mod bot_strategy;
pub mod error;
pub mod leaderboard;
pub mod minimax;
pub mod policy;
pub mod scoring;
pub mod session;
pub mod telemetry;

use crate::error::AppError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub leaderboard: LeaderboardConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub env: String,
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardConfig {
    /// Sizes the skip list height: max level ~ log2(expected participants).
    pub expected_participants: u64,
    /// Upper bound (exclusive) for whole-point scores generated by the
    /// test-data seeder.
    pub seed_max_score: i64,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            expected_participants: default_expected_participants(),
            seed_max_score: default_seed_max_score(),
        }
    }
}

fn default_expected_participants() -> u64 {
    1_000_000
}

fn default_seed_max_score() -> i64 {
    500
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Ok(Config {
            app: AppConfig {
                env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("APP_PORT")
                    .unwrap_or_else(|_| "8080".to_string())
                    .parse()
                    .map_err(|e| AppError::Config(format!("APP_PORT: {e}")))?,
                log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            },
            leaderboard: LeaderboardConfig {
                expected_participants: std::env::var("LEADERBOARD_EXPECTED_PARTICIPANTS")
                    .ok()
                    .map(|v| {
                        v.parse().map_err(|e| {
                            AppError::Config(format!("LEADERBOARD_EXPECTED_PARTICIPANTS: {e}"))
                        })
                    })
                    .transpose()?
                    .unwrap_or_else(default_expected_participants),
                seed_max_score: std::env::var("LEADERBOARD_SEED_MAX_SCORE")
                    .ok()
                    .map(|v| {
                        v.parse().map_err(|e| {
                            AppError::Config(format!("LEADERBOARD_SEED_MAX_SCORE: {e}"))
                        })
                    })
                    .transpose()?
                    .unwrap_or_else(default_seed_max_score),
            },
        })
    }
}

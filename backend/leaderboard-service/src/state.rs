use crate::{config::Config, services::leaderboard::LeaderboardEngine};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<LeaderboardEngine>,
    pub config: Arc<Config>,
}

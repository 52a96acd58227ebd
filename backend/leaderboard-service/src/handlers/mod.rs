pub mod customer;
#[path = "health.rs"]
mod health_impl;
pub mod leaderboard;

pub use customer::{add_test_data, update_score};
pub use health_impl::health;
pub use leaderboard::{get_leaderboard, get_neighbors};

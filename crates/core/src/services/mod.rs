pub mod annotation;
pub mod auth_service;
pub mod change_cell;
pub mod dashboard_service;
pub mod leaderboard_service;
pub mod lifetime;
pub mod market_service;
pub mod polling;

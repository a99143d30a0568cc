pub mod balance;
pub mod broker;
pub mod chart;
pub mod dashboard;
pub mod execution;
pub mod leaderboard;
pub mod market;
pub mod session;
pub mod timestamp;

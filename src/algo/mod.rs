/// Deep Q-learning with experience replay
pub mod dqn;

/// Bellman target construction
pub mod target;

pub use dqn::DQNAgent;

use burn::config::Config;

use crate::error::{Error, Result};

/// Hyperparameters for the [`DQNAgent`](crate::algo::dqn::DQNAgent)
#[derive(Config, Debug)]
pub struct AgentConfig {
    /// Maximum number of transitions kept for replay
    #[config(default = 100_000)]
    pub memory_capacity: usize,
    /// Number of transitions replayed at the end of each episode
    #[config(default = 1000)]
    pub batch_size: usize,
    /// The discount factor
    #[config(default = 0.9)]
    pub gamma: f32,
    #[config(default = 1.0)]
    pub epsilon_start: f32,
    /// Multiplied into epsilon once per episode
    #[config(default = 0.95)]
    pub epsilon_decay: f32,
    #[config(default = 0.05)]
    pub min_epsilon: f32,
    /// Save the model every this many episodes, or never if zero
    #[config(default = 10)]
    pub save_every: u32,
    /// Seed for exploration and replay sampling; drawn from entropy if unset
    #[config(default = "None")]
    pub seed: Option<u64>,
}

impl AgentConfig {
    pub fn validate(&self) -> Result<()> {
        let check = |ok: bool, msg: String| if ok { Ok(()) } else { Err(Error::InvalidConfig(msg)) };

        check(self.memory_capacity > 0, "memory_capacity must be nonzero".into())?;
        check(self.batch_size > 0, "batch_size must be nonzero".into())?;
        check(
            (0.0..=1.0).contains(&self.gamma),
            format!("gamma must be in [0, 1], got {}", self.gamma),
        )?;
        check(
            (0.0..=1.0).contains(&self.epsilon_start),
            format!("epsilon_start must be in [0, 1], got {}", self.epsilon_start),
        )?;
        check(
            (0.0..=1.0).contains(&self.min_epsilon),
            format!("min_epsilon must be in [0, 1], got {}", self.min_epsilon),
        )?;
        check(
            self.min_epsilon <= self.epsilon_start,
            "min_epsilon must not exceed epsilon_start".into(),
        )?;
        check(
            self.epsilon_decay > 0.0 && self.epsilon_decay <= 1.0,
            format!("epsilon_decay must be in (0, 1], got {}", self.epsilon_decay),
        )
    }
}

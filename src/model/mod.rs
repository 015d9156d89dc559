pub mod mlp;

pub use mlp::{Mlp, MlpConfig};

/// A function approximator mapping a state to one predicted value per action
pub trait Model {
    /// Width of the state vectors the model accepts
    fn input_dim(&self) -> usize;

    /// Number of actions, i.e. the length of every prediction
    fn output_dim(&self) -> usize;

    /// Predict the value of each action in `state` without changing the model
    fn predict(&self, state: &[f32]) -> anyhow::Result<Vec<f32>>;

    /// Take one supervised gradient step pulling `predict(state)` towards `target`
    fn train(&mut self, state: &[f32], target: &[f32]) -> anyhow::Result<()>;

    /// Persist the model's parameters
    fn save(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

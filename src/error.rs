use thiserror::Error;

/// Errors surfaced by the learning loop and its utilities
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("state has width {got}, but the model expects {expected}")]
    StateWidth { expected: usize, got: usize },

    #[error("model produced {got} values, but {expected} actions are configured")]
    OutputWidth { expected: usize, got: usize },

    #[error("action of length {len} is not a one-hot vector")]
    InvalidAction { len: usize },

    #[error("replay memory returned an empty sample")]
    EmptySample,

    #[error("game failure: {0:#}")]
    Game(anyhow::Error),

    #[error("model failure: {0:#}")]
    Model(anyhow::Error),

    #[error("strategy '{name}' failed: {cause:#}")]
    Strategy { name: String, cause: anyhow::Error },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

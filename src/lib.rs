/// One-hot encoded actions
pub mod action;

/// Learning algorithms
pub mod algo;

/// Timing harness for decision strategies
pub mod bench;

/// Agent hyperparameters
pub mod config;

/// Strategies for decaying hyperparameters between episodes
pub mod decay;

/// Data structures
pub mod ds;

/// The game contract
pub mod env;

pub mod error;

/// Exploration policies
pub mod exploration;

/// Built-in games
pub mod gym;

/// Experience replay
pub mod memory;

/// Function approximators
pub mod model;

/// Score sinks
pub mod report;

/// Terminal plots
#[cfg(feature = "viz")]
pub mod viz;

mod util;

pub use error::{Error, Result};

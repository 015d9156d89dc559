use crate::{action::Action, env::State};

/// A single observed transition in the game
///
/// Terminal transitions carry a regular `next_state`; the terminal value lives in `reward`.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// The state of the game before taking the action
    pub state: State,
    /// The action taken in the given state
    pub action: Action,
    /// The reward received after taking the action
    pub reward: f32,
    /// The state of the game after the action is taken
    pub next_state: State,
}

impl Transition {
    pub fn new(state: State, action: Action, reward: f32, next_state: State) -> Self {
        Self {
            state,
            action,
            reward,
            next_state,
        }
    }
}

use crate::action::Action;

/// A snapshot of the game's observable situation, with a fixed length for a given game
pub type State = Vec<f32>;

/// The real-time game an agent learns to play
///
/// Calls arrive in a fixed order each step: [`state`](Game::state), [`take_action`](Game::take_action),
/// [`state`](Game::state) again, then [`reward`](Game::reward). Any error is treated as fatal by the
/// learning loop, since a broken game boundary leaves no reward signal worth trusting.
pub trait Game {
    /// Capture the current state
    fn state(&mut self) -> anyhow::Result<State>;

    /// Apply a one-hot action to the game
    fn take_action(&mut self, action: &Action) -> anyhow::Result<()>;

    /// The reward for the last action and whether it ended the game
    ///
    /// Terminal rewards should already encode the terminal value, since the Bellman target adds
    /// the discounted next-state value unconditionally.
    ///
    /// **Returns** `(reward, game_over)`
    fn reward(&mut self) -> anyhow::Result<(f32, bool)>;

    /// The score of the current game
    fn score(&self) -> i64;

    /// Start a new game
    fn restart(&mut self) -> anyhow::Result<()>;
}

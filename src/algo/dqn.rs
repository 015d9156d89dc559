use log::{debug, info, trace};
use rand::{rngs::StdRng, SeedableRng};

use crate::{
    action::Action,
    config::AgentConfig,
    decay::Multiplicative,
    env::{Game, State},
    error::{Error, Result},
    exploration::{Choice, EpsilonGreedy, Mode},
    memory::{ReplayMemory, Transition},
    model::Model,
    report::{NullSink, ScoreSink},
};

use super::target::{build_target, predict};

/// Where the agent currently is within a step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    AwaitingState,
    Acting,
    Observing,
    ShortTraining,
    EpisodeEnd,
}

/// What happened during one step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    pub reward: f32,
    pub game_over: bool,
}

/// A Deep Q-learning agent with experience replay
///
/// Every step trains the model on the fresh transition (short memory) and stores it; every
/// finished episode replays a random batch of stored transitions (long memory) and decays epsilon.
///
/// ### Generics
/// - `G`: The [`Game`] the agent plays
/// - `M`: The [`Model`] approximating action values; its output width is the number of moves
/// - `S`: A [`ScoreSink`] receiving the score history after each episode
pub struct DQNAgent<G, M, S = NullSink> {
    game: G,
    model: M,
    sink: S,
    memory: ReplayMemory,
    exploration: EpsilonGreedy<Multiplicative>,
    gamma: f32,
    batch_size: usize,
    save_every: u32,
    episode: u32,
    scores: Vec<i64>,
    phase: Phase,
    rng: StdRng,
}

impl<G: Game, M: Model> DQNAgent<G, M> {
    /// Initialize a new `DQNAgent`
    ///
    /// ### Arguments
    /// - `game` The game to play
    /// - `model` The approximator, whose output width fixes the number of moves
    /// - `config` An [`AgentConfig`] containing hyperparameters for the agent
    pub fn new(game: G, model: M, config: &AgentConfig) -> Result<Self> {
        Self::with_sink(game, model, NullSink, config)
    }
}

impl<G: Game, M: Model, S: ScoreSink> DQNAgent<G, M, S> {
    pub fn with_sink(game: G, model: M, sink: S, config: &AgentConfig) -> Result<Self> {
        config.validate()?;
        if model.output_dim() == 0 {
            return Err(Error::InvalidConfig("model has no outputs".into()));
        }

        let decay = Multiplicative::new(config.epsilon_decay, config.min_epsilon)?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            game,
            model,
            sink,
            memory: ReplayMemory::new(config.memory_capacity),
            exploration: EpsilonGreedy::new(config.epsilon_start, decay)?,
            gamma: config.gamma,
            batch_size: config.batch_size,
            save_every: config.save_every,
            episode: 0,
            scores: Vec::new(),
            phase: Phase::default(),
            rng,
        })
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.exploration.set_mode(mode);
    }

    pub fn mode(&self) -> Mode {
        self.exploration.mode()
    }

    pub fn epsilon(&self) -> f32 {
        self.exploration.epsilon()
    }

    /// Number of finished episodes
    pub fn episode(&self) -> u32 {
        self.episode
    }

    pub fn scores(&self) -> &[i64] {
        &self.scores
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn memory(&self) -> &ReplayMemory {
        &self.memory
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_parts(self) -> (G, M, S) {
        (self.game, self.model, self.sink)
    }

    /// Invoke the exploration policy to choose an action from the given state
    pub fn act(&mut self, state: &[f32]) -> Result<Action> {
        match self.exploration.choose(&mut self.rng) {
            Choice::Explore => Ok(Action::random(self.model.output_dim(), &mut self.rng)),
            Choice::Exploit => Action::greedy(&predict(&self.model, state)?),
        }
    }

    /// Train on a single fresh transition
    pub fn train_short_memory(&mut self, transition: &Transition) -> Result<()> {
        fit(&mut self.model, transition, self.gamma)
    }

    /// Replay a batch drawn from memory, one short-memory update per transition
    pub fn train_long_memory(&mut self) -> Result<()> {
        let batch = self.memory.sample(self.batch_size, &mut self.rng);
        if batch.is_empty() {
            return Err(Error::EmptySample);
        }
        debug!(
            "Replaying {} of {} stored transitions",
            batch.len(),
            self.memory.len()
        );
        for transition in batch {
            fit(&mut self.model, transition, self.gamma)?;
        }
        Ok(())
    }

    /// Store a transition for later replay
    pub fn remember(&mut self, transition: Transition) {
        self.memory.push(transition);
    }

    /// Run one full training step, finishing the episode if the game ends
    pub fn step(&mut self) -> Result<StepOutcome> {
        self.enter(Phase::AwaitingState);
        let state = self.capture()?;

        self.enter(Phase::Acting);
        let action = self.act(&state)?;
        self.game.take_action(&action).map_err(Error::Game)?;

        self.enter(Phase::Observing);
        let next_state = self.capture()?;
        let (reward, game_over) = self.game.reward().map_err(Error::Game)?;

        self.enter(Phase::ShortTraining);
        let transition = Transition::new(state, action, reward, next_state);
        self.train_short_memory(&transition)?;
        self.remember(transition);

        if game_over {
            self.end_episode()?;
        }
        self.enter(Phase::AwaitingState);

        Ok(StepOutcome { reward, game_over })
    }

    /// Train until `should_stop` returns true, checked before every step
    ///
    /// Pass `|_| false` to train indefinitely.
    pub fn train<F>(&mut self, mut should_stop: F) -> Result<()>
    where
        F: FnMut(&Self) -> bool,
    {
        self.set_mode(Mode::Training);
        while !should_stop(&*self) {
            self.step()?;
        }
        Ok(())
    }

    /// Play with a purely greedy policy until `should_stop` returns true, without learning
    pub fn perform<F>(&mut self, mut should_stop: F) -> Result<()>
    where
        F: FnMut(&Self) -> bool,
    {
        self.set_mode(Mode::Performing);
        while !should_stop(&*self) {
            self.enter(Phase::AwaitingState);
            let state = self.capture()?;

            self.enter(Phase::Acting);
            let action = self.act(&state)?;
            self.game.take_action(&action).map_err(Error::Game)?;

            self.enter(Phase::Observing);
            let (_, game_over) = self.game.reward().map_err(Error::Game)?;
            if game_over {
                self.enter(Phase::EpisodeEnd);
                self.episode += 1;
                self.checkpoint()?;

                let score = self.game.score();
                self.scores.push(score);
                self.sink.record(&self.scores);
                info!("Episode {} finished with score {}", self.episode, score);

                self.game.restart().map_err(Error::Game)?;
            }
        }
        Ok(())
    }

    fn end_episode(&mut self) -> Result<()> {
        self.enter(Phase::EpisodeEnd);
        let epsilon = self.exploration.decay();
        self.episode += 1;

        self.train_long_memory()?;
        self.checkpoint()?;

        let score = self.game.score();
        self.scores.push(score);
        self.sink.record(&self.scores);
        info!(
            "Episode {} finished with score {} (epsilon {:.3})",
            self.episode, score, epsilon
        );

        self.game.restart().map_err(Error::Game)
    }

    fn checkpoint(&mut self) -> Result<()> {
        if self.save_every > 0 && self.episode % self.save_every == 0 {
            self.model.save().map_err(Error::Model)?;
        }
        Ok(())
    }

    fn capture(&mut self) -> Result<State> {
        self.game.state().map_err(Error::Game)
    }

    fn enter(&mut self, phase: Phase) {
        trace!("{:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }
}

/// One supervised update towards the Bellman target of `transition`
fn fit<M: Model>(model: &mut M, transition: &Transition, gamma: f32) -> Result<()> {
    let target = build_target(&*model, transition, gamma)?;
    model
        .train(&transition.state, &target)
        .map_err(Error::Model)
}

#[cfg(test)]
mod tests {
    use crate::{
        env::tests::ScriptedGame,
        model::tests::TableModel,
        report::ScoreHistory,
    };

    use super::*;

    const WIDTH: usize = 3;
    const MOVES: usize = 4;

    fn config() -> AgentConfig {
        AgentConfig::new().with_seed(Some(11)).with_batch_size(5)
    }

    fn agent(episode_len: usize) -> DQNAgent<ScriptedGame, TableModel, ScoreHistory> {
        DQNAgent::with_sink(
            ScriptedGame::new(WIDTH, episode_len),
            TableModel::new(WIDTH, vec![0.0, 0.5, 0.2, 0.1]),
            ScoreHistory::default(),
            &config(),
        )
        .unwrap()
    }

    #[test]
    fn step_trains_then_remembers() {
        let mut agent = agent(10);
        let outcome = agent.step().unwrap();

        assert_eq!(outcome, StepOutcome { reward: 1.0, game_over: false });
        assert_eq!(agent.model().trained.len(), 1, "one short-memory update");
        assert_eq!(agent.memory().len(), 1, "transition stored");
        assert_eq!(agent.phase(), Phase::AwaitingState);

        let stored = agent.memory().iter().next().unwrap();
        let (state, target) = &agent.model().trained[0];
        assert_eq!(state, &stored.state, "trained on the stored transition's state");
        assert_eq!(target.len(), MOVES);
        assert_eq!(stored.action.as_slice().iter().sum::<f32>(), 1.0);
    }

    #[test]
    fn episode_end_replays_and_decays() {
        let mut agent = agent(3);
        agent.train(|a| a.episode() == 1).unwrap();

        assert_eq!(agent.episode(), 1);
        assert_eq!(agent.memory().len(), 3);
        // three short updates plus a replay of all three stored transitions
        assert_eq!(agent.model().trained.len(), 6);
        assert!((agent.epsilon() - 0.95).abs() < 1e-6);
        assert_eq!(agent.scores(), [2]);
        assert_eq!(agent.sink().scores, [2]);
        assert_eq!(agent.game().restarts, 1);
    }

    #[test]
    fn long_memory_batch_is_bounded() {
        let mut agent = agent(20);
        agent.train(|a| a.episode() == 1).unwrap();
        // twenty short updates plus a replay batch of five
        assert_eq!(agent.model().trained.len(), 25);
    }

    #[test]
    fn epsilon_never_increases_across_episodes() {
        let mut agent = agent(2);
        let mut prev = agent.epsilon();
        agent
            .train(|a| {
                assert!(a.epsilon() <= prev);
                prev = a.epsilon();
                a.episode() == 80
            })
            .unwrap();
        assert_eq!(agent.epsilon(), 0.05);
        assert_eq!(agent.scores().len(), 80);
    }

    #[test]
    fn checkpoints_every_ten_episodes() {
        let mut agent = agent(1);
        agent.train(|a| a.episode() == 25).unwrap();
        assert_eq!(agent.model().saves.get(), 2);
    }

    #[test]
    fn performing_is_greedy_and_does_not_learn() {
        let mut agent = agent(4);
        agent.perform(|a| a.episode() == 2).unwrap();

        assert_eq!(agent.mode(), Mode::Performing);
        assert!(agent.model().trained.is_empty());
        assert!(agent.memory().is_empty());
        assert_eq!(agent.epsilon(), 1.0, "no decay while performing");
        // action 1 has the largest bias and the state sum is constant
        assert!(agent.game().actions.iter().all(|&a| a == 1));
        assert_eq!(agent.game().restarts, 2);
        assert_eq!(agent.scores(), [3, 3], "scores are taken before the restart");
        assert_eq!(agent.sink().updates, 2);
    }

    #[test]
    fn performing_is_deterministic() {
        let mut agent = agent(100);
        agent.set_mode(Mode::Performing);
        let state = vec![1.0, 0.0, 0.0];
        let first = agent.act(&state).unwrap();
        for _ in 0..20 {
            assert_eq!(agent.act(&state).unwrap(), first);
        }
    }

    #[test]
    fn game_failure_is_fatal() {
        let mut agent = DQNAgent::new(
            ScriptedGame::new(WIDTH, 10).failing_after(2),
            TableModel::new(WIDTH, vec![0.0; MOVES]),
            &config(),
        )
        .unwrap();

        let err = agent.train(|_| false).unwrap_err();
        assert!(matches!(err, Error::Game(_)));
        assert_eq!(agent.memory().len(), 2, "failed step was not stored");
    }

    #[test]
    fn width_mismatch_surfaces_on_first_training_call() {
        let mut agent = DQNAgent::new(
            ScriptedGame::new(WIDTH + 1, 10),
            TableModel::new(WIDTH, vec![0.0; MOVES]),
            &config().with_epsilon_start(1.0),
        )
        .unwrap();

        let err = agent.step().unwrap_err();
        assert!(matches!(
            err,
            Error::StateWidth {
                expected: WIDTH,
                got: 4
            }
        ));
        assert!(agent.memory().is_empty());
    }

    #[test]
    fn width_mismatch_is_reported_the_same_when_exploiting() {
        let mut agent = DQNAgent::new(
            ScriptedGame::new(WIDTH + 1, 10),
            TableModel::new(WIDTH, vec![0.0; MOVES]),
            &config().with_epsilon_start(0.0).with_min_epsilon(0.0),
        )
        .unwrap();

        let err = agent.step().unwrap_err();
        assert!(matches!(
            err,
            Error::StateWidth {
                expected: WIDTH,
                got: 4
            }
        ));
        assert_eq!(agent.model().predictions.get(), 0, "model never saw the bad state");
        assert!(agent.memory().is_empty());
    }

    #[test]
    fn empty_replay_is_an_error() {
        let mut agent = agent(5);
        assert!(matches!(agent.train_long_memory(), Err(Error::EmptySample)));
    }

    #[test]
    fn rejects_invalid_config() {
        let result = DQNAgent::new(
            ScriptedGame::new(WIDTH, 5),
            TableModel::new(WIDTH, vec![0.0; MOVES]),
            &AgentConfig::new().with_batch_size(0),
        );
        assert!(result.is_err());
    }
}

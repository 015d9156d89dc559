use rand::Rng;

use crate::{
    decay::Decay,
    error::{Error, Result},
};

use super::Choice;

/// Whether the policy is still learning or just playing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// Explore with probability epsilon
    #[default]
    Training,
    /// Always exploit
    Performing,
}

/// Epsilon greedy exploration policy with an epsilon that decays once per episode
#[derive(Debug, Clone)]
pub struct EpsilonGreedy<D: Decay> {
    epsilon: f32,
    decay: D,
    mode: Mode,
}

impl<D: Decay> EpsilonGreedy<D> {
    /// Initialize epsilon greedy policy from a starting epsilon and a decay strategy
    pub fn new(epsilon: f32, decay: D) -> Result<Self> {
        if !(0.0..=1.0).contains(&epsilon) {
            return Err(Error::InvalidConfig(format!(
                "epsilon must be in [0, 1], got {epsilon}"
            )));
        }
        Ok(Self {
            epsilon,
            decay,
            mode: Mode::default(),
        })
    }

    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    /// Invoke the policy for the current step
    ///
    /// In [`Mode::Performing`] this always exploits and never touches `rng`.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Choice {
        match self.mode {
            Mode::Performing => Choice::Exploit,
            Mode::Training => {
                if rng.gen::<f32>() < self.epsilon {
                    Choice::Explore
                } else {
                    Choice::Exploit
                }
            }
        }
    }

    /// Decay epsilon at the end of an episode and return the new value
    pub fn decay(&mut self) -> f32 {
        self.epsilon = self.decay.step(self.epsilon);
        self.epsilon
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, RngCore, SeedableRng};

    use crate::decay::{Constant, Multiplicative};

    use super::*;

    /// An rng that fails the test if consulted
    struct NoRng;

    impl RngCore for NoRng {
        fn next_u32(&mut self) -> u32 {
            panic!("rng consulted")
        }

        fn next_u64(&mut self) -> u64 {
            panic!("rng consulted")
        }

        fn fill_bytes(&mut self, _dest: &mut [u8]) {
            panic!("rng consulted")
        }

        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
            panic!("rng consulted")
        }
    }

    #[test]
    fn defaults_to_training() {
        let policy = EpsilonGreedy::new(1.0, Constant).unwrap();
        assert_eq!(policy.mode(), Mode::Training);
    }

    #[test]
    fn rejects_out_of_range_epsilon() {
        assert!(EpsilonGreedy::new(1.5, Constant).is_err());
        assert!(EpsilonGreedy::new(-0.1, Constant).is_err());
    }

    #[test]
    fn training_extremes() {
        let mut rng = StdRng::seed_from_u64(3);
        let always = EpsilonGreedy::new(1.0, Constant).unwrap();
        let never = EpsilonGreedy::new(0.0, Constant).unwrap();
        for _ in 0..100 {
            assert_eq!(always.choose(&mut rng), Choice::Explore);
            assert_eq!(never.choose(&mut rng), Choice::Exploit);
        }
    }

    #[test]
    fn performing_never_consults_rng() {
        let mut policy = EpsilonGreedy::new(1.0, Constant).unwrap();
        policy.set_mode(Mode::Performing);
        for _ in 0..10 {
            assert_eq!(policy.choose(&mut NoRng), Choice::Exploit);
        }
    }

    #[test]
    fn epsilon_converges_to_floor() {
        let decay = Multiplicative::new(0.95, 0.05).unwrap();
        let mut policy = EpsilonGreedy::new(1.0, decay).unwrap();

        let mut oracle = 1.0_f32;
        let mut first_at_floor = None;
        for episode in 1..=60 {
            let prev = policy.epsilon();
            oracle = (oracle * 0.95).max(0.05);
            let eps = policy.decay();

            assert_eq!(eps, oracle, "matches direct iteration");
            assert!(eps <= prev, "never increases");
            if eps == 0.05 && first_at_floor.is_none() {
                first_at_floor = Some(episode);
            }
            if first_at_floor.is_some() {
                assert_eq!(eps, 0.05, "stays at the floor");
            }
        }
        // 0.95^58 > 0.05 > 0.95^59
        assert_eq!(first_at_floor, Some(59));
    }
}

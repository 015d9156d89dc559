use rand::Rng;

use crate::{
    error::{Error, Result},
    util::argmax,
};

/// A discrete move encoded as a one-hot vector
///
/// Exactly one entry equals `1.0` and the rest are `0.0`, so the entries always sum to one.
#[derive(Debug, Clone, PartialEq)]
pub struct Action(Vec<f32>);

impl Action {
    /// Construct the one-hot encoding of move `index` out of `n` moves
    ///
    /// **Panics** if `index >= n`
    pub fn one_hot(index: usize, n: usize) -> Self {
        assert!(index < n, "Action index {index} out of range for {n} moves");
        let mut v = vec![0.0; n];
        v[index] = 1.0;
        Self(v)
    }

    /// Choose one of `n` moves uniformly at random
    pub fn random<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Self {
        Self::one_hot(rng.gen_range(0..n), n)
    }

    /// Choose the move with the highest predicted value
    pub fn greedy(q_values: &[f32]) -> Result<Self> {
        let ix = argmax(q_values).ok_or(Error::InvalidAction {
            len: q_values.len(),
        })?;
        Ok(Self::one_hot(ix, q_values.len()))
    }

    /// Validate an externally produced vector
    pub fn from_vec(v: Vec<f32>) -> Result<Self> {
        let ones = v.iter().filter(|&&x| x == 1.0).count();
        let zeros = v.iter().filter(|&&x| x == 0.0).count();
        if ones == 1 && ones + zeros == v.len() {
            Ok(Self(v))
        } else {
            Err(Error::InvalidAction { len: v.len() })
        }
    }

    /// The index of the hot entry
    pub fn index(&self) -> usize {
        self.0.iter().position(|&x| x == 1.0).unwrap_or_default()
    }

    /// Number of discrete moves this action was drawn from
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

use rand::{seq::SliceRandom, Rng};

use crate::ds::RingBuffer;

use super::Transition;

/// A fixed-size memory storage for past transitions
///
/// This structure uses a ring buffer to store transitions. It automatically overwrites the
/// oldest transition once it reaches its capacity. Stored transitions are never mutated.
#[derive(Debug, Clone)]
pub struct ReplayMemory {
    memory: RingBuffer<Transition>,
}

impl ReplayMemory {
    /// **Panics** if `capacity` is zero
    pub fn new(capacity: usize) -> Self {
        Self {
            memory: RingBuffer::new(capacity),
        }
    }

    /// Add a new transition to the memory, evicting the oldest one when full
    pub fn push(&mut self, transition: Transition) {
        self.memory.push(transition);
    }

    pub fn len(&self) -> usize {
        self.memory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memory.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.memory.capacity()
    }

    /// Iterate over stored transitions from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.memory.iter()
    }

    /// Draw a training batch of at most `batch_size` transitions
    ///
    /// ### Returns
    /// - `batch_size` distinct transitions chosen uniformly at random if more than `batch_size` are stored
    /// - every stored transition, oldest first, otherwise
    pub fn sample<R: Rng + ?Sized>(&self, batch_size: usize, rng: &mut R) -> Vec<&Transition> {
        if self.memory.len() > batch_size {
            self.memory
                .view()
                .choose_multiple(rng, batch_size)
                .collect()
        } else {
            self.memory.iter().collect()
        }
    }
}

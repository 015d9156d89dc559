#![allow(clippy::len_without_is_empty)]

/// A fixed-capacity ring buffer
///
/// Slots fill in order until `capacity` is reached, after which every push overwrites the
/// oldest element. [`RingBuffer::iter`] yields elements oldest first regardless of where the
/// write cursor currently sits.
#[derive(Debug, Default, Clone)]
pub struct RingBuffer<T> {
    buffer: Vec<T>,
    ix: usize,
    capacity: usize,
}

impl<T> RingBuffer<T> {
    /// **Panics** if `capacity` is zero
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "RingBuffer capacity must be nonzero");
        Self {
            buffer: Vec::<T>::with_capacity(capacity),
            ix: 0,
            capacity,
        }
    }

    /// Returns the number of stored elements
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.buffer.len() == self.capacity
    }

    /// Insert an element into the buffer, overwriting the oldest element once full
    pub fn push(&mut self, item: T) {
        if self.ix >= self.len() {
            self.buffer.push(item);
        } else {
            self.buffer[self.ix] = item;
        }
        self.ix = (self.ix + 1) % self.capacity;
    }

    /// Get a slice view of the internal slots (not in insertion order once wrapped)
    pub fn view(&self) -> &[T] {
        &self.buffer
    }

    /// Iterate over the stored elements from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        let split = if self.is_full() { self.ix } else { 0 };
        let (newer, older) = self.buffer.split_at(split);
        older.iter().chain(newer.iter())
    }
}

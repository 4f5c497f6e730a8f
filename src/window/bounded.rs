//! Fixed-capacity FIFO buffer
//!
//! Pushing into a full buffer evicts and returns the oldest element, so memory
//! stays bounded by the configured size no matter how long the stream runs.

use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq)]
pub struct BoundedBuffer<T> {
    items: VecDeque<T>,
    size: usize,
}

impl<T> BoundedBuffer<T> {
    /// Create an empty buffer holding at most `size` elements
    ///
    /// # Panics
    /// Panics if `size` is zero.
    pub fn new(size: usize) -> Self {
        assert!(size >= 1, "bounded buffer size must be at least 1");
        Self {
            items: VecDeque::with_capacity(size),
            size,
        }
    }

    /// Append `item`, evicting the oldest element when the buffer is full
    pub fn push(&mut self, item: T) -> Option<T> {
        let evicted = if self.items.len() >= self.size {
            self.items.pop_front()
        } else {
            None
        };
        self.items.push_back(item);
        evicted
    }

    /// Like [`push`](Self::push), mapping the evicted element through `f`
    pub fn push_map<U, F>(&mut self, item: T, f: F) -> Option<U>
    where
        F: FnOnce(T) -> U,
    {
        self.push(item).map(f)
    }

    /// Change the capacity; shrinking keeps only the newest `size` elements
    ///
    /// # Panics
    /// Panics if `size` is zero.
    pub fn set_size(&mut self, size: usize) {
        assert!(size >= 1, "bounded buffer size must be at least 1");
        while self.items.len() > size {
            self.items.pop_front();
        }
        self.size = size;
    }

    pub fn capacity(&self) -> usize {
        self.size
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() == self.size
    }

    pub fn oldest(&self) -> Option<&T> {
        self.items.front()
    }

    pub fn newest(&self) -> Option<&T> {
        self.items.back()
    }

    /// Up to `n` elements from the oldest end, oldest first
    pub fn oldest_n(&self, n: usize) -> impl Iterator<Item = &T> + '_ {
        self.items.iter().take(n)
    }

    /// Up to `n` elements from the newest end, still in chronological order
    pub fn newest_n(&self, n: usize) -> impl Iterator<Item = &T> + '_ {
        let skip = self.items.len().saturating_sub(n);
        self.items.iter().skip(skip)
    }

    /// All elements, oldest first
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator + '_ {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_until_full_then_evict_in_order() {
        let mut buffer = BoundedBuffer::new(3);
        assert_eq!(buffer.push(1), None);
        assert_eq!(buffer.push(2), None);
        assert_eq!(buffer.push(3), None);
        assert!(buffer.is_full());

        assert_eq!(buffer.push(4), Some(1));
        assert_eq!(buffer.push(5), Some(2));
        assert_eq!(buffer.push(6), Some(3));
        assert_eq!(buffer.iter().copied().collect::<Vec<_>>(), vec![4, 5, 6]);
    }

    #[test]
    fn test_length_never_exceeds_size() {
        let mut buffer = BoundedBuffer::new(4);
        for i in 0..50 {
            buffer.push(i);
            assert!(buffer.len() <= 4);
        }
        assert_eq!(buffer.oldest(), Some(&46));
        assert_eq!(buffer.newest(), Some(&49));
    }

    #[test]
    fn test_push_map_transforms_evicted() {
        let mut buffer = BoundedBuffer::new(1);
        assert_eq!(buffer.push_map(7, |v| v.to_string()), None);
        assert_eq!(buffer.push_map(8, |v| v.to_string()), Some("7".to_string()));
    }

    #[test]
    fn test_set_size_grow_keeps_contents() {
        let mut buffer = BoundedBuffer::new(2);
        buffer.push('a');
        buffer.push('b');
        buffer.set_size(4);
        assert_eq!(buffer.capacity(), 4);
        assert_eq!(buffer.push('c'), None);
        assert_eq!(buffer.iter().copied().collect::<String>(), "abc");
    }

    #[test]
    fn test_set_size_shrink_keeps_newest() {
        let mut buffer = BoundedBuffer::new(5);
        for c in "abcde".chars() {
            buffer.push(c);
        }
        buffer.set_size(2);
        assert_eq!(buffer.iter().copied().collect::<String>(), "de");
        assert_eq!(buffer.push('f'), Some('d'));
    }

    #[test]
    fn test_peeks_on_empty_buffer() {
        let buffer: BoundedBuffer<u8> = BoundedBuffer::new(3);
        assert!(buffer.is_empty());
        assert_eq!(buffer.oldest(), None);
        assert_eq!(buffer.newest(), None);
        assert_eq!(buffer.oldest_n(2).count(), 0);
    }

    #[test]
    fn test_oldest_and_newest_n_are_clipped() {
        let mut buffer = BoundedBuffer::new(5);
        for i in 1..=4 {
            buffer.push(i);
        }
        assert_eq!(buffer.oldest_n(2).copied().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(buffer.newest_n(2).copied().collect::<Vec<_>>(), vec![3, 4]);
        assert_eq!(buffer.oldest_n(10).count(), 4);
        assert_eq!(buffer.newest_n(10).copied().collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    }

    #[test]
    #[should_panic(expected = "at least 1")]
    fn test_zero_size_fails_fast() {
        let _ = BoundedBuffer::<u8>::new(0);
    }
}

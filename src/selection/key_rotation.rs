// src/selection/key_rotation.rs

use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::trace;

/// Process-wide round-robin cursor.
///
/// Every call to [`RoundRobinRotation::rotate`] advances the cursor by one
/// and starts the returned list at `cursor % len`. The cursor starts at zero,
/// so the first rotation begins at offset one.
#[derive(Debug, Default)]
pub struct RoundRobinRotation {
    cursor: AtomicUsize,
}

impl RoundRobinRotation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current cursor value without advancing it.
    pub fn position(&self) -> usize {
        self.cursor.load(Ordering::SeqCst)
    }

    /// Increments the cursor and returns its new value. Wraps on overflow.
    pub fn advance(&self) -> usize {
        self.cursor.fetch_add(1, Ordering::SeqCst).wrapping_add(1)
    }

    /// Advances the cursor and returns `items` rotated by the new position.
    /// The cursor moves even when `items` is empty.
    pub fn rotate<T: Clone>(&self, items: &[T]) -> Vec<T> {
        let cursor = self.advance();
        if items.is_empty() {
            return Vec::new();
        }
        let offset = cursor % items.len();
        trace!(rotation.cursor = cursor, rotation.offset = offset, "Rotating candidates");
        rotate_from(items, offset)
    }
}

/// `items[offset..] ++ items[..offset]`.
pub fn rotate_from<T: Clone>(items: &[T], offset: usize) -> Vec<T> {
    let (head, tail) = items.split_at(offset % items.len().max(1));
    tail.iter().chain(head.iter()).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_rotation_starts_at_one() {
        let rotation = RoundRobinRotation::new();
        assert_eq!(rotation.rotate(&["a", "b", "c"]), vec!["b", "c", "a"]);
        assert_eq!(rotation.rotate(&["a", "b", "c"]), vec!["c", "a", "b"]);
        assert_eq!(rotation.rotate(&["a", "b", "c"]), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_empty_still_advances() {
        let rotation = RoundRobinRotation::new();
        assert!(rotation.rotate::<&str>(&[]).is_empty());
        assert_eq!(rotation.position(), 1);
    }

    #[test]
    fn test_single_item_is_stable() {
        let rotation = RoundRobinRotation::new();
        for _ in 0..5 {
            assert_eq!(rotation.rotate(&["only"]), vec!["only"]);
        }
    }

    #[test]
    fn test_rotate_from() {
        assert_eq!(rotate_from(&[1, 2, 3, 4], 0), vec![1, 2, 3, 4]);
        assert_eq!(rotate_from(&[1, 2, 3, 4], 3), vec![4, 1, 2, 3]);
        assert!(rotate_from::<u8>(&[], 2).is_empty());
    }
}

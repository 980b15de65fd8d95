//! Per-pass registration order.

use std::collections::HashMap;

/// Records the order in which ids register during one render pass.
///
/// Siblings are sorted by this order at serialization time. When an id registers twice
/// within a pass its first position is kept.
#[derive(Debug, Default, Clone)]
pub struct RenderSequencer {
    order: Vec<String>,
    positions: HashMap<String, usize>,
}

impl RenderSequencer {
    /// Creates an empty sequence.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the sequence at the start of a pass.
    pub fn reset(&mut self) {
        self.order.clear();
        self.positions.clear();
    }

    /// Appends `id`, returning its position. A repeated id keeps its first position.
    pub fn record(&mut self, id: &str) -> usize {
        if let Some(&position) = self.positions.get(id) {
            return position;
        }
        let position = self.order.len();
        self.order.push(id.to_owned());
        self.positions.insert(id.to_owned(), position);
        position
    }

    /// Position of `id` in this pass, if it registered.
    #[must_use]
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    /// Number of distinct ids recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Recorded ids in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_registration_wins() {
        let mut sequence = RenderSequencer::new();
        sequence.record("b");
        sequence.record("a");
        assert_eq!(sequence.record("b"), 0);
        assert_eq!(sequence.index_of("a"), Some(1));
        assert_eq!(sequence.len(), 2);
        assert_eq!(sequence.iter().collect::<Vec<_>>(), ["b", "a"]);
    }

    #[test]
    fn reset_starts_a_new_pass() {
        let mut sequence = RenderSequencer::new();
        sequence.record("a");
        sequence.reset();
        assert!(sequence.is_empty());
        assert_eq!(sequence.index_of("a"), None);
    }
}

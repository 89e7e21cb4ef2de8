//! Breadth-first work queue and visited set.
//!
//! The frontier is a plain FIFO queue: duplicates are allowed in the queue and
//! filtered against the visited set when they reach the head. The visited set
//! only ever grows, and a gamertag enters it only after a successful
//! expansion.

use crate::domain::Gamertag;
use std::collections::{HashSet, VecDeque};

/// FIFO queue of gamertags awaiting expansion plus the set already expanded.
#[derive(Debug, Clone, Default)]
pub struct Frontier {
    queue: VecDeque<Gamertag>,
    visited: HashSet<Gamertag>,
}

impl Frontier {
    /// A frontier holding only `seed`, with nothing visited.
    pub fn new(seed: Gamertag) -> Self {
        Self {
            queue: VecDeque::from([seed]),
            visited: HashSet::new(),
        }
    }

    /// Remove and return the head of the queue.
    pub fn pop(&mut self) -> Option<Gamertag> {
        self.queue.pop_front()
    }

    /// Append discovered gamertags to the tail, in order.
    pub fn extend<I>(&mut self, gamertags: I)
    where
        I: IntoIterator<Item = Gamertag>,
    {
        self.queue.extend(gamertags);
    }

    /// Record a successful expansion. Returns `false` if it was already
    /// visited.
    pub fn mark_visited(&mut self, gamertag: Gamertag) -> bool {
        self.visited.insert(gamertag)
    }

    /// Whether `gamertag` has been expanded in this run.
    #[must_use]
    pub fn is_visited(&self, gamertag: &Gamertag) -> bool {
        self.visited.contains(gamertag)
    }

    /// Queued entries, head first. May contain duplicates and visited
    /// gamertags.
    pub fn queued(&self) -> impl Iterator<Item = &Gamertag> {
        self.queue.iter()
    }

    /// Every gamertag expanded so far.
    #[must_use]
    pub fn visited(&self) -> &HashSet<Gamertag> {
        &self.visited
    }

    /// Number of queued entries, duplicates included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether the queue is drained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(name: &str) -> Gamertag {
        Gamertag::new(name)
    }

    #[test]
    fn test_new_holds_only_seed() {
        let frontier = Frontier::new(tag("alice"));
        assert_eq!(frontier.queued().collect::<Vec<_>>(), vec![&tag("alice")]);
        assert!(frontier.visited().is_empty());
        assert_eq!(frontier.len(), 1);
    }

    #[test]
    fn test_pop_is_fifo() {
        let mut frontier = Frontier::new(tag("alice"));
        frontier.extend([tag("bob"), tag("carol")]);

        assert_eq!(frontier.pop(), Some(tag("alice")));
        assert_eq!(frontier.pop(), Some(tag("bob")));
        assert_eq!(frontier.pop(), Some(tag("carol")));
        assert_eq!(frontier.pop(), None);
        assert!(frontier.is_empty());
    }

    #[test]
    fn test_queue_keeps_duplicates() {
        let mut frontier = Frontier::new(tag("alice"));
        frontier.extend([tag("carol"), tag("carol")]);
        assert_eq!(frontier.len(), 3);
    }

    #[test]
    fn test_mark_visited_reports_first_insert() {
        let mut frontier = Frontier::new(tag("alice"));
        assert!(frontier.mark_visited(tag("alice")));
        assert!(!frontier.mark_visited(tag("alice")));
        assert!(frontier.is_visited(&tag("alice")));
        assert_eq!(frontier.visited().len(), 1);
    }

    #[test]
    fn test_visited_does_not_touch_queue() {
        let mut frontier = Frontier::new(tag("alice"));
        frontier.mark_visited(tag("bob"));
        assert_eq!(frontier.len(), 1);
        assert!(!frontier.is_visited(&tag("alice")));
    }

    #[test]
    fn test_default_is_empty() {
        let frontier = Frontier::default();
        assert!(frontier.is_empty());
        assert!(frontier.visited().is_empty());
    }
}

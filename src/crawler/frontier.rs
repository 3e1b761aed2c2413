//! Breadth-first frontier for a single domain crawl
//!
//! This module handles:
//! - FIFO ordering of `(url, depth)` pairs
//! - The visited set, keyed by [`crate::url::visit_key`]
//! - Dropping URLs that are already queued or visited

use std::collections::{HashSet, VecDeque};

/// A URL waiting to be fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedUrl {
    /// The URL to fetch
    pub url: String,

    /// Distance from the seed in link hops
    pub depth: u32,
}

/// FIFO queue plus visited set
///
/// Every URL is handed out by [`Frontier::pop`] at most once. Because the
/// queue is FIFO, the first time a URL is enqueued is also its shallowest
/// depth, so later duplicates can be dropped at enqueue time.
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<QueuedUrl>,
    queued: HashSet<String>,
    visited: HashSet<String>,
}

impl Frontier {
    /// Creates a frontier holding only the seed at depth 0
    pub fn new(seed: &str) -> Self {
        let mut frontier = Self::default();
        frontier.push(seed, 0);
        frontier
    }

    /// Enqueues a URL unless it was already queued or visited
    ///
    /// # Returns
    ///
    /// `true` if the URL was added
    pub fn push(&mut self, url: &str, depth: u32) -> bool {
        let key = crate::url::visit_key(url);
        if self.visited.contains(&key) || !self.queued.insert(key) {
            return false;
        }

        self.queue.push_back(QueuedUrl {
            url: url.to_string(),
            depth,
        });
        true
    }

    /// Pops the next unvisited URL and marks it visited
    pub fn pop(&mut self) -> Option<QueuedUrl> {
        while let Some(next) = self.queue.pop_front() {
            let key = crate::url::visit_key(&next.url);
            self.queued.remove(&key);
            if self.visited.insert(key) {
                return Some(next);
            }
            tracing::trace!("Skipping already visited {}", next.url);
        }
        None
    }

    /// Records a URL reached without being popped, such as a redirect target
    ///
    /// # Returns
    ///
    /// `false` if the URL had already been visited
    pub fn mark_visited(&mut self, url: &str) -> bool {
        self.visited.insert(crate::url::visit_key(url))
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_frontier() {
        let mut frontier = Frontier::new("https://a.com");
        assert_eq!(frontier.len(), 1);

        let first = frontier.pop().unwrap();
        assert_eq!(first.url, "https://a.com");
        assert_eq!(first.depth, 0);
        assert!(frontier.is_empty());
        assert!(!frontier.mark_visited("https://a.com/"));
    }

    #[test]
    fn test_fifo_order() {
        let mut frontier = Frontier::default();
        frontier.push("https://a.com/1", 1);
        frontier.push("https://a.com/2", 1);
        frontier.push("https://a.com/3", 2);

        let order: Vec<String> = std::iter::from_fn(|| frontier.pop()).map(|q| q.url).collect();
        assert_eq!(
            order,
            vec!["https://a.com/1", "https://a.com/2", "https://a.com/3"]
        );
    }

    #[test]
    fn test_duplicate_pushes_dropped() {
        let mut frontier = Frontier::default();
        assert!(frontier.push("https://a.com/x", 1));
        assert!(!frontier.push("https://a.com/x", 2));
        assert!(!frontier.push("https://a.com/x#frag", 2));
        assert_eq!(frontier.len(), 1);
    }

    #[test]
    fn test_visited_never_requeued() {
        let mut frontier = Frontier::new("https://a.com/");
        frontier.pop();

        assert!(!frontier.push("https://a.com/", 1));
        assert!(!frontier.push("https://a.com", 1));
        assert!(frontier.pop().is_none());
    }

    #[test]
    fn test_marked_url_skipped_even_if_queued() {
        let mut frontier = Frontier::default();
        frontier.push("https://a.com/old", 1);
        frontier.push("https://a.com/new", 1);

        assert!(frontier.mark_visited("https://a.com/new#top"));
        assert!(!frontier.mark_visited("https://a.com/new"));
        assert!(!frontier.push("https://a.com/new", 2));

        let order: Vec<String> = std::iter::from_fn(|| frontier.pop()).map(|q| q.url).collect();
        assert_eq!(order, vec!["https://a.com/old"]);
    }
}

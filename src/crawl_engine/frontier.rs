//! Crawl frontier: the FIFO queue of pending URLs plus its seen and visited sets.
//!
//! Dedup happens at insertion. A URL is queued at most once per run and is
//! marked visited the moment it is dequeued, before any fetch starts.

use std::collections::{HashSet, VecDeque};

use super::crawl_types::UrlState;

#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<String>,
    /// Queued or visited
    seen: HashSet<String>,
    visited: HashSet<String>,
    /// URLs dequeued in this run (resumed URLs excluded)
    dequeued: usize,
}

impl Frontier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `url` unless it was already queued or visited.
    ///
    /// Returns `true` if the URL was added.
    pub fn enqueue(&mut self, url: impl Into<String>) -> bool {
        let url = url.into();
        if self.seen.contains(&url) {
            return false;
        }
        self.seen.insert(url.clone());
        self.queue.push_back(url);
        true
    }

    /// Queue every URL in order, returning how many were new
    pub fn enqueue_all<I, S>(&mut self, urls: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut added = 0;
        for url in urls {
            if self.enqueue(url) {
                added += 1;
            }
        }
        added
    }

    /// Record a URL as already visited by a previous run
    pub fn mark_visited(&mut self, url: impl Into<String>) {
        let url = url.into();
        self.seen.insert(url.clone());
        self.visited.insert(url);
    }

    /// Dequeue the next URL, marking it visited immediately
    pub fn next_url(&mut self) -> Option<String> {
        let url = self.queue.pop_front()?;
        self.visited.insert(url.clone());
        self.dequeued += 1;
        Some(url)
    }

    #[must_use]
    pub fn state(&self, url: &str) -> UrlState {
        if self.visited.contains(url) {
            UrlState::Visited
        } else if self.seen.contains(url) {
            UrlState::Queued
        } else {
            UrlState::Unseen
        }
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    #[must_use]
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    #[must_use]
    pub fn dequeued(&self) -> usize {
        self.dequeued
    }
}

//! In-memory visited-links store.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::link::VisitedLinks;

/// Default number of links remembered
pub const DEFAULT_CAPACITY: usize = 100;

/// Most recently visited links, newest first.
///
/// Visiting a link again moves it to the front; the oldest entry is evicted
/// once the store is full.
#[derive(Debug)]
pub struct RecentLinks {
    capacity: usize,
    links: Mutex<VecDeque<String>>,
}

impl RecentLinks {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            links: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Snapshot of the stored links, newest first
    pub fn links(&self) -> Vec<String> {
        self.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<String>> {
        self.links.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for RecentLinks {
    fn default() -> Self {
        Self::new()
    }
}

impl VisitedLinks for RecentLinks {
    fn is_visited(&self, url: &str) -> bool {
        self.lock().iter().any(|link| link == url)
    }

    fn mark_visited(&self, url: &str) {
        if self.capacity == 0 {
            return;
        }
        let mut links = self.lock();
        if let Some(index) = links.iter().position(|link| link == url) {
            links.remove(index);
        }
        links.push_front(url.to_string());
        links.truncate(self.capacity);
    }
}

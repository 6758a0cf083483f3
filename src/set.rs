// src/set.rs
use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock};

/// Thread-safe set of unique strings
///
/// Cloning the handle shares the underlying set between workers. Use
/// [`ConcurrentSet::snapshot`] to get an independent copy.
#[derive(Clone, Default, Debug)]
pub struct ConcurrentSet {
    inner: Arc<RwLock<HashSet<String>>>,
}

impl ConcurrentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an item. Returns true if it was not already present.
    pub fn add(&self, item: impl Into<String>) -> bool {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        guard.insert(item.into())
    }

    pub fn contains(&self, item: &str) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(item)
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Independent copy of the current contents
    ///
    /// The read lock is held for the whole copy, so a concurrent `add` lands
    /// either entirely before or entirely after the snapshot.
    pub fn snapshot(&self) -> Self {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Self {
            inner: Arc::new(RwLock::new(guard.clone())),
        }
    }

    /// All members in ascending lexicographic order
    pub fn sorted(&self) -> Vec<String> {
        let mut items: Vec<String> = self
            .inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect();
        items.sort();
        items
    }
}

impl<S: Into<String>> FromIterator<S> for ConcurrentSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let set = Self::new();
        for item in iter {
            set.add(item);
        }
        set
    }
}

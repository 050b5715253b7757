use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Prepared fragments of one page, keyed by module id.
///
/// Lives as long as its navigator, holds at most one entry per module of the
/// phase and never evicts. Concurrent loads of the same module may both
/// insert; the later insert wins.
#[derive(Debug, Default)]
pub struct ContentCache {
    entries: Mutex<HashMap<&'static str, String>>,
}

impl ContentCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, module: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(module)
            .cloned()
    }

    pub fn insert(&self, module: &'static str, html: String) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(module, html);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

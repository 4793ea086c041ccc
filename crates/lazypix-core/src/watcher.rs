//! Visibility watcher.
//!
//! Owns the set of images still waiting to become visible and releases each
//! one the first time it is reported as intersecting.

use std::cell::RefCell;

use crate::{VisibilityEntry, VisibilityObserver};

/// Tracks which images are under observation.
///
/// Images enter the set only through [`watch`](Self::watch) and leave it only
/// through [`dispatch`](Self::dispatch), so each image triggers at most once
/// even if its visibility keeps toggling.
pub struct VisibilityWatcher<E, O> {
    observer: O,
    watched: RefCell<Vec<E>>,
}

impl<E, O> VisibilityWatcher<E, O>
where
    E: Clone + PartialEq,
    O: VisibilityObserver<E>,
{
    pub fn new(observer: O) -> Self {
        Self {
            observer,
            watched: RefCell::new(Vec::new()),
        }
    }

    /// Starts observing `target`.
    ///
    /// Callers pass distinct targets; duplicates are not detected.
    pub fn watch(&self, target: E) {
        self.observer.observe(&target);
        self.watched.borrow_mut().push(target);
    }

    pub fn is_watching(&self, target: &E) -> bool {
        self.watched.borrow().contains(target)
    }

    pub fn watched_count(&self) -> usize {
        self.watched.borrow().len()
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Handles one batch of entries.
    ///
    /// For every intersecting entry `on_visible` runs once, then the target
    /// stops being observed. Non-intersecting entries are ignored. Returns the
    /// number of targets triggered.
    pub fn dispatch(
        &self,
        entries: Vec<VisibilityEntry<E>>,
        mut on_visible: impl FnMut(&E),
    ) -> usize {
        let mut triggered = 0;
        for entry in entries {
            if !entry.is_intersecting {
                continue;
            }
            on_visible(&entry.target);
            self.release(&entry.target);
            triggered += 1;
        }
        triggered
    }

    fn release(&self, target: &E) {
        self.observer.unobserve(target);
        let mut watched = self.watched.borrow_mut();
        if let Some(index) = watched.iter().position(|watched| watched == target) {
            watched.swap_remove(index);
        }
    }
}

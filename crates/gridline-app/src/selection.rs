// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeSet;

/// Header checkbox state for the rows on the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    Unchecked,
    Indeterminate,
    Checked,
}

/// Checked row ids. Filtering and paging never touch it; rows stay selected
/// while hidden until they are explicitly deselected or cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection<K: Ord + Clone> {
    ids: BTreeSet<K>,
}

impl<K: Ord + Clone> Default for Selection<K> {
    fn default() -> Self {
        Self {
            ids: BTreeSet::new(),
        }
    }
}

impl<K: Ord + Clone> Selection<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips one id and returns whether it is now selected.
    pub fn toggle(&mut self, id: K) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    /// Returns whether the set changed.
    pub fn set(&mut self, id: K, selected: bool) -> bool {
        if selected {
            self.ids.insert(id)
        } else {
            self.ids.remove(&id)
        }
    }

    /// Checks or unchecks every id on the page, leaving other selections alone.
    /// Returns whether the set changed.
    pub fn select_page<'a, I>(&mut self, page: I, selected: bool) -> bool
    where
        I: IntoIterator<Item = &'a K>,
        K: 'a,
    {
        let mut changed = false;
        for id in page {
            changed |= self.set(id.clone(), selected);
        }
        changed
    }

    pub fn clear(&mut self) -> bool {
        let changed = !self.ids.is_empty();
        self.ids.clear();
        changed
    }

    pub fn contains(&self, id: &K) -> bool {
        self.ids.contains(id)
    }

    pub fn page_state<'a, I>(&self, page: I) -> CheckState
    where
        I: IntoIterator<Item = &'a K>,
        K: 'a,
    {
        let mut total = 0;
        let mut selected = 0;
        for id in page {
            total += 1;
            if self.ids.contains(id) {
                selected += 1;
            }
        }
        match selected {
            0 => CheckState::Unchecked,
            n if n == total => CheckState::Checked,
            _ => CheckState::Indeterminate,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &K> {
        self.ids.iter()
    }

    pub fn ids(&self) -> Vec<K> {
        self.ids.iter().cloned().collect()
    }

    /// Drops ids the predicate rejects; used when the underlying rows change.
    pub fn retain<F>(&mut self, keep: F) -> bool
    where
        F: FnMut(&K) -> bool,
    {
        let before = self.ids.len();
        self.ids.retain(keep);
        before != self.ids.len()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::ops::Range;

pub const PAGE_SIZE_OPTIONS: [usize; 5] = [5, 10, 20, 50, 100];
pub const DEFAULT_PAGE_SIZE: usize = 10;
const WINDOW: usize = 5;

/// One-based page cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub page_size: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Pagination {
    pub const fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: effective_page_size(page_size),
        }
    }

    pub fn total_pages(&self, count: usize) -> usize {
        total_pages(count, self.page_size)
    }

    pub fn range(&self, count: usize) -> Range<usize> {
        page_range(count, self.page, self.page_size)
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        paginate(items, self.page, self.page_size)
    }

    pub fn reset(&mut self) {
        self.page = 1;
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = effective_page_size(page_size);
        self.page = 1;
    }

    pub fn is_first(&self) -> bool {
        self.page <= 1
    }

    pub fn is_last(&self, count: usize) -> bool {
        self.page >= self.total_pages(count)
    }
}

pub const fn effective_page_size(page_size: usize) -> usize {
    if page_size == 0 {
        DEFAULT_PAGE_SIZE
    } else {
        page_size
    }
}

/// Zero rows give zero pages, which hides the pager entirely.
pub fn total_pages(count: usize, page_size: usize) -> usize {
    count.div_ceil(effective_page_size(page_size))
}

/// Index range of `page` within `count` rows. Pages past the end are empty
/// rather than clamped to the last page.
pub fn page_range(count: usize, page: usize, page_size: usize) -> Range<usize> {
    let size = effective_page_size(page_size);
    let start = page.saturating_sub(1).saturating_mul(size).min(count);
    let end = start.saturating_add(size).min(count);
    start..end
}

pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    &items[page_range(items.len(), page, page_size)]
}

pub fn shows_pager(count: usize, page_size: usize) -> bool {
    total_pages(count, page_size) > 1
}

/// Page numbers for the numbered buttons: at most five, sliding so the
/// current page stays centred away from either end.
pub fn page_window(current: usize, total: usize) -> Vec<usize> {
    if total <= WINDOW {
        return (1..=total).collect();
    }
    let first = if current <= 3 {
        1
    } else if current >= total - 2 {
        total - WINDOW + 1
    } else {
        current - 2
    };
    (first..first + WINDOW).collect()
}

/// "Showing a to b of n entries", noting the unfiltered total when it differs.
pub fn showing_label(range: &Range<usize>, filtered: usize, total: usize) -> String {
    let (from, to) = if range.is_empty() {
        (0, 0)
    } else {
        (range.start + 1, range.end)
    };
    let mut label = format!("Showing {from} to {to} of {filtered} entries");
    if filtered != total {
        label.push_str(&format!(" (filtered from {total} total entries)"));
    }
    label
}

use serde::{Deserialize, Serialize};

use crate::{
    helpers::pagination_helpers::{page_bounds, total_pages, visible_window},
    Error, Result,
};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PaginationInfo {
    pub current_page: usize, // (1-based)
    pub total_pages: usize,
    pub total_items: usize,
    pub page_size: usize, // number of elements per page
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

/// Client-side pages over an in-memory list.
///
/// `set_page` does not clamp; keeping the page in range is up to the caller.
/// An out-of-range page renders as an empty slice.
#[derive(Debug, Clone)]
pub struct Paginator<T> {
    items: Vec<T>,
    page_size: usize,
    current_page: usize,
}

impl<T> Paginator<T> {
    pub fn new(items: Vec<T>, page_size: usize) -> Result<Self> {
        if page_size == 0 {
            return Err(Error::InvalidPageSize);
        }

        Ok(Self {
            items,
            page_size,
            current_page: 1,
        })
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Swaps in a fresh collection, e.g. after a poll. The current page is kept.
    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn set_page(&mut self, page: usize) {
        self.current_page = page;
    }

    /// Steps forward, landing back inside `[1, total_pages]` if the page was out of range.
    pub fn next_page(&mut self) -> usize {
        self.current_page = self
            .current_page
            .saturating_add(1)
            .clamp(1, self.total_pages());
        self.current_page
    }

    pub fn previous_page(&mut self) -> usize {
        self.current_page = self
            .current_page
            .saturating_sub(1)
            .clamp(1, self.total_pages());
        self.current_page
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.items.len(), self.page_size)
    }

    pub fn current_items(&self) -> &[T] {
        let (start, end) = page_bounds(self.items.len(), self.page_size, self.current_page);
        &self.items[start..end]
    }

    pub fn visible_pages(&self) -> Vec<usize> {
        visible_window(self.current_page, self.total_pages())
    }

    pub fn info(&self) -> PaginationInfo {
        let total_pages = self.total_pages();

        PaginationInfo {
            current_page: self.current_page,
            total_pages,
            total_items: self.items.len(),
            page_size: self.page_size,
            has_next_page: self.current_page < total_pages,
            has_previous_page: self.current_page > 1,
        }
    }
}

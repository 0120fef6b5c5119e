//! Paged iteration over list-style `get` calls.
//!
//! A [`PagedQuery`] issues one call per page, lazily. After each page the
//! selector's start index advances by the number of sub-items the page
//! carried, which is not always the number of entries: a criterion bid
//! landscape is one entry but the remote pages over its points.
//!
//! Iteration stops after a page with zero sub-items or fewer sub-items than
//! the page size. A call error is yielded once and ends iteration.

use std::marker::PhantomData;

use adwords_protocol::ops::{AdGroup, AdGroupCriterion, CriterionBidLandscape, Page, Selector};

/// An entry of a paged result.
pub trait PageEntry {
    /// Number of units the remote counted for this entry when paging
    fn sub_item_count(&self) -> usize {
        1
    }
}

impl PageEntry for AdGroup {}

impl PageEntry for AdGroupCriterion {}

impl PageEntry for CriterionBidLandscape {
    fn sub_item_count(&self) -> usize {
        self.landscape_points.len()
    }
}

/// Lazy sequence of pages produced by repeatedly calling `fetch`.
pub struct PagedQuery<T, E, F> {
    fetch: F,
    selector: Selector,
    calls: u32,
    done: bool,
    _entries: PhantomData<fn() -> (T, E)>,
}

impl<T, E, F> PagedQuery<T, E, F>
where
    T: PageEntry,
    F: FnMut(&Selector) -> Result<Page<T>, E>,
{
    pub fn new(selector: Selector, fetch: F) -> Self {
        Self {
            fetch,
            selector,
            calls: 0,
            done: false,
            _entries: PhantomData,
        }
    }

    /// Start index the next call will use
    pub fn offset(&self) -> u32 {
        self.selector.paging.start_index
    }

    /// Calls issued so far
    pub fn calls(&self) -> u32 {
        self.calls
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Resume from `offset`, even after iteration ended.
    pub fn restart_from(&mut self, offset: u32) {
        self.selector.paging.start_index = offset;
        self.done = false;
    }

    /// Flatten pages into entries.
    pub fn entries(self) -> Entries<T, E, F> {
        Entries {
            pages: self,
            current: Vec::new().into_iter(),
        }
    }
}

impl<T, E, F> Iterator for PagedQuery<T, E, F>
where
    T: PageEntry,
    F: FnMut(&Selector) -> Result<Page<T>, E>,
{
    type Item = Result<Page<T>, E>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        self.calls += 1;
        let page = match (self.fetch)(&self.selector) {
            Ok(page) => page,
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };

        let sub_items: usize = page.entries.iter().map(PageEntry::sub_item_count).sum();
        let page_size = self.selector.paging.number_results as usize;

        self.selector
            .paging
            .increase_offset_by(u32::try_from(sub_items).unwrap_or(u32::MAX));

        if sub_items == 0 || page_size == 0 || sub_items < page_size {
            self.done = true;
        }

        Some(Ok(page))
    }
}

/// Entries of a [`PagedQuery`], one at a time.
pub struct Entries<T, E, F> {
    pages: PagedQuery<T, E, F>,
    current: std::vec::IntoIter<T>,
}

impl<T, E, F> Entries<T, E, F> {
    /// The underlying page sequence
    pub fn pages(&self) -> &PagedQuery<T, E, F> {
        &self.pages
    }
}

impl<T, E, F> Iterator for Entries<T, E, F>
where
    T: PageEntry,
    F: FnMut(&Selector) -> Result<Page<T>, E>,
{
    type Item = Result<T, E>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.current.next() {
                return Some(Ok(entry));
            }
            match self.pages.next()? {
                Ok(page) => self.current = page.entries.into_iter(),
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

//! In-memory state of a resource store and the patches applied to it.
//!
//! Every function here runs only after the server confirmed the change, with
//! the server's representation of the entity.

use bazaar_core::{ListQuery, Page, Pagination, Resource};

/// How a fetched page is merged into the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Merge {
    /// Discard the current list (plain pagination, search, filters).
    Replace,
    /// Add to the end of the current list ("load more").
    Append,
}

/// Observable state of one store.
#[derive(Debug, Clone)]
pub struct StoreState<R: Resource> {
    pub items: Vec<R>,
    pub pagination: Pagination,
    /// Query of the last successful fetch, used to load the next page.
    pub last_query: Option<ListQuery>,
}

impl<R: Resource> Default for StoreState<R> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            pagination: Pagination::default(),
            last_query: None,
        }
    }
}

impl<R: Resource> StoreState<R> {
    /// Merge a fetched page.
    ///
    /// Appending skips items already present, so a page that shifted under
    /// concurrent inserts does not duplicate rows.
    pub fn apply_page(&mut self, page: Page<R>, merge: Merge, query: ListQuery) {
        match merge {
            Merge::Replace => self.items = page.items,
            Merge::Append => {
                for item in page.items {
                    if !self.contains(item.id()) {
                        self.items.push(item);
                    }
                }
            }
        }
        self.pagination = page.pagination;
        self.last_query = Some(query);
    }

    /// Insert a created entity, or replace it if the id is already listed.
    pub fn apply_created(&mut self, item: R) {
        if let Some(existing) = self.position(item.id()) {
            if let Some(slot) = self.items.get_mut(existing) {
                *slot = item;
            }
            return;
        }
        self.items.push(item);
        self.pagination.adjust_total(1);
    }

    /// Replace the entity with the same id. Returns whether it was listed.
    pub fn apply_updated(&mut self, item: R) -> bool {
        match self.position(item.id()) {
            Some(index) => self.items.get_mut(index).is_some_and(|slot| {
                *slot = item;
                true
            }),
            None => false,
        }
    }

    /// Drop the entity with `id`. Returns whether it was listed.
    pub fn apply_deleted(&mut self, id: &R::Id) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id() != id);
        let removed = self.items.len() != before;
        if removed {
            self.pagination.adjust_total(-1);
        }
        removed
    }

    #[must_use]
    pub fn find(&self, id: &R::Id) -> Option<&R> {
        self.items.iter().find(|item| item.id() == id)
    }

    #[must_use]
    pub fn contains(&self, id: &R::Id) -> bool {
        self.position(id).is_some()
    }

    fn position(&self, id: &R::Id) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }
}

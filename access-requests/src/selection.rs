//! Row selection state.
//!
//! Selection only stores row ids. It is validated against the current
//! projection whenever it is read, so it never holds a reference into request
//! storage and survives the rows changing shape or status between renders.

use crate::projection::RowView;
use crate::row_id::RowId;
use crate::tree;
use std::collections::BTreeMap;

/// Which rows the user has selected
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    rows: BTreeMap<RowId, bool>,
}

impl Selection {
    /// Creates an empty selection
    #[must_use]
    pub const fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
        }
    }

    /// Select or deselect `row`
    ///
    /// Selecting a row that is not selectable is refused and returns `false`.
    /// Deselecting always succeeds.
    pub fn set(&mut self, row: &RowView, selected: bool) -> bool {
        if selected && !row.is_selectable() {
            tracing::debug!(row = %row.row_id(), "Refusing to select a row with nothing pending");
            return false;
        }
        self.rows.insert(row.row_id().clone(), selected);
        true
    }

    /// [`Self::set`] for a row looked up by id in `rows`
    ///
    /// Returns `false` if no such row is displayed.
    pub fn set_by_id(&mut self, rows: &[RowView], id: &RowId, selected: bool) -> bool {
        match tree::find(rows, |row| row.row_id() == id) {
            Some(row) => self.set(row, selected),
            None if !selected => self.rows.remove(id).is_some(),
            None => false,
        }
    }

    /// Flip the selection of `row`; returns whether it is now selected
    pub fn toggle(&mut self, row: &RowView) -> bool {
        let selected = !self.is_selected(row.row_id());
        self.set(row, selected) && selected
    }

    /// Select every selectable top-level row; returns how many were selected
    pub fn select_all(&mut self, rows: &[RowView]) -> usize {
        rows.iter().filter(|row| self.set(row, true)).count()
    }

    /// Whether `id` is recorded as selected
    #[must_use]
    pub fn is_selected(&self, id: &RowId) -> bool {
        self.rows.get(id).copied().unwrap_or(false)
    }

    /// Ids recorded as selected
    pub fn selected_ids(&self) -> impl Iterator<Item = &RowId> {
        self.rows.iter().filter(|(_, selected)| **selected).map(|(id, _)| id)
    }

    /// Number of rows recorded as selected
    #[must_use]
    pub fn len(&self) -> usize {
        self.selected_ids().count()
    }

    /// Whether nothing is selected
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deselect everything
    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// Drop entries that no longer name a displayed, selectable row
    ///
    /// Returns the number of entries removed.
    pub fn prune(&mut self, rows: &[RowView]) -> usize {
        let before = self.rows.len();
        self.rows.retain(|id, selected| {
            *selected && tree::find(rows, |row| row.row_id() == id).is_some_and(RowView::is_selectable)
        });
        let removed = before - self.rows.len();
        if removed > 0 {
            tracing::debug!(removed, "Discarded stale selection entries");
        }
        removed
    }

    /// Selected rows of `rows` that are still selectable, in display order
    #[must_use]
    pub fn selected_rows<'a>(&self, rows: &'a [RowView]) -> Vec<&'a RowView> {
        tree::preorder(rows)
            .filter(|row| self.is_selected(row.row_id()) && row.is_selectable())
            .collect()
    }
}

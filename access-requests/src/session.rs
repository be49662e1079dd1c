//! A user session: one request store and the selection made against it.
//!
//! The session is created once and handed by reference to the views that
//! need it. The store is provided explicitly, either at construction or
//! later through [`Session::provide`]; every operation that needs it before
//! then fails with [`AccessError::StoreNotProvided`].

use crate::bulk::{self, BulkAction, BulkOutcome};
use crate::error::AccessError;
use crate::projection::{build_rows_for, RowView};
use crate::row_id::RowId;
use crate::selection::Selection;
use crate::store::RequestStore;

/// Request store plus selection state for one session
#[derive(Debug, Default)]
pub struct Session {
    store: Option<RequestStore>,
    selection: Selection,
}

impl Session {
    /// A session whose store has not been provided yet
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A session backed by `store`
    #[must_use]
    pub fn with_store(store: RequestStore) -> Self {
        Self {
            store: Some(store),
            selection: Selection::new(),
        }
    }

    /// Provide the store, replacing any previous one and clearing the selection
    pub fn provide(&mut self, store: RequestStore) {
        if self.store.replace(store).is_some() {
            tracing::warn!("Replacing the request store of an active session");
        }
        self.selection.clear();
    }

    /// Whether a store has been provided
    #[must_use]
    pub const fn is_provided(&self) -> bool {
        self.store.is_some()
    }

    /// The request store
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::StoreNotProvided`] if no store was provided.
    pub fn store(&self) -> Result<&RequestStore, AccessError> {
        self.store.as_ref().ok_or(AccessError::StoreNotProvided)
    }

    /// The request store, for mutation
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::StoreNotProvided`] if no store was provided.
    pub fn store_mut(&mut self) -> Result<&mut RequestStore, AccessError> {
        self.store.as_mut().ok_or(AccessError::StoreNotProvided)
    }

    /// Current selection
    #[must_use]
    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Display rows for the current snapshot
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::StoreNotProvided`] if no store was provided.
    pub fn rows(&self) -> Result<Vec<RowView>, AccessError> {
        Ok(self.store()?.state(build_rows_for))
    }

    /// Select or deselect the displayed row `id`
    ///
    /// Returns `Ok(false)` if the row is not displayed or not selectable.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::StoreNotProvided`] if no store was provided.
    pub fn select(&mut self, id: &RowId, selected: bool) -> Result<bool, AccessError> {
        let rows = self.rows()?;
        Ok(self.selection.set_by_id(&rows, id, selected))
    }

    /// Select every selectable row; returns how many were selected
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::StoreNotProvided`] if no store was provided.
    pub fn select_all(&mut self) -> Result<usize, AccessError> {
        let rows = self.rows()?;
        Ok(self.selection.select_all(&rows))
    }

    /// Drop selection entries that went stale since the last render
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::StoreNotProvided`] if no store was provided.
    pub fn refresh(&mut self) -> Result<usize, AccessError> {
        let rows = self.rows()?;
        Ok(self.selection.prune(&rows))
    }

    /// Apply `action` to the current selection
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::StoreNotProvided`] if no store was provided.
    pub fn apply_bulk(&mut self, action: BulkAction) -> Result<BulkOutcome, AccessError> {
        let store = self.store.as_mut().ok_or(AccessError::StoreNotProvided)?;
        Ok(bulk::apply_selected(store, &mut self.selection, action))
    }

    /// Withdraw every pending item in the current selection
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::StoreNotProvided`] if no store was provided.
    pub fn withdraw_selected(&mut self) -> Result<BulkOutcome, AccessError> {
        self.apply_bulk(BulkAction::Withdraw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::{RequestsEnvironment, SequentialRequestIds};
    use crate::types::{ItemDraft, ItemStatus};
    use access_testing::test_clock;
    use std::sync::Arc;

    fn store() -> RequestStore {
        RequestStore::new(RequestsEnvironment::new(
            Arc::new(test_clock()),
            Arc::new(SequentialRequestIds::default()),
        ))
    }

    #[test]
    fn operations_before_provide_are_configuration_errors() {
        let mut session = Session::new();
        assert!(!session.is_provided());
        assert_eq!(session.rows(), Err(AccessError::StoreNotProvided));
        assert_eq!(session.select_all(), Err(AccessError::StoreNotProvided));
        assert_eq!(session.withdraw_selected(), Err(AccessError::StoreNotProvided));
        assert!(session.store_mut().is_err());
    }

    #[test]
    fn provided_store_is_used() {
        let mut session = Session::new();
        session.provide(store());
        let id = session
            .store_mut()
            .ok()
            .and_then(|store| store.add_request(vec![ItemDraft::new("1", "Acme", "write")]));

        assert!(id.is_some());
        assert_eq!(session.rows().map(|rows| rows.len()), Ok(1));
    }

    #[test]
    fn withdraw_selected_clears_selection() {
        let mut session = Session::with_store(store());
        if let Ok(store) = session.store_mut() {
            store.add_request(vec![ItemDraft::new("1", "A", "read"), ItemDraft::new("2", "B", "read")]);
        }
        assert_eq!(session.select_all(), Ok(1));

        let outcome = session.withdraw_selected();

        assert_eq!(outcome.map(|o| o.applied.len()), Ok(2));
        assert!(session.selection().is_empty());
        let pending = session.store().map(|store| store.state(|s| s.pending_count()));
        assert_eq!(pending, Ok(0));
        let status = session
            .store()
            .ok()
            .and_then(|store| store.item(&RowId::parse("req-10001.2")?))
            .map(|item| item.status);
        assert_eq!(status, Some(ItemStatus::Withdrawn));
    }
}

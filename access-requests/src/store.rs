//! The request store: single owner and mutator of access requests.
//!
//! [`RequestStore`] wraps the generic runtime [`Store`] with the operations
//! the surrounding application uses. Every mutation publishes a new
//! snapshot; readers holding an older [`Arc<RequestsState>`] keep seeing it
//! unchanged, so version numbers or pointer comparison are enough for
//! change detection.

use crate::actions::RequestsAction;
use crate::environment::RequestsEnvironment;
use crate::reducer::RequestsReducer;
use crate::row_id::RowId;
use crate::types::{AccessRequest, AccessRequestItem, ItemDraft, ItemStatus, RequestId, RequestsState};
use access_runtime::{Store, StoreConfig, StoreError, SubscriptionId};
use chrono::{DateTime, Utc};
use std::sync::Arc;

type Inner = Store<RequestsState, RequestsAction, RequestsEnvironment, RequestsReducer>;

/// Owns the ordered collection of access requests, newest first
pub struct RequestStore {
    inner: Inner,
}

impl RequestStore {
    /// Empty store with the default runtime configuration
    #[must_use]
    pub fn new(environment: RequestsEnvironment) -> Self {
        Self::with_config(environment, StoreConfig::default())
    }

    /// Empty store with a custom runtime configuration
    #[must_use]
    pub fn with_config(environment: RequestsEnvironment, config: StoreConfig) -> Self {
        Self {
            inner: Store::with_config(RequestsState::new(), RequestsReducer::new(), environment, config),
        }
    }

    /// Submit a new request and return its freshly minted id
    ///
    /// Returns `None` without touching the store when `items` is empty.
    /// Permissions are coerced with [`crate::types::Permission::from_submitted`].
    pub fn add_request(&mut self, items: Vec<ItemDraft>) -> Option<RequestId> {
        if items.is_empty() {
            tracing::debug!("Ignoring submission without items");
            return None;
        }

        let request_id = RequestId::new(self.inner.environment().ids.next_id());
        self.dispatch(RequestsAction::SubmitRequest {
            request_id: request_id.clone(),
            items,
        });

        self.inner
            .state(|state| state.contains(&request_id))
            .then_some(request_id)
    }

    /// Move the item addressed by `row` to `status`
    ///
    /// A request-level row addresses the request's first item. Unknown
    /// requests, out-of-range items and transitions out of a terminal status
    /// are ignored. When `approved_at` is `None` the item keeps its current
    /// timestamp.
    pub fn update_item_status(&mut self, row: &RowId, status: ItemStatus, approved_at: Option<DateTime<Utc>>) {
        self.dispatch(RequestsAction::UpdateItemStatus {
            row: row.clone(),
            status,
            approved_at,
        });
    }

    /// [`Self::update_item_status`] for the raw `requestId[.position]` form
    pub fn update_item_status_by_key(&mut self, key: &str, status: ItemStatus, approved_at: Option<DateTime<Utc>>) {
        match RowId::parse(key) {
            Some(row) => self.update_item_status(&row, status, approved_at),
            None => tracing::debug!(key, "Ignoring status update for an empty row id"),
        }
    }

    /// Move every still-pending item of a request to `status`
    pub fn update_request_status(
        &mut self,
        request_id: &RequestId,
        status: ItemStatus,
        approved_at: Option<DateTime<Utc>>,
    ) {
        self.dispatch(RequestsAction::UpdateRequestStatus {
            request_id: request_id.clone(),
            status,
            approved_at,
        });
    }

    /// Move several items at once, publishing a single snapshot
    ///
    /// Returns `false` if the batch was discarded by the runtime.
    pub fn transition_items(
        &mut self,
        rows: &[RowId],
        status: ItemStatus,
        approved_at: Option<DateTime<Utc>>,
    ) -> bool {
        let actions = rows.iter().map(|row| RequestsAction::UpdateItemStatus {
            row: row.clone(),
            status,
            approved_at,
        });
        match self.inner.send_all(actions) {
            Ok(_) => true,
            Err(error) => {
                log_store_error(&error);
                false
            },
        }
    }

    /// All requests, most recent first
    #[must_use]
    pub fn requests(&self) -> Vec<AccessRequest> {
        self.inner.state(|state| state.requests().to_vec())
    }

    /// Request by id
    #[must_use]
    pub fn request(&self, id: &RequestId) -> Option<AccessRequest> {
        self.inner.state(|state| state.get(id).cloned())
    }

    /// Item addressed by a row
    #[must_use]
    pub fn item(&self, row: &RowId) -> Option<AccessRequestItem> {
        self.inner.state(|state| state.item(row).cloned())
    }

    /// Read the current state via a closure
    pub fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&RequestsState) -> T,
    {
        self.inner.state(f)
    }

    /// The current snapshot
    #[must_use]
    pub fn snapshot(&self) -> Arc<RequestsState> {
        self.inner.snapshot()
    }

    /// Version of the current snapshot; bumped by every mutation
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.version()
    }

    /// Current time according to the injected clock
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.inner.environment().clock.now()
    }

    /// Register an observer called with every new snapshot and its version
    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&RequestsState, u64) + Send + 'static,
    {
        self.inner.subscribe(observer)
    }

    /// Remove an observer; returns `false` if it was not registered
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.inner.unsubscribe(id)
    }

    fn dispatch(&mut self, action: RequestsAction) {
        if let Err(error) = self.inner.send(action) {
            log_store_error(&error);
        }
    }
}

impl std::fmt::Debug for RequestStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestStore")
            .field("version", &self.inner.version())
            .field("requests", &self.inner.state(RequestsState::len))
            .finish()
    }
}

fn log_store_error(error: &StoreError) {
    tracing::error!(%error, "Request store rejected the update; state left unchanged");
}

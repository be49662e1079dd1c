//! # Access Requests
//!
//! Lifecycle of organization access requests, from submission through
//! approval, rejection, cancellation or withdrawal, together with the row
//! projection, selection and bulk-action engine behind the request and
//! approval tables.
//!
//! ## Components
//!
//! - [`store::RequestStore`]: owns every request and is the only mutator
//! - [`projection`]: turns requests into leaf and parent rows
//! - [`selection::Selection`]: which rows the user has ticked
//! - [`bulk`]: resolves a mixed selection to items and applies an action
//! - [`session::Session`]: a store and a selection with an explicit lifecycle
//!
//! Data flows one way: store → rows → selection → bulk action → store.
//!
//! ## Example
//!
//! ```
//! use access_requests::prelude::*;
//!
//! let mut session = Session::with_store(AccessConfig::default().build_store());
//! let store = session.store_mut()?;
//! let id = store.add_request(vec![
//!     ItemDraft::new("549236", "Acme", "read"),
//!     ItemDraft::new("812003", "Globex", "write"),
//! ]);
//! assert_eq!(id.map(|id| id.to_string()).as_deref(), Some("req-10001"));
//!
//! session.select_all()?;
//! let outcome = session.withdraw_selected()?;
//! assert_eq!(outcome.applied.len(), 2);
//! # Ok::<(), access_requests::error::AccessError>(())
//! ```

pub mod actions;
pub mod bulk;
pub mod config;
pub mod environment;
pub mod error;
pub mod labels;
pub mod metrics;
pub mod projection;
pub mod reducer;
pub mod row_id;
pub mod selection;
pub mod session;
pub mod store;
pub mod tree;
pub mod types;

/// Commonly used items
pub mod prelude {
    pub use crate::bulk::{apply, apply_withdraw, resolve_leaf_ids, BulkAction, BulkOutcome};
    pub use crate::config::AccessConfig;
    pub use crate::environment::RequestsEnvironment;
    pub use crate::error::AccessError;
    pub use crate::labels::{format_timestamp, status_label};
    pub use crate::projection::{build_rows, Aggregate, LeafRow, ParentRow, RowView, MULTIPLE};
    pub use crate::row_id::RowId;
    pub use crate::selection::Selection;
    pub use crate::session::Session;
    pub use crate::store::RequestStore;
    pub use crate::types::{AccessRequest, AccessRequestItem, ItemDraft, ItemStatus, Organization, Permission, RequestId};
}

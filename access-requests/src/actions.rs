//! Actions accepted by the requests reducer.

use crate::row_id::RowId;
use crate::types::{ItemDraft, ItemStatus, RequestId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Inputs to [`crate::reducer::RequestsReducer`]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestsAction {
    /// Record a new submission under an id minted by the caller
    SubmitRequest {
        /// Id for the new request
        request_id: RequestId,
        /// Submitted items, in form order
        items: Vec<ItemDraft>,
    },

    /// Move one item to a new status
    UpdateItemStatus {
        /// Row addressing the item
        row: RowId,
        /// Target status
        status: ItemStatus,
        /// Resolution time; `None` keeps the existing value
        approved_at: Option<DateTime<Utc>>,
    },

    /// Move every item of a request to a new status
    UpdateRequestStatus {
        /// Target request
        request_id: RequestId,
        /// Target status
        status: ItemStatus,
        /// Resolution time; `None` keeps the existing values
        approved_at: Option<DateTime<Utc>>,
    },
}

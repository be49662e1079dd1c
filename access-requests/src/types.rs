//! Domain types for access requests.
//!
//! An access request bundles one or more organization + permission items that
//! were submitted together. Each item carries its own status, so a request can
//! be partly approved, partly withdrawn and partly still pending.

use crate::error::AccessError;
use crate::row_id::RowId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Base URL of the organization pages on the dashboard
pub const DASHBOARD_ORG_BASE: &str = "https://dashboard.meraki.com/o";

/// Unique identifier for an access request (e.g. `req-10001`)
///
/// Never contains a `.`, which is reserved as the row-id item separator.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Wrap an identifier string
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RequestId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Access level requested for an organization
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    /// Read-only access
    Read,
    /// Read-write access
    Write,
}

impl Permission {
    /// Coerce a submitted permission literal.
    ///
    /// Policy: only the exact literal `"write"` grants write access; every
    /// other value (including `"Write"`, `""` or typos) is read access. This
    /// is a safe default, not validation, so submissions are never rejected
    /// because of the permission field.
    #[must_use]
    pub fn from_submitted(raw: &str) -> Self {
        if raw == "write" { Self::Write } else { Self::Read }
    }

    /// Lowercase literal
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a single item
///
/// `Pending` is the only initial state and every other state is terminal:
///
/// ```text
///            ┌──► Approved
///            ├──► Rejected
/// Pending ───┼──► Withdrawn
///            └──► Cancelled
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    /// Awaiting a decision
    Pending,
    /// Granted by an approver
    Approved,
    /// Refused by an approver
    Rejected,
    /// Cancelled by an administrator
    Cancelled,
    /// Withdrawn by the requester
    Withdrawn,
}

impl ItemStatus {
    /// Every status, in display order
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Approved,
        Self::Rejected,
        Self::Cancelled,
        Self::Withdrawn,
    ];

    /// Whether the item is still awaiting a decision
    #[must_use]
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Whether no further transition is possible
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !self.is_pending()
    }

    /// Whether `self → next` is an edge of the state machine
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        self.is_pending() && next.is_terminal()
    }

    /// Lowercase literal
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
            Self::Withdrawn => "withdrawn",
        }
    }

    /// Human-readable label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
            Self::Cancelled => "Cancelled",
            Self::Withdrawn => "Withdrawn",
        }
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemStatus {
    type Err = AccessError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == raw)
            .ok_or_else(|| AccessError::UnknownStatus(raw.to_string()))
    }
}

/// An organization as reported by the external organization source
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    /// Organization identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Dashboard overview link (empty when the id is empty)
    pub link: String,
}

impl Organization {
    /// Build an organization record, deriving its dashboard link
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let id = id.into();
        let link = if id.is_empty() {
            String::new()
        } else {
            format!("{DASHBOARD_ORG_BASE}/{id}/overview")
        };
        Self {
            id,
            name: name.into(),
            link,
        }
    }
}

/// One item of a submission, as supplied by the request form
///
/// `permission` is the raw literal; it is coerced by
/// [`Permission::from_submitted`] when the request is created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDraft {
    /// Organization identifier
    pub org_id: String,
    /// Organization display name
    pub org_name: String,
    /// Requested permission literal
    pub permission: String,
}

impl ItemDraft {
    /// Creates a new draft item
    #[must_use]
    pub fn new(org_id: impl Into<String>, org_name: impl Into<String>, permission: impl Into<String>) -> Self {
        Self {
            org_id: org_id.into(),
            org_name: org_name.into(),
            permission: permission.into(),
        }
    }

    /// Draft a request for `permission` on `organization`
    #[must_use]
    pub fn for_organization(organization: &Organization, permission: Permission) -> Self {
        Self::new(organization.id.clone(), organization.name.clone(), permission.as_str())
    }
}

/// One organization + permission within a request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessRequestItem {
    /// Organization identifier
    pub org_id: String,
    /// Organization display name
    pub org_name: String,
    /// Requested access level
    pub permission: Permission,
    /// Current status
    pub status: ItemStatus,
    /// When the item was resolved; only ever set once it has left `Pending`
    pub approved_at: Option<DateTime<Utc>>,
}

impl AccessRequestItem {
    /// A freshly submitted, pending item
    #[must_use]
    pub fn from_draft(draft: ItemDraft) -> Self {
        Self {
            permission: Permission::from_submitted(&draft.permission),
            org_id: draft.org_id,
            org_name: draft.org_name,
            status: ItemStatus::Pending,
            approved_at: None,
        }
    }

    /// Move to `to`, optionally stamping the resolution time
    ///
    /// Returns `false` (leaving the item untouched) when the state machine
    /// has no `self.status → to` edge. When `approved_at` is `None` the
    /// existing timestamp is kept.
    pub fn apply_status(&mut self, to: ItemStatus, approved_at: Option<DateTime<Utc>>) -> bool {
        if !self.status.can_transition_to(to) {
            return false;
        }
        self.status = to;
        if approved_at.is_some() {
            self.approved_at = approved_at;
        }
        true
    }
}

/// An access request: items submitted together at one point in time
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessRequest {
    /// Unique identifier
    pub id: RequestId,
    /// Items in submission order; never empty, never reordered
    pub items: Vec<AccessRequestItem>,
    /// Submission time
    pub requested_at: DateTime<Utc>,
}

impl AccessRequest {
    /// Item at a 0-based position
    #[must_use]
    pub fn item(&self, index: usize) -> Option<&AccessRequestItem> {
        self.items.get(index)
    }

    /// Whether the request is shown as a parent row with children
    #[must_use]
    pub fn is_multi_item(&self) -> bool {
        self.items.len() > 1
    }

    /// Number of items still awaiting a decision
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.items.iter().filter(|item| item.status.is_pending()).count()
    }
}

/// State of the request store: every request ever submitted, newest first
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestsState {
    requests: Vec<AccessRequest>,
}

impl RequestsState {
    /// Creates a new empty state
    #[must_use]
    pub const fn new() -> Self {
        Self {
            requests: Vec::new(),
        }
    }

    /// All requests, most recent first
    #[must_use]
    pub fn requests(&self) -> &[AccessRequest] {
        &self.requests
    }

    /// Number of requests
    #[must_use]
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    /// Whether no request has been submitted yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Request by id
    #[must_use]
    pub fn get(&self, id: &RequestId) -> Option<&AccessRequest> {
        self.requests.iter().find(|request| &request.id == id)
    }

    /// Checks if a request exists
    #[must_use]
    pub fn contains(&self, id: &RequestId) -> bool {
        self.get(id).is_some()
    }

    /// Item addressed by a row id (a request-level row addresses item 0)
    #[must_use]
    pub fn item(&self, row: &RowId) -> Option<&AccessRequestItem> {
        self.get(row.request_id())?.item(row.item_index())
    }

    /// Number of pending items across all requests
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.requests.iter().map(AccessRequest::pending_count).sum()
    }

    pub(crate) fn get_mut(&mut self, id: &RequestId) -> Option<&mut AccessRequest> {
        self.requests.iter_mut().find(|request| &request.id == id)
    }

    pub(crate) fn prepend(&mut self, request: AccessRequest) {
        self.requests.insert(0, request);
    }
}

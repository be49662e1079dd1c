//! Projection of requests into display rows.
//!
//! A single-item request becomes one leaf row addressed by the request id. A
//! multi-item request becomes a parent row whose children are the items, in
//! submission order, addressed `requestId.position`. Parent fields other
//! than the id and submission time are aggregates: the common value when
//! every child agrees, otherwise [`MULTIPLE`].

use crate::row_id::RowId;
use crate::tree::TreeNode;
use crate::types::{AccessRequest, AccessRequestItem, ItemStatus, Permission, RequestsState};
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::fmt;

/// Shown for a parent field whose children disagree
pub const MULTIPLE: &str = "(multiple)";

/// Uniform-or-sentinel aggregate of a field across a parent's children
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Aggregate<T> {
    /// Every child has this value
    Uniform(T),
    /// Children disagree
    Multiple,
}

impl<T: PartialEq> Aggregate<T> {
    /// Aggregate `values`; an empty input has no common value
    pub fn of<I>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let mut values = values.into_iter();
        let Some(first) = values.next() else {
            return Self::Multiple;
        };
        if values.all(|value| value == first) {
            Self::Uniform(first)
        } else {
            Self::Multiple
        }
    }
}

impl<T> Aggregate<T> {
    /// The common value, if any
    #[must_use]
    pub const fn uniform(&self) -> Option<&T> {
        match self {
            Self::Uniform(value) => Some(value),
            Self::Multiple => None,
        }
    }

    /// Whether the children disagree
    #[must_use]
    pub const fn is_multiple(&self) -> bool {
        matches!(self, Self::Multiple)
    }
}

impl<T: fmt::Display> fmt::Display for Aggregate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uniform(value) => value.fmt(f),
            Self::Multiple => f.write_str(MULTIPLE),
        }
    }
}

impl<T: Serialize> Serialize for Aggregate<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Uniform(value) => value.serialize(serializer),
            Self::Multiple => serializer.serialize_str(MULTIPLE),
        }
    }
}

/// Row for one item
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeafRow {
    /// Address of the row
    pub row_id: RowId,
    /// Submission time of the owning request
    pub requested_at: DateTime<Utc>,
    /// Organization name
    pub scope: String,
    /// Organization id
    pub org_id: String,
    /// Requested access level
    pub permission: Permission,
    /// Resolution time
    pub approval_at: Option<DateTime<Utc>>,
    /// Current status
    pub status: ItemStatus,
}

impl LeafRow {
    fn from_item(row_id: RowId, requested_at: DateTime<Utc>, item: &AccessRequestItem) -> Self {
        Self {
            row_id,
            requested_at,
            scope: item.org_name.clone(),
            org_id: item.org_id.clone(),
            permission: item.permission,
            approval_at: item.approved_at,
            status: item.status,
        }
    }
}

/// Row for a multi-item request
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentRow {
    /// Address of the row (the request id)
    pub row_id: RowId,
    /// Submission time
    pub requested_at: DateTime<Utc>,
    /// Organization name, if shared by all children
    pub scope: Aggregate<String>,
    /// Permission, if shared by all children
    pub permission: Aggregate<Permission>,
    /// Resolution time, if shared by all children
    pub approval_at: Aggregate<Option<DateTime<Utc>>>,
    /// Status, if shared by all children
    pub status: Aggregate<ItemStatus>,
    /// Child rows, in item order
    pub children: Vec<RowView>,
}

impl ParentRow {
    /// Build a parent from its children, aggregating over their leaves
    #[must_use]
    pub fn from_children(row_id: RowId, requested_at: DateTime<Utc>, children: Vec<RowView>) -> Self {
        let leaves: Vec<&LeafRow> = crate::tree::leaves(&children)
            .filter_map(RowView::as_leaf)
            .collect();

        Self {
            scope: Aggregate::of(leaves.iter().map(|leaf| leaf.scope.clone())),
            permission: Aggregate::of(leaves.iter().map(|leaf| leaf.permission)),
            approval_at: Aggregate::of(leaves.iter().map(|leaf| leaf.approval_at)),
            status: Aggregate::of(leaves.iter().map(|leaf| leaf.status)),
            row_id,
            requested_at,
            children,
        }
    }
}

/// A display row
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RowView {
    /// Item row (single-item request, or child of a parent)
    Leaf(LeafRow),
    /// Multi-item request
    Parent(ParentRow),
}

impl RowView {
    /// Address of the row
    #[must_use]
    pub const fn row_id(&self) -> &RowId {
        match self {
            Self::Leaf(leaf) => &leaf.row_id,
            Self::Parent(parent) => &parent.row_id,
        }
    }

    /// Submission time of the owning request
    #[must_use]
    pub const fn requested_at(&self) -> DateTime<Utc> {
        match self {
            Self::Leaf(leaf) => leaf.requested_at,
            Self::Parent(parent) => parent.requested_at,
        }
    }

    /// The leaf, if this is one
    #[must_use]
    pub const fn as_leaf(&self) -> Option<&LeafRow> {
        match self {
            Self::Leaf(leaf) => Some(leaf),
            Self::Parent(_) => None,
        }
    }

    /// The parent, if this is one
    #[must_use]
    pub const fn as_parent(&self) -> Option<&ParentRow> {
        match self {
            Self::Parent(parent) => Some(parent),
            Self::Leaf(_) => None,
        }
    }

    /// Whether a user may select this row
    ///
    /// A leaf is selectable while pending; a parent while at least one of its
    /// descendants is.
    #[must_use]
    pub fn is_selectable(&self) -> bool {
        match self {
            Self::Leaf(leaf) => leaf.status.is_pending(),
            Self::Parent(parent) => crate::tree::leaves(&parent.children).any(Self::is_selectable),
        }
    }
}

impl TreeNode for RowView {
    fn children(&self) -> &[Self] {
        match self {
            Self::Leaf(_) => &[],
            Self::Parent(parent) => &parent.children,
        }
    }

    fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }
}

/// Rows for `requests`, one per request, order preserved
#[must_use]
pub fn build_rows(requests: &[AccessRequest]) -> Vec<RowView> {
    requests.iter().filter_map(request_row).collect()
}

/// [`build_rows`] over a store snapshot
#[must_use]
pub fn build_rows_for(state: &RequestsState) -> Vec<RowView> {
    build_rows(state.requests())
}

fn request_row(request: &AccessRequest) -> Option<RowView> {
    match request.items.as_slice() {
        [] => None,
        [item] => Some(RowView::Leaf(LeafRow::from_item(
            RowId::request(request.id.clone()),
            request.requested_at,
            item,
        ))),
        items => {
            let children = items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    RowView::Leaf(LeafRow::from_item(
                        RowId::item(request.id.clone(), index),
                        request.requested_at,
                        item,
                    ))
                })
                .collect();
            Some(RowView::Parent(ParentRow::from_children(
                RowId::request(request.id.clone()),
                request.requested_at,
                children,
            )))
        },
    }
}

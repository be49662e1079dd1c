//! Bulk actions over a mixed selection of rows.
//!
//! A selection may contain parent rows, leaf rows, or both. Parents expand to
//! their leaves, duplicates collapse, and only items still pending at the
//! time of the action are transitioned. Every transition of one bulk action
//! lands in the store as a single snapshot.

use crate::metrics::BULK_ACTIONS_APPLIED;
use crate::projection::{build_rows_for, RowView};
use crate::row_id::RowId;
use crate::selection::Selection;
use crate::store::RequestStore;
use crate::tree;
use crate::types::ItemStatus;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// An action applied to every selected item
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BulkAction {
    /// Requester withdraws
    Withdraw,
    /// Approver grants
    Approve,
    /// Approver refuses
    Reject,
    /// Administrator cancels
    Cancel,
}

impl BulkAction {
    /// Status the affected items move to
    #[must_use]
    pub const fn target_status(self) -> ItemStatus {
        match self {
            Self::Withdraw => ItemStatus::Withdrawn,
            Self::Approve => ItemStatus::Approved,
            Self::Reject => ItemStatus::Rejected,
            Self::Cancel => ItemStatus::Cancelled,
        }
    }

    /// Lowercase name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Withdraw => "withdraw",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Cancel => "cancel",
        }
    }
}

impl std::fmt::Display for BulkAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a bulk action did
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkOutcome {
    /// Action applied
    pub action: BulkAction,
    /// Leaves that were transitioned
    pub applied: Vec<RowId>,
    /// Leaves left alone because they were no longer pending or no longer exist
    pub skipped: Vec<RowId>,
}

impl BulkOutcome {
    /// Whether nothing was transitioned
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.applied.is_empty()
    }
}

/// Leaf row ids under `selected`, each once, in first-seen order
///
/// Parents contribute all their leaves; a leaf selected both directly and
/// through its parent appears once.
pub fn resolve_leaf_ids<'a, I>(selected: I) -> Vec<RowId>
where
    I: IntoIterator<Item = &'a RowView>,
{
    let mut seen = HashSet::new();
    tree::leaves(selected)
        .map(RowView::row_id)
        .filter(|id| seen.insert(*id))
        .cloned()
        .collect()
}

/// Apply `action` to every pending item under `selected`, then clear the
/// selection
///
/// Items are re-checked against the store, so rows rendered before another
/// update resolved them are skipped. Applying the same action twice is
/// harmless: the second run finds nothing pending. The selection is kept if
/// the store discards the batch.
pub fn apply<'a, I>(
    store: &mut RequestStore,
    selection: &mut Selection,
    action: BulkAction,
    selected: I,
) -> BulkOutcome
where
    I: IntoIterator<Item = &'a RowView>,
{
    let (applied, skipped): (Vec<RowId>, Vec<RowId>) = resolve_leaf_ids(selected)
        .into_iter()
        .partition(|id| store.item(id).is_some_and(|item| item.status.is_pending()));

    if !applied.is_empty() {
        let now = store.now();
        if !store.transition_items(&applied, action.target_status(), Some(now)) {
            let skipped = applied.into_iter().chain(skipped).collect();
            return BulkOutcome {
                action,
                applied: Vec::new(),
                skipped,
            };
        }
    }

    selection.clear();
    metrics::counter!(BULK_ACTIONS_APPLIED, "action" => action.as_str()).increment(1);
    tracing::info!(%action, applied = applied.len(), skipped = skipped.len(), "Bulk action applied");

    BulkOutcome {
        action,
        applied,
        skipped,
    }
}

/// Withdraw every pending item under `selected`
pub fn apply_withdraw<'a, I>(store: &mut RequestStore, selection: &mut Selection, selected: I) -> BulkOutcome
where
    I: IntoIterator<Item = &'a RowView>,
{
    apply(store, selection, BulkAction::Withdraw, selected)
}

/// Apply `action` to the rows currently recorded in `selection`
pub fn apply_selected(store: &mut RequestStore, selection: &mut Selection, action: BulkAction) -> BulkOutcome {
    let rows = store.state(build_rows_for);
    let selected: Vec<RowView> = selection.selected_rows(&rows).into_iter().cloned().collect();
    apply(store, selection, action, &selected)
}

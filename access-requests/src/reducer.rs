//! Reducer for the access-request collection.
//!
//! Every item transition, whether requested for one row or for a whole
//! request, goes through the same per-item state-machine check. A request
//! update is applied in place, so it never counts against the store's
//! feedback bound. Invalid or stale input never fails; it is
//! logged and ignored.

use crate::actions::RequestsAction;
use crate::environment::RequestsEnvironment;
use crate::metrics::{ITEMS_TRANSITIONED, REQUESTS_CREATED, TRANSITIONS_SKIPPED};
use crate::row_id::{RowId, ITEM_SEPARATOR};
use crate::types::{AccessRequest, AccessRequestItem, ItemDraft, ItemStatus, RequestId, RequestsState};
use access_core::{effect::Effect, reducer::Reducer, SmallVec};
use chrono::{DateTime, Utc};

/// Reducer for [`RequestsState`]
#[derive(Clone, Debug, Default)]
pub struct RequestsReducer;

impl RequestsReducer {
    /// Creates a new reducer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn submit(
        state: &mut RequestsState,
        request_id: RequestId,
        items: Vec<ItemDraft>,
        env: &RequestsEnvironment,
    ) {
        if items.is_empty() {
            tracing::debug!(%request_id, "Ignoring submission without items");
            return;
        }
        if request_id.as_str().is_empty() || request_id.as_str().contains(ITEM_SEPARATOR) {
            tracing::warn!(%request_id, "Ignoring submission with an unaddressable request id");
            return;
        }
        if state.contains(&request_id) {
            tracing::warn!(%request_id, "Ignoring submission with a duplicate request id");
            return;
        }

        let request = AccessRequest {
            id: request_id,
            items: items.into_iter().map(AccessRequestItem::from_draft).collect(),
            requested_at: env.clock.now(),
        };
        tracing::info!(request_id = %request.id, items = request.items.len(), "Access request created");
        metrics::counter!(REQUESTS_CREATED).increment(1);
        state.prepend(request);
    }

    fn update_item(
        state: &mut RequestsState,
        row: &RowId,
        to: ItemStatus,
        approved_at: Option<DateTime<Utc>>,
    ) {
        let request_id = row.request_id();
        let item_index = row.item_index();

        let Some(item) = state
            .get_mut(request_id)
            .and_then(|request| request.items.get_mut(item_index))
        else {
            tracing::debug!(%row, "Ignoring status update for an unknown row");
            metrics::counter!(TRANSITIONS_SKIPPED).increment(1);
            return;
        };

        let from = item.status;
        if item.apply_status(to, approved_at) {
            tracing::info!(%request_id, item_index, %from, %to, "Item status changed");
            metrics::counter!(ITEMS_TRANSITIONED, "to" => to.as_str()).increment(1);
        } else {
            tracing::debug!(%request_id, item_index, %from, %to, "Ignoring transition not allowed from current status");
            metrics::counter!(TRANSITIONS_SKIPPED).increment(1);
        }
    }
}

impl Reducer for RequestsReducer {
    type State = RequestsState;
    type Action = RequestsAction;
    type Environment = RequestsEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            RequestsAction::SubmitRequest { request_id, items } => {
                Self::submit(state, request_id, items, env);
                SmallVec::new()
            },

            RequestsAction::UpdateItemStatus {
                row,
                status,
                approved_at,
            } => {
                Self::update_item(state, &row, status, approved_at);
                SmallVec::new()
            },

            RequestsAction::UpdateRequestStatus {
                request_id,
                status,
                approved_at,
            } => {
                let Some(request) = state.get(&request_id) else {
                    tracing::debug!(%request_id, "Ignoring status update for an unknown request");
                    metrics::counter!(TRANSITIONS_SKIPPED).increment(1);
                    return SmallVec::new();
                };

                // Items already resolved would be refused anyway
                let pending: Vec<usize> = request
                    .items
                    .iter()
                    .enumerate()
                    .filter(|(_, item)| item.status.is_pending())
                    .map(|(index, _)| index)
                    .collect();

                for index in pending {
                    Self::update_item(state, &RowId::item(request_id.clone(), index), status, approved_at);
                }
                SmallVec::new()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::SequentialRequestIds;
    use access_testing::{assertions, test_clock, test_epoch, ReducerTest};
    use chrono::Duration;
    use std::sync::Arc;

    fn env() -> RequestsEnvironment {
        RequestsEnvironment::new(Arc::new(test_clock()), Arc::new(SequentialRequestIds::default()))
    }

    fn id(raw: &str) -> RequestId {
        RequestId::new(raw)
    }

    fn drafts(n: usize) -> Vec<ItemDraft> {
        (0..n)
            .map(|i| ItemDraft::new(format!("org-{i}"), format!("Org {i}"), "read"))
            .collect()
    }

    fn submit(request_id: &str, items: Vec<ItemDraft>) -> RequestsAction {
        RequestsAction::SubmitRequest {
            request_id: id(request_id),
            items,
        }
    }

    fn state_with(requests: &[(&str, usize)]) -> RequestsState {
        let reducer = RequestsReducer::new();
        let env = env();
        let mut state = RequestsState::new();
        for (request_id, n) in requests {
            reducer.reduce(&mut state, submit(request_id, drafts(*n)), &env);
        }
        state
    }

    #[test]
    fn submit_creates_pending_request() {
        ReducerTest::new(RequestsReducer::new())
            .with_env(env())
            .given_state(RequestsState::new())
            .when_action(submit(
                "req-1",
                vec![
                    ItemDraft::new("a", "Org A", "read"),
                    ItemDraft::new("b", "Org B", "admin"),
                ],
            ))
            .then_state(|state| {
                let request = state.get(&id("req-1"));
                assert_eq!(request.map(|r| r.requested_at), Some(test_epoch()));
                let items = request.map(|r| r.items.clone()).unwrap_or_default();
                assert_eq!(items.len(), 2);
                assert!(items.iter().all(|item| item.status.is_pending() && item.approved_at.is_none()));
                assert!(items.iter().all(|item| item.permission == crate::types::Permission::Read));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn newest_request_comes_first() {
        let state = state_with(&[("req-1", 1), ("req-2", 1)]);
        let ids: Vec<_> = state.requests().iter().map(|r| r.id.to_string()).collect();
        assert_eq!(ids, vec!["req-2", "req-1"]);
    }

    #[test]
    fn empty_submission_is_ignored() {
        ReducerTest::new(RequestsReducer::new())
            .with_env(env())
            .given_state(RequestsState::new())
            .when_action(submit("req-1", Vec::new()))
            .then_state(|state| assert!(state.is_empty()))
            .run();
    }

    #[test]
    fn duplicate_and_dotted_ids_are_ignored() {
        ReducerTest::new(RequestsReducer::new())
            .with_env(env())
            .given_state(state_with(&[("req-1", 1)]))
            .when_action(submit("req-1", drafts(2)))
            .when_action(submit("req.2", drafts(1)))
            .then_state(|state| {
                assert_eq!(state.len(), 1);
                assert_eq!(state.get(&id("req-1")).map(|r| r.items.len()), Some(1));
            })
            .run();
    }

    #[test]
    fn update_item_touches_only_the_addressed_item() {
        let at = test_epoch() + Duration::hours(1);
        ReducerTest::new(RequestsReducer::new())
            .with_env(env())
            .given_state(state_with(&[("req-1", 2)]))
            .when_action(RequestsAction::UpdateItemStatus {
                row: RowId::item(id("req-1"), 1),
                status: ItemStatus::Withdrawn,
                approved_at: Some(at),
            })
            .then_state(move |state| {
                let first = state.item(&RowId::item(id("req-1"), 0)).cloned();
                let second = state.item(&RowId::item(id("req-1"), 1)).cloned();
                assert_eq!(first.map(|i| (i.status, i.approved_at)), Some((ItemStatus::Pending, None)));
                assert_eq!(second.map(|i| (i.status, i.approved_at)), Some((ItemStatus::Withdrawn, Some(at))));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn stale_rows_leave_state_unchanged() {
        let before = state_with(&[("req-1", 2)]);
        let expected = before.clone();
        ReducerTest::new(RequestsReducer::new())
            .with_env(env())
            .given_state(before)
            .when_action(RequestsAction::UpdateItemStatus {
                row: RowId::item(id("req-9"), 0),
                status: ItemStatus::Approved,
                approved_at: None,
            })
            .when_action(RequestsAction::UpdateItemStatus {
                row: RowId::item(id("req-1"), 2),
                status: ItemStatus::Approved,
                approved_at: None,
            })
            .then_state(move |state| assert_eq!(state, &expected))
            .run();
    }

    #[test]
    fn terminal_items_do_not_move() {
        ReducerTest::new(RequestsReducer::new())
            .with_env(env())
            .given_state(state_with(&[("req-1", 1)]))
            .when_action(RequestsAction::UpdateItemStatus {
                row: RowId::request(id("req-1")),
                status: ItemStatus::Rejected,
                approved_at: None,
            })
            .when_action(RequestsAction::UpdateItemStatus {
                row: RowId::request(id("req-1")),
                status: ItemStatus::Approved,
                approved_at: Some(test_epoch()),
            })
            .then_state(|state| {
                let item = state.item(&RowId::request(id("req-1"))).cloned();
                assert_eq!(item.map(|i| (i.status, i.approved_at)), Some((ItemStatus::Rejected, None)));
            })
            .run();
    }

    #[test]
    fn request_update_moves_pending_items_in_place() {
        let mut state = state_with(&[("req-1", 3)]);
        RequestsReducer::new().reduce(
            &mut state,
            RequestsAction::UpdateItemStatus {
                row: RowId::item(id("req-1"), 1),
                status: ItemStatus::Cancelled,
                approved_at: None,
            },
            &env(),
        );

        ReducerTest::new(RequestsReducer::new())
            .with_env(env())
            .given_state(state)
            .when_action(RequestsAction::UpdateRequestStatus {
                request_id: id("req-1"),
                status: ItemStatus::Approved,
                approved_at: Some(test_epoch()),
            })
            .then_state(|state| {
                let request = state.get(&id("req-1"));
                let items: Vec<_> = request
                    .map(|r| r.items.iter().map(|i| (i.status, i.approved_at)).collect())
                    .unwrap_or_default();
                assert_eq!(
                    items,
                    vec![
                        (ItemStatus::Approved, Some(test_epoch())),
                        (ItemStatus::Cancelled, None),
                        (ItemStatus::Approved, Some(test_epoch())),
                    ]
                );
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn request_update_covers_large_requests() {
        ReducerTest::new(RequestsReducer::new())
            .with_env(env())
            .given_state(state_with(&[("req-1", 1_500)]))
            .when_action(RequestsAction::UpdateRequestStatus {
                request_id: id("req-1"),
                status: ItemStatus::Withdrawn,
                approved_at: None,
            })
            .then_state(|state| assert_eq!(state.pending_count(), 0))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn request_update_for_unknown_id_is_ignored() {
        ReducerTest::new(RequestsReducer::new())
            .with_env(env())
            .given_state(state_with(&[("req-1", 2)]))
            .when_action(RequestsAction::UpdateRequestStatus {
                request_id: id("req-2"),
                status: ItemStatus::Approved,
                approved_at: None,
            })
            .then_state(|state| assert_eq!(state.pending_count(), 2))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn unknown_request_and_unknown_row_both_count_as_skipped() {
        let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        let mut state = state_with(&[("req-1", 2)]);

        metrics::with_local_recorder(&recorder, || {
            let reducer = RequestsReducer::new();
            reducer.reduce(
                &mut state,
                RequestsAction::UpdateRequestStatus {
                    request_id: id("req-2"),
                    status: ItemStatus::Approved,
                    approved_at: None,
                },
                &env(),
            );
            reducer.reduce(
                &mut state,
                RequestsAction::UpdateItemStatus {
                    row: RowId::item(id("req-2"), 0),
                    status: ItemStatus::Approved,
                    approved_at: None,
                },
                &env(),
            );
        });

        assert!(handle.render().contains(&format!("{TRANSITIONS_SKIPPED} 2")));
    }
}

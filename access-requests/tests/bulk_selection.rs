//! Selection and bulk actions driven through a session.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use access_requests::environment::{RequestsEnvironment, SequentialRequestIds};
use access_requests::prelude::*;
use access_testing::{test_clock, test_epoch};
use std::sync::{Arc, Mutex};

fn session() -> Session {
    Session::with_store(RequestStore::new(RequestsEnvironment::new(
        Arc::new(test_clock()),
        Arc::new(SequentialRequestIds::default()),
    )))
}

fn submit(session: &mut Session, orgs: &[&str]) -> RequestId {
    session
        .store_mut()
        .unwrap()
        .add_request(orgs.iter().map(|org| ItemDraft::new(*org, *org, "read")).collect())
        .expect("submission accepted")
}

fn status(session: &Session, row: &RowId) -> ItemStatus {
    session.store().unwrap().item(row).expect("item exists").status
}

#[test]
fn parent_plus_unrelated_leaf_resolves_to_four_leaves() {
    let mut session = session();
    let parent = submit(&mut session, &["a", "b", "c"]);
    let leaf = submit(&mut session, &["d"]);
    let rows = session.rows().unwrap();

    let selected: Vec<&RowView> = rows
        .iter()
        .filter(|row| [&parent, &leaf].contains(&row.row_id().request_id()))
        .collect();
    let ids = resolve_leaf_ids(selected);

    assert_eq!(ids.len(), 4);
    assert!(ids.contains(&RowId::request(leaf)));
    assert!(ids.contains(&RowId::item(parent.clone(), 0)));
    assert!(ids.contains(&RowId::item(parent, 2)));
}

#[test]
fn parent_and_its_child_selected_together_count_once() {
    let mut session = session();
    let id = submit(&mut session, &["a", "b"]);

    session.select(&RowId::request(id.clone()), true).unwrap();
    session.select(&RowId::item(id.clone(), 1), true).unwrap();
    assert_eq!(session.selection().len(), 2);

    let outcome = session.withdraw_selected().unwrap();

    assert_eq!(outcome.applied, vec![RowId::item(id.clone(), 0), RowId::item(id, 1)]);
    assert!(outcome.skipped.is_empty());
}

#[test]
fn withdrawing_twice_is_idempotent() {
    let mut session = session();
    let id = submit(&mut session, &["a", "b", "c"]);
    let rows = session.rows().unwrap();
    let targets: Vec<RowView> = rows.clone();

    let store = session.store_mut().unwrap();
    let first = apply_withdraw(store, &mut Selection::new(), &targets);
    let version = store.version();
    let second = apply_withdraw(store, &mut Selection::new(), &targets);

    assert_eq!(first.applied.len(), 3);
    assert!(second.applied.is_empty());
    assert_eq!(second.skipped.len(), 3);
    assert_eq!(store.version(), version);
    for index in 0..3 {
        let item = store.item(&RowId::item(id.clone(), index)).unwrap();
        assert_eq!(item.status, ItemStatus::Withdrawn);
        assert_eq!(item.approved_at, Some(test_epoch()));
    }
}

#[test]
fn bulk_action_only_touches_pending_items() {
    let mut session = session();
    let id = submit(&mut session, &["a", "b", "c"]);
    session
        .store_mut()
        .unwrap()
        .update_item_status(&RowId::item(id.clone(), 0), ItemStatus::Approved, None);

    session.select(&RowId::request(id.clone()), true).unwrap();
    let outcome = session.apply_bulk(BulkAction::Reject).unwrap();

    assert_eq!(outcome.skipped, vec![RowId::item(id.clone(), 0)]);
    assert_eq!(status(&session, &RowId::item(id.clone(), 0)), ItemStatus::Approved);
    assert_eq!(status(&session, &RowId::item(id.clone(), 1)), ItemStatus::Rejected);
    assert_eq!(status(&session, &RowId::item(id, 2)), ItemStatus::Rejected);
}

#[test]
fn resolved_rows_cannot_be_selected() {
    let mut session = session();
    let done = submit(&mut session, &["a"]);
    let open = submit(&mut session, &["b", "c"]);
    session
        .store_mut()
        .unwrap()
        .update_request_status(&done, ItemStatus::Cancelled, None);

    assert_eq!(session.select(&RowId::request(done), true), Ok(false));
    assert_eq!(session.select(&RowId::item(open, 0), true), Ok(true));
    assert_eq!(session.select_all().unwrap(), 1);
}

#[test]
fn refresh_discards_selection_made_stale_by_another_update() {
    let mut session = session();
    let id = submit(&mut session, &["a", "b"]);
    session.select(&RowId::item(id.clone(), 0), true).unwrap();
    session.select(&RowId::item(id.clone(), 1), true).unwrap();

    // Resolved elsewhere between renders
    session
        .store_mut()
        .unwrap()
        .update_item_status(&RowId::item(id.clone(), 0), ItemStatus::Approved, None);

    assert_eq!(session.refresh(), Ok(1));
    let remaining: Vec<_> = session.selection().selected_ids().cloned().collect();
    assert_eq!(remaining, vec![RowId::item(id, 1)]);
}

#[test]
fn stale_selection_is_filtered_without_refresh() {
    let mut session = session();
    let id = submit(&mut session, &["a", "b"]);
    session.select(&RowId::request(id.clone()), true).unwrap();
    session
        .store_mut()
        .unwrap()
        .update_request_status(&id, ItemStatus::Approved, None);

    let outcome = session.withdraw_selected().unwrap();

    assert!(outcome.is_empty());
    assert!(session.selection().is_empty());
    assert_eq!(status(&session, &RowId::item(id, 1)), ItemStatus::Approved);
}

#[test]
fn observers_see_one_snapshot_per_bulk_action() {
    let mut session = session();
    submit(&mut session, &["a", "b", "c"]);
    submit(&mut session, &["d"]);

    let versions = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&versions);
    session.store_mut().unwrap().subscribe(move |state, version| {
        sink.lock().unwrap().push((version, state.pending_count()));
    });

    session.select_all().unwrap();
    session.apply_bulk(BulkAction::Approve).unwrap();

    assert_eq!(*versions.lock().unwrap(), vec![(3, 0)]);
}

#[test]
fn rows_serialize_for_the_table_widget() {
    let mut session = session();
    submit(&mut session, &["a", "b"]);
    let rows = session.rows().unwrap();

    let json = serde_json::to_value(&rows).unwrap();

    assert_eq!(json[0]["rowId"], "req-10001");
    assert_eq!(json[0]["scope"], "(multiple)");
    assert_eq!(json[0]["children"][0]["rowId"], "req-10001.1");
    assert_eq!(json[0]["children"][0]["approvalAt"], serde_json::Value::Null);
}

#[test]
fn session_without_store_reports_configuration_error() {
    let mut session = Session::new();

    assert_eq!(session.store().err(), Some(AccessError::StoreNotProvided));
    assert_eq!(session.select(&RowId::request(RequestId::new("req-1")), true), Err(AccessError::StoreNotProvided));
    assert_eq!(session.apply_bulk(BulkAction::Approve), Err(AccessError::StoreNotProvided));
    assert_eq!(session.refresh(), Err(AccessError::StoreNotProvided));
}

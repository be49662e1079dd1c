//! Headless walkthrough of the access-request workflow.
//!
//! Submits a few requests, renders their rows, withdraws a mixed selection
//! twice, approves what is left of one request and prints the Prometheus
//! exposition at the end.

use access_requests::labels::{format_timestamp, status_label};
use access_requests::metrics::register_metrics;
use access_requests::prelude::*;
use access_runtime::metrics::PrometheusRecorder;
use chrono::{DateTime, Utc};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();
    let config = AccessConfig::from_env()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let recorder = PrometheusRecorder::install()?;
    register_metrics();

    info!(
        id_strategy = ?config.id_strategy,
        id_prefix = %config.id_prefix,
        max_feedback_actions = config.max_feedback_actions,
        "Configuration loaded"
    );

    let mut session = Session::with_store(config.build_store());
    let store = session.store_mut()?;
    store.subscribe(|state, version| {
        info!(version, requests = state.len(), pending = state.pending_count(), "Snapshot published");
    });

    // Organizations as the dashboard would report them
    let acme = Organization::new("549236", "Acme Corp");
    let globex = Organization::new("812003", "Globex");
    let initech = Organization::new("330771", "Initech");

    println!("=== Access Requests ===\n");
    let multi = store.add_request(vec![
        ItemDraft::for_organization(&acme, Permission::Read),
        ItemDraft::for_organization(&globex, Permission::Write),
        ItemDraft::for_organization(&initech, Permission::Read),
    ]);
    let single = store.add_request(vec![ItemDraft::for_organization(&acme, Permission::Write)]);
    let same_org = store.add_request(vec![
        ItemDraft::for_organization(&globex, Permission::Read),
        ItemDraft::for_organization(&globex, Permission::Read),
    ]);
    let rejected = store.add_request(Vec::new());
    println!("Submitted: {multi:?}, {single:?}, {same_org:?}; empty submission -> {rejected:?}\n");

    print_rows(&session.rows()?);

    // Select the whole multi-item request plus one child of it, and the single one
    if let (Some(multi), Some(single)) = (&multi, &single) {
        session.select(&RowId::request(multi.clone()), true)?;
        session.select(&RowId::item(multi.clone(), 1), true)?;
        session.select(&RowId::request(single.clone()), true)?;
    }

    let first = session.withdraw_selected()?;
    println!("\nWithdraw #1: {}", serde_json::to_string(&first)?);

    // Same selection again: nothing is pending any more
    if let Some(multi) = &multi {
        let rows = session.rows()?;
        let again: Vec<&RowView> = rows.iter().filter(|row| row.row_id().request_id() == multi).collect();
        let store = session.store_mut()?;
        let second = apply_withdraw(store, &mut Selection::new(), again);
        println!("Withdraw #2: {}", serde_json::to_string(&second)?);
    }

    if let Some(same_org) = &same_org {
        session.select(&RowId::request(same_org.clone()), true)?;
        let approved = session.apply_bulk(BulkAction::Approve)?;
        println!("Approve:     {}", serde_json::to_string(&approved)?);
    }

    println!();
    print_rows(&session.rows()?);

    println!("\n=== Rows (JSON) ===\n{}", serde_json::to_string_pretty(&session.rows()?)?);
    println!("\n=== Metrics ===\n{}", recorder.render());

    Ok(())
}

fn print_rows(rows: &[RowView]) {
    for row in rows {
        match row {
            RowView::Leaf(leaf) => print_leaf(leaf, ""),
            RowView::Parent(parent) => {
                println!(
                    "{:<14} {:<12} {:<6} {:<24} {}",
                    parent.row_id.to_string(),
                    parent.scope.to_string(),
                    parent.permission.to_string(),
                    aggregate_timestamp(&parent.approval_at),
                    status_label(&parent.status.to_string()),
                );
                for child in parent.children.iter().filter_map(RowView::as_leaf) {
                    print_leaf(child, "  ");
                }
            },
        }
    }
}

fn print_leaf(leaf: &LeafRow, indent: &str) {
    println!(
        "{indent}{:<width$} {:<12} {:<6} {:<24} {}",
        leaf.row_id.to_string(),
        leaf.scope,
        leaf.permission.as_str(),
        format_timestamp(leaf.approval_at),
        status_label(leaf.status.as_str()),
        width = 14 - indent.len(),
    );
}

fn aggregate_timestamp(at: &Aggregate<Option<DateTime<Utc>>>) -> String {
    match at {
        Aggregate::Uniform(at) => format_timestamp(*at),
        Aggregate::Multiple => MULTIPLE.to_string(),
    }
}

//! Metric names recorded by the access-request domain.

use metrics::describe_counter;

/// Requests accepted by the store
pub const REQUESTS_CREATED: &str = "access_requests_created_total";

/// Item transitions applied, labelled by target status (`to`)
pub const ITEMS_TRANSITIONED: &str = "access_request_items_transitioned_total";

/// Item updates ignored (unknown row, out-of-range index, terminal item)
pub const TRANSITIONS_SKIPPED: &str = "access_request_transitions_skipped_total";

/// Bulk actions applied, labelled by action (`action`)
pub const BULK_ACTIONS_APPLIED: &str = "bulk_actions_applied_total";

/// Register store and domain metric descriptions.
pub fn register_metrics() {
    access_runtime::metrics::register_metrics();

    describe_counter!(REQUESTS_CREATED, "Total number of access requests created");
    describe_counter!(
        ITEMS_TRANSITIONED,
        "Total number of request items moved out of pending"
    );
    describe_counter!(
        TRANSITIONS_SKIPPED,
        "Total number of item status updates ignored as stale or invalid"
    );
    describe_counter!(BULK_ACTIONS_APPLIED, "Total number of bulk actions applied");
}

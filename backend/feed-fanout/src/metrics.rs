use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, IntCounterVec};

lazy_static! {
    /// Fan-out worker runs segmented by outcome (completed/empty/dropped/failed).
    pub static ref FANOUT_RUNS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "feed_fanout_runs_total",
        "Fan-out worker runs segmented by outcome",
        &["outcome"]
    )
    .expect("failed to register feed_fanout_runs_total");

    /// Per-recipient feed updates segmented by result (updated/failed).
    pub static ref FANOUT_RECIPIENTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "feed_fanout_recipients_total",
        "Recipient feed cache updates segmented by result",
        &["result"]
    )
    .expect("failed to register feed_fanout_recipients_total");

    /// Feed cache reads segmented by outcome (hit/miss).
    pub static ref FEED_CACHE_EVENTS: IntCounterVec = register_int_counter_vec!(
        "feed_cache_events_total",
        "Feed cache read events segmented by outcome",
        &["event"]
    )
    .expect("failed to register feed_cache_events_total");
}

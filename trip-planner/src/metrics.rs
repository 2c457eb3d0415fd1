use once_cell::sync::Lazy;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec,
    TextEncoder,
};

static RUNS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "trip_planner_runs_total",
        "Pipeline runs by terminal outcome",
        &["outcome"]
    )
    .expect("runs counter registers once")
});

static STAGE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "trip_planner_stage_duration_seconds",
        "Wall time of a single pipeline stage",
        &["stage"],
        vec![1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0]
    )
    .expect("stage histogram registers once")
});

static SEARCHES: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "trip_planner_search_requests_total",
        "Outbound web searches",
        &["outcome"]
    )
    .expect("search counter registers once")
});

pub fn record_run(outcome: &str) {
    RUNS.with_label_values(&[outcome]).inc();
}

pub fn observe_stage(stage: &str, seconds: f64) {
    STAGE_DURATION.with_label_values(&[stage]).observe(seconds);
}

pub fn record_search(ok: bool) {
    SEARCHES
        .with_label_values(&[if ok { "ok" } else { "error" }])
        .inc();
}

/// Text exposition of the default registry.
pub fn render() -> (Vec<u8>, String) {
    let encoder = TextEncoder::new();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
        tracing::error!("failed to encode metrics: {}", e);
    }
    (buffer, encoder.format_type().to_string())
}

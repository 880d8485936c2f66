use lazy_static::lazy_static;
use prometheus::{
    Counter, CounterVec, Gauge, Histogram, register_counter, register_counter_vec, register_gauge,
    register_histogram,
};

lazy_static! {
    pub static ref SUBMISSIONS_TOTAL: Counter =
        register_counter!("contact_submissions_total", "Total contact form submissions").unwrap();
    pub static ref REJECTIONS_TOTAL: CounterVec = register_counter_vec!(
        "contact_rejections_total",
        "Submissions that were not delivered, by reason",
        &["reason"]
    )
    .unwrap();
    pub static ref RELAY_LATENCY: Histogram = register_histogram!(
        "contact_relay_latency_seconds",
        "Time spent handing a submission to the submission target"
    )
    .unwrap();
    pub static ref GUARDS_TRACKED: Gauge =
        register_gauge!("contact_guards_tracked", "Visitors with a live form guard").unwrap();
}

pub fn record_rejection(reason: &str) {
    REJECTIONS_TOTAL.with_label_values(&[reason]).inc();
}

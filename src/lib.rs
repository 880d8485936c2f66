//! Contact form guard.
//!
//! Input sanitization, field validation, bot heuristics and a cooldown-backed
//! rate limiter for a portfolio contact form, plus a small axum service that
//! puts them in front of the real form endpoint.

pub mod bot;
pub mod clock;
pub mod config;
pub mod error;
pub mod guard;
pub mod handlers;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod rate_limit;
pub mod registry;
pub mod relay;
pub mod sanitize;
pub mod state;
pub mod storage;
pub mod validation;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::handlers::{check_handler, contact_handler, health_handler, metrics_handler, stamp_handler};
use crate::state::AppState;

pub use crate::guard::{FormGuard, GuardConfig, Submission, Verdict};
pub use crate::rate_limit::{RateDecision, RateLimitConfig, RateLimiter};
pub use crate::sanitize::sanitize_input;
pub use crate::validation::{ContactForm, validate_email, validate_message, validate_name};

// creating the router with routes
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/api/contact", post(contact_handler))
        .route("/api/contact/check", post(check_handler))
        .route("/api/contact/stamp", get(stamp_handler))
        .with_state(state)
}

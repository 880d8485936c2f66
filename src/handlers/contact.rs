use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Instant;

use crate::guard::{Submission, Verdict};
use crate::handlers::ClientAddr;
use crate::metrics::{RELAY_LATENCY, SUBMISSIONS_TOTAL, record_rejection};
use crate::models::{
    BOT_MESSAGE, ContactResponse, FieldCheckRequest, FieldCheckResponse, RELAY_FAILED_MESSAGE,
    SENT_MESSAGE, StampResponse,
};
use crate::relay;
use crate::state::AppState;
use crate::validation::check_field;

pub async fn contact_handler(
    State(state): State<Arc<AppState>>,
    ClientAddr(client): ClientAddr,
    Json(submission): Json<Submission>,
) -> Response {
    SUBMISSIONS_TOTAL.inc();

    // guard lock is released before any await
    let verdict = state.registry.with_guard(&client, |guard| guard.evaluate(&submission));

    match verdict {
        Verdict::SuspectedBot(_) => {
            record_rejection("bot");
            (StatusCode::OK, Json(ContactResponse::success(BOT_MESSAGE))).into_response()
        }
        Verdict::Invalid(errors) => {
            record_rejection("invalid");
            (StatusCode::UNPROCESSABLE_ENTITY, Json(ContactResponse::invalid(&errors))).into_response()
        }
        Verdict::RateLimited(decision) => {
            record_rejection("rate_limited");
            let wait = decision.wait_seconds.unwrap_or_default();
            let body = ContactResponse {
                retry_after_secs: decision.wait_seconds,
                ..ContactResponse::error(decision.message().unwrap_or_default())
            };
            (
                StatusCode::TOO_MANY_REQUESTS,
                [(header::RETRY_AFTER, wait.to_string())],
                Json(body),
            )
                .into_response()
        }
        Verdict::Accepted(form) => {
            let start_time = Instant::now();
            let result = relay::submit(&state.relay_tx, form).await;
            RELAY_LATENCY.observe(start_time.elapsed().as_secs_f64());

            match result {
                Ok(()) => (StatusCode::OK, Json(ContactResponse::success(SENT_MESSAGE))).into_response(),
                Err(e) => {
                    record_rejection("relay_failed");
                    tracing::error!(error = %e, "could not deliver contact submission");
                    (StatusCode::BAD_GATEWAY, Json(ContactResponse::error(RELAY_FAILED_MESSAGE))).into_response()
                }
            }
        }
    }
}

pub async fn check_handler(Json(req): Json<FieldCheckRequest>) -> Json<FieldCheckResponse> {
    let error = check_field(req.field, &req.value);
    Json(FieldCheckResponse {
        valid: error.is_none(),
        error: error.map(|e| e.to_string()),
    })
}

pub async fn stamp_handler(State(state): State<Arc<AppState>>) -> Json<StampResponse> {
    Json(StampResponse {
        timestamp: state.clock.now_ms().to_string(),
    })
}

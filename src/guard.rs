//! The form guard: one visitor's view of bot checks, validation and rate
//! limiting, in the order a submit handler needs them.

use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use crate::bot::{self, BotSignal, DEFAULT_MIN_FILL_TIME};
use crate::clock::Clock;
use crate::rate_limit::{RateDecision, RateLimitConfig, RateLimiter};
use crate::storage::KeyValueStore;
use crate::validation::{ContactForm, FieldErrors};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuardConfig {
    pub rate: RateLimitConfig,
    pub min_fill_time: Duration,
    pub honeypot: bool,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            rate: RateLimitConfig::default(),
            min_fill_time: DEFAULT_MIN_FILL_TIME,
            honeypot: true,
        }
    }
}

// One submit as it arrives from the page
#[derive(Debug, Clone, Deserialize)]
pub struct Submission {
    #[serde(flatten)]
    pub form: ContactForm,
    // page-load stamp from the hidden field
    #[serde(default)]
    pub form_timestamp: Option<String>,
    #[serde(default, rename = "bot-field", alias = "bot_field")]
    pub bot_field: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Passed validation, attempt recorded. Carries the trimmed input as the
    /// visitor typed it, for the transport to post.
    Accepted(ContactForm),
    /// Looks automated. Answer with a thank-you and drop it.
    SuspectedBot(BotSignal),
    Invalid(FieldErrors),
    RateLimited(RateDecision),
}

pub struct FormGuard {
    config: GuardConfig,
    limiter: RateLimiter,
    clock: Arc<dyn Clock>,
}

impl FormGuard {
    pub fn new(config: GuardConfig, store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            limiter: RateLimiter::new(config.rate, store, clock.clone()),
            clock,
        }
    }

    pub fn can_submit(&mut self) -> RateDecision {
        self.limiter.can_submit()
    }

    pub fn record_attempt(&mut self) {
        self.limiter.record_attempt()
    }

    pub fn is_idle(&mut self) -> bool {
        self.limiter.is_idle()
    }

    pub fn clear_stored(&self) {
        self.limiter.clear_stored()
    }

    pub fn evaluate(&mut self, submission: &Submission) -> Verdict {
        let now = self.clock.now_ms();

        let signal = bot::submitted_too_fast(
            submission.form_timestamp.as_deref(),
            now,
            self.config.min_fill_time,
        )
        .or_else(|| {
            if self.config.honeypot {
                bot::honeypot_tripped(submission.bot_field.as_deref())
            } else {
                None
            }
        });
        if let Some(signal) = signal {
            tracing::warn!(?signal, "bot suspected, dropping submission");
            return Verdict::SuspectedBot(signal);
        }

        if let Err(errors) = submission.form.sanitized().validate() {
            tracing::debug!(fields = ?errors.keys().collect::<Vec<_>>(), "submission failed validation");
            return Verdict::Invalid(errors);
        }

        let decision = self.limiter.can_submit();
        if !decision.allowed {
            tracing::info!(wait_seconds = ?decision.wait_seconds, "submission rate limited");
            return Verdict::RateLimited(decision);
        }

        self.limiter.record_attempt();
        Verdict::Accepted(submission.form.trimmed())
    }
}

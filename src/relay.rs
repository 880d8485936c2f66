//! Hands accepted submissions to the real submission target.
//!
//! A single worker drains a bounded queue and posts each form URL-encoded,
//! the way a static-site form endpoint expects it. No retries: the visitor
//! sees the failure and can resend.

use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

use crate::error::RelayError;
use crate::models::RelayJob;
use crate::validation::ContactForm;

const RELAY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct RelayTarget {
    // None means log only
    pub url: Option<String>,
    pub form_name: String,
}

impl RelayTarget {
    pub fn new(url: Option<String>, form_name: impl Into<String>) -> Self {
        Self {
            url,
            form_name: form_name.into(),
        }
    }
}

pub async fn relay_worker(mut rx: mpsc::Receiver<RelayJob>, client: reqwest::Client, target: RelayTarget) {
    match &target.url {
        Some(url) => tracing::info!(%url, form_name = %target.form_name, "relay worker started"),
        None => tracing::info!("relay worker started without a target, submissions are only logged"),
    }

    // keep receiving jobs from the queue
    while let Some(job) = rx.recv().await {
        let result = deliver(&client, &target, &job.form).await;
        if let Err(e) = &result {
            tracing::warn!(error = %e, "relay failed");
        }
        // handler may have gone away, nothing to do then
        let _ = job.response_tx.send(result);
    }

    tracing::info!("relay queue closed, worker stopping");
}

async fn deliver(client: &reqwest::Client, target: &RelayTarget, form: &ContactForm) -> Result<(), RelayError> {
    let Some(url) = target.url.as_deref() else {
        tracing::info!(
            name = %form.name,
            email = %form.email,
            message_chars = form.message.chars().count(),
            "contact submission received"
        );
        return Ok(());
    };

    let fields = [
        ("form-name", target.form_name.as_str()),
        ("name", form.name.as_str()),
        ("email", form.email.as_str()),
        ("message", form.message.as_str()),
    ];
    let res = client
        .post(url)
        .form(&fields)
        .timeout(RELAY_TIMEOUT)
        .send()
        .await?;

    let status = res.status();
    if !status.is_success() {
        return Err(RelayError::Status(status));
    }
    tracing::debug!(%status, "submission relayed");
    Ok(())
}

// Queue a form and wait for the worker's answer
pub async fn submit(tx: &mpsc::Sender<RelayJob>, form: ContactForm) -> Result<(), RelayError> {
    let (response_tx, response_rx) = oneshot::channel();

    tx.send(RelayJob { form, response_tx })
        .await
        .map_err(|_| RelayError::WorkerGone)?;

    response_rx.await.map_err(|_| RelayError::WorkerGone)?
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> ContactForm {
        ContactForm::new("Ada", "ada@example.com", "Hello there, engine fans")
    }

    #[tokio::test]
    async fn log_only_target_succeeds() {
        let (tx, rx) = mpsc::channel(4);
        tokio::spawn(relay_worker(rx, reqwest::Client::new(), RelayTarget::new(None, "contact")));
        assert!(submit(&tx, form()).await.is_ok());
    }

    #[tokio::test]
    async fn stopped_worker_is_reported() {
        let (tx, rx) = mpsc::channel::<RelayJob>(4);
        drop(rx);
        assert!(matches!(submit(&tx, form()).await, Err(RelayError::WorkerGone)));
    }
}

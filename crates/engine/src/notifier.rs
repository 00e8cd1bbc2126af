// SPDX-License-Identifier: MIT
// Copyright (c) 2026 FlowController Contributors

//! Notifier: e-mail + chat-webhook sinks for job completion (`spec.md`
//! §4.7). Both are fire-and-forget and best-effort; a slow or failing sink
//! never delays job completion or blocks the scheduler.

use lettre::message::Message as EmailMessage;
use lettre::transport::smtp::SmtpTransport;
use lettre::Transport;
use tracing::warn;

/// Stateless; kept as a struct (rather than free functions) so it can grow
/// configuration (SMTP host override, timeouts) without changing call sites.
#[derive(Clone, Default)]
pub struct Notifier;

impl Notifier {
    pub fn new() -> Self {
        Self
    }

    /// Fire both sinks for one job outcome. Each sink silently no-ops on an
    /// empty recipient/URL (`spec.md` §4.7).
    pub fn notify(
        &self,
        email_sender: Option<String>,
        job_name: &str,
        outcome: &'static str,
        recipients: Option<String>,
        webhook: Option<String>,
        body: String,
    ) {
        let subject = format!("FlowController job '{job_name}' {outcome}");

        if let Some(to) = recipients.filter(|s| !s.trim().is_empty()) {
            let from = email_sender.unwrap_or_else(|| "flowctl@localhost".to_string());
            let subject = subject.clone();
            let body = body.clone();
            tokio::spawn(async move {
                if let Err(err) = send_email(&from, &to, &subject, &body).await {
                    warn!(%err, to, "notifier: email send failed");
                }
            });
        }

        if let Some(url) = webhook.filter(|s| !s.trim().is_empty()) {
            tokio::spawn(async move {
                if let Err(err) = send_webhook(&url, &subject).await {
                    warn!(%err, url, "notifier: webhook post failed");
                }
            });
        }
    }
}

async fn send_email(from: &str, to: &str, subject: &str, body: &str) -> Result<(), String> {
    let email = EmailMessage::builder()
        .from(from.parse().map_err(|e| format!("invalid from address: {e}"))?)
        .to(to.parse().map_err(|e| format!("invalid to address: {e}"))?)
        .subject(subject)
        .body(body.to_string())
        .map_err(|e| format!("failed to build message: {e}"))?;

    let transport = SmtpTransport::builder_dangerous("localhost").build();
    tokio::task::spawn_blocking(move || transport.send(&email))
        .await
        .map_err(|e| format!("blocking task join failed: {e}"))?
        .map_err(|e| format!("smtp send failed: {e}"))?;
    Ok(())
}

async fn send_webhook(url: &str, text: &str) -> Result<(), String> {
    let client = reqwest::Client::new();
    let response = client
        .post(url)
        .json(&serde_json::json!({ "text": text }))
        .send()
        .await
        .map_err(|e| format!("request failed: {e}"))?;

    if !response.status().is_success() {
        return Err(format!("non-success status: {}", response.status()));
    }
    Ok(())
}

#[cfg(test)]
#[path = "notifier_tests.rs"]
mod tests;

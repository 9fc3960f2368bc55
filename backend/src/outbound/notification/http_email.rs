//! Reqwest-backed email provider adapter.
//!
//! Posts `{from, to, subject, text}` as JSON to the provider endpoint with a
//! bearer API key. The adapter owns transport details only; rendering lives
//! in [`super::templates`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;
use tracing::debug;

use crate::domain::ports::{BookingNotifier, NotificationError};
use crate::domain::{Booking, BookingStatus, Invoice};

use super::templates::{self, EmailMessage};

/// Provider endpoint, credentials and sender identity.
#[derive(Debug, Clone)]
pub struct EmailProviderConfig {
    /// Provider send endpoint.
    pub endpoint: Url,
    /// Bearer API key.
    pub api_key: String,
    /// `From` address.
    pub sender: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

/// Email notifier backed by an HTTP provider.
pub struct HttpEmailNotifier {
    client: Client,
    config: EmailProviderConfig,
}

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

impl HttpEmailNotifier {
    /// Build a notifier with a client honouring `config.timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(config: EmailProviderConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    async fn deliver(
        &self,
        kind: &'static str,
        booking: &Booking,
        message: Option<EmailMessage>,
    ) -> Result<(), NotificationError> {
        let Some(message) = message else {
            debug!(kind, booking_id = %booking.id, "no email on booking; skipping");
            return Ok(());
        };
        let payload = SendEmailRequest {
            from: self.config.sender.as_str(),
            to: message.to.as_str(),
            subject: message.subject.as_str(),
            text: message.body.as_str(),
        };
        let response = self
            .client
            .post(self.config.endpoint.clone())
            .bearer_auth(self.config.api_key.as_str())
            .json(&payload)
            .send()
            .await
            .map_err(|err| NotificationError::transport(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            debug!(kind, booking_id = %booking.id, "notification delivered");
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(map_status_error(status, &body))
    }
}

fn map_status_error(status: StatusCode, body: &str) -> NotificationError {
    const PREVIEW_CHAR_LIMIT: usize = 160;
    let preview: String = body
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(PREVIEW_CHAR_LIMIT)
        .collect();
    NotificationError::rejected(status.as_u16(), preview)
}

#[async_trait]
impl BookingNotifier for HttpEmailNotifier {
    async fn send_booking_confirmation(
        &self,
        booking: &Booking,
        tracking_url: &str,
    ) -> Result<(), NotificationError> {
        self.deliver(
            "booking_confirmation",
            booking,
            templates::booking_confirmation(booking, tracking_url),
        )
        .await
    }

    async fn send_status_update(
        &self,
        booking: &Booking,
        previous: BookingStatus,
    ) -> Result<(), NotificationError> {
        self.deliver(
            "status_update",
            booking,
            templates::status_update(booking, previous),
        )
        .await
    }

    async fn send_invoice_notification(
        &self,
        booking: &Booking,
        invoice: &Invoice,
    ) -> Result<(), NotificationError> {
        self.deliver(
            "invoice",
            booking,
            templates::invoice_ready(booking, invoice),
        )
        .await
    }
}

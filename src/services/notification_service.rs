use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use sha2::Sha256;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::task::TaskTracker;
use uuid::Uuid;

use crate::error::DeliveryError;
use crate::models::candidate::Candidate;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationEvent {
    ApplicationReceived,
    TaskSubmitted,
    InterviewScheduled,
    Selected,
    Rejected,
}

impl NotificationEvent {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ApplicationReceived => "application_received",
            Self::TaskSubmitted => "task_submitted",
            Self::InterviewScheduled => "interview_scheduled",
            Self::Selected => "selected",
            Self::Rejected => "rejected",
        }
    }
}

/// Delivery port for candidate-facing messages.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(
        &self,
        event: NotificationEvent,
        email: &str,
        name: &str,
        payload: &JsonValue,
    ) -> Result<(), DeliveryError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedMessage {
    pub subject: String,
    pub body: String,
}

fn field<'a>(payload: &'a JsonValue, key: &str) -> &'a str {
    payload.get(key).and_then(|v| v.as_str()).unwrap_or("")
}

pub fn render(event: NotificationEvent, name: &str, payload: &JsonValue) -> RenderedMessage {
    let application_id = field(payload, "application_id");
    match event {
        NotificationEvent::ApplicationReceived => RenderedMessage {
            subject: format!("Application received ({})", application_id),
            body: format!(
                "Hi {}, thank you for applying for {}. Your application ID is {}.",
                name,
                field(payload, "job_title"),
                application_id
            ),
        },
        NotificationEvent::TaskSubmitted => RenderedMessage {
            subject: format!("Task submission received ({})", application_id),
            body: format!(
                "Hi {}, we have received your task submission. Our team will review it shortly.",
                name
            ),
        },
        NotificationEvent::InterviewScheduled => {
            let mut body = format!(
                "Hi {}, your interview is scheduled for {} with {}.",
                name,
                field(payload, "scheduled_at"),
                field(payload, "interviewer_name")
            );
            let location = field(payload, "location");
            if !location.is_empty() {
                body.push_str(&format!(" Location: {}.", location));
            }
            let link = field(payload, "meeting_link");
            if !link.is_empty() {
                body.push_str(&format!(" Meeting link: {}", link));
            }
            let subject = if payload.get("rescheduled").and_then(|v| v.as_bool()) == Some(true) {
                "Your interview has been rescheduled".to_string()
            } else {
                "Your interview has been scheduled".to_string()
            };
            RenderedMessage { subject, body }
        }
        NotificationEvent::Selected => RenderedMessage {
            subject: "Congratulations!".to_string(),
            body: format!(
                "Hi {}, we are delighted to let you know you have been selected. We will be in touch about next steps.",
                name
            ),
        },
        NotificationEvent::Rejected => RenderedMessage {
            subject: format!("Update on your application ({})", application_id),
            body: format!(
                "Hi {}, thank you for your time. We have decided not to move forward with your application.",
                name
            ),
        },
    }
}

/// Posts rendered notifications to an outbound mail relay webhook.
#[derive(Clone)]
pub struct WebhookNotifier {
    client: Client,
    target_url: String,
    secret: String,
}

impl WebhookNotifier {
    pub fn new(client: Client, target_url: String, secret: String) -> Self {
        Self {
            client,
            target_url,
            secret,
        }
    }

    fn sign(&self, body: &[u8]) -> Result<String, DeliveryError> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;
        mac.update(body);
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(
        &self,
        event: NotificationEvent,
        email: &str,
        name: &str,
        payload: &JsonValue,
    ) -> Result<(), DeliveryError> {
        let message = render(event, name, payload);
        let body = json!({
            "event": event.as_str(),
            "email": email,
            "name": name,
            "subject": message.subject,
            "body": message.body,
            "payload": payload,
        })
        .to_string();
        let signature = self.sign(body.as_bytes())?;

        let resp = self
            .client
            .post(&self.target_url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header("X-Webhook-Secret", &self.secret)
            .header("X-Signature", signature)
            .body(body)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = resp.text().await.unwrap_or_default();
            Err(DeliveryError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }
}

/// Used when no relay is configured: messages are only logged.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(
        &self,
        event: NotificationEvent,
        email: &str,
        name: &str,
        payload: &JsonValue,
    ) -> Result<(), DeliveryError> {
        let message = render(event, name, payload);
        tracing::info!(
            event = event.as_str(),
            to = %email,
            subject = %message.subject,
            "notification (log only)"
        );
        Ok(())
    }
}

/// Runs notifications off the request path. A failed or slow delivery is
/// logged and never affects the transition that triggered it.
#[derive(Clone)]
pub struct NotificationService {
    notifier: Arc<dyn Notifier>,
    tracker: TaskTracker,
    timeout: Duration,
}

impl NotificationService {
    pub fn new(notifier: Arc<dyn Notifier>, timeout: Duration) -> Self {
        Self {
            notifier,
            tracker: TaskTracker::new(),
            timeout,
        }
    }

    pub fn dispatch(&self, event: NotificationEvent, candidate: &Candidate, payload: JsonValue) {
        let notifier = self.notifier.clone();
        let timeout = self.timeout;
        let candidate_id: Uuid = candidate.id;
        let email = candidate.email.clone();
        let name = candidate.name.clone();

        self.tracker.spawn(async move {
            let outcome =
                match tokio::time::timeout(timeout, notifier.notify(event, &email, &name, &payload))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => Err(DeliveryError::Timeout(timeout.as_secs())),
                };
            match outcome {
                Ok(()) => {
                    tracing::debug!(event = event.as_str(), %candidate_id, "notification delivered")
                }
                Err(err) => tracing::error!(
                    event = event.as_str(),
                    %candidate_id,
                    error = %err,
                    "notification delivery failed"
                ),
            }
        });
    }

    /// Waits for every in-flight delivery to finish.
    pub async fn flush(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }

    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }
}

mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{http::HeaderMap, http::StatusCode, routing::post, Router};
use hmac::{Hmac, Mac};
use mockall::mock;
use serde_json::{json, Value as JsonValue};
use sha2::Sha256;
use tokio::net::TcpListener;

use common::{applicant, build_state};
use hiring_pipeline::{
    database::memory::InMemoryStore,
    error::DeliveryError,
    models::candidate::CandidateStatus,
    services::{
        identity_service::IdentityService,
        job_service::{JobService, NewJob},
        notification_service::{NotificationEvent, NotificationService, Notifier, WebhookNotifier},
        pipeline_service::PipelineService,
    },
};

mock! {
    pub Relay {}

    #[async_trait]
    impl Notifier for Relay {
        async fn notify(
            &self,
            event: NotificationEvent,
            email: &str,
            name: &str,
            payload: &JsonValue,
        ) -> Result<(), DeliveryError>;
    }
}

fn rust_job() -> NewJob {
    NewJob {
        title: "Rust Engineer".into(),
        ..NewJob::default()
    }
}

#[tokio::test]
async fn failed_delivery_does_not_roll_back_intake() {
    let mut relay = MockRelay::new();
    relay
        .expect_notify()
        .withf(|event, email, _, _| {
            *event == NotificationEvent::ApplicationReceived && email == "fail@example.com"
        })
        .times(1)
        .returning(|_, _, _, _| Err(DeliveryError::Transport("connection refused".into())));

    let (state, _store) = build_state(Arc::new(relay));
    let job = state.job_service.create_job(rust_job()).await.unwrap();

    let candidate = state
        .pipeline
        .intake(&job.job_id, applicant("fail@example.com"), Some("cv.pdf".into()))
        .await
        .unwrap();
    state.pipeline.notifications().flush().await;

    let stored = state.pipeline.get_candidate(candidate.id).await.unwrap();
    assert_eq!(stored.status, CandidateStatus::Applied);
}

#[tokio::test]
async fn rejected_delivery_is_attempted_once_per_transition() {
    let mut relay = MockRelay::new();
    relay
        .expect_notify()
        .times(2)
        .returning(|_, _, _, _| {
            Err(DeliveryError::Rejected {
                status: 503,
                body: "down".into(),
            })
        });

    let (state, _store) = build_state(Arc::new(relay));
    let job = state.job_service.create_job(rust_job()).await.unwrap();
    let candidate = state
        .pipeline
        .intake(&job.job_id, applicant("twice@example.com"), Some("cv.pdf".into()))
        .await
        .unwrap();
    let candidate = state
        .pipeline
        .submit_task(&candidate.application_id, common::github_link())
        .await
        .unwrap();
    state.pipeline.notifications().flush().await;
    assert_eq!(candidate.status, CandidateStatus::TaskSubmitted);
}

struct SlowNotifier;

#[async_trait]
impl Notifier for SlowNotifier {
    async fn notify(
        &self,
        _event: NotificationEvent,
        _email: &str,
        _name: &str,
        _payload: &JsonValue,
    ) -> Result<(), DeliveryError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(())
    }
}

#[tokio::test]
async fn slow_delivery_times_out_without_blocking_the_transition() {
    let store = Arc::new(InMemoryStore::new());
    let notifications = NotificationService::new(Arc::new(SlowNotifier), Duration::from_millis(50));
    let pipeline = PipelineService::new(store.clone(), notifications, IdentityService::new(4));
    let jobs = JobService::new(store, IdentityService::new(4));
    let job = jobs.create_job(rust_job()).await.unwrap();

    let candidate = pipeline
        .intake(&job.job_id, applicant("slow@example.com"), Some("cv.pdf".into()))
        .await
        .unwrap();
    assert_eq!(pipeline.notifications().in_flight(), 1);

    tokio::time::timeout(Duration::from_secs(5), pipeline.notifications().flush())
        .await
        .expect("flush finishes once the delivery times out");
    assert_eq!(pipeline.notifications().in_flight(), 0);
    assert!(pipeline.get_candidate(candidate.id).await.is_ok());
}

type Captured = Arc<Mutex<Vec<(HeaderMap, String)>>>;

async fn spawn_relay(status: StatusCode) -> (String, Captured) {
    let captured: Captured = Arc::default();
    let sink = captured.clone();
    let app = Router::new().route(
        "/notify",
        post(move |headers: HeaderMap, body: String| {
            let sink = sink.clone();
            async move {
                sink.lock().unwrap().push((headers, body));
                status
            }
        }),
    );
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}/notify", addr), captured)
}

#[tokio::test]
async fn webhook_notifier_signs_the_rendered_message() {
    let (url, captured) = spawn_relay(StatusCode::OK).await;
    let notifier = WebhookNotifier::new(reqwest::Client::new(), url, "whsec_test".into());

    notifier
        .notify(
            NotificationEvent::ApplicationReceived,
            "alice@example.com",
            "Alice",
            &json!({"application_id": "APP-1-abcdefghi", "job_title": "Rust Engineer"}),
        )
        .await
        .unwrap();

    let requests = captured.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    let (headers, body) = &requests[0];
    assert_eq!(headers["x-webhook-secret"], "whsec_test");

    let mut mac = Hmac::<Sha256>::new_from_slice(b"whsec_test").unwrap();
    mac.update(body.as_bytes());
    let expected = hex::encode(mac.finalize().into_bytes());
    assert_eq!(headers["x-signature"].to_str().unwrap(), expected);

    let sent: JsonValue = serde_json::from_str(body).unwrap();
    assert_eq!(sent["event"], "application_received");
    assert_eq!(sent["email"], "alice@example.com");
    assert!(sent["subject"].as_str().unwrap().contains("APP-1-abcdefghi"));
}

#[tokio::test]
async fn webhook_non_success_status_is_a_delivery_error() {
    let (url, _captured) = spawn_relay(StatusCode::SERVICE_UNAVAILABLE).await;
    let notifier = WebhookNotifier::new(reqwest::Client::new(), url, "whsec_test".into());

    let err = notifier
        .notify(
            NotificationEvent::Rejected,
            "bob@example.com",
            "Bob",
            &json!({}),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DeliveryError::Rejected { status: 503, .. }));
}

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use hiring_pipeline::{
    config::Config,
    database::memory::InMemoryStore,
    error::DeliveryError,
    models::{
        candidate::{Applicant, Candidate, LinkKind, TaskLink},
        interview::{Interview, InterviewType},
        job::Job,
        user::{StaffRole, User},
    },
    services::{
        interview_service::ScheduleInterview,
        job_service::NewJob,
        notification_service::{NotificationEvent, Notifier},
        pipeline_service::PipelineService,
    },
    AppState,
};

pub const JWT_SECRET: &str = "test_secret_key";

#[derive(Debug, Clone)]
pub struct Sent {
    pub event: NotificationEvent,
    pub email: String,
    pub payload: JsonValue,
}

#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Sent>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn events(&self) -> Vec<NotificationEvent> {
        self.sent().into_iter().map(|s| s.event).collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(
        &self,
        event: NotificationEvent,
        email: &str,
        _name: &str,
        payload: &JsonValue,
    ) -> Result<(), DeliveryError> {
        self.sent.lock().unwrap().push(Sent {
            event,
            email: email.to_string(),
            payload: payload.clone(),
        });
        Ok(())
    }
}

pub fn test_config() -> Config {
    Config::from_lookup(|name| match name {
        "SERVER_ADDRESS" => Some("127.0.0.1:0".into()),
        "JWT_SECRET" => Some(JWT_SECRET.into()),
        "API_RPS" => Some("1000".into()),
        "PUBLIC_RPS" => Some("1000".into()),
        "NOTIFY_TIMEOUT_SECS" => Some("2".into()),
        _ => None,
    })
    .expect("test config")
}

pub struct Harness {
    pub state: AppState,
    pub store: InMemoryStore,
    pub notifier: Arc<RecordingNotifier>,
    pub job: Job,
    pub hr: User,
    pub interviewer: User,
}

fn staff(name: &str, role: StaffRole) -> User {
    User {
        id: Uuid::new_v4(),
        name: name.to_string(),
        email: format!("{}@company.test", name.to_lowercase()),
        role,
        is_active: true,
        created_at: Utc::now(),
    }
}

impl Harness {
    pub async fn new() -> Self {
        let notifier = Arc::new(RecordingNotifier::default());
        let (state, store) = build_state(notifier.clone());
        let hr = staff("Hannah", StaffRole::Hr);
        let interviewer = staff("Ivan", StaffRole::Evaluator);
        store.insert_staff(hr.clone()).expect("seed hr");
        store.insert_staff(interviewer.clone()).expect("seed interviewer");

        let job = state
            .job_service
            .create_job(NewJob {
                title: "Rust Engineer".into(),
                description: Some("Build services".into()),
                location: Some("Remote".into()),
                task_link: Some("https://tasks.example.com/rust".into()),
            })
            .await
            .expect("seed job");

        Self {
            state,
            store,
            notifier,
            job,
            hr,
            interviewer,
        }
    }

    pub fn pipeline(&self) -> &PipelineService {
        &self.state.pipeline
    }

    pub async fn flush(&self) {
        self.state.pipeline.notifications().flush().await;
    }

    pub async fn apply(&self, email: &str) -> Candidate {
        self.pipeline()
            .intake(&self.job.job_id, applicant(email), Some("cv/alice.pdf".into()))
            .await
            .expect("intake")
    }

    pub async fn submitted(&self, email: &str) -> Candidate {
        let candidate = self.apply(email).await;
        self.pipeline()
            .submit_task(&candidate.application_id, github_link())
            .await
            .expect("submit task")
    }

    pub async fn eligible(&self, email: &str) -> Candidate {
        let candidate = self.submitted(email).await;
        self.pipeline()
            .evaluate(candidate.id, 80, None, self.interviewer.id)
            .await
            .expect("evaluate")
    }

    pub fn schedule_request(&self, candidate_id: Uuid) -> ScheduleInterview {
        ScheduleInterview {
            candidate_id,
            scheduled_at: Utc::now() + Duration::days(2),
            interviewer_id: self.interviewer.id,
            interview_type: InterviewType::Technical,
            location: Some("Office 4".into()),
            meeting_link: Some("https://meet.example.com/abc".into()),
            duration_minutes: None,
        }
    }

    pub async fn scheduled(&self, email: &str) -> (Candidate, Interview) {
        let candidate = self.eligible(email).await;
        let interview = self
            .pipeline()
            .schedule_interview(self.schedule_request(candidate.id), self.hr.id)
            .await
            .expect("schedule");
        let candidate = self.pipeline().get_candidate(candidate.id).await.unwrap();
        (candidate, interview)
    }
}

pub fn build_state(notifier: Arc<dyn Notifier>) -> (AppState, InMemoryStore) {
    let store = InMemoryStore::new();
    let state = AppState::new(Arc::new(store.clone()), notifier, &test_config(), "memory");
    (state, store)
}

pub fn applicant(email: &str) -> Applicant {
    Applicant {
        name: "Alice Example".into(),
        email: email.into(),
        phone: Some("+1 555 0100".into()),
        years_of_experience: Some(4),
        ..Applicant::default()
    }
}

pub fn github_link() -> Vec<TaskLink> {
    vec![TaskLink {
        kind: LinkKind::Github,
        url: "https://github.com/alice/task".into(),
    }]
}

pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod telemetry;
pub mod utils;

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::database::store::PipelineStore;
use crate::services::{
    identity_service::IdentityService,
    job_service::JobService,
    notification_service::{NotificationService, Notifier},
    pipeline_service::PipelineService,
};

#[derive(Clone)]
pub struct AppState {
    pub pipeline: PipelineService,
    pub job_service: JobService,
    pub jwt_secret: Arc<str>,
    pub storage: &'static str,
}

impl AppState {
    pub fn new(
        store: Arc<dyn PipelineStore>,
        notifier: Arc<dyn Notifier>,
        config: &Config,
        storage: &'static str,
    ) -> Self {
        let identity = IdentityService::new(config.id_max_attempts);
        let notifications =
            NotificationService::new(notifier, Duration::from_secs(config.notify_timeout_secs));

        Self {
            pipeline: PipelineService::new(store.clone(), notifications, identity.clone()),
            job_service: JobService::new(store, identity),
            jwt_secret: Arc::from(config.jwt_secret.as_str()),
            storage,
        }
    }
}

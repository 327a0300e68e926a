//! Shared fixtures for the HTTP tests

use std::sync::{Arc, Mutex};

use actix_web::web;
use async_trait::async_trait;

use crate::config::Config;
use crate::models::ContactForm;
use crate::services::{
    ContactError, Mailer, MemoryRepoCache, RateLimiterService, RepoCache, RepositoryShowcase,
    RepositorySource,
};
use crate::AppState;

pub const SITE_NAME: &str = "Test Site";

/// Mailer that keeps every message it is asked to send
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<ContactForm>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, form: &ContactForm) -> Result<(), ContactError> {
        self.sent.lock().unwrap().push(form.clone());
        Ok(())
    }

    fn transport_name(&self) -> &'static str {
        "recording"
    }
}

/// Mailer whose every delivery fails
pub struct BrokenMailer;

#[async_trait]
impl Mailer for BrokenMailer {
    async fn send(&self, _form: &ContactForm) -> Result<(), ContactError> {
        let err = "not an address".parse::<lettre::Address>().unwrap_err();
        Err(ContactError::Address(err))
    }

    fn transport_name(&self) -> &'static str {
        "broken"
    }
}

pub fn test_config() -> Config {
    Config {
        app_name: SITE_NAME.to_string(),
        github_username: "someone".to_string(),
        ..Config::default()
    }
}

/// State with the default rate limits and a recording mailer
pub fn state_with(
    source: Arc<dyn RepositorySource>,
    cache: Arc<dyn RepoCache>,
) -> web::Data<AppState> {
    let showcase = RepositoryShowcase::new(source, cache, "someone");
    web::Data::new(AppState::new(
        test_config(),
        showcase,
        Arc::new(RecordingMailer::default()),
    ))
}

/// State whose limiter never rejects
pub fn unlimited_state(
    source: Arc<dyn RepositorySource>,
    mailer: Arc<dyn Mailer>,
) -> web::Data<AppState> {
    let showcase = RepositoryShowcase::new(source, Arc::new(MemoryRepoCache::default()), "someone");
    web::Data::new(
        AppState::new(test_config(), showcase, mailer)
            .with_rate_limiter(RateLimiterService::unlimited()),
    )
}

/// Initialise the full application around `state`
macro_rules! init_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($state.clone())
                .configure(crate::configure_app)
                .default_service(actix_web::web::to(crate::handlers::not_found)),
        )
        .await
    };
}

pub(crate) use init_app;

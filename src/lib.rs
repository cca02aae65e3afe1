//! Engine for a personal mistake-notebook app: photograph a wrong answer,
//! compress and upload it to a configured remote, keep the local question
//! collection, and schedule spaced-review reminders.
//!
//! The host shell owns screens, navigation and the platform notification
//! facility; it talks to the engine through [`Engine`] plus the two injected
//! ports ([`StoragePort`], [`Notifier`]).

pub mod capture;
pub mod config;
pub mod error;
pub mod notify;
pub mod processing;
pub mod questions;
pub mod review;
pub mod store;
pub mod upload;

use std::sync::Arc;

use anyhow::Result;

pub use capture::{CaptureController, CapturePhase, CaptureSnapshot};
pub use config::{AppConfig, ConfigStore};
pub use error::{CaptureError, UploadError};
pub use notify::{Notifier, PermissionState, ReminderDispatcher};
pub use questions::{Question, QuestionRepository, SUBJECTS};
pub use review::ReviewScheduler;
pub use store::{JsonFileStore, MemoryStore, StoragePort};
pub use upload::UploadClient;

/// Wires the engine together over the injected host ports.
pub struct Engine {
    config: Arc<ConfigStore>,
    questions: QuestionRepository,
    capture: CaptureController,
    scheduler: ReviewScheduler,
    reminders: ReminderDispatcher,
}

impl Engine {
    /// Opens the stores and starts reminder dispatch. Must be called inside
    /// a tokio runtime; the dispatcher runs until [`Engine::shutdown`].
    pub fn new(store: Arc<dyn StoragePort>, notifier: Arc<dyn Notifier>) -> Result<Self> {
        let config = Arc::new(ConfigStore::open(store.clone())?);
        let questions = QuestionRepository::open(store)?;
        let capture = CaptureController::new(config.clone());
        let scheduler = ReviewScheduler::new(questions.clone());

        let mut reminders = ReminderDispatcher::new();
        reminders.start(questions.clone(), notifier)?;

        Ok(Self {
            config,
            questions,
            capture,
            scheduler,
            reminders,
        })
    }

    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    pub fn questions(&self) -> &QuestionRepository {
        &self.questions
    }

    pub fn capture(&self) -> &CaptureController {
        &self.capture
    }

    pub fn scheduler(&self) -> &ReviewScheduler {
        &self.scheduler
    }

    /// Stops the reminder dispatcher.
    pub async fn shutdown(&mut self) {
        self.reminders.stop().await;
    }
}

/// Initializes logging from `RUST_LOG`, defaulting to info.
pub fn init_logging() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SilentNotifier;

    impl Notifier for SilentNotifier {
        fn permission(&self) -> PermissionState {
            PermissionState::Denied
        }

        fn request_permission(&self) -> PermissionState {
            PermissionState::Denied
        }

        fn notify(&self, _title: &str, _body: &str) {}
    }

    #[tokio::test]
    async fn engine_wires_the_components_together() {
        let store = Arc::new(MemoryStore::new());
        let mut engine = Engine::new(store, Arc::new(SilentNotifier)).expect("engine");

        assert_eq!(engine.questions().len(), 3);
        assert_eq!(engine.config().get().server_url, "http://192.168.1.2:3000");
        assert_eq!(engine.capture().snapshot().await.phase, CapturePhase::Idle);

        let id = engine.questions().all()[0].id.clone();
        engine.scheduler().set_review(&id, 0).expect("set review");
        assert!(engine.questions().all()[0].is_due(chrono::Utc::now()));

        engine.shutdown().await;
    }
}

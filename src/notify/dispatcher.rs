use std::sync::Arc;

use anyhow::{bail, Result};
use chrono::Utc;
use log::{debug, info};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::questions::{Question, QuestionRepository};

use super::{Notifier, PermissionState};

/// Background reminder delivery: one scan at startup, then one per
/// repository change. Scans re-fire for every due question; nothing tracks
/// already-delivered reminders.
pub struct ReminderDispatcher {
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl ReminderDispatcher {
    pub fn new() -> Self {
        Self {
            handle: None,
            cancel_token: None,
        }
    }

    pub fn start(
        &mut self,
        questions: QuestionRepository,
        notifier: Arc<dyn Notifier>,
    ) -> Result<()> {
        if self.handle.is_some() {
            bail!("reminder dispatcher already running");
        }

        let cancel_token = CancellationToken::new();
        let token_clone = cancel_token.clone();

        let handle = tokio::spawn(reminder_loop(questions, notifier, token_clone));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        Ok(())
    }

    pub async fn stop(&mut self) {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Default for ReminderDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

async fn reminder_loop(
    questions: QuestionRepository,
    notifier: Arc<dyn Notifier>,
    cancel_token: CancellationToken,
) {
    let mut changes = questions.changes();

    scan(&questions.all(), notifier.as_ref());

    loop {
        tokio::select! {
            changed = changes.changed() => {
                if changed.is_err() {
                    debug!("Repository change channel closed, reminder loop exiting");
                    break;
                }
                scan(&questions.all(), notifier.as_ref());
            }
            _ = cancel_token.cancelled() => {
                info!("Reminder loop shutting down");
                break;
            }
        }
    }
}

/// Delivers one reminder per due question, provided permission is granted.
/// Undetermined permission is requested opportunistically; anything but a
/// grant silently disables delivery.
fn scan(questions: &[Question], notifier: &dyn Notifier) -> usize {
    let mut permission = notifier.permission();
    if permission == PermissionState::Prompt {
        permission = notifier.request_permission();
    }
    if permission != PermissionState::Granted {
        return 0;
    }

    let now = Utc::now();
    let mut delivered = 0;
    for question in questions.iter().filter(|q| q.is_due(now)) {
        notifier.notify(
            "Review reminder",
            &format!("[{}] {} is due for review", question.subject, question.title),
        );
        delivered += 1;
    }

    if delivered > 0 {
        debug!("Delivered {delivered} review reminders");
    }
    delivered
}

use std::sync::{Arc, RwLock};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::{info, warn};
use tokio::sync::watch;

use crate::store::{StoragePort, QUESTIONS_KEY};

use super::model::{seed_questions, Question};

/// Cloneable handle over the question collection.
///
/// Every mutation rewrites the whole collection through the storage port
/// (last write wins, whole-collection granularity) and bumps the revision
/// watched by the reminder dispatcher.
#[derive(Clone)]
pub struct QuestionRepository {
    inner: Arc<Inner>,
}

struct Inner {
    store: Arc<dyn StoragePort>,
    questions: RwLock<Vec<Question>>,
    revision: watch::Sender<u64>,
}

impl QuestionRepository {
    /// Loads the persisted collection, seeding (and persisting) the sample
    /// set when none exists. A corrupt blob falls back to the seed set.
    pub fn open(store: Arc<dyn StoragePort>) -> Result<Self> {
        let questions = match store.get(QUESTIONS_KEY) {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                warn!("Ignoring corrupt {QUESTIONS_KEY}: {err}");
                seed_questions()
            }),
            None => {
                let seed = seed_questions();
                store
                    .set(QUESTIONS_KEY, &serde_json::to_string(&seed)?)
                    .context("Failed to persist seed questions")?;
                info!("Seeded question collection with {} samples", seed.len());
                seed
            }
        };

        let (revision, _) = watch::channel(0);

        Ok(Self {
            inner: Arc::new(Inner {
                store,
                questions: RwLock::new(questions),
                revision,
            }),
        })
    }

    /// The full collection in display (insertion) order.
    pub fn all(&self) -> Vec<Question> {
        self.inner.questions.read().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.questions.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Questions whose review date has arrived, in display order.
    pub fn due(&self, now: DateTime<Utc>) -> Vec<Question> {
        self.inner
            .questions
            .read()
            .unwrap()
            .iter()
            .filter(|q| q.is_due(now))
            .cloned()
            .collect()
    }

    /// Appends a record and persists the collection.
    pub fn add(&self, question: Question) -> Result<()> {
        {
            let mut guard = self.inner.questions.write().unwrap();
            guard.push(question);
            self.persist(&guard)?;
        }
        self.bump();
        Ok(())
    }

    /// Applies `mutator` to the matching record and persists the whole
    /// collection. Returns whether a record matched.
    pub fn update(&self, id: &str, mutator: impl FnOnce(&mut Question)) -> Result<bool> {
        let found = {
            let mut guard = self.inner.questions.write().unwrap();
            let found = if let Some(question) = guard.iter_mut().find(|q| q.id == id) {
                mutator(question);
                true
            } else {
                false
            };
            if found {
                self.persist(&guard)?;
            }
            found
        };

        if found {
            self.bump();
        }
        Ok(found)
    }

    /// Change signal for the reminder dispatcher: the carried value is a
    /// revision counter bumped once per mutation.
    pub fn changes(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    fn persist(&self, questions: &[Question]) -> Result<()> {
        let raw = serde_json::to_string(questions)?;
        self.inner.store.set(QUESTIONS_KEY, &raw)
    }

    fn bump(&self) {
        self.inner.revision.send_modify(|rev| *rev += 1);
    }
}

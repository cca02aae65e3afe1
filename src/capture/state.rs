use serde::{Deserialize, Serialize};

use crate::questions::SUBJECTS;

/// Lifecycle of one capture-to-upload attempt.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum CapturePhase {
    Idle,
    Acquiring,
    Processing,
    Ready,
    Uploading,
    Failed,
    Done,
}

impl Default for CapturePhase {
    fn default() -> Self {
        CapturePhase::Idle
    }
}

/// Ephemeral state of the in-flight capture draft. Never persisted; exactly
/// one draft exists at a time and re-acquiring replaces it wholesale.
#[derive(Debug, Clone)]
pub struct CaptureSession {
    pub phase: CapturePhase,
    pub subject: String,
    pub raw_input: Option<Vec<u8>>,
    pub artifact: Option<Vec<u8>>,
    pub last_error: Option<String>,
}

impl Default for CaptureSession {
    fn default() -> Self {
        Self {
            phase: CapturePhase::Idle,
            subject: SUBJECTS[0].to_string(),
            raw_input: None,
            artifact: None,
            last_error: None,
        }
    }
}

impl CaptureSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entering acquisition discards the previous draft entirely.
    pub fn begin_acquiring(&mut self) {
        self.phase = CapturePhase::Acquiring;
        self.raw_input = None;
        self.artifact = None;
        self.last_error = None;
    }

    pub fn begin_processing(&mut self, raw: Vec<u8>) {
        self.phase = CapturePhase::Processing;
        self.raw_input = Some(raw);
    }

    pub fn ready(&mut self, artifact: Vec<u8>) {
        self.phase = CapturePhase::Ready;
        self.artifact = Some(artifact);
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.phase = CapturePhase::Failed;
        self.last_error = Some(message.into());
    }

    pub fn begin_uploading(&mut self) {
        self.phase = CapturePhase::Uploading;
        self.last_error = None;
    }

    /// A failed upload keeps the artifact so the same draft can be retried.
    pub fn upload_failed(&mut self, message: impl Into<String>) {
        self.phase = CapturePhase::Ready;
        self.last_error = Some(message.into());
    }

    pub fn done(&mut self) {
        self.phase = CapturePhase::Done;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// True while a pipeline step is in flight; guards re-entry.
    pub fn busy(&self) -> bool {
        matches!(
            self.phase,
            CapturePhase::Acquiring | CapturePhase::Processing | CapturePhase::Uploading
        )
    }

    pub fn snapshot(&self) -> CaptureSnapshot {
        CaptureSnapshot {
            phase: self.phase,
            subject: self.subject.clone(),
            has_artifact: self.artifact.is_some(),
            last_error: self.last_error.clone(),
        }
    }
}

/// Host-facing view of the session, published on every transition.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CaptureSnapshot {
    pub phase: CapturePhase,
    pub subject: String,
    pub has_artifact: bool,
    pub last_error: Option<String>,
}

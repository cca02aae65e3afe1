use std::{path::Path, sync::Arc};

use anyhow::{bail, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::Utc;
use log::{info, warn};
use tokio::sync::{watch, Mutex};

use crate::{
    config::ConfigStore, error::CaptureError, processing, upload::UploadClient,
};

use super::state::{CapturePhase, CaptureSession, CaptureSnapshot};

/// Drives the capture -> compress -> preview -> upload state machine.
///
/// All steps run on the cooperative scheduler; the session mutex plus the
/// phase guards ensure no two pipeline steps for the same session are ever
/// in flight together. Acquisition and processing failures land in the
/// `Failed` phase, upload failures return to `Ready` with the artifact
/// retained.
#[derive(Clone)]
pub struct CaptureController {
    session: Arc<Mutex<CaptureSession>>,
    config: Arc<ConfigStore>,
    snapshots: Arc<watch::Sender<CaptureSnapshot>>,
}

impl CaptureController {
    pub fn new(config: Arc<ConfigStore>) -> Self {
        let session = CaptureSession::new();
        let (snapshots, _) = watch::channel(session.snapshot());
        Self {
            session: Arc::new(Mutex::new(session)),
            config,
            snapshots: Arc::new(snapshots),
        }
    }

    pub async fn snapshot(&self) -> CaptureSnapshot {
        self.session.lock().await.snapshot()
    }

    /// Watch channel carrying a snapshot per state transition.
    pub fn subscribe(&self) -> watch::Receiver<CaptureSnapshot> {
        self.snapshots.subscribe()
    }

    /// JPEG data URL of the processed artifact, for the host's preview.
    pub async fn preview(&self) -> Option<String> {
        let session = self.session.lock().await;
        session.artifact.as_deref().map(to_data_url)
    }

    pub async fn set_subject(&self, subject: impl Into<String>) {
        let mut session = self.session.lock().await;
        session.subject = subject.into();
        self.publish(&session);
    }

    /// Acquires a raw photo from `path` and runs it through the processor.
    ///
    /// Read and decode failures land the session in `Failed` with a
    /// human-readable `last_error`; they are not returned as `Err`. `Err`
    /// is reserved for misuse: acquiring while a step is in flight.
    pub async fn acquire(&self, path: impl AsRef<Path>) -> Result<CaptureSnapshot> {
        let path = path.as_ref();

        {
            let mut session = self.session.lock().await;
            if session.busy() {
                bail!("capture already in progress");
            }
            session.begin_acquiring();
            self.publish(&session);
        }

        let raw = match tokio::fs::read(path).await {
            Ok(raw) => raw,
            Err(err) => {
                warn!("Failed to read {}: {err}", path.display());
                return Ok(self.fail(CaptureError::Read(err).to_string()).await);
            }
        };

        {
            let mut session = self.session.lock().await;
            session.begin_processing(raw.clone());
            self.publish(&session);
        }

        match processing::compress(&raw).await {
            Ok(artifact) => {
                let mut session = self.session.lock().await;
                info!("Processed capture: {} -> {} bytes", raw.len(), artifact.len());
                session.ready(artifact);
                self.publish(&session);
                Ok(session.snapshot())
            }
            Err(err) => Ok(self.fail(err.to_string()).await),
        }
    }

    /// Uploads the processed artifact to the configured remote.
    ///
    /// A call with no artifact ready is a guarded no-op returning the
    /// unchanged snapshot. Exactly one attempt per call; on failure the
    /// session returns to `Ready` so the user can retry the same draft.
    pub async fn upload(&self) -> Result<CaptureSnapshot> {
        let (image, subject) = {
            let mut session = self.session.lock().await;
            let artifact = match (session.phase, &session.artifact) {
                (CapturePhase::Ready, Some(artifact)) => artifact.clone(),
                _ => return Ok(session.snapshot()),
            };
            session.begin_uploading();
            self.publish(&session);
            (to_data_url(&artifact), session.subject.clone())
        };

        let client = UploadClient::new(&self.config.server_url());
        match client.upload(&image, &subject, Utc::now()).await {
            Ok(()) => {
                let mut session = self.session.lock().await;
                info!("Uploaded [{subject}] capture");
                session.done();
                self.publish(&session);
                Ok(session.snapshot())
            }
            Err(err) => {
                let mut session = self.session.lock().await;
                warn!("Upload failed: {err}");
                session.upload_failed(err.to_string());
                self.publish(&session);
                Ok(session.snapshot())
            }
        }
    }

    /// Returns to a fresh idle session, e.g. when the host leaves the
    /// capture screen after `Done`.
    pub async fn reset(&self) {
        let mut session = self.session.lock().await;
        session.reset();
        self.publish(&session);
    }

    async fn fail(&self, message: String) -> CaptureSnapshot {
        let mut session = self.session.lock().await;
        session.fail(message);
        self.publish(&session);
        session.snapshot()
    }

    fn publish(&self, session: &CaptureSession) {
        self.snapshots.send_replace(session.snapshot());
    }
}

fn to_data_url(artifact: &[u8]) -> String {
    format!("data:image/jpeg;base64,{}", BASE64.encode(artifact))
}

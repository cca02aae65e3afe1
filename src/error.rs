use thiserror::Error;

/// Failures raised while acquiring or processing a capture.
///
/// The pipeline records the `Display` message in the session's `last_error`
/// and moves to the `Failed` phase; nothing here aborts the process or
/// touches the question collection.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("file read failed")]
    Read(#[source] std::io::Error),
    #[error("cannot decode image; retake the photo")]
    Decode(#[source] image::ImageError),
}

/// Failures from a single upload attempt.
///
/// Both axes return the pipeline to `Ready` with the artifact retained, so
/// the upload can be retried without re-capturing.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("cannot reach configured remote; verify address.")]
    Connectivity(#[source] reqwest::Error),
    /// Non-success status from the remote. `message` is the body's `message`
    /// field when present, otherwise a generic status line.
    #[error("{message}")]
    Rejected { status: u16, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_failures_surface_the_documented_message() {
        let err = CaptureError::Read(std::io::Error::other("denied"));
        assert_eq!(err.to_string(), "file read failed");
    }

    #[test]
    fn rejections_display_their_resolved_message() {
        let err = UploadError::Rejected {
            status: 500,
            message: "remote rejected request, status=500".into(),
        };
        assert_eq!(err.to_string(), "remote rejected request, status=500");
    }
}

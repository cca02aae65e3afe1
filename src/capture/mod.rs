pub mod controller;
pub mod state;

pub use controller::CaptureController;
pub use state::{CapturePhase, CaptureSession, CaptureSnapshot};

//! Recording session control for screenrec.
//!
//! Spawns the external encoder, lets callers interrupt it, classifies how it
//! exited, and stamps rotation metadata in a second pass when asked to.

#![deny(clippy::all)]

pub mod config;
pub mod error;
pub mod outcome;
pub mod process;
pub mod remediation;
mod session;

pub use config::RecorderConfig;
pub use error::ErrorCategory;
pub use error::Pass;
pub use error::SessionError;
pub use outcome::ExitSignature;
pub use outcome::FFMPEG_INTERRUPT_EXIT_CODE;
pub use outcome::ProcessExitOutcome;
pub use outcome::RecordingResult;
pub use outcome::classify_exit;
pub use process::ProcessController;
pub use process::Signal;
pub use remediation::apply_rotation_metadata;
pub use remediation::remediation_arguments;
pub use remediation::temp_output_path;
pub use session::Canceller;
pub use session::Recorder;
pub use session::SessionHandle;
pub use session::SessionResult;
pub use session::start_session;

pub use screenrec_core::CaptureConfig;
pub use screenrec_core::InputFormat;

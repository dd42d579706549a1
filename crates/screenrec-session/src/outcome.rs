//! Exit classification for the capture process.
//!
//! Interrupting the encoder is how a capture normally ends, so an interrupt
//! that the encoder acknowledges with its documented status counts as
//! success. Everything else non-zero is a failure.

use std::process::ExitStatus;

use crate::process::Signal;

/// Status ffmpeg exits with after catching SIGINT and finalizing the file.
///
/// This is ffmpeg behavior, not an OS contract: other encoders or future
/// ffmpeg releases may report something else. Override it through
/// [`crate::RecorderConfig::interrupt_exit_code`].
pub const FFMPEG_INTERRUPT_EXIT_CODE: i32 = 255;

/// Text the capture process wrote, collected in full.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingResult {
    pub stdout: String,
    pub stderr: String,
}

/// How a child process ended: its exit code, or the signal that killed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitSignature {
    pub code: Option<i32>,
    pub signal: Option<i32>,
}

impl ExitSignature {
    pub fn exited(code: i32) -> Self {
        Self {
            code: Some(code),
            signal: None,
        }
    }

    pub fn killed(signal: i32) -> Self {
        Self {
            code: None,
            signal: Some(signal),
        }
    }
}

impl From<ExitStatus> for ExitSignature {
    fn from(status: ExitStatus) -> Self {
        #[cfg(unix)]
        let signal = {
            use std::os::unix::process::ExitStatusExt;
            status.signal()
        };
        #[cfg(not(unix))]
        let signal = None;

        Self {
            code: status.code(),
            signal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessExitOutcome {
    NormalExit,
    /// Stopped by our interrupt and acknowledged with the expected status.
    InterruptedExit { signal: i32, code: i32 },
    ErrorExit(ExitSignature),
}

impl ProcessExitOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, ProcessExitOutcome::ErrorExit(_))
    }
}

pub fn classify_exit(
    exit: ExitSignature,
    interrupt_requested: bool,
    interrupt_exit_code: i32,
) -> ProcessExitOutcome {
    match exit.code {
        Some(0) => ProcessExitOutcome::NormalExit,
        Some(code) if interrupt_requested && code == interrupt_exit_code => {
            ProcessExitOutcome::InterruptedExit {
                signal: Signal::Interrupt.number(),
                code,
            }
        }
        _ => ProcessExitOutcome::ErrorExit(exit),
    }
}

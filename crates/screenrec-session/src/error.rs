//! Session errors with structured context.
//!
//! Every failure reaches the caller exactly once, through the session's
//! result. Nothing here is retried: each operation is a local, single-shot
//! process launch or file move.

use std::fmt;
use std::io;
use std::path::PathBuf;

use serde_json::{Value, json};
use thiserror::Error;

/// Which encoder invocation an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    /// The recording itself.
    Capture,
    /// The codec-copy pass that stamps rotation metadata.
    Remediation,
}

impl Pass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Pass::Capture => "capture",
            Pass::Remediation => "remediation",
        }
    }
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The encoder could not be started.
    Unavailable,
    /// The encoder ran and failed.
    Encoder,
    /// A local file or pipe operation failed.
    Io,
    /// The supervising task died.
    Internal,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Unavailable => "unavailable",
            ErrorCategory::Encoder => "encoder",
            ErrorCategory::Io => "io",
            ErrorCategory::Internal => "internal",
        }
    }
}

const ORIGINAL_KEPT: &str = "The unrotated recording was kept at the output path.";

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Failed to launch {program} for the {pass} pass: {source}")]
    Spawn {
        program: String,
        pass: Pass,
        #[source]
        source: io::Error,
    },
    #[error("Encoder failed ({}): {}", describe_exit(.code, .signal), last_line(.stderr))]
    Encoding {
        code: Option<i32>,
        signal: Option<i32>,
        stderr: String,
    },
    #[error("Rotation pass failed ({}): {}", describe_exit(.code, .signal), last_line(.stderr))]
    Remediation {
        code: Option<i32>,
        signal: Option<i32>,
        stderr: String,
    },
    #[error("Failed to {operation} {}: {source}", .path.display())]
    Filesystem {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("I/O error while {operation}: {source}")]
    Io {
        operation: &'static str,
        #[source]
        source: io::Error,
    },
    #[error("Recording supervisor stopped without a result: {0}")]
    Supervisor(String),
}

impl SessionError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SessionError::Spawn { .. } => ErrorCategory::Unavailable,
            SessionError::Encoding { .. } | SessionError::Remediation { .. } => {
                ErrorCategory::Encoder
            }
            SessionError::Filesystem { .. } | SessionError::Io { .. } => ErrorCategory::Io,
            SessionError::Supervisor(_) => ErrorCategory::Internal,
        }
    }

    /// Returns the operation that failed.
    pub fn operation(&self) -> &'static str {
        match self {
            SessionError::Spawn { .. } => "spawn",
            SessionError::Encoding { .. } => "encode",
            SessionError::Remediation { .. } => "remediate",
            SessionError::Filesystem { operation, .. } => *operation,
            SessionError::Io { operation, .. } => *operation,
            SessionError::Supervisor(_) => "supervise",
        }
    }

    /// Encoder stderr captured before the failure, when there is any.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            SessionError::Encoding { stderr, .. } | SessionError::Remediation { stderr, .. } => {
                Some(stderr)
            }
            _ => None,
        }
    }

    /// Returns structured context about the error for debugging.
    pub fn context(&self) -> Value {
        match self {
            SessionError::Spawn {
                program,
                pass,
                source,
            } => json!({
                "operation": "spawn",
                "program": program,
                "pass": pass.as_str(),
                "reason": source.to_string()
            }),
            SessionError::Encoding {
                code,
                signal,
                stderr,
            } => json!({
                "operation": "encode",
                "code": code,
                "signal": signal,
                "stderr": stderr
            }),
            SessionError::Remediation {
                code,
                signal,
                stderr,
            } => json!({
                "operation": "remediate",
                "code": code,
                "signal": signal,
                "stderr": stderr
            }),
            SessionError::Filesystem {
                operation,
                path,
                source,
            } => json!({
                "operation": operation,
                "path": path.display().to_string(),
                "reason": source.to_string()
            }),
            SessionError::Io { operation, source } => json!({
                "operation": operation,
                "reason": source.to_string()
            }),
            SessionError::Supervisor(reason) => json!({
                "operation": "supervise",
                "reason": reason
            }),
        }
    }

    /// Returns a helpful suggestion for resolving the error.
    pub fn suggestion(&self) -> String {
        match self {
            SessionError::Spawn { source, pass, .. } => {
                let hint = match source.kind() {
                    io::ErrorKind::NotFound => {
                        "Encoder not found. Install ffmpeg or point SCREENREC_FFMPEG at the binary."
                    }
                    io::ErrorKind::PermissionDenied => {
                        "Permission denied launching the encoder. Check the binary's permissions."
                    }
                    _ => "Encoder launch failed. Check the encoder path and system limits.",
                };
                match pass {
                    Pass::Capture => hint.to_string(),
                    Pass::Remediation => format!("{} {}", hint, ORIGINAL_KEPT),
                }
            }
            SessionError::Encoding { .. } => {
                "Check the encoder output above. With x11grab the resolution must match the display."
                    .to_string()
            }
            SessionError::Remediation { .. } => ORIGINAL_KEPT.to_string(),
            SessionError::Filesystem { .. } => {
                "Check free space and permissions in the output directory.".to_string()
            }
            SessionError::Io { .. } | SessionError::Supervisor(_) => {
                "The recording state is unknown. Inspect the output file before reusing it."
                    .to_string()
            }
        }
    }
}

fn describe_exit(code: &Option<i32>, signal: &Option<i32>) -> String {
    match (*code, *signal) {
        (Some(code), _) => format!("exit status {}", code),
        (None, Some(signal)) => format!("killed by signal {}", signal),
        (None, None) => "unknown exit".to_string(),
    }
}

fn last_line(stderr: &str) -> &str {
    stderr
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("no encoder output")
}

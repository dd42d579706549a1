use std::env;
use std::path::PathBuf;

use crate::outcome::FFMPEG_INTERRUPT_EXIT_CODE;

const DEFAULT_ENCODER: &str = "ffmpeg";

/// Runtime settings shared by every session a [`crate::Recorder`] starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecorderConfig {
    /// Encoder program, looked up on `PATH` when not absolute.
    pub encoder: PathBuf,
    /// Exit status the encoder reports after handling an interrupt.
    pub interrupt_exit_code: i32,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl RecorderConfig {
    pub fn from_env() -> Self {
        Self {
            encoder: env::var_os("SCREENREC_FFMPEG")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ENCODER)),
            interrupt_exit_code: env::var("SCREENREC_INTERRUPT_EXIT_CODE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(FFMPEG_INTERRUPT_EXIT_CODE),
        }
    }

    pub fn with_encoder(mut self, encoder: impl Into<PathBuf>) -> Self {
        self.encoder = encoder.into();
        self
    }

    pub fn with_interrupt_exit_code(mut self, code: i32) -> Self {
        self.interrupt_exit_code = code;
        self
    }
}

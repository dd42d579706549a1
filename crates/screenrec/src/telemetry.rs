use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

/// Environment variable naming a file to append logs to instead of stderr.
pub const LOG_FILE_ENV: &str = "SCREENREC_LOG";

/// A log file records at least the session lifecycle (spawn, interrupt,
/// settlement), which is logged at this level.
const FILE_MIN_LEVEL: LevelFilter = LevelFilter::INFO;

/// Where log lines go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

impl LogTarget {
    pub fn from_env() -> Self {
        std::env::var_os(LOG_FILE_ENV)
            .filter(|value| !value.is_empty())
            .map_or(LogTarget::Stderr, |path| LogTarget::File(PathBuf::from(path)))
    }

    /// Filter directive used when `RUST_LOG` is unset. stderr follows
    /// `--log-level` as given; a file never drops below `info`. Directives
    /// that are not a bare level pass through untouched.
    pub fn default_directive(&self, log_level: &str) -> String {
        match (self, log_level.parse::<LevelFilter>()) {
            (LogTarget::File(_), Ok(level)) => level.max(FILE_MIN_LEVEL).to_string(),
            _ => log_level.to_string(),
        }
    }
}

/// Keeps the background log writer alive; drop it last to flush.
#[derive(Debug)]
pub struct TelemetryGuard {
    _guard: Option<WorkerGuard>,
}

/// Installs the global subscriber for `LogTarget::from_env()`.
pub fn init_tracing(log_level: &str) -> TelemetryGuard {
    let (target, writer, guard) = match LogTarget::from_env() {
        LogTarget::File(path) => match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => {
                let (non_blocking, guard) = tracing_appender::non_blocking(file);
                (LogTarget::File(path), BoxMakeWriter::new(non_blocking), Some(guard))
            }
            Err(err) => {
                eprintln!(
                    "Warning: failed to open log file {}: {}",
                    path.display(),
                    err
                );
                (LogTarget::Stderr, BoxMakeWriter::new(std::io::stderr), None)
            }
        },
        LogTarget::Stderr => (LogTarget::Stderr, BoxMakeWriter::new(std::io::stderr), None),
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(target.default_directive(log_level)));
    let ansi = target == LogTarget::Stderr && std::io::stderr().is_terminal();

    let installed = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(ansi)
        .with_writer(writer)
        .try_init()
        .is_ok();

    TelemetryGuard {
        _guard: guard.filter(|_| installed),
    }
}

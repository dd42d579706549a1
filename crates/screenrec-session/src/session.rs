//! Recording session controller.
//!
//! A session owns exactly one capture process. The caller gets a
//! [`SessionHandle`] back immediately; one tokio task drains the encoder's
//! output, waits for it to exit, classifies the exit, and runs the rotation
//! pass when one was requested. Cancellation only flips a flag the task
//! watches, so it never blocks and is a no-op once the session settled.

use std::future::Future;
use std::future::IntoFuture;
use std::io;
use std::path::PathBuf;
use std::pin::Pin;
use std::process::ExitStatus;
use std::process::Stdio;
use std::sync::Arc;

use screenrec_core::ArgumentBuilder;
use screenrec_core::CaptureConfig;
use screenrec_core::InputLocator;
use tokio::io::AsyncRead;
use tokio::io::AsyncReadExt;
use tokio::process::Child;
use tokio::process::Command;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::RecorderConfig;
use crate::error::Pass;
use crate::error::SessionError;
use crate::outcome::ExitSignature;
use crate::outcome::RecordingResult;
use crate::outcome::classify_exit;
use crate::process::PlatformProcessController;
use crate::process::ProcessController;
use crate::process::Signal;
use crate::remediation::apply_rotation_metadata;

pub type SessionResult = Result<RecordingResult, SessionError>;

/// Starts recording sessions against one encoder.
#[derive(Clone)]
pub struct Recorder {
    config: RecorderConfig,
    builder: ArgumentBuilder,
    controller: Arc<dyn ProcessController>,
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new(RecorderConfig::default())
    }
}

impl std::fmt::Debug for Recorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recorder")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Recorder {
    pub fn new(config: RecorderConfig) -> Self {
        Self {
            config,
            builder: ArgumentBuilder::new(),
            controller: Arc::new(PlatformProcessController::default()),
        }
    }

    /// Locator for input formats other than the screen grab.
    pub fn with_locator(mut self, locator: impl InputLocator + 'static) -> Self {
        self.builder = self.builder.with_locator(locator);
        self
    }

    pub fn with_controller(mut self, controller: Arc<dyn ProcessController>) -> Self {
        self.controller = controller;
        self
    }

    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }

    /// Spawns the encoder and returns without waiting for it.
    ///
    /// `config` is overlaid on [`CaptureConfig::defaults`]. Must be called
    /// from within a tokio runtime. A launch failure is reported through
    /// the handle's result, never here.
    pub fn start_session(&self, output_path: impl Into<PathBuf>, config: CaptureConfig) -> SessionHandle {
        let output_path = output_path.into();
        let capture = config.with_defaults();
        let args = self.builder.build(&output_path, &capture);
        debug!(args = %args, "Capture arguments");

        let (cancel_tx, cancel_rx) = watch::channel(false);
        let canceller = Canceller {
            tx: Arc::new(cancel_tx),
        };

        let spawned = Command::new(&self.config.encoder)
            .args(args.as_slice())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn();

        let task = match spawned {
            Ok(child) => {
                info!(
                    pid = ?child.id(),
                    program = %self.config.encoder.display(),
                    output = %output_path.display(),
                    "Recording started"
                );
                let supervision = Supervision {
                    encoder: self.config.encoder.clone(),
                    output_path,
                    rotation: capture.requested_rotation(),
                    interrupt_exit_code: self.config.interrupt_exit_code,
                    controller: Arc::clone(&self.controller),
                };
                tokio::spawn(supervision.run(child, cancel_rx))
            }
            Err(source) => {
                let err = SessionError::Spawn {
                    program: self.config.encoder.display().to_string(),
                    pass: Pass::Capture,
                    source,
                };
                error!(error = %err, "Recording could not start");
                tokio::spawn(async move { Err(err) })
            }
        };

        SessionHandle { canceller, task }
    }
}

/// Starts a session with a [`Recorder`] configured from the environment.
pub fn start_session(output_path: impl Into<PathBuf>, config: CaptureConfig) -> SessionHandle {
    Recorder::default().start_session(output_path, config)
}

/// Requests an interrupt of a running session. Cheap to clone and safe to
/// use from any task, including while the handle is being awaited.
#[derive(Debug, Clone)]
pub struct Canceller {
    tx: Arc<watch::Sender<bool>>,
}

impl Canceller {
    /// Asks the encoder to stop. Does not wait; repeated calls and calls
    /// after the session settled do nothing.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

/// Result and cancellation of one recording.
#[derive(Debug)]
pub struct SessionHandle {
    canceller: Canceller,
    task: JoinHandle<SessionResult>,
}

impl SessionHandle {
    pub fn cancel(&self) {
        self.canceller.cancel();
    }

    pub fn canceller(&self) -> Canceller {
        self.canceller.clone()
    }

    /// Whether the result is ready.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for the session to settle.
    pub async fn wait(self) -> SessionResult {
        let SessionHandle { canceller, task } = self;
        let joined = task.await;
        drop(canceller);
        joined.unwrap_or_else(|e| Err(SessionError::Supervisor(e.to_string())))
    }
}

impl IntoFuture for SessionHandle {
    type Output = SessionResult;
    type IntoFuture = Pin<Box<dyn Future<Output = SessionResult> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.wait())
    }
}

struct Supervision {
    encoder: PathBuf,
    output_path: PathBuf,
    rotation: Option<i32>,
    interrupt_exit_code: i32,
    controller: Arc<dyn ProcessController>,
}

impl Supervision {
    async fn run(self, mut child: Child, cancel_rx: watch::Receiver<bool>) -> SessionResult {
        let stdout_pipe = child.stdout.take();
        let stderr_pipe = child.stderr.take();

        let (exited, stdout, stderr) = tokio::join!(
            self.wait_for_exit(&mut child, cancel_rx),
            read_all(stdout_pipe),
            read_all(stderr_pipe),
        );

        let (status, interrupt_requested) = exited.map_err(|source| SessionError::Io {
            operation: "waiting for the encoder",
            source,
        })?;
        let read_error = |source| SessionError::Io {
            operation: "reading encoder output",
            source,
        };
        let stdout = stdout.map_err(read_error)?;
        let stderr = stderr.map_err(read_error)?;

        let exit = ExitSignature::from(status);
        let outcome = classify_exit(exit, interrupt_requested, self.interrupt_exit_code);
        if !outcome.is_success() {
            error!(code = ?exit.code, signal = ?exit.signal, "Encoder failed");
            return Err(SessionError::Encoding {
                code: exit.code,
                signal: exit.signal,
                stderr,
            });
        }
        info!(?outcome, "Recording finished");

        let result = RecordingResult { stdout, stderr };
        apply_rotation_metadata(&self.encoder, &self.output_path, self.rotation, result).await
    }

    /// Waits for the child, delivering at most one interrupt. The signal is
    /// sent before the child is reaped, so its pid is still ours.
    async fn wait_for_exit(
        &self,
        child: &mut Child,
        mut cancel_rx: watch::Receiver<bool>,
    ) -> io::Result<(ExitStatus, bool)> {
        let mut interrupt_requested = false;
        let mut listening = true;

        loop {
            tokio::select! {
                status = child.wait() => return Ok((status?, interrupt_requested)),
                changed = cancel_rx.changed(), if listening => {
                    if changed.is_err() {
                        // Every canceller is gone; the recording runs to its own end.
                        listening = false;
                    }
                    if *cancel_rx.borrow_and_update() {
                        listening = false;
                        interrupt_requested = true;
                        self.interrupt(child);
                    }
                }
            }
        }
    }

    fn interrupt(&self, child: &Child) {
        let Some(pid) = child.id() else {
            return;
        };
        match self.controller.send_signal(pid, Signal::Interrupt) {
            Ok(()) => info!(pid, "Interrupt sent to encoder"),
            Err(e) => warn!(pid, error = %e, "Failed to interrupt encoder"),
        }
    }
}

async fn read_all<R>(pipe: Option<R>) -> io::Result<String>
where
    R: AsyncRead + Unpin,
{
    let Some(mut pipe) = pipe else {
        return Ok(String::new());
    };
    let mut buf = Vec::new();
    pipe.read_to_end(&mut buf).await?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

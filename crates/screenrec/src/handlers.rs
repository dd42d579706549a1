use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use screenrec_core::ArgumentBuilder;
use screenrec_session::Canceller;
use screenrec_session::Recorder;
use tracing::{debug, info, warn};

use crate::color::Colors;
use crate::commands::CaptureArgs;

pub type HandlerResult = Result<(), Box<dyn std::error::Error>>;

/// Time after which a recording is stopped; `None` when `duration_secs` is 0.
pub fn stop_after(duration_secs: u64) -> Option<Duration> {
    (duration_secs > 0).then(|| Duration::from_secs(duration_secs))
}

pub fn handle_args(output: &Path, capture: &CaptureArgs, out: &mut impl Write) -> HandlerResult {
    let config = capture.resolve()?.with_defaults();
    for arg in ArgumentBuilder::new().build(output, &config).iter() {
        writeln!(out, "{}", arg)?;
    }
    Ok(())
}

/// Records until `stop_after` elapses or Ctrl-C, then echoes what the
/// encoder printed: its stdout to ours, its stderr to ours.
pub async fn handle_record(
    recorder: &Recorder,
    output: PathBuf,
    capture: &CaptureArgs,
    stop_after: Option<Duration>,
) -> HandlerResult {
    let config = capture.resolve()?;
    let handle = recorder.start_session(&output, config);

    match stop_after {
        Some(limit) => eprintln!(
            "{} {} for {}s (Ctrl-C to stop early)",
            Colors::info("Recording"),
            output.display(),
            limit.as_secs()
        ),
        None => eprintln!(
            "{} {} (Ctrl-C to stop)",
            Colors::info("Recording"),
            output.display()
        ),
    }

    let stopper = tokio::spawn(stop_when(handle.canceller(), stop_after));
    let settled = handle.wait().await;
    stopper.abort();
    let result = settled?;

    print!("{}", result.stdout);
    eprint!("{}", result.stderr);
    std::io::stdout().flush()?;
    eprintln!("{} {}", Colors::success("Saved"), output.display());
    Ok(())
}

async fn stop_when(canceller: Canceller, stop_after: Option<Duration>) {
    let timer = async {
        match stop_after {
            Some(limit) => tokio::time::sleep(limit).await,
            None => std::future::pending().await,
        }
    };

    tokio::select! {
        _ = timer => debug!("Recording duration elapsed"),
        _ = ctrl_c() => info!("Ctrl-C received, stopping recording"),
    }
    canceller.cancel();
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Ctrl-C handler unavailable");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_after() {
        assert_eq!(stop_after(0), None);
        assert_eq!(stop_after(5), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_handle_args_applies_defaults() {
        let mut out = Vec::new();
        handle_args(Path::new("out.mp4"), &CaptureArgs::default(), &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "-y\n-r\n15\n-f\nx11grab\n-i\n:0\n-pix_fmt\nyuv420p\nout.mp4\n"
        );
    }

    #[test]
    fn test_handle_args_custom_input() {
        let capture = CaptureArgs {
            input_format: Some("rtsp".to_string()),
            input_url: Some("rtsp://camera.local/stream".to_string()),
            ..CaptureArgs::default()
        };
        let mut out = Vec::new();
        handle_args(Path::new("out.mp4"), &capture, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines.windows(2).any(|w| w == ["-f", "rtsp"]));
        assert!(lines.windows(2).any(|w| w == ["-i", "rtsp://camera.local/stream"]));
    }
}

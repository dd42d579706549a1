//! Session lifecycle tests against a fake encoder.
//!
//! The fake is a shell script that answers SIGINT the way ffmpeg does, so
//! these tests exercise the real spawn, signal, and file replacement path.

#![cfg(unix)]

mod common;

use std::time::Duration;

use common::FakeEncoder;
use screenrec_session::CaptureConfig;
use screenrec_session::Pass;
use screenrec_session::SessionError;

const SESSION_TIMEOUT: Duration = Duration::from_secs(10);

// =============================================================================
// Cancellation
// =============================================================================

#[tokio::test]
async fn test_cancel_resolves_with_captured_output() {
    let encoder = FakeEncoder::cancellable();
    let output = encoder.output("test.mp4");

    let handle = encoder
        .recorder()
        .start_session(&output, CaptureConfig::new().with_fps(10));
    encoder.wait_until_ready().await;
    assert!(!handle.is_finished());

    handle.cancel();
    let result = tokio::time::timeout(SESSION_TIMEOUT, handle)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(result.stdout, "capture started\n");
    assert!(result.stderr.contains("frame=    1"));
    assert!(result.stderr.contains("received signal 2"));
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "recorded");
}

#[tokio::test]
async fn test_cancel_from_another_task() {
    let encoder = FakeEncoder::cancellable();
    let handle = encoder
        .recorder()
        .start_session(encoder.output("test.mp4"), CaptureConfig::new());
    let canceller = handle.canceller();
    encoder.wait_until_ready().await;

    let waiter = tokio::spawn(handle.wait());
    canceller.cancel();

    let result = tokio::time::timeout(SESSION_TIMEOUT, waiter)
        .await
        .unwrap()
        .unwrap();
    assert!(result.is_ok());
    // Settled: further cancels are no-ops.
    canceller.cancel();
}

#[tokio::test]
async fn test_normal_exit_without_cancel() {
    let encoder = FakeEncoder::finishing();
    let output = encoder.output("test.mp4");

    let result = encoder
        .recorder()
        .start_session(&output, CaptureConfig::new())
        .await
        .unwrap();

    assert_eq!(result.stdout, "capture started\n");
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "recorded");
}

// =============================================================================
// Failure
// =============================================================================

#[tokio::test]
async fn test_failed_capture_rejects_with_stderr() {
    let encoder = FakeEncoder::failing();

    let err = encoder
        .recorder()
        .start_session(encoder.output("test.mp4"), CaptureConfig::new())
        .await
        .unwrap_err();

    match &err {
        SessionError::Encoding { code, stderr, .. } => {
            assert_eq!(*code, Some(1));
            assert!(stderr.contains("Cannot open display :0"));
        }
        other => panic!("expected encoding error, got {other:?}"),
    }
    assert!(err.to_string().contains(":0: Input/output error"));
    // Failed captures never reach the rotation pass.
    assert_eq!(encoder.invocations().len(), 1);
}

#[tokio::test]
async fn test_failed_capture_skips_rotation() {
    let encoder = FakeEncoder::failing();

    let err = encoder
        .recorder()
        .start_session(encoder.output("test.mp4"), CaptureConfig::new().with_rotate(90))
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::Encoding { .. }));
    assert_eq!(encoder.invocations().len(), 1);
}

#[tokio::test]
async fn test_missing_encoder_rejects_with_spawn_error() {
    let dir = tempfile::tempdir().unwrap();
    let recorder = screenrec_session::Recorder::new(
        screenrec_session::RecorderConfig::from_env().with_encoder(dir.path().join("nope")),
    );

    let err = recorder
        .start_session(dir.path().join("test.mp4"), CaptureConfig::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SessionError::Spawn {
            pass: Pass::Capture,
            ..
        }
    ));
    assert!(err.suggestion().contains("SCREENREC_FFMPEG"));
}

// =============================================================================
// Rotation remediation
// =============================================================================

#[tokio::test]
async fn test_without_rotation_no_second_pass() {
    let encoder = FakeEncoder::finishing();
    let output = encoder.output("test.mp4");

    encoder
        .recorder()
        .start_session(&output, CaptureConfig::new())
        .await
        .unwrap();

    let invocations = encoder.invocations();
    assert_eq!(invocations.len(), 1);
    assert!(!invocations[0].contains("-codec copy"));
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "recorded");
}

#[tokio::test]
async fn test_rotation_replaces_output_and_keeps_result() {
    let encoder = FakeEncoder::finishing();
    let output = encoder.output("test.mp4");
    let temp = encoder.output("test.tmp.mp4");

    let result = encoder
        .recorder()
        .start_session(&output, CaptureConfig::new().with_rotate(90))
        .await
        .unwrap();

    assert_eq!(std::fs::read_to_string(&output).unwrap(), "recorded+rotated");
    assert!(!temp.exists());
    assert_eq!(result.stdout, "capture started\n");
    assert!(!result.stderr.contains("remediation noise"));

    let invocations = encoder.invocations();
    assert_eq!(invocations.len(), 2);
    assert_eq!(
        invocations[1],
        format!(
            "-y -loglevel error -i {} -codec copy -map_metadata :0 -metadata:s:v rotate=90 {}",
            output.display(),
            temp.display()
        )
    );
}

#[tokio::test]
async fn test_rotation_after_cancel() {
    let encoder = FakeEncoder::cancellable();
    let output = encoder.output("clip.mp4");

    let handle = encoder
        .recorder()
        .start_session(&output, CaptureConfig::new().with_rotate(270));
    encoder.wait_until_ready().await;
    handle.cancel();

    let result = tokio::time::timeout(SESSION_TIMEOUT, handle)
        .await
        .unwrap()
        .unwrap();

    assert!(result.stderr.contains("received signal 2"));
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "recorded+rotated");
    assert!(encoder.invocations()[1].contains("rotate=270"));
}

#[tokio::test]
async fn test_failed_rotation_keeps_original() {
    let encoder = FakeEncoder::with_failing_remediation();
    let output = encoder.output("test.mp4");

    let err = encoder
        .recorder()
        .start_session(&output, CaptureConfig::new().with_rotate(90))
        .await
        .unwrap_err();

    match &err {
        SessionError::Remediation { code, stderr, .. } => {
            assert_eq!(*code, Some(1));
            assert!(stderr.contains("Invalid data"));
        }
        other => panic!("expected remediation error, got {other:?}"),
    }
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "recorded");
    assert!(!encoder.output("test.tmp.mp4").exists());
}

#[tokio::test]
async fn test_missing_rotated_output_rejects_with_rename_error() {
    let encoder = FakeEncoder::with_silent_remediation();
    let output = encoder.output("test.mp4");
    let temp = encoder.output("test.tmp.mp4");

    let handle = encoder
        .recorder()
        .start_session(&output, CaptureConfig::new().with_rotate(90));
    let err = tokio::time::timeout(SESSION_TIMEOUT, handle)
        .await
        .unwrap()
        .unwrap_err();

    match &err {
        SessionError::Filesystem {
            operation, path, ..
        } => {
            assert_eq!(*operation, "rename");
            assert_eq!(path, &temp);
        }
        other => panic!("expected filesystem error, got {other:?}"),
    }
    assert_eq!(err.operation(), "rename");
    assert_eq!(err.category(), screenrec_session::ErrorCategory::Io);
    // Both passes ran once; nothing was retried after the failure.
    assert_eq!(encoder.invocations().len(), 2);
    assert!(!temp.exists());
}

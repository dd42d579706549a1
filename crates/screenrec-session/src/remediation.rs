//! Rotation metadata remediation.
//!
//! The MP4 muxer ignores rotation metadata while encoding
//! (https://trac.ffmpeg.org/ticket/6370), so rotation is stamped afterwards
//! by a codec-copy pass into a sibling file that then replaces the
//! recording. The recording is only deleted once that pass has succeeded.

use std::ffi::OsString;
use std::path::Path;
use std::path::PathBuf;
use std::process::Stdio;

use screenrec_core::ArgumentVector;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::error::Pass;
use crate::error::SessionError;
use crate::outcome::ExitSignature;
use crate::outcome::RecordingResult;

const TEMP_MARKER: &str = "tmp";

/// Sibling path the rotated copy is written to: `clip.mp4` -> `clip.tmp.mp4`.
pub fn temp_output_path(output_path: &Path) -> PathBuf {
    match (output_path.file_stem(), output_path.extension()) {
        (Some(stem), Some(ext)) => {
            let mut name = OsString::from(stem);
            name.push(".");
            name.push(TEMP_MARKER);
            name.push(".");
            name.push(ext);
            output_path.with_file_name(name)
        }
        _ => {
            let mut name = output_path.as_os_str().to_owned();
            name.push(".");
            name.push(TEMP_MARKER);
            PathBuf::from(name)
        }
    }
}

/// Codec-copy invocation that drops existing stream metadata and tags the
/// video stream with `rotate=<degrees>`.
pub fn remediation_arguments(output_path: &Path, temp_path: &Path, degrees: i32) -> ArgumentVector {
    vec![
        "-y".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-i".to_string(),
        output_path.to_string_lossy().into_owned(),
        "-codec".to_string(),
        "copy".to_string(),
        "-map_metadata".to_string(),
        ":0".to_string(),
        "-metadata:s:v".to_string(),
        format!("rotate={}", degrees),
        temp_path.to_string_lossy().into_owned(),
    ]
    .into()
}

/// Stamps `rotation` onto the recording at `output_path`.
///
/// Without a rotation (or with zero) nothing is spawned and `result` comes
/// back as is. Otherwise the encoder runs a second time and, on success,
/// its output replaces the recording. The captured text in `result` is
/// never changed by this pass.
pub async fn apply_rotation_metadata(
    encoder: &Path,
    output_path: &Path,
    rotation: Option<i32>,
    result: RecordingResult,
) -> Result<RecordingResult, SessionError> {
    let Some(degrees) = rotation.filter(|degrees| *degrees != 0) else {
        return Ok(result);
    };

    let temp_path = temp_output_path(output_path);
    let args = remediation_arguments(output_path, &temp_path, degrees);
    info!(
        rotation = degrees,
        output = %output_path.display(),
        "Stamping rotation metadata"
    );
    debug!(args = %args, "Remediation arguments");

    let output = Command::new(encoder)
        .args(args.as_slice())
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|source| SessionError::Spawn {
            program: encoder.display().to_string(),
            pass: Pass::Remediation,
            source,
        })?;

    if !output.status.success() {
        let exit = ExitSignature::from(output.status);
        discard_partial(&temp_path).await;
        return Err(SessionError::Remediation {
            code: exit.code,
            signal: exit.signal,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    tokio::fs::remove_file(output_path)
        .await
        .map_err(|source| SessionError::Filesystem {
            operation: "delete",
            path: output_path.to_path_buf(),
            source,
        })?;
    tokio::fs::rename(&temp_path, output_path)
        .await
        .map_err(|source| SessionError::Filesystem {
            operation: "rename",
            path: temp_path.clone(),
            source,
        })?;

    info!(output = %output_path.display(), "Rotation metadata applied");
    Ok(result)
}

async fn discard_partial(temp_path: &Path) {
    match tokio::fs::remove_file(temp_path).await {
        Ok(()) => debug!(path = %temp_path.display(), "Removed partial rotation output"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(
            path = %temp_path.display(),
            error = %e,
            "Failed to remove partial rotation output"
        ),
    }
}

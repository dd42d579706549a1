#![allow(dead_code)]

use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use screenrec_session::Recorder;
use screenrec_session::RecorderConfig;
use tempfile::TempDir;

pub const READY_TIMEOUT: Duration = Duration::from_secs(5);

/// Shell script standing in for ffmpeg.
///
/// Every invocation appends its arguments to `invocations.log`. A capture
/// writes `ready` once its SIGINT trap is installed, then loops until
/// interrupted, answering the interrupt the way ffmpeg does (stderr note,
/// output file written, exit 255). A `-codec copy` invocation copies its
/// input to its output and appends `+rotated`.
pub struct FakeEncoder {
    pub dir: TempDir,
    pub path: PathBuf,
}

impl FakeEncoder {
    pub fn cancellable() -> Self {
        Self::with_capture_body(
            r#"trap 'echo "Exiting normally, received signal 2." >&2; printf recorded > "$out"; exit 255' INT
echo "capture started"
echo "frame=    1 fps=0.0" >&2
touch "$DIR/ready"
while :; do sleep 0.05; done"#,
        )
    }

    pub fn finishing() -> Self {
        Self::with_capture_body(
            r#"echo "capture started"
echo "frame=   10 fps=10" >&2
printf recorded > "$out"
exit 0"#,
        )
    }

    pub fn failing() -> Self {
        Self::with_capture_body(
            r#"echo "[x11grab @ 0x55] Cannot open display :0, error 1." >&2
echo ":0: Input/output error" >&2
exit 1"#,
        )
    }

    pub fn with_failing_remediation() -> Self {
        Self::build(
            r#"printf partial > "$out"
echo "Invalid data found when processing input" >&2
exit 1"#,
            r#"echo "capture started"
printf recorded > "$out"
exit 0"#,
        )
    }

    /// Second pass reports success but never writes its output.
    pub fn with_silent_remediation() -> Self {
        Self::build(
            "exit 0",
            r#"echo "capture started"
printf recorded > "$out"
exit 0"#,
        )
    }

    fn with_capture_body(capture: &str) -> Self {
        Self::build(
            r#"{ cat "$input"; printf '+rotated'; } > "$out"
echo "remediation noise" >&2
exit 0"#,
            capture,
        )
    }

    fn build(remediation: &str, capture: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake-ffmpeg");
        let script = format!(
            r#"#!/bin/sh
DIR='{dir}'
echo "$*" >> "$DIR/invocations.log"
prev=""
input=""
remediate=0
for arg; do
  if [ "$prev" = "-i" ]; then input="$arg"; fi
  if [ "$arg" = "-codec" ]; then remediate=1; fi
  prev="$arg"
  out="$arg"
done
if [ "$remediate" = 1 ]; then
{remediation}
fi
{capture}
"#,
            dir = dir.path().display(),
            remediation = remediation,
            capture = capture,
        );
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        Self { dir, path }
    }

    pub fn recorder(&self) -> Recorder {
        Recorder::new(
            RecorderConfig::from_env()
                .with_encoder(&self.path)
                .with_interrupt_exit_code(255),
        )
    }

    pub fn output(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn invocations(&self) -> Vec<String> {
        std::fs::read_to_string(self.dir.path().join("invocations.log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    pub async fn wait_until_ready(&self) {
        let ready = self.dir.path().join("ready");
        wait_for_file(&ready).await;
    }
}

pub async fn wait_for_file(path: &Path) {
    tokio::time::timeout(READY_TIMEOUT, async {
        while !path.exists() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("fake encoder never became ready");
}

//! Per-session capture configuration.
//!
//! Every field is optional. A session overlays the caller's values on
//! [`CaptureConfig::defaults`], so a caller only names what differs from a
//! plain screen grab of display `:0` at 15 fps.

use std::fmt;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

pub const DEFAULT_FPS: u32 = 15;
/// Pixel format QuickTime can play back.
pub const DEFAULT_PIXEL_FORMAT: &str = "yuv420p";
pub const DEFAULT_DISPLAY: &str = "0";
pub const DEFAULT_PORT: u16 = 9000;

const X11GRAB: &str = "x11grab";

/// Capture backend the encoder reads from (its `-f` input driver).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InputFormat {
    /// X11 screen grab, bound to `<hostname>:<display>`.
    X11Grab,
    Other(String),
}

impl InputFormat {
    pub fn as_str(&self) -> &str {
        match self {
            InputFormat::X11Grab => X11GRAB,
            InputFormat::Other(name) => name,
        }
    }

    pub fn is_screen_grab(&self) -> bool {
        matches!(self, InputFormat::X11Grab)
    }
}

impl From<&str> for InputFormat {
    fn from(name: &str) -> Self {
        if name == X11GRAB {
            InputFormat::X11Grab
        } else {
            InputFormat::Other(name.to_string())
        }
    }
}

impl From<String> for InputFormat {
    fn from(name: String) -> Self {
        if name == X11GRAB {
            InputFormat::X11Grab
        } else {
            InputFormat::Other(name)
        }
    }
}

impl From<InputFormat> for String {
    fn from(format: InputFormat) -> Self {
        match format {
            InputFormat::X11Grab => X11GRAB.to_string(),
            InputFormat::Other(name) => name,
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid capture config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Capture settings for one recording.
///
/// JSON keys are camelCase (`inputFormat`, `pixelFormat`, ...). Unknown
/// keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CaptureConfig {
    /// Capture backend passed as `-f`.
    pub input_format: Option<InputFormat>,
    /// X11 display number for the screen-grab locator.
    pub display: Option<String>,
    /// X11 host for the screen-grab locator; empty means local.
    pub hostname: Option<String>,
    /// Port for network input sources. Only read by custom locators.
    pub port: Option<u16>,
    /// Frame rate passed as `-r`.
    pub fps: Option<u32>,
    /// Capture size passed as `-video_size`. With x11grab this must match
    /// the display's native resolution; it is not validated.
    pub resolution: Option<String>,
    /// Output pixel format passed as `-pix_fmt`.
    pub pixel_format: Option<String>,
    /// Output codec passed as `-vcodec`.
    pub video_codec: Option<String>,
    /// Filter graph passed as `-vf`.
    pub video_filter: Option<String>,
    /// Encoder log level passed as `-loglevel`.
    pub loglevel: Option<String>,
    /// Rotation in degrees, stamped in a second pass after recording.
    pub rotate: Option<i32>,
    /// Input URL for non-screen-grab backends.
    pub input_url: Option<String>,
}

impl CaptureConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// The values a session falls back to for anything the caller leaves unset.
    pub fn defaults() -> Self {
        Self {
            input_format: Some(InputFormat::X11Grab),
            fps: Some(DEFAULT_FPS),
            pixel_format: Some(DEFAULT_PIXEL_FORMAT.to_string()),
            display: Some(DEFAULT_DISPLAY.to_string()),
            port: Some(DEFAULT_PORT),
            ..Self::default()
        }
    }

    /// Fills every unset field from `fallback`. Values already set win.
    pub fn or(self, fallback: CaptureConfig) -> Self {
        Self {
            input_format: self.input_format.or(fallback.input_format),
            display: self.display.or(fallback.display),
            hostname: self.hostname.or(fallback.hostname),
            port: self.port.or(fallback.port),
            fps: self.fps.or(fallback.fps),
            resolution: self.resolution.or(fallback.resolution),
            pixel_format: self.pixel_format.or(fallback.pixel_format),
            video_codec: self.video_codec.or(fallback.video_codec),
            video_filter: self.video_filter.or(fallback.video_filter),
            loglevel: self.loglevel.or(fallback.loglevel),
            rotate: self.rotate.or(fallback.rotate),
            input_url: self.input_url.or(fallback.input_url),
        }
    }

    pub fn with_defaults(self) -> Self {
        self.or(Self::defaults())
    }

    /// Rotation to stamp after recording. Zero counts as no rotation.
    pub fn requested_rotation(&self) -> Option<i32> {
        self.rotate.filter(|degrees| *degrees != 0)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    pub fn with_input_format(mut self, format: impl Into<InputFormat>) -> Self {
        self.input_format = Some(format.into());
        self
    }

    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }

    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = Some(fps);
        self
    }

    pub fn with_resolution(mut self, resolution: impl Into<String>) -> Self {
        self.resolution = Some(resolution.into());
        self
    }

    pub fn with_pixel_format(mut self, pixel_format: impl Into<String>) -> Self {
        self.pixel_format = Some(pixel_format.into());
        self
    }

    pub fn with_video_codec(mut self, codec: impl Into<String>) -> Self {
        self.video_codec = Some(codec.into());
        self
    }

    pub fn with_video_filter(mut self, filter: impl Into<String>) -> Self {
        self.video_filter = Some(filter.into());
        self
    }

    pub fn with_loglevel(mut self, loglevel: impl Into<String>) -> Self {
        self.loglevel = Some(loglevel.into());
        self
    }

    pub fn with_rotate(mut self, degrees: i32) -> Self {
        self.rotate = Some(degrees);
        self
    }

    pub fn with_input_url(mut self, url: impl Into<String>) -> Self {
        self.input_url = Some(url.into());
        self
    }
}

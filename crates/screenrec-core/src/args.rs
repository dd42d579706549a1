//! Encoder argument building.
//!
//! The encoder reads flag/value pairs left to right and a later flag can
//! override an earlier global one, so the order below is fixed:
//! overwrite, log level, capture size, frame rate, input format, input,
//! filter, codec, pixel format, output path.

use std::fmt;
use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;

use crate::config::CaptureConfig;
use crate::config::DEFAULT_DISPLAY;

const OVERWRITE_FLAG: &str = "-y";

/// Ordered, immutable argument list for one encoder invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentVector(Vec<String>);

impl ArgumentVector {
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }

    /// Value following the first occurrence of `flag`, if any.
    pub fn value_of(&self, flag: &str) -> Option<&str> {
        self.0
            .iter()
            .position(|arg| arg == flag)
            .and_then(|idx| self.0.get(idx + 1))
            .map(String::as_str)
    }
}

impl Deref for ArgumentVector {
    type Target = [String];

    fn deref(&self) -> &[String] {
        &self.0
    }
}

impl From<Vec<String>> for ArgumentVector {
    fn from(args: Vec<String>) -> Self {
        Self(args)
    }
}

impl<'a> IntoIterator for &'a ArgumentVector {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for ArgumentVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" "))
    }
}

/// Produces the `-i` locator for input formats other than the screen grab.
///
/// Network and device sources each spell their input differently, so the
/// caller decides. Closures work directly.
pub trait InputLocator: Send + Sync {
    fn locate(&self, config: &CaptureConfig) -> String;
}

impl<F> InputLocator for F
where
    F: Fn(&CaptureConfig) -> String + Send + Sync,
{
    fn locate(&self, config: &CaptureConfig) -> String {
        self(config)
    }
}

/// Default locator: the config's `input_url`, or nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfiguredUrl;

impl InputLocator for ConfiguredUrl {
    fn locate(&self, config: &CaptureConfig) -> String {
        config.input_url.clone().unwrap_or_default()
    }
}

#[derive(Clone)]
pub struct ArgumentBuilder {
    locator: Arc<dyn InputLocator>,
}

impl Default for ArgumentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ArgumentBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgumentBuilder").finish_non_exhaustive()
    }
}

impl ArgumentBuilder {
    pub fn new() -> Self {
        Self {
            locator: Arc::new(ConfiguredUrl),
        }
    }

    pub fn with_locator(mut self, locator: impl InputLocator + 'static) -> Self {
        self.locator = Arc::new(locator);
        self
    }

    pub fn with_shared_locator(mut self, locator: Arc<dyn InputLocator>) -> Self {
        self.locator = locator;
        self
    }

    /// Builds the capture invocation. Unset, empty, or zero fields emit
    /// nothing; no field emits more than one pair.
    pub fn build(&self, output_path: impl AsRef<Path>, config: &CaptureConfig) -> ArgumentVector {
        let mut args = vec![OVERWRITE_FLAG.to_string()];

        push_pair(&mut args, "-loglevel", config.loglevel.as_deref());
        push_pair(&mut args, "-video_size", config.resolution.as_deref());
        let fps = config.fps.filter(|fps| *fps > 0).map(|fps| fps.to_string());
        push_pair(&mut args, "-r", fps.as_deref());
        push_pair(
            &mut args,
            "-f",
            config.input_format.as_ref().map(|format| format.as_str()),
        );

        args.push("-i".to_string());
        args.push(self.input_locator(config));

        push_pair(&mut args, "-vf", config.video_filter.as_deref());
        push_pair(&mut args, "-vcodec", config.video_codec.as_deref());
        push_pair(&mut args, "-pix_fmt", config.pixel_format.as_deref());

        args.push(output_path.as_ref().to_string_lossy().into_owned());
        ArgumentVector(args)
    }

    fn input_locator(&self, config: &CaptureConfig) -> String {
        match &config.input_format {
            Some(format) if format.is_screen_grab() => format!(
                "{}:{}",
                config.hostname.as_deref().unwrap_or(""),
                config.display.as_deref().unwrap_or(DEFAULT_DISPLAY)
            ),
            _ => self.locator.locate(config),
        }
    }
}

fn push_pair(args: &mut Vec<String>, flag: &str, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        args.push(flag.to_string());
        args.push(value.to_string());
    }
}

/// Builds the capture invocation with the default locator.
pub fn build_arguments(output_path: impl AsRef<Path>, config: &CaptureConfig) -> ArgumentVector {
    ArgumentBuilder::new().build(output_path, config)
}

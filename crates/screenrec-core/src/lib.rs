//! Capture configuration and argument building for screenrec.
//!
//! This crate is pure data: it turns a [`CaptureConfig`] into the ordered
//! argument vector the external encoder expects. Nothing here spawns a
//! process or touches the filesystem beyond reading a config file.

#![deny(clippy::all)]

pub mod args;
pub mod config;

pub use args::ArgumentBuilder;
pub use args::ArgumentVector;
pub use args::ConfiguredUrl;
pub use args::InputLocator;
pub use args::build_arguments;
pub use config::CaptureConfig;
pub use config::ConfigError;
pub use config::DEFAULT_DISPLAY;
pub use config::DEFAULT_FPS;
pub use config::DEFAULT_PIXEL_FORMAT;
pub use config::DEFAULT_PORT;
pub use config::InputFormat;

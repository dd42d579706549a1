#![deny(clippy::all)]

pub mod color;
pub mod commands;
pub mod handlers;
pub mod telemetry;

pub use color::Colors;
pub use color::init as color_init;

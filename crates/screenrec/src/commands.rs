use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
pub use clap_complete::Shell;
use screenrec_core::CaptureConfig;
use screenrec_core::ConfigError;
use screenrec_core::InputFormat;

const LONG_ABOUT: &str = r#"screenrec records the screen by driving ffmpeg.

A recording runs until --duration elapses or Ctrl-C is pressed. Either way
ffmpeg is interrupted, finalizes the file, and exits; that exit counts as
success. With --rotate the finished file is stamped with rotation metadata
in a second, codec-copy pass.

ENVIRONMENT:
    SCREENREC_FFMPEG                 Encoder binary (default: ffmpeg)
    SCREENREC_INTERRUPT_EXIT_CODE    Exit status of an interrupted encoder (default: 255)
    SCREENREC_LOG                    Append logs to this file instead of stderr
    RUST_LOG                         Log filter, overrides --log-level

EXAMPLES:
    # Ten seconds of display :0 at 10 fps
    screenrec record ./test.mp4 --fps 10 --resolution 3286x1080 --video-codec h264 --duration 10

    # Record until Ctrl-C, rotated for a portrait monitor
    screenrec record ./portrait.mp4 --rotate 90 --duration 0

    # Show the ffmpeg invocation without recording
    screenrec args ./test.mp4 --config capture.json"#;

#[derive(Parser)]
#[command(name = "screenrec")]
#[command(author, version)]
#[command(about = "Record the screen through ffmpeg")]
#[command(long_about = LONG_ABOUT)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log level used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Disable colored output (also respects NO_COLOR env var)
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Record the screen into OUTPUT
    Record {
        /// File to write; overwritten if it exists
        output: PathBuf,

        /// Seconds to record before stopping; 0 records until Ctrl-C
        #[arg(short, long, default_value_t = 5, value_name = "SECS")]
        duration: u64,

        #[command(flatten)]
        capture: CaptureArgs,
    },

    /// Print the ffmpeg arguments a recording would use, one per line
    Args {
        /// File the recording would write
        output: PathBuf,

        #[command(flatten)]
        capture: CaptureArgs,
    },

    /// Generate shell completion scripts
    #[command(long_about = "Generate shell completion scripts.

INSTALLATION:
    Bash:  screenrec completions bash > /etc/bash_completion.d/screenrec
    Zsh:   screenrec completions zsh > \"${fpath[1]}/_screenrec\"
    Fish:  screenrec completions fish > ~/.config/fish/completions/screenrec.fish")]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Capture settings from the command line. Flags win over `--config`.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct CaptureArgs {
    /// JSON capture config with camelCase keys (inputFormat, pixelFormat, ...)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Capture backend (-f), e.g. x11grab
    #[arg(long, value_name = "FORMAT")]
    pub input_format: Option<String>,

    /// X11 display number
    #[arg(long)]
    pub display: Option<String>,

    /// X11 host; empty for the local display
    #[arg(long)]
    pub hostname: Option<String>,

    /// Port for network input sources
    #[arg(long)]
    pub port: Option<u16>,

    /// Frames per second
    #[arg(long)]
    pub fps: Option<u32>,

    /// Capture size, e.g. 1920x1080; must match the display for x11grab
    #[arg(long, value_name = "WxH")]
    pub resolution: Option<String>,

    /// Output pixel format
    #[arg(long, value_name = "FORMAT")]
    pub pixel_format: Option<String>,

    /// Output video codec
    #[arg(long, value_name = "CODEC")]
    pub video_codec: Option<String>,

    /// ffmpeg filter graph
    #[arg(long, value_name = "FILTER")]
    pub video_filter: Option<String>,

    /// ffmpeg log level
    #[arg(long, value_name = "LEVEL")]
    pub loglevel: Option<String>,

    /// Rotation in degrees stamped after recording
    #[arg(long, value_name = "DEGREES", allow_negative_numbers = true)]
    pub rotate: Option<i32>,

    /// Input URL for backends other than x11grab
    #[arg(long, value_name = "URL")]
    pub input_url: Option<String>,
}

impl CaptureArgs {
    /// Only the values given as flags.
    pub fn flags(&self) -> CaptureConfig {
        CaptureConfig {
            input_format: self.input_format.clone().map(InputFormat::from),
            display: self.display.clone(),
            hostname: self.hostname.clone(),
            port: self.port,
            fps: self.fps,
            resolution: self.resolution.clone(),
            pixel_format: self.pixel_format.clone(),
            video_codec: self.video_codec.clone(),
            video_filter: self.video_filter.clone(),
            loglevel: self.loglevel.clone(),
            rotate: self.rotate,
            input_url: self.input_url.clone(),
        }
    }

    /// Flags overlaid on the `--config` file. Defaults are not applied.
    pub fn resolve(&self) -> Result<CaptureConfig, ConfigError> {
        let flags = self.flags();
        match &self.config {
            Some(path) => Ok(flags.or(CaptureConfig::from_json_file(path)?)),
            None => Ok(flags),
        }
    }
}

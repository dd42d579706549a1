use std::io::IsTerminal;
use std::sync::OnceLock;

static NO_COLOR: OnceLock<bool> = OnceLock::new();

/// Status lines go to stderr, so that is the stream checked for a terminal.
/// `NO_COLOR` disables color whatever its value.
pub fn init(no_color_flag: bool) {
    let _ = NO_COLOR.set(color_disabled(
        no_color_flag,
        std::env::var_os("NO_COLOR").is_some(),
        std::io::stderr().is_terminal(),
    ));
}

fn color_disabled(no_color_flag: bool, no_color_env: bool, stderr_is_terminal: bool) -> bool {
    no_color_flag || no_color_env || !stderr_is_terminal
}

pub fn is_disabled() -> bool {
    *NO_COLOR.get().unwrap_or(&false)
}

mod codes {
    pub const RESET: &str = "\x1b[0m";
    pub const GREEN: &str = "\x1b[32m";
    pub const RED: &str = "\x1b[31m";
    pub const CYAN: &str = "\x1b[36m";
    pub const DIM: &str = "\x1b[90m";
}

pub struct Colors;

impl Colors {
    fn paint(code: &str, text: &str) -> String {
        if is_disabled() {
            text.to_string()
        } else {
            format!("{}{}{}", code, text, codes::RESET)
        }
    }

    pub fn success(text: &str) -> String {
        Self::paint(codes::GREEN, text)
    }

    pub fn error(text: &str) -> String {
        Self::paint(codes::RED, text)
    }

    pub fn info(text: &str) -> String {
        Self::paint(codes::CYAN, text)
    }

    pub fn dim(text: &str) -> String {
        Self::paint(codes::DIM, text)
    }
}

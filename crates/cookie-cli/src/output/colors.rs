//! ANSI styling for CLI output.
//!
//! Each output stream decides on its own whether it gets colors, so piping
//! stdout keeps warnings on a terminal stderr colored. `NO_COLOR` turns
//! styling off everywhere.

use std::env;
use std::io::{self, IsTerminal};

/// What a piece of output means
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Success,
    Warning,
    Error,
    Muted,
}

impl Style {
    fn sgr(self) -> &'static str {
        match self {
            Style::Success => "32",
            Style::Warning => "33",
            Style::Error => "31",
            Style::Muted => "2",
        }
    }
}

/// Stream the styled text is written to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

/// Whether styles are rendered for one output stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorSupport {
    enabled: bool,
}

impl ColorSupport {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Colors for `stream` when it is a terminal and `NO_COLOR` is unset or empty
    pub fn for_stream(stream: Stream) -> Self {
        let no_color = env::var_os("NO_COLOR").is_some_and(|value| !value.is_empty());
        let terminal = match stream {
            Stream::Stdout => io::stdout().is_terminal(),
            Stream::Stderr => io::stderr().is_terminal(),
        };
        Self::new(terminal && !no_color)
    }

    /// Render `text` in `style`, or unchanged when colors are off
    pub fn paint(&self, style: Style, text: &str) -> String {
        if self.enabled {
            format!("\x1b[{}m{}\x1b[0m", style.sgr(), text)
        } else {
            text.to_string()
        }
    }
}

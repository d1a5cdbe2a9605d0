//! Terminal output formatting.
//!
//! Status lines go to stdout; warnings and errors go to stderr so the
//! printed entry URL can be piped on its own.

pub mod colors;
pub mod errors;

use colors::{ColorSupport, Stream, Style};

/// Output handler for consistent terminal formatting
pub struct OutputHandler {
    stdout: ColorSupport,
    stderr: ColorSupport,
}

impl OutputHandler {
    /// Create a new output handler
    pub fn new() -> Self {
        Self {
            stdout: ColorSupport::for_stream(Stream::Stdout),
            stderr: ColorSupport::for_stream(Stream::Stderr),
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        println!("{}", self.stdout.paint(Style::Muted, message));
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        println!("{} {}", self.stdout.paint(Style::Success, "✓"), message);
    }

    /// Print a warning, such as the update advisory
    pub fn warn(&self, message: &str) {
        eprintln!("{}", self.stderr.paint(Style::Warning, &format!("⚠ {}", message)));
    }

    /// Print a step message with emoji
    pub fn step(&self, emoji: &str, message: &str) {
        println!("{} {}", emoji, message);
    }
}

impl Default for OutputHandler {
    fn default() -> Self {
        Self::new()
    }
}

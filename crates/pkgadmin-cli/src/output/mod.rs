//! Terminal output formatting.
//!
//! Command results (metadata documents, listings) go to stdout so they can be
//! piped; status messages go to stderr.

use std::io::{self, Write};

use serde::Serialize;

pub mod colors;
pub mod errors;

/// Output handler for consistent terminal formatting
pub struct OutputHandler {
    colors: colors::ColorSupport,
}

impl OutputHandler {
    pub fn new() -> Self {
        Self {
            colors: colors::ColorSupport::detect(),
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        eprintln!("{}", self.colors.dim(message));
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        eprintln!("{} {}", self.colors.green("✓"), message);
    }

    /// Print a value as pretty JSON on stdout
    pub fn json<T: Serialize>(&self, value: &T) -> serde_json::Result<()> {
        let rendered = serde_json::to_string_pretty(value)?;
        println!("{}", rendered);
        Ok(())
    }

    /// Print one entry per line on stdout
    pub fn lines(&self, entries: &[String]) {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        for entry in entries {
            // A closed pipe (e.g. `| head`) ends the listing early
            if writeln!(out, "{}", entry).is_err() {
                break;
            }
        }
    }
}

impl Default for OutputHandler {
    fn default() -> Self {
        Self::new()
    }
}

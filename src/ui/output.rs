//! ui::output
//!
//! Console output and lock record rendering.
//!
//! # Design
//!
//! Diagnostics (`debug`, `warn`, `error`) go to stderr and respect the
//! verbosity flags. Lock records are the command's result and go to the
//! sink handed to [`LockRenderer`], regardless of verbosity.

use std::fmt::Display;
use std::io::{self, Write};

use crate::core::types::LockRecord;

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Print a message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Print a debug message (only in debug mode).
pub fn debug(message: impl Display, verbosity: Verbosity) {
    if verbosity == Verbosity::Debug {
        eprintln!("[debug] {}", message);
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Print a warning message (respects quiet mode).
pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        eprintln!("warning: {}", message);
    }
}

/// How lock records are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// `Locked <path>` per record
    #[default]
    Text,
    /// One JSON object per line per record
    Json,
}

impl OutputMode {
    /// Pick the mode from the `--json` flag.
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputMode::Json
        } else {
            OutputMode::Text
        }
    }
}

/// Writes lock records to a sink in a fixed [`OutputMode`].
///
/// # Example
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use locksmith::core::types::LockRecord;
/// use locksmith::ui::output::{LockRenderer, OutputMode};
///
/// let record = LockRecord {
///     id: "1".into(),
///     path: "bar/baz".into(),
///     owner: None,
///     locked_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
/// };
///
/// let mut out = Vec::new();
/// LockRenderer::new(&mut out, OutputMode::Text).render(&[record]).unwrap();
/// assert_eq!(String::from_utf8(out).unwrap(), "Locked bar/baz\n");
/// ```
pub struct LockRenderer<W: Write> {
    sink: W,
    mode: OutputMode,
}

impl<W: Write> LockRenderer<W> {
    pub fn new(sink: W, mode: OutputMode) -> Self {
        Self { sink, mode }
    }

    /// Write every record in order, then flush.
    pub fn render(&mut self, records: &[LockRecord]) -> io::Result<()> {
        for record in records {
            self.render_one(record)?;
        }
        self.sink.flush()
    }

    fn render_one(&mut self, record: &LockRecord) -> io::Result<()> {
        match self.mode {
            OutputMode::Text => writeln!(self.sink, "Locked {}", record.path),
            OutputMode::Json => {
                serde_json::to_writer(&mut self.sink, record)?;
                writeln!(self.sink)
            }
        }
    }

    /// Consume the renderer and return the sink.
    pub fn into_inner(self) -> W {
        self.sink
    }
}

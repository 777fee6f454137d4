//! Assembly of text sources into one binary image.
//!
//! Sources are parsed in order into a single value store. Every statement that
//! parses is kept, so a source with errors still contributes the values
//! before and after the bad statement. Names already defined by an earlier
//! statement are reported and skipped.

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use cairn_foundation::{Error, Result};
use cairn_language::{Parser, Registry};
use cairn_machine::MachineState;
use tracing::debug;

/// One problem found while assembling.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// Name of the source the problem was found in.
    pub source: String,
    /// What went wrong.
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.source, self.message)
    }
}

/// Per-source summary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceReport {
    /// Name of the source.
    pub source: String,
    /// Values added to the image.
    pub loaded: usize,
    /// Problems found.
    pub errors: usize,
}

/// An image under construction.
#[derive(Debug)]
pub struct Assembly {
    registry: Registry,
    machine: MachineState,
    reports: Vec<SourceReport>,
    diagnostics: Vec<Diagnostic>,
}

impl Default for Assembly {
    fn default() -> Self {
        Self::new()
    }
}

impl Assembly {
    /// Creates an empty assembly using the standard registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: Registry::standard(),
            machine: MachineState::new(),
            reports: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Parses `text` and adds its values.
    pub fn add_source(&mut self, source: &str, text: &str) -> &SourceReport {
        let mut parser = Parser::new(text, &self.registry);
        let entries = parser.parse_program();
        let mut report = SourceReport {
            source: source.to_string(),
            loaded: 0,
            errors: 0,
        };

        for error in parser.take_errors() {
            report.errors += 1;
            self.diagnostics.push(Diagnostic {
                source: source.to_string(),
                message: error.to_string(),
            });
        }
        for (name, value) in entries {
            if self.machine.define(name.as_str(), value) {
                report.loaded += 1;
            } else {
                report.errors += 1;
                self.diagnostics.push(Diagnostic {
                    source: source.to_string(),
                    message: format!("value `{name}` is already defined"),
                });
            }
        }

        debug!(source, loaded = report.loaded, errors = report.errors, "assembled source");
        self.reports.push(report);
        &self.reports[self.reports.len() - 1]
    }

    /// Reads a file and adds its values.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read as UTF-8 text.
    pub fn add_file(&mut self, path: impl AsRef<Path>) -> Result<&SourceReport> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::io(format!("failed to read '{}': {e}", path.display())))?;
        Ok(self.add_source(&path.display().to_string(), &text))
    }

    /// Number of values in the image.
    #[must_use]
    pub fn len(&self) -> usize {
        self.machine.store().len()
    }

    /// Returns true if no value has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.machine.store().is_empty()
    }

    /// Returns true if any source had problems.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// Every problem found so far, in source order.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Per-source summaries, in the order sources were added.
    #[must_use]
    pub fn reports(&self) -> &[SourceReport] {
        &self.reports
    }

    /// The values assembled so far.
    #[must_use]
    pub fn machine(&self) -> &MachineState {
        &self.machine
    }

    /// Encodes the image.
    #[must_use]
    pub fn image(&self) -> Vec<u8> {
        self.machine.serialize()
    }

    /// Writes the image to `path`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .map_err(|e| Error::io(format!("failed to create '{}': {e}", path.display())))?;
        let mut writer = BufWriter::new(file);
        writer
            .write_all(&self.image())
            .and_then(|()| writer.flush())
            .map_err(|e| Error::io(format!("failed to write '{}': {e}", path.display())))
    }
}

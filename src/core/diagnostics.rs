//! Classification of a tool's diagnostic output into warnings and errors.
//!
//! Every non-blank line becomes one [`Diagnostic`]. Lines matching
//! `warning:` (any case) are warnings, everything else is an error. A line
//! starting with `<input>.v:<line>` for one of the design's Verilog inputs is
//! attributed to that file and line.
use std::io::Write;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

static WARNING_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)warning:").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub file: Option<String>,
    pub line: Option<u32>,
    pub message: String,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Default, Clone)]
pub struct ErrorReporter {
    all: Vec<(Severity, Diagnostic)>,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    errors: Vec<&'a Diagnostic>,
    warnings: Vec<&'a Diagnostic>,
}

impl ErrorReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(
        &mut self,
        is_warning: bool,
        message: impl Into<String>,
        file: Option<String>,
        line: Option<u32>,
    ) -> &mut Self {
        let severity = if is_warning {
            Severity::Warning
        } else {
            Severity::Error
        };
        self.all.push((
            severity,
            Diagnostic {
                file,
                line,
                message: message.into(),
            },
        ));
        self
    }

    pub fn add_warning(
        &mut self,
        message: impl Into<String>,
        file: Option<String>,
        line: Option<u32>,
    ) -> &mut Self {
        self.add(true, message, file, line)
    }

    pub fn add_error(
        &mut self,
        message: impl Into<String>,
        file: Option<String>,
        line: Option<u32>,
    ) -> &mut Self {
        self.add(false, message, file, line)
    }

    /// Classify every non-blank line of `text`.
    pub fn classify(&mut self, classifier: &DiagnosticClassifier, text: &str) -> &mut Self {
        for line in text.lines() {
            if let Some((is_warning, diagnostic)) = classifier.classify_line(line) {
                self.add(is_warning, diagnostic.message, diagnostic.file, diagnostic.line);
            }
        }
        self
    }

    pub fn all(&self) -> impl Iterator<Item = &Diagnostic> {
        self.all.iter().map(|(_, d)| d)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.with_severity(Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.with_severity(Severity::Warning)
    }

    fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &Diagnostic> {
        self.all
            .iter()
            .filter(move |(s, _)| *s == severity)
            .map(|(_, d)| d)
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn to_json(&self) -> Result<String> {
        let report = JsonReport {
            errors: self.errors().collect(),
            warnings: self.warnings().collect(),
        };
        Ok(serde_json::to_string(&report)?)
    }

    /// Write every message in order to `messages`, then the JSON summary to
    /// `json` when enabled.
    pub fn write_report<M: Write, J: Write>(
        &self,
        messages: &mut M,
        json: &mut J,
        print_json: bool,
    ) -> Result<()> {
        for diagnostic in self.all() {
            writeln!(messages, "{}", diagnostic.message)?;
        }
        debug!("JSON diagnostics enabled: {}", print_json);
        if print_json {
            writeln!(json, "{}", self.to_json()?)?;
        }
        Ok(())
    }

    /// Messages go to stderr, the JSON summary to stdout.
    pub fn report(&self, print_json: bool) -> Result<()> {
        let stderr = std::io::stderr();
        let stdout = std::io::stdout();
        self.write_report(&mut stderr.lock(), &mut stdout.lock(), print_json)
    }
}

/// Patterns for one design; the location pattern depends on its input files.
#[derive(Debug, Clone)]
pub struct DiagnosticClassifier {
    location: Option<Regex>,
}

impl DiagnosticClassifier {
    pub fn new<I, S>(input_files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let stems: Vec<String> = input_files
            .into_iter()
            .filter_map(|f| f.as_ref().strip_suffix(".v").map(regex::escape))
            .collect();

        let location = if stems.is_empty() {
            None
        } else {
            let pattern = format!(r"^({})\.v:(\d+)", stems.join("|"));
            // Escaped alternation of literals always compiles
            Regex::new(&pattern).ok()
        };

        Self { location }
    }

    /// `None` for blank lines, otherwise whether the line is a warning and
    /// the diagnostic it describes.
    pub fn classify_line(&self, line: &str) -> Option<(bool, Diagnostic)> {
        let message = line.trim_end();
        if message.trim().is_empty() {
            return None;
        }

        let is_warning = WARNING_RE.is_match(message);
        // A location only counts when its line number fits
        let (file, line) = self
            .location
            .as_ref()
            .and_then(|re| re.captures(message))
            .and_then(|caps| {
                let line = caps[2].parse::<u32>().ok()?;
                Some((Some(format!("{}.v", &caps[1])), Some(line)))
            })
            .unwrap_or((None, None));

        Some((
            is_warning,
            Diagnostic {
                file,
                line,
                message: message.to_string(),
            },
        ))
    }
}

//! Output Rendering
//!
//! Two output modes share this module:
//! - Text: the console report, each section preceded by a 20-dash separator
//! - JSON: a success or error envelope around the command's data
//!
//! # JSON Output Contract
//! - Success: `{"ok": true, "engine": "...", "command": "...", "data": {...}, "meta": {...}}`
//! - Error: `{"ok": false, "engine": "...", "command": "...", "error": {"code": "...", "message": "..."}}`

use serde::{Deserialize, Serialize};

use crate::error::GeoError;
use crate::report::{Report, SectionValue};

/// Line printed before every section
pub const SEPARATOR: &str = "--------------------";

/// Output format selected on the command line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Render the report as console text
///
/// List sections always print their separator, even when empty. Single-line
/// sections print nothing at all when the value is absent. The output ends
/// with a blank line.
#[must_use]
pub fn render_text(report: &Report) -> String {
    let mut out = String::new();

    for section in &report.sections {
        match &section.value {
            SectionValue::List(items) => {
                out.push_str(SEPARATOR);
                out.push('\n');
                for item in items {
                    out.push_str(item);
                    out.push('\n');
                }
            }
            SectionValue::Counts(counts) => {
                out.push_str(SEPARATOR);
                out.push('\n');
                for count in counts {
                    out.push_str(&count.to_string());
                    out.push('\n');
                }
            }
            SectionValue::Line(Some(line)) => {
                out.push_str(SEPARATOR);
                out.push('\n');
                out.push_str(line);
                out.push('\n');
            }
            SectionValue::Line(None) => {}
        }
    }

    out.push('\n');
    out
}

/// Success envelope for command results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessEnvelope<T> {
    /// Always true for success envelopes
    pub ok: bool,

    /// Engine used for this command (mongodb, memory)
    pub engine: String,

    /// Command that was executed (report, seed, connect)
    pub command: String,

    /// Command-specific data
    pub data: T,

    /// Execution metadata
    pub meta: Metadata,
}

impl<T> SuccessEnvelope<T> {
    pub fn new(engine: impl Into<String>, command: impl Into<String>, data: T, meta: Metadata) -> Self {
        Self { ok: true, engine: engine.into(), command: command.into(), data, meta }
    }
}

/// Error envelope for command failures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Always false for error envelopes
    pub ok: bool,

    pub engine: String,

    pub command: String,

    pub error: ErrorInfo,
}

impl ErrorEnvelope {
    pub fn new(engine: impl Into<String>, command: impl Into<String>, error: ErrorInfo) -> Self {
        Self { ok: false, engine: engine.into(), command: command.into(), error }
    }

    /// Create error envelope from a `GeoError`
    pub fn from_error(engine: impl Into<String>, command: impl Into<String>, err: &GeoError) -> Self {
        Self::new(engine, command, ErrorInfo::new(err.error_code(), err.message()))
    }
}

/// Error information structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable error code (e.g., "CONNECTION_FAILED")
    pub code: String,

    pub message: String,
}

impl ErrorInfo {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self { code: code.into(), message: message.into() }
    }
}

/// Execution metadata included in all success responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    /// Execution time in milliseconds
    pub execution_ms: u64,

    /// Number of report sections (report command only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sections: Option<usize>,
}

impl Metadata {
    #[must_use]
    pub const fn new(execution_ms: u64) -> Self {
        Self { execution_ms, sections: None }
    }

    #[must_use]
    pub const fn with_sections(execution_ms: u64, sections: usize) -> Self {
        Self { execution_ms, sections: Some(sections) }
    }
}

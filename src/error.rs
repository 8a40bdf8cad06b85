/*!
 * Error handling for CCN library operations
 *
 * Canonicalization and type inference failures are reported synchronously to
 * the caller with enough context to explain what was wrong with the input.
 * Decoding never fails: unknown table entries are reported as sentinel values.
 */

use std::fmt;
use thiserror::Error;
use serde::{Serialize, Deserialize};

/// CCN library result type
pub type Result<T> = std::result::Result<T, CcnError>;

/// Error types with context and suggestions
#[derive(Error, Debug)]
pub enum CcnError {
    /// Cleaned input contains a character outside `A-Z` / `0-9`
    #[error("Invalid character '{character}' at position {position} in CCN '{input}'")]
    InvalidCharacter {
        input: String,
        character: char,
        /// 1-indexed position within the cleaned input
        position: usize,
    },

    /// Cleaned input is longer than the target canonical length
    #[error("CCN cannot be more than {max_length} characters in length (got {length} in '{input}')")]
    TooLong {
        input: String,
        length: usize,
        max_length: usize,
    },

    /// Numeric input below zero
    #[error("CCNs cannot be negative (got {value})")]
    NegativeValue {
        value: String,
    },

    /// Numeric input that cannot be exactly converted to an integer
    #[error("CCN value {value} cannot be exactly converted to an integer")]
    NonIntegral {
        value: String,
    },

    /// Canonical string length matches no known CCN type
    #[error("CCN type cannot be inferred from '{code}': length {length} is neither 6 nor 10")]
    UnknownLength {
        code: String,
        length: usize,
    },

    /// Six-character code whose letters and digits match no provider layout
    #[error("CCN type cannot be inferred from '{code}'")]
    AmbiguousOrInvalid {
        code: String,
    },

    /// File I/O errors
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// CSV parsing errors with location information
    #[error("CSV parsing error at line {line:?}: {message}")]
    CsvParse {
        message: String,
        line: Option<usize>,
    },

    /// Column requested for batch processing is not in the CSV header
    #[error("Column '{column}' not found in CSV header")]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },

    /// Serialization errors while exporting results
    #[error("Serialization error ({format}): {message}")]
    Serialization {
        message: String,
        format: OutputFormat,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        suggestion: Option<String>,
    },
}

/// Output format for exported batch results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    JsonLines,
    Csv,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "JSON"),
            OutputFormat::JsonLines => write!(f, "JSON Lines"),
            OutputFormat::Csv => write!(f, "CSV"),
        }
    }
}

impl CcnError {
    /// Create an invalid character error
    pub fn invalid_character(input: &str, character: char, position: usize) -> Self {
        Self::InvalidCharacter {
            input: input.to_string(),
            character,
            position,
        }
    }

    /// Create a too-long error for a cleaned input
    pub fn too_long(input: &str, max_length: usize) -> Self {
        Self::TooLong {
            input: input.to_string(),
            length: input.chars().count(),
            max_length,
        }
    }

    /// Create a missing column error listing the columns that were found
    pub fn missing_column(column: &str, available: &[String]) -> Self {
        Self::MissingColumn {
            column: column.to_string(),
            available: available.to_vec(),
        }
    }

    /// Short, stable name of the error kind, used for grouping in statistics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidCharacter { .. } => "invalid_character",
            Self::TooLong { .. } => "too_long",
            Self::NegativeValue { .. } => "negative_value",
            Self::NonIntegral { .. } => "non_integral",
            Self::UnknownLength { .. } => "unknown_length",
            Self::AmbiguousOrInvalid { .. } => "ambiguous_or_invalid",
            Self::Io { .. } => "io",
            Self::CsvParse { .. } => "csv_parse",
            Self::MissingColumn { .. } => "missing_column",
            Self::Serialization { .. } => "serialization",
            Self::Configuration { .. } => "configuration",
        }
    }

    /// Whether the error was raised while canonicalizing raw input
    pub fn is_canonicalization_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidCharacter { .. }
                | Self::TooLong { .. }
                | Self::NegativeValue { .. }
                | Self::NonIntegral { .. }
        )
    }

    /// Whether the error was raised while inferring the CCN type
    pub fn is_inference_error(&self) -> bool {
        matches!(self, Self::UnknownLength { .. } | Self::AmbiguousOrInvalid { .. })
    }

    /// Get a user-friendly error message with suggestions
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidCharacter { .. } => {
                format!("{}\n\nSuggestion: CCNs contain only letters A-Z and digits 0-9. \
                    A single hyphen after the state code (e.g. '12-3456') is accepted.", self)
            }
            Self::TooLong { max_length, .. } => {
                let hint = if *max_length == crate::constants::PROVIDER_CCN_LENGTH {
                    "Provider CCNs have 6 characters; supplier CCNs have 10."
                } else {
                    "Supplier CCNs have at most 10 characters."
                };
                format!("{}\n\nSuggestion: {}", self, hint)
            }
            Self::UnknownLength { .. } | Self::AmbiguousOrInvalid { .. } => {
                format!("{}\n\nSuggestion: If the CCN type is known, parse it as that type explicitly.", self)
            }
            Self::MissingColumn { available, .. } => {
                format!("{}\n\nAvailable columns: {}", self, available.join(", "))
            }
            Self::Configuration { suggestion: Some(sug), .. } => {
                format!("{}\n\nSuggestion: {}", self, sug)
            }
            _ => self.to_string(),
        }
    }
}

// Convenience conversions
impl From<std::io::Error> for CcnError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<csv::Error> for CcnError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map(|pos| pos.line() as usize);
        Self::CsvParse {
            message: err.to_string(),
            line,
        }
    }
}

impl From<serde_json::Error> for CcnError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
            format: OutputFormat::Json,
        }
    }
}

//! Conversion options and result record.
//!
//! The CLI (or any other caller) builds a [`ConversionConfig`] and hands it
//! to the converter by value. Nothing in the core reads arguments or the
//! environment.

use std::fmt;
use std::str::FromStr;

use crate::error::{ConfigurationError, RuleFailure};
use crate::version::SafariVersion;

/// Size of the smallest payload the limiter can emit: `[]`.
pub const EMPTY_PAYLOAD_LEN: usize = 2;

/// Output form of the advanced blocking payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdvancedBlockingFormat {
    /// JSON array of entries
    #[default]
    Json,
    /// Source rule texts, one per line
    Txt,
}

impl AdvancedBlockingFormat {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Txt => "txt",
        }
    }
}

impl FromStr for AdvancedBlockingFormat {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "txt" => Ok(Self::Txt),
            _ => Err(ConfigurationError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for AdvancedBlockingFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for one conversion call.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionConfig {
    pub safari_version: SafariVersion,
    /// Merge and deduplicate entries
    pub optimize: bool,
    /// Produce the advanced blocking payload
    pub advanced_blocking: bool,
    pub advanced_blocking_format: AdvancedBlockingFormat,
    /// Byte budget of the native payload, `None` for unbounded
    pub max_json_size_bytes: Option<usize>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            safari_version: SafariVersion::default(),
            optimize: false,
            advanced_blocking: false,
            advanced_blocking_format: AdvancedBlockingFormat::Json,
            max_json_size_bytes: None,
        }
    }
}

impl ConversionConfig {
    /// Checks options that cannot be enforced by their types.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if let Some(limit) = self.max_json_size_bytes {
            if limit < EMPTY_PAYLOAD_LEN {
                return Err(ConfigurationError::SizeBudgetTooSmall(limit));
            }
        }
        Ok(())
    }
}

/// Everything a conversion call produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionResult {
    /// Native content blocker JSON (compact)
    pub converted: String,
    /// Rules converted without error
    pub converted_count: usize,
    /// Rules that failed to parse, compile or fit the target version
    pub errors_count: usize,
    /// Native entries before size limiting
    pub total_converted_count: usize,
    /// Native entries present in `converted`
    pub entries_count: usize,
    /// At least one entry was dropped to respect the size or rule limit
    pub over_limit: bool,
    /// Advanced blocking payload, when requested
    pub advanced_blocking: Option<String>,
    pub advanced_blocking_count: usize,
    pub failures: Vec<RuleFailure>,
}

impl ConversionResult {
    pub fn empty() -> Self {
        Self {
            converted: "[]".to_string(),
            converted_count: 0,
            errors_count: 0,
            total_converted_count: 0,
            entries_count: 0,
            over_limit: false,
            advanced_blocking: None,
            advanced_blocking_count: 0,
            failures: Vec::new(),
        }
    }
}

//! Content Blocker Converter Core Library
//!
//! Shared vocabulary of the converter: Safari's content blocker schema,
//! conversion options and results, the error taxonomy and the logging hook
//! the pipeline reports through.
//!
//! # Modules
//!
//! - `types`: action, resource and load type enumerations
//! - `entry`: `{trigger, action}` entries as serialized for Safari
//! - `version`: target Safari version and its feature gates
//! - `config`: conversion options and the result record
//! - `error`: fatal and per-rule errors
//! - `logger`: injectable diagnostics sink
//! - `url`: host helpers
//! - `matcher`: evaluates entries against requests with Safari's ordering rules

pub mod config;
pub mod entry;
pub mod error;
pub mod logger;
pub mod matcher;
pub mod types;
pub mod url;
pub mod version;

// Re-export commonly used types
pub use config::{AdvancedBlockingFormat, ConversionConfig, ConversionResult};
pub use entry::{Action, DomainCondition, Entry, Trigger, MATCH_ALL_URLS};
pub use error::{
    CompileError, ConfigurationError, ConversionError, ParseError, RuleError, RuleFailure,
};
pub use logger::{ConversionLogger, LogFacade, MemoryLogger, NoopLogger};
pub use matcher::{Matcher, RequestContext, TriggerMatcher};
pub use types::{ActionType, LoadTypes, ResourceTypes};
pub use version::SafariVersion;

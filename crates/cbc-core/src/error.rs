//! Error taxonomy.
//!
//! `ConversionError` aborts a conversion. `RuleError` only ever costs the
//! rule that produced it and is accumulated by the pipeline.

/// Fatal error returned by a conversion call.
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("invalid configuration: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("failed to serialize payload: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Invalid option detected before any rule is read.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("unsupported advanced blocking format: {0}")]
    UnsupportedFormat(String),
    #[error("unsupported Safari version: {0}")]
    UnsupportedVersion(String),
    #[error("max json size of {0} bytes cannot hold an empty rule list")]
    SizeBudgetTooSmall(usize),
}

/// Why a single rule could not be converted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error("not supported by Safari {version}: {reason}")]
    Unsupported { version: String, reason: String },
}

/// Malformed rule text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("empty pattern")]
    EmptyPattern,
    #[error("unknown syntax")]
    UnknownSyntax,
    #[error("unknown modifier: {0}")]
    UnknownModifier(String),
    #[error("malformed modifier: {0}")]
    MalformedModifier(String),
    #[error("modifier {0} is only allowed on exception rules")]
    ExceptionOnlyModifier(String),
    #[error("invalid domain: {0}")]
    InvalidDomain(String),
    #[error("invalid regular expression: {0}")]
    InvalidRegex(String),
    #[error("malformed scriptlet: {0}")]
    MalformedScriptlet(String),
    #[error("invalid selector: {0}")]
    InvalidSelector(String),
}

/// Valid rule that has no representation in the target schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    #[error("unsupported modifier: {0}")]
    UnsupportedModifier(String),
    #[error("regular expression uses an unsupported construct: {0}")]
    UnsupportedRegex(String),
    #[error("pattern contains non-ASCII characters")]
    NonAsciiPattern,
    #[error("rule restricts and excludes the same domains, nothing is left to match")]
    ConflictingDomains,
    #[error("none of the rule's resource types exist in Safari")]
    AllResourceTypesDropped,
    #[error("empty selector")]
    EmptySelector,
    #[error("rule requires advanced blocking, which is disabled")]
    AdvancedBlockingDisabled,
}

/// Recoverable failure of one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleFailure {
    /// Zero-based index of the line in the input.
    pub line: usize,
    pub text: String,
    pub error: RuleError,
}

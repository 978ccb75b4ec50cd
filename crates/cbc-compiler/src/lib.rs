//! Content Blocker Converter
//!
//! This crate compiles ABP/uBO/AdGuard filter rules into Safari content
//! blocker JSON, plus an advanced blocking payload for what Safari cannot
//! express natively.

pub mod advanced;
pub mod compiler;
pub mod converter;
pub mod cosmetic;
pub mod limiter;
pub mod optimizer;
pub mod parser;
pub mod pattern;
pub mod rule;
pub mod version_filter;

pub use advanced::{compile_advanced, render_advanced, AdvancedCompiled};
pub use compiler::{compile_rule, CompiledEntry, EntryGroup};
pub use converter::convert_array;
pub use cosmetic::apply_cosmetic_exceptions;
pub use limiter::{limit_and_serialize, LimitedPayload};
pub use optimizer::{apply_badfilters, optimize_entries, OptimizeStats};
pub use parser::{parse_rule, parse_rules, ParsedRules};
pub use rule::{Rule, RuleKind};
pub use version_filter::{filter_for_version, VersionFiltered};

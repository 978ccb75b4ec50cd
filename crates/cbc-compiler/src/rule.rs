//! Typed representation of one filter line.

use std::fmt;

/// What a rule does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    /// URL blocking rule
    Network,
    /// `@@` URL exception
    Exception,
    /// Element hiding, extended CSS, CSS or script injection
    Cosmetic,
    /// `##+js(...)` / `#%#//scriptlet(...)`
    Scriptlet,
}

/// Flavour of a cosmetic rule, given by its marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CosmeticType {
    /// `##` with a selector Safari understands
    ElementHiding,
    /// `#?#`, or `##` using extended pseudo-classes
    ExtendedCss,
    /// `#$#`
    CssInject,
    /// `#%#`
    Script,
}

// =============================================================================
// Content Types (filter syntax vocabulary)
// =============================================================================

bitflags::bitflags! {
    /// Request types as spelled in filter options.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ContentType: u16 {
        const SCRIPT = 1 << 0;
        const IMAGE = 1 << 1;
        const STYLESHEET = 1 << 2;
        const OBJECT = 1 << 3;
        const SUBDOCUMENT = 1 << 4;
        const XMLHTTPREQUEST = 1 << 5;
        const MEDIA = 1 << 6;
        const FONT = 1 << 7;
        const WEBSOCKET = 1 << 8;
        const WEBRTC = 1 << 9;
        const PING = 1 << 10;
        const OTHER = 1 << 11;
        const DOCUMENT = 1 << 12;
        const POPUP = 1 << 13;

        /// Types a rule without type options applies to, restricted to the
        /// ones Safari can tell apart. Negated options are taken from here.
        const DEFAULT = Self::SCRIPT.bits()
            | Self::IMAGE.bits()
            | Self::STYLESHEET.bits()
            | Self::SUBDOCUMENT.bits()
            | Self::XMLHTTPREQUEST.bits()
            | Self::MEDIA.bits()
            | Self::FONT.bits()
            | Self::WEBSOCKET.bits()
            | Self::PING.bits()
            | Self::OTHER.bits()
            | Self::DOCUMENT.bits();
    }
}

// =============================================================================
// Exception Scopes
// =============================================================================

bitflags::bitflags! {
    /// Page-level behaviours an `@@` rule can switch off.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ExceptionScope: u8 {
        const DOCUMENT = 1 << 0;
        const ELEMHIDE = 1 << 1;
        const GENERICHIDE = 1 << 2;
        const JSINJECT = 1 << 3;
        const CONTENT = 1 << 4;
        const URLBLOCK = 1 << 5;
        const GENERICBLOCK = 1 << 6;
    }
}

// =============================================================================
// Modifiers
// =============================================================================

/// `domain=` option, or the domain list in front of a cosmetic marker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct DomainList {
    pub permitted: Vec<String>,
    pub restricted: Vec<String>,
}

impl DomainList {
    pub fn is_empty(&self) -> bool {
        self.permitted.is_empty() && self.restricted.is_empty()
    }
}

/// Parsed rule options.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub domains: DomainList,
    /// `None` when the rule applies to every request type
    pub content_types: Option<ContentType>,
    /// `Some(true)` for third-party only, `Some(false)` for first-party only
    pub third_party: Option<bool>,
    pub match_case: bool,
    pub important: bool,
    pub badfilter: bool,
    pub exception_scope: ExceptionScope,
    /// Recognised options with no content blocker equivalent
    pub unsupported: Vec<String>,
}

/// Scriptlet call: name and arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Scriptlet {
    pub name: String,
    pub args: Vec<String>,
}

// =============================================================================
// Rule
// =============================================================================

/// One parsed filter line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Zero-based line index in the input
    pub line: usize,
    pub text: String,
    pub kind: RuleKind,
    /// URL pattern for network rules, rule body for cosmetic rules,
    /// scriptlet name for scriptlets
    pub pattern: String,
    pub modifiers: Modifiers,
    pub cosmetic: Option<CosmeticType>,
    /// `#@#`-style exception of a cosmetic or scriptlet rule
    pub cosmetic_exception: bool,
    pub scriptlet: Option<Scriptlet>,
}

impl Rule {
    /// Pattern written as `/regex/`.
    pub fn is_regex(&self) -> bool {
        matches!(self.kind, RuleKind::Network | RuleKind::Exception)
            && is_regex_pattern(&self.pattern)
    }

    /// Rule that only the advanced blocking payload can carry.
    pub fn is_advanced(&self) -> bool {
        match self.kind {
            RuleKind::Scriptlet => true,
            RuleKind::Cosmetic => self.cosmetic != Some(CosmeticType::ElementHiding),
            _ => false,
        }
    }

    pub fn is_exception(&self) -> bool {
        self.kind == RuleKind::Exception || self.cosmetic_exception
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

pub(crate) fn is_regex_pattern(pattern: &str) -> bool {
    pattern.len() > 2 && pattern.starts_with('/') && pattern.ends_with('/')
}

//! Content blocker entries: the `{trigger, action}` pairs Safari consumes.
//!
//! These structs contain schema fields only. Anything the compiler needs
//! while building or optimizing (shortcuts, priority groups, source rules)
//! lives on the compiler's own working type, so whatever reaches the
//! encoder is exactly what Safari will read.

use serde::Serialize;

use crate::types::{ActionType, LoadTypes, ResourceTypes};

/// Regex that matches every URL.
pub const MATCH_ALL_URLS: &str = ".*";

// =============================================================================
// Trigger
// =============================================================================

/// Domain restriction of a trigger.
///
/// Safari rejects triggers carrying both `if-domain` and `unless-domain`,
/// so the two directions are variants of one field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum DomainCondition {
    #[serde(rename = "if-domain")]
    If(Vec<String>),
    #[serde(rename = "unless-domain")]
    Unless(Vec<String>),
}

impl DomainCondition {
    pub fn domains(&self) -> &[String] {
        match self {
            Self::If(domains) | Self::Unless(domains) => domains,
        }
    }
}

/// Matching condition of an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Trigger {
    #[serde(rename = "url-filter")]
    pub url_filter: String,
    #[serde(flatten)]
    pub domains: Option<DomainCondition>,
    #[serde(rename = "resource-type", skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<ResourceTypes>,
    #[serde(rename = "load-type", skip_serializing_if = "Option::is_none")]
    pub load_type: Option<LoadTypes>,
    #[serde(
        rename = "url-filter-is-case-sensitive",
        skip_serializing_if = "is_false"
    )]
    pub case_sensitive: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Default for Trigger {
    fn default() -> Self {
        Self::new(MATCH_ALL_URLS)
    }
}

impl Trigger {
    pub fn new(url_filter: impl Into<String>) -> Self {
        Self {
            url_filter: url_filter.into(),
            domains: None,
            resource_type: None,
            load_type: None,
            case_sensitive: false,
        }
    }

    /// Restrict the trigger to the given page domains.
    /// An empty list leaves the trigger unrestricted.
    pub fn with_if_domain(mut self, domains: Vec<String>) -> Self {
        self.domains = (!domains.is_empty()).then_some(DomainCondition::If(domains));
        self
    }

    /// Exclude the given page domains.
    /// An empty list leaves the trigger unrestricted.
    pub fn with_unless_domain(mut self, domains: Vec<String>) -> Self {
        self.domains = (!domains.is_empty()).then_some(DomainCondition::Unless(domains));
        self
    }

    pub fn if_domain(&self) -> Option<&[String]> {
        match &self.domains {
            Some(DomainCondition::If(domains)) => Some(domains),
            _ => None,
        }
    }

    pub fn unless_domain(&self) -> Option<&[String]> {
        match &self.domains {
            Some(DomainCondition::Unless(domains)) => Some(domains),
            _ => None,
        }
    }

    pub fn matches_all_urls(&self) -> bool {
        self.url_filter == MATCH_ALL_URLS
    }
}

// =============================================================================
// Action
// =============================================================================

/// Effect applied when a trigger matches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub action_type: ActionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub css: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scriptlet: Option<String>,
    #[serde(rename = "scriptletParam", skip_serializing_if = "Option::is_none")]
    pub scriptlet_param: Option<String>,
}

impl Action {
    pub fn new(action_type: ActionType) -> Self {
        Self {
            action_type,
            selector: None,
            css: None,
            script: None,
            scriptlet: None,
            scriptlet_param: None,
        }
    }

    pub fn block() -> Self {
        Self::new(ActionType::Block)
    }

    pub fn ignore_previous_rules() -> Self {
        Self::new(ActionType::IgnorePreviousRules)
    }

    pub fn css_display_none(selector: impl Into<String>) -> Self {
        Self {
            selector: Some(selector.into()),
            ..Self::new(ActionType::CssDisplayNone)
        }
    }

    pub fn css_extended(css: impl Into<String>) -> Self {
        Self {
            css: Some(css.into()),
            ..Self::new(ActionType::CssExtended)
        }
    }

    pub fn css_inject(css: impl Into<String>) -> Self {
        Self {
            css: Some(css.into()),
            ..Self::new(ActionType::CssInject)
        }
    }

    pub fn script(script: impl Into<String>) -> Self {
        Self {
            script: Some(script.into()),
            ..Self::new(ActionType::Script)
        }
    }

    pub fn scriptlet(name: impl Into<String>, param: impl Into<String>) -> Self {
        Self {
            scriptlet: Some(name.into()),
            scriptlet_param: Some(param.into()),
            ..Self::new(ActionType::Scriptlet)
        }
    }
}

// =============================================================================
// Entry
// =============================================================================

/// One content blocker rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Entry {
    pub trigger: Trigger,
    pub action: Action,
}

impl Entry {
    pub fn new(trigger: Trigger, action: Action) -> Self {
        Self { trigger, action }
    }
}

//! Rule to content blocker entry compilation.

use cbc_core::error::CompileError;
use cbc_core::{
    Action, ConversionLogger, DomainCondition, Entry, LoadTypes, ResourceTypes, Trigger,
    MATCH_ALL_URLS,
};

use crate::pattern::{extract_host, extract_shortcut, to_url_filter};
use crate::rule::{ContentType, CosmeticType, DomainList, ExceptionScope, Rule, RuleKind};

// =============================================================================
// Priority Groups
// =============================================================================

/// Output position class of an entry.
///
/// Safari evaluates the list top to bottom and `ignore-previous-rules` only
/// cancels what came before it, so exceptions must follow the rules they
/// override. Variants are declared in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntryGroup {
    /// Element hiding with no domain restriction
    CssWide,
    /// Element hiding with `unless-domain` only
    CssGenericDomainSensitive,
    /// `$generichide` exceptions
    GenericHideExceptions,
    /// Element hiding bound to `if-domain`
    CssDomainSensitive,
    /// `$elemhide` exceptions
    ElemhideExceptions,
    UrlBlocking,
    /// Plain `@@` exceptions
    OtherExceptions,
    /// `$important` blocking rules
    Important,
    /// `@@...$important`
    ImportantExceptions,
    /// `$document` exceptions, which switch everything off
    DocumentExceptions,
}

/// Entry plus the working state the optimizer needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledEntry {
    pub entry: Entry,
    /// Literal every matching URL contains
    pub shortcut: Option<String>,
    /// Literal host of a `||host` pattern
    pub host: Option<String>,
    /// Pattern is exactly `||host^`
    pub pure_host: bool,
    pub group: EntryGroup,
    /// Input lines that produced the entry
    pub sources: Vec<usize>,
}

impl CompiledEntry {
    fn new(entry: Entry, group: EntryGroup, source: usize) -> Self {
        Self {
            entry,
            shortcut: None,
            host: None,
            pure_host: false,
            group,
            sources: vec![source],
        }
    }

    fn with_host(mut self, pattern: &str) -> Self {
        if let Some((host, pure)) = extract_host(pattern) {
            self.host = Some(host);
            self.pure_host = pure;
        }
        self
    }
}

// =============================================================================
// Compilation
// =============================================================================

/// Compile a rule into native entries.
///
/// Rules only the advanced blocking payload can carry, and cosmetic
/// exceptions, produce no entries.
pub fn compile_rule(
    rule: &Rule,
    logger: &dyn ConversionLogger,
) -> Result<Vec<CompiledEntry>, CompileError> {
    match rule.kind {
        RuleKind::Network => compile_network(rule, logger),
        RuleKind::Exception => compile_exception(rule, logger),
        RuleKind::Cosmetic => compile_cosmetic(rule),
        RuleKind::Scriptlet => Ok(Vec::new()),
    }
}

fn compile_network(
    rule: &Rule,
    logger: &dyn ConversionLogger,
) -> Result<Vec<CompiledEntry>, CompileError> {
    let group = if rule.modifiers.important {
        EntryGroup::Important
    } else {
        EntryGroup::UrlBlocking
    };
    let entry = compile_url_entry(rule, Action::block(), group, logger)?;
    Ok(vec![entry])
}

fn compile_exception(
    rule: &Rule,
    logger: &dyn ConversionLogger,
) -> Result<Vec<CompiledEntry>, CompileError> {
    let scope = rule.modifiers.exception_scope;

    if scope.contains(ExceptionScope::URLBLOCK) {
        return Err(CompileError::UnsupportedModifier("urlblock".to_string()));
    }
    if scope.contains(ExceptionScope::GENERICBLOCK) {
        return Err(CompileError::UnsupportedModifier("genericblock".to_string()));
    }
    ensure_supported(rule)?;

    let group = if scope.contains(ExceptionScope::DOCUMENT) {
        EntryGroup::DocumentExceptions
    } else if scope.contains(ExceptionScope::ELEMHIDE) {
        EntryGroup::ElemhideExceptions
    } else if scope.contains(ExceptionScope::GENERICHIDE) {
        EntryGroup::GenericHideExceptions
    } else if !scope.is_empty() {
        // $content and $jsinject have no native counterpart
        return Ok(Vec::new());
    } else {
        let group = if rule.modifiers.important {
            EntryGroup::ImportantExceptions
        } else {
            EntryGroup::OtherExceptions
        };
        let entry = compile_url_entry(rule, Action::ignore_previous_rules(), group, logger)?;
        return Ok(vec![entry]);
    };

    let trigger = page_scope_trigger(rule)?;
    let compiled = CompiledEntry::new(
        Entry::new(trigger, Action::ignore_previous_rules()),
        group,
        rule.line,
    );
    Ok(vec![compiled.with_host(&rule.pattern)])
}

/// Trigger of a page-level exception (`$document`, `$elemhide`, ...).
///
/// A `||host^` pattern without `$domain` names the page itself, so it
/// applies to the host and its subdomains wherever the page loads from.
pub(crate) fn page_scope_trigger(rule: &Rule) -> Result<Trigger, CompileError> {
    ensure_supported(rule)?;
    if rule.modifiers.domains.is_empty() {
        if let Some((host, true)) = extract_host(&rule.pattern) {
            return Ok(Trigger::default().with_if_domain(vec![format!("*{host}")]));
        }
    }

    let mut trigger = Trigger::new(to_url_filter(&rule.pattern)?);
    trigger.domains = domain_condition(&rule.modifiers.domains)?;
    trigger.case_sensitive = rule.modifiers.match_case;
    Ok(trigger)
}

fn compile_url_entry(
    rule: &Rule,
    action: Action,
    group: EntryGroup,
    logger: &dyn ConversionLogger,
) -> Result<CompiledEntry, CompileError> {
    ensure_supported(rule)?;

    let modifiers = &rule.modifiers;
    let mut trigger = Trigger::new(to_url_filter(&rule.pattern)?);
    trigger.domains = domain_condition(&modifiers.domains)?;
    trigger.case_sensitive = modifiers.match_case;
    trigger.load_type = modifiers.third_party.map(|third_party| {
        if third_party {
            LoadTypes::THIRD_PARTY
        } else {
            LoadTypes::FIRST_PARTY
        }
    });
    if let Some(types) = modifiers.content_types {
        trigger.resource_type = Some(map_content_types(types, rule, logger)?);
    }

    let mut compiled = CompiledEntry::new(Entry::new(trigger, action), group, rule.line);
    compiled.shortcut = extract_shortcut(&rule.pattern, modifiers.match_case);
    Ok(compiled.with_host(&rule.pattern))
}

fn compile_cosmetic(rule: &Rule) -> Result<Vec<CompiledEntry>, CompileError> {
    if rule.cosmetic_exception || rule.cosmetic != Some(CosmeticType::ElementHiding) {
        return Ok(Vec::new());
    }

    let selector = rule.pattern.trim();
    if selector.is_empty() {
        return Err(CompileError::EmptySelector);
    }

    let domains = domain_condition(&rule.modifiers.domains)?;
    let group = match domains {
        None => EntryGroup::CssWide,
        Some(DomainCondition::Unless(_)) => EntryGroup::CssGenericDomainSensitive,
        Some(DomainCondition::If(_)) => EntryGroup::CssDomainSensitive,
    };

    let mut trigger = Trigger::new(MATCH_ALL_URLS);
    trigger.domains = domains;
    Ok(vec![CompiledEntry::new(
        Entry::new(trigger, Action::css_display_none(selector)),
        group,
        rule.line,
    )])
}

fn ensure_supported(rule: &Rule) -> Result<(), CompileError> {
    match rule.modifiers.unsupported.first() {
        Some(name) => Err(CompileError::UnsupportedModifier(name.clone())),
        None => Ok(()),
    }
}

// =============================================================================
// Domains
// =============================================================================

/// Turn a rule's domain lists into one trigger condition.
///
/// Safari compares `if-domain` values against the exact page host, so once
/// a rule names permitted domains every other host is already excluded and
/// the restricted list only has to be subtracted from the permitted one.
pub(crate) fn domain_condition(
    domains: &DomainList,
) -> Result<Option<DomainCondition>, CompileError> {
    if domains.permitted.is_empty() {
        if domains.restricted.is_empty() {
            return Ok(None);
        }
        return Ok(Some(DomainCondition::Unless(domains.restricted.clone())));
    }

    let permitted: Vec<String> = domains
        .permitted
        .iter()
        .filter(|domain| !domains.restricted.contains(domain))
        .cloned()
        .collect();
    if permitted.is_empty() {
        return Err(CompileError::ConflictingDomains);
    }
    Ok(Some(DomainCondition::If(permitted)))
}

// =============================================================================
// Resource Types
// =============================================================================

const CONTENT_TYPE_MAP: [(ContentType, ResourceTypes); 12] = [
    (ContentType::SCRIPT, ResourceTypes::SCRIPT),
    (ContentType::IMAGE, ResourceTypes::IMAGE),
    (ContentType::STYLESHEET, ResourceTypes::STYLE_SHEET),
    (ContentType::SUBDOCUMENT, ResourceTypes::DOCUMENT),
    (ContentType::XMLHTTPREQUEST, ResourceTypes::FETCH),
    (ContentType::MEDIA, ResourceTypes::MEDIA),
    (ContentType::FONT, ResourceTypes::FONT),
    (ContentType::WEBSOCKET, ResourceTypes::WEBSOCKET),
    (ContentType::PING, ResourceTypes::PING),
    (ContentType::OTHER, ResourceTypes::OTHER),
    (ContentType::DOCUMENT, ResourceTypes::DOCUMENT),
    (ContentType::POPUP, ResourceTypes::POPUP),
];

fn map_content_types(
    types: ContentType,
    rule: &Rule,
    logger: &dyn ConversionLogger,
) -> Result<ResourceTypes, CompileError> {
    let mut mapped = ResourceTypes::empty();
    for (content_type, resource_type) in CONTENT_TYPE_MAP {
        if types.contains(content_type) {
            mapped |= resource_type;
        }
    }

    if types.intersects(ContentType::OBJECT | ContentType::WEBRTC) {
        logger.warn(&format!(
            "dropping object/webrtc resource types, Safari has no equivalent: {rule}"
        ));
    }

    if mapped.is_empty() {
        return Err(CompileError::AllResourceTypesDropped);
    }
    Ok(mapped)
}

//! Adapts entries to what the target Safari version understands.

use std::collections::BTreeMap;

use cbc_core::{ActionType, ConversionLogger, Entry, ResourceTypes, SafariVersion};

use crate::compiler::CompiledEntry;
use crate::rule::{CosmeticType, Rule, RuleKind};

/// Resource types older Safari versions fold into `raw`.
const RAW_SUBTYPES: ResourceTypes = ResourceTypes::FETCH
    .union(ResourceTypes::WEBSOCKET)
    .union(ResourceTypes::OTHER);

#[derive(Debug, Default)]
pub struct VersionFiltered {
    pub entries: Vec<CompiledEntry>,
    /// Input line of each rule that cannot be expressed, with the reason
    pub errored_sources: BTreeMap<usize, String>,
    pub downgraded: usize,
}

pub fn filter_for_version(
    entries: Vec<CompiledEntry>,
    version: SafariVersion,
    logger: &dyn ConversionLogger,
) -> VersionFiltered {
    let mut filtered = VersionFiltered::default();
    let mut kept = Vec::with_capacity(entries.len());

    for compiled in entries {
        if let Some(reason) = unsupported_reason(&compiled.entry, version) {
            for source in &compiled.sources {
                filtered.errored_sources.insert(*source, reason.to_string());
            }
            continue;
        }

        match downgrade_resource_types(&compiled.entry, version) {
            Some(entry) => {
                filtered.downgraded += 1;
                kept.push(CompiledEntry { entry, ..compiled });
            }
            None => kept.push(compiled),
        }
    }

    filtered.entries = kept
        .into_iter()
        .filter(|compiled| {
            !compiled
                .sources
                .iter()
                .all(|source| filtered.errored_sources.contains_key(source))
        })
        .collect();

    if !filtered.errored_sources.is_empty() || filtered.downgraded > 0 {
        logger.info(&format!(
            "Safari {version}: {} rules unsupported, {} entries downgraded",
            filtered.errored_sources.len(),
            filtered.downgraded
        ));
    }
    filtered
}

/// Hand element hiding rules with `:has()` to the advanced payload as
/// extended CSS when the target Safari cannot apply them natively.
///
/// Returns how many rules moved.
pub fn promote_has_selectors(
    rules: &mut [Rule],
    version: SafariVersion,
    logger: &dyn ConversionLogger,
) -> usize {
    if version.supports_has_selector() {
        return 0;
    }
    let mut promoted = 0;
    for rule in rules.iter_mut().filter(|rule| {
        rule.kind == RuleKind::Cosmetic
            && !rule.cosmetic_exception
            && rule.cosmetic == Some(CosmeticType::ElementHiding)
            && rule.pattern.contains(":has(")
    }) {
        rule.cosmetic = Some(CosmeticType::ExtendedCss);
        promoted += 1;
    }
    if promoted > 0 {
        logger.info(&format!(
            "Safari {version}: {promoted} :has() rules moved to advanced blocking"
        ));
    }
    promoted
}

fn unsupported_reason(entry: &Entry, version: SafariVersion) -> Option<&'static str> {
    let action = &entry.action;
    if action.action_type == ActionType::CssDisplayNone
        && !version.supports_has_selector()
        && action
            .selector
            .as_deref()
            .is_some_and(|selector| selector.contains(":has("))
    {
        return Some(":has() selectors require Safari 16.4");
    }
    None
}

/// Entry with `fetch`/`websocket`/`other` (and `ping` before 14) replaced by
/// `raw`, or `None` when nothing needs to change.
fn downgrade_resource_types(entry: &Entry, version: SafariVersion) -> Option<Entry> {
    let types = entry.trigger.resource_type?;

    let mut folded = ResourceTypes::empty();
    if !version.supports_fine_grained_raw_types() {
        folded |= types & RAW_SUBTYPES;
    }
    if !version.supports_ping() {
        folded |= types & ResourceTypes::PING;
    }
    if folded.is_empty() {
        return None;
    }

    let mut entry = entry.clone();
    entry.trigger.resource_type = Some((types - folded) | ResourceTypes::RAW);
    Some(entry)
}

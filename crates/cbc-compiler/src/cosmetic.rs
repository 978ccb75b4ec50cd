//! Cosmetic exception resolution (`#@#`, `#@?#`, `#@$#`, `#@%#`).
//!
//! Safari has no way to express "hide this selector except on these sites"
//! once the rule has been emitted, so exceptions are folded into the rules
//! they target before compilation.

use std::collections::HashMap;

use crate::rule::{CosmeticType, Rule, RuleKind};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum TargetKey {
    Cosmetic(CosmeticType, String),
    Scriptlet(String),
    /// `#@#+js()`: every scriptlet
    AnyScriptlet,
}

fn target_key(rule: &Rule) -> Option<TargetKey> {
    match rule.kind {
        RuleKind::Cosmetic => Some(TargetKey::Cosmetic(rule.cosmetic?, rule.pattern.clone())),
        RuleKind::Scriptlet => {
            let scriptlet = rule.scriptlet.as_ref()?;
            if scriptlet.name.is_empty() {
                Some(TargetKey::AnyScriptlet)
            } else {
                Some(TargetKey::Scriptlet(scriptlet.name.clone()))
            }
        }
        _ => None,
    }
}

/// Apply cosmetic exceptions to the rules they target.
///
/// Returns the remaining rules, with narrowed domain lists where an
/// exception names domains, and the exception rules themselves.
pub fn apply_cosmetic_exceptions(rules: Vec<Rule>) -> (Vec<Rule>, Vec<Rule>) {
    let (exceptions, rules): (Vec<Rule>, Vec<Rule>) = rules
        .into_iter()
        .partition(|rule| rule.cosmetic_exception);

    if exceptions.is_empty() {
        return (rules, exceptions);
    }

    let mut by_target: HashMap<TargetKey, Vec<&Rule>> = HashMap::new();
    for exception in &exceptions {
        if let Some(key) = target_key(exception) {
            by_target.entry(key).or_default().push(exception);
        }
    }

    let remaining = rules
        .into_iter()
        .filter_map(|rule| {
            let mut matching: Vec<&Rule> = Vec::new();
            if let Some(key) = target_key(&rule) {
                if let Some(found) = by_target.get(&key) {
                    matching.extend(found.iter().copied().filter(|e| same_arguments(e, &rule)));
                }
                if matches!(key, TargetKey::Scriptlet(_)) {
                    if let Some(found) = by_target.get(&TargetKey::AnyScriptlet) {
                        matching.extend(found.iter().copied());
                    }
                }
            }
            matching
                .into_iter()
                .try_fold(rule, |rule, exception| narrow(rule, exception))
        })
        .collect();

    (remaining, exceptions)
}

/// Scriptlet exceptions with arguments only cancel calls with the same ones.
fn same_arguments(exception: &Rule, rule: &Rule) -> bool {
    match (&exception.scriptlet, &rule.scriptlet) {
        (Some(exception), Some(target)) => {
            exception.args.is_empty() || exception.args == target.args
        }
        _ => true,
    }
}

/// Narrow `rule` by one exception, `None` when nothing is left of it.
fn narrow(rule: Rule, exception: &Rule) -> Option<Rule> {
    let excluded = &exception.modifiers.domains.permitted;
    if excluded.is_empty() {
        return None;
    }

    let mut modifiers = rule.modifiers.clone();
    let domains = &mut modifiers.domains;
    if domains.permitted.is_empty() {
        for domain in excluded {
            if !domains.restricted.contains(domain) {
                domains.restricted.push(domain.clone());
            }
        }
    } else {
        domains.permitted.retain(|domain| !excluded.contains(domain));
        if domains.permitted.is_empty() {
            return None;
        }
    }

    Some(Rule { modifiers, ..rule })
}

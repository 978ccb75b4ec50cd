use std::collections::{HashMap, HashSet};

use cbc_core::url::{domain_value_matches, is_same_or_subdomain};
use cbc_core::{Action, DomainCondition, Entry, Trigger};

use crate::compiler::CompiledEntry;
use crate::rule::{CosmeticType, Modifiers, Rule, RuleKind, Scriptlet};

// =============================================================================
// Badfilter
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BadfilterStats {
    pub badfilter_rules: usize,
    pub badfiltered_rules: usize,
}

/// Drop `$badfilter` rules and every rule they cancel.
pub fn apply_badfilters(rules: &mut Vec<Rule>) -> BadfilterStats {
    let badfilter_keys: HashSet<BadfilterKey> = rules
        .iter()
        .filter(|rule| rule.modifiers.badfilter)
        .map(BadfilterKey::from)
        .collect();
    let badfilter_rules = rules.iter().filter(|rule| rule.modifiers.badfilter).count();

    let mut badfiltered_rules = 0usize;
    if badfilter_keys.is_empty() {
        return BadfilterStats {
            badfilter_rules,
            badfiltered_rules,
        };
    }

    rules.retain(|rule| {
        if rule.modifiers.badfilter {
            return false;
        }
        if badfilter_keys.contains(&BadfilterKey::from(rule)) {
            badfiltered_rules += 1;
            return false;
        }
        true
    });

    BadfilterStats {
        badfilter_rules,
        badfiltered_rules,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct BadfilterKey {
    kind: RuleKind,
    pattern: String,
    modifiers: Modifiers,
    cosmetic: Option<CosmeticType>,
    cosmetic_exception: bool,
    scriptlet: Option<Scriptlet>,
}

impl From<&Rule> for BadfilterKey {
    fn from(rule: &Rule) -> Self {
        let mut modifiers = rule.modifiers.clone();
        modifiers.badfilter = false;
        modifiers.domains.permitted.sort();
        modifiers.domains.restricted.sort();
        modifiers.unsupported.sort();
        Self {
            kind: rule.kind,
            pattern: rule.pattern.clone(),
            modifiers,
            cosmetic: rule.cosmetic,
            cosmetic_exception: rule.cosmetic_exception,
            scriptlet: rule.scriptlet.clone(),
        }
    }
}

// =============================================================================
// Entry Optimization
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptimizeStats {
    pub before: usize,
    pub after: usize,
    pub deduped: usize,
    pub subsumed: usize,
    pub merged: usize,
}

/// Shrink a group-sorted entry list without changing what it matches.
///
/// Work is confined to runs of one priority group. Every group holds a
/// single action type, so no `ignore-previous-rules` entry can sit between
/// two entries that get combined.
pub fn optimize_entries(entries: Vec<CompiledEntry>) -> (Vec<CompiledEntry>, OptimizeStats) {
    let mut stats = OptimizeStats {
        before: entries.len(),
        ..OptimizeStats::default()
    };
    let mut output = Vec::with_capacity(entries.len());
    let mut run: Vec<CompiledEntry> = Vec::new();

    for entry in entries {
        if run.last().is_some_and(|last| last.group != entry.group) {
            output.extend(optimize_run(std::mem::take(&mut run), &mut stats));
        }
        run.push(entry);
    }
    output.extend(optimize_run(run, &mut stats));

    stats.after = output.len();
    (output, stats)
}

fn optimize_run(entries: Vec<CompiledEntry>, stats: &mut OptimizeStats) -> Vec<CompiledEntry> {
    if entries.len() < 2 {
        return entries;
    }
    let entries = dedupe(entries, stats);
    let entries = remove_subsumed(entries, stats);
    merge_if_domains(entries, stats)
}

fn union_sources(target: &mut Vec<usize>, sources: &[usize]) {
    for source in sources {
        if !target.contains(source) {
            target.push(*source);
        }
    }
}

fn dedupe(entries: Vec<CompiledEntry>, stats: &mut OptimizeStats) -> Vec<CompiledEntry> {
    let mut seen: HashMap<Entry, usize> = HashMap::new();
    let mut output: Vec<CompiledEntry> = Vec::with_capacity(entries.len());

    for entry in entries {
        match seen.get(&entry.entry) {
            Some(&index) => {
                union_sources(&mut output[index].sources, &entry.sources);
                stats.deduped += 1;
            }
            None => {
                seen.insert(entry.entry.clone(), output.len());
                output.push(entry);
            }
        }
    }
    output
}

// =============================================================================
// Subsumption
// =============================================================================

fn remove_subsumed(entries: Vec<CompiledEntry>, stats: &mut OptimizeStats) -> Vec<CompiledEntry> {
    // Candidates must share the action, so match-all entries are keyed by it
    let mut match_all: HashMap<&Action, Vec<usize>> = HashMap::new();
    let mut by_url: HashMap<&str, Vec<usize>> = HashMap::new();
    let mut by_host: HashMap<&str, Vec<usize>> = HashMap::new();

    for (index, compiled) in entries.iter().enumerate() {
        let trigger = &compiled.entry.trigger;
        if trigger.matches_all_urls() {
            match_all
                .entry(&compiled.entry.action)
                .or_default()
                .push(index);
        } else {
            by_url.entry(trigger.url_filter.as_str()).or_default().push(index);
        }
        if compiled.pure_host {
            if let Some(host) = &compiled.host {
                by_host.entry(host.as_str()).or_default().push(index);
            }
        }
    }

    let mut covered_by: Vec<Option<usize>> = vec![None; entries.len()];
    for (index, compiled) in entries.iter().enumerate() {
        let mut candidates: Vec<usize> = match_all
            .get(&compiled.entry.action)
            .cloned()
            .unwrap_or_default();
        if let Some(same_url) = by_url.get(compiled.entry.trigger.url_filter.as_str()) {
            candidates.extend(same_url);
        }
        if let Some(host) = &compiled.host {
            for domain in parent_domains(host) {
                if let Some(hosts) = by_host.get(domain) {
                    candidates.extend(hosts);
                }
            }
        }

        covered_by[index] = candidates.into_iter().find(|&other| {
            other != index
                && subsumes(&entries[other], compiled)
                && !(other > index && subsumes(compiled, &entries[other]))
        });
    }

    // Hand the sources of dropped entries to the surviving entry covering them
    let mut inherited: HashMap<usize, Vec<usize>> = HashMap::new();
    for index in 0..entries.len() {
        let Some(mut root) = covered_by[index] else {
            continue;
        };
        let mut steps = 0;
        while let Some(next) = covered_by[root] {
            root = next;
            steps += 1;
            if steps > entries.len() {
                break;
            }
        }
        inherited
            .entry(root)
            .or_default()
            .extend(&entries[index].sources);
    }

    let mut output = Vec::with_capacity(entries.len());
    for (index, mut compiled) in entries.into_iter().enumerate() {
        if covered_by[index].is_some() {
            stats.subsumed += 1;
            continue;
        }
        if let Some(sources) = inherited.get(&index) {
            union_sources(&mut compiled.sources, sources);
        }
        output.push(compiled);
    }
    output
}

fn parent_domains(host: &str) -> impl Iterator<Item = &str> {
    std::iter::successors(Some(host), |domain| domain.split_once('.').map(|(_, rest)| rest))
}

/// `broad` matches every request `narrow` matches, with the same action.
fn subsumes(broad: &CompiledEntry, narrow: &CompiledEntry) -> bool {
    if broad.entry.action != narrow.entry.action {
        return false;
    }
    let (a, b) = (&broad.entry.trigger, &narrow.entry.trigger);
    covers_url(broad, narrow)
        && match (a.resource_type, b.resource_type) {
            (None, _) => true,
            (Some(a), Some(b)) => a.contains(b),
            (Some(_), None) => false,
        }
        && match (a.load_type, b.load_type) {
            (None, _) => true,
            (Some(a), Some(b)) => a.contains(b),
            (Some(_), None) => false,
        }
        && covers_domains(a, b)
}

fn covers_url(broad: &CompiledEntry, narrow: &CompiledEntry) -> bool {
    let (a, b) = (&broad.entry.trigger, &narrow.entry.trigger);
    if a.matches_all_urls() {
        return true;
    }
    // A case-sensitive filter matches fewer URLs than the same insensitive one
    if a.case_sensitive && !b.case_sensitive {
        return false;
    }
    if !shortcut_contained(broad, narrow) {
        return false;
    }
    if a.url_filter == b.url_filter {
        return true;
    }
    match (&broad.host, &narrow.host) {
        (Some(broad_host), Some(narrow_host)) if broad.pure_host && !a.case_sensitive => {
            host_covers(broad_host, narrow_host)
        }
        _ => false,
    }
}

/// Every URL `narrow` matches contains the literal `broad` needs.
fn shortcut_contained(broad: &CompiledEntry, narrow: &CompiledEntry) -> bool {
    let Some(needed) = &broad.shortcut else {
        return true;
    };
    let Some(literal) = &narrow.shortcut else {
        return false;
    };
    if broad.entry.trigger.case_sensitive {
        literal.contains(needed.as_str())
    } else {
        literal.to_ascii_lowercase().contains(needed.as_str())
    }
}

/// The domain anchor of `||broad_host^` reaches `narrow_host`.
///
/// The anchor only spans labels of `[a-z0-9-]`, so a subdomain with any
/// other character in its extra labels is out of reach.
fn host_covers(broad_host: &str, narrow_host: &str) -> bool {
    if narrow_host.eq_ignore_ascii_case(broad_host) {
        return true;
    }
    if !is_same_or_subdomain(narrow_host, broad_host) {
        return false;
    }
    let extra = &narrow_host[..narrow_host.len() - broad_host.len() - 1];
    extra.split('.').all(|label| {
        !label.is_empty() && label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
    })
}

fn covers_domains(a: &Trigger, b: &Trigger) -> bool {
    match (&a.domains, &b.domains) {
        (None, _) => true,
        (Some(_), None) => false,
        (Some(DomainCondition::If(broad)), Some(DomainCondition::If(narrow))) => narrow
            .iter()
            .all(|n| broad.iter().any(|b| value_covers(b, n))),
        (Some(DomainCondition::Unless(broad)), Some(DomainCondition::Unless(narrow))) => broad
            .iter()
            .all(|b| narrow.iter().any(|n| value_covers(n, b))),
        (Some(DomainCondition::Unless(excluded)), Some(DomainCondition::If(narrow))) => narrow
            .iter()
            .all(|n| excluded.iter().all(|e| values_disjoint(e, n))),
        (Some(DomainCondition::If(_)), Some(DomainCondition::Unless(_))) => false,
    }
}

/// Every host `narrow` matches is matched by `broad`.
fn value_covers(broad: &str, narrow: &str) -> bool {
    match (broad.strip_prefix('*'), narrow.strip_prefix('*')) {
        (Some(broad), Some(narrow)) => is_same_or_subdomain(narrow, broad),
        (Some(_), None) => domain_value_matches(broad, narrow),
        (None, Some(_)) => false,
        (None, None) => broad.eq_ignore_ascii_case(narrow),
    }
}

/// No host is matched by both values.
fn values_disjoint(a: &str, b: &str) -> bool {
    match (a.strip_prefix('*'), b.strip_prefix('*')) {
        (Some(x), Some(y)) => !is_same_or_subdomain(x, y) && !is_same_or_subdomain(y, x),
        (Some(_), None) => !domain_value_matches(a, b),
        (None, Some(_)) => !domain_value_matches(b, a),
        (None, None) => !a.eq_ignore_ascii_case(b),
    }
}

// =============================================================================
// Domain Merging
// =============================================================================

/// Combine entries that differ only in their `if-domain` list.
fn merge_if_domains(entries: Vec<CompiledEntry>, stats: &mut OptimizeStats) -> Vec<CompiledEntry> {
    let mut seen: HashMap<Entry, usize> = HashMap::new();
    let mut output: Vec<CompiledEntry> = Vec::with_capacity(entries.len());

    for compiled in entries {
        let Some(DomainCondition::If(domains)) = &compiled.entry.trigger.domains else {
            output.push(compiled);
            continue;
        };

        let mut key = compiled.entry.clone();
        key.trigger.domains = None;

        match seen.get(&key) {
            Some(&index) => {
                let target = &mut output[index];
                if let Some(DomainCondition::If(existing)) = &mut target.entry.trigger.domains {
                    for domain in domains {
                        if !existing.contains(domain) {
                            existing.push(domain.clone());
                        }
                    }
                }
                union_sources(&mut target.sources, &compiled.sources);
                stats.merged += 1;
            }
            None => {
                seen.insert(key, output.len());
                output.push(compiled);
            }
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile_rule;
    use crate::parser::{parse_rule, parse_rules};
    use cbc_core::NoopLogger;

    fn compile(lines: &[&str]) -> Vec<CompiledEntry> {
        let mut entries: Vec<CompiledEntry> = lines
            .iter()
            .enumerate()
            .flat_map(|(index, line)| {
                let rule = parse_rule(index, line).unwrap().unwrap();
                compile_rule(&rule, &NoopLogger).unwrap()
            })
            .collect();
        entries.sort_by_key(|entry| entry.group);
        entries
    }

    fn url_filters(entries: &[CompiledEntry]) -> Vec<&str> {
        entries
            .iter()
            .map(|entry| entry.entry.trigger.url_filter.as_str())
            .collect()
    }

    #[test]
    fn badfilter_cancels_identical_rule() {
        let mut rules = parse_rules(&[
            "||ads.com^$script,domain=a.com|b.com",
            "||ads.com^$script,domain=b.com|a.com,badfilter",
            "||ads.com^$image",
        ])
        .rules;
        let stats = apply_badfilters(&mut rules);
        assert_eq!(stats.badfilter_rules, 1);
        assert_eq!(stats.badfiltered_rules, 1);
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].text, "||ads.com^$image");
    }

    #[test]
    fn badfilter_without_target_only_drops_itself() {
        let mut rules = parse_rules(&["||ads.com^", "||other.com^$badfilter"]).rules;
        let stats = apply_badfilters(&mut rules);
        assert_eq!(stats.badfiltered_rules, 0);
        assert_eq!(rules.len(), 1);
    }

    #[test]
    fn dedupes_and_keeps_sources() {
        let (entries, stats) = optimize_entries(compile(&["||ads.com^", "||ads.com^"]));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].sources, vec![0, 1]);
        assert_eq!(stats.deduped, 1);
        assert_eq!(stats.before, 2);
        assert_eq!(stats.after, 1);
    }

    #[test]
    fn merges_if_domains_in_first_seen_order() {
        let (entries, stats) = optimize_entries(compile(&[
            "ad.example.com##.banner",
            "tracker.example.com##.banner",
            "ad.example.com##.banner",
            "~x.com##.banner",
        ]));
        assert_eq!(entries.len(), 2);
        let merged = entries
            .iter()
            .find(|entry| entry.entry.trigger.if_domain().is_some())
            .unwrap();
        assert_eq!(
            merged.entry.trigger.if_domain().unwrap(),
            ["ad.example.com", "tracker.example.com"]
        );
        assert_eq!(stats.merged, 1);
        assert!(entries.iter().all(|e| !(e.entry.trigger.if_domain().is_some()
            && e.entry.trigger.unless_domain().is_some())));
    }

    #[test]
    fn pure_host_rule_subsumes_subdomain_rules() {
        let (entries, stats) = optimize_entries(compile(&[
            "||cdn.ads.com/banner.js",
            "||ads.com^",
            "||ads.com^$script",
            "||ads.com.evil.net^",
        ]));
        assert_eq!(stats.subsumed, 2);
        assert_eq!(
            url_filters(&entries),
            vec![
                r"^[htpsw]+:\/\/([a-z0-9-]+\.)*ads\.com([\/:&\?].*)?$",
                r"^[htpsw]+:\/\/([a-z0-9-]+\.)*ads\.com\.evil\.net([\/:&\?].*)?$",
            ]
        );
        assert_eq!(entries[0].sources, vec![1, 0, 2]);
    }

    #[test]
    fn generic_selector_subsumes_domain_specific_one() {
        let (entries, _) = optimize_entries(compile(&["##.ad", "example.com##.ad"]));
        // different groups: both stay
        assert_eq!(entries.len(), 2);

        let (entries, stats) = optimize_entries(compile(&["a.com##.ad", "a.com,b.com##.ad"]));
        assert_eq!(stats.subsumed, 1);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].entry.trigger.if_domain().unwrap(), ["a.com", "b.com"]);
    }

    #[test]
    fn different_actions_never_subsume() {
        let (entries, _) = optimize_entries(compile(&["##.ad", "##.banner"]));
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn unless_domain_subsumption() {
        let (entries, stats) = optimize_entries(compile(&[
            "||ads.com^$domain=~a.com",
            "||ads.com^$domain=~a.com|~b.com",
            "||ads.com^$domain=c.com",
            "||ads.com^$domain=a.com",
        ]));
        assert_eq!(stats.subsumed, 2);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].entry.trigger.unless_domain().unwrap(), ["a.com"]);
        assert_eq!(entries[1].entry.trigger.if_domain().unwrap(), ["a.com"]);
    }

    #[test]
    fn resource_type_subsumption_requires_superset() {
        let (entries, _) = optimize_entries(compile(&[
            "||ads.com^$script",
            "||ads.com^$script,image",
        ]));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].sources, vec![1, 0]);

        let (entries, _) = optimize_entries(compile(&["||ads.com^$script", "||ads.com^$image"]));
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn case_sensitive_filter_does_not_cover_insensitive_one() {
        let (entries, _) = optimize_entries(compile(&["/Ads/$match-case", "/Ads/"]));
        assert_eq!(entries.len(), 1);
        assert!(!entries[0].entry.trigger.case_sensitive);
    }

    #[test]
    fn host_coverage_follows_the_domain_anchor() {
        let (entries, stats) = optimize_entries(compile(&[
            "||ADS.com^$match-case",
            "||cdn.ads.com/x$match-case",
        ]));
        assert_eq!(stats.subsumed, 0);
        assert_eq!(entries.len(), 2);

        let (entries, stats) = optimize_entries(compile(&["||ads.com^", "||a_b.ads.com^"]));
        assert_eq!(stats.subsumed, 0);
        assert_eq!(entries.len(), 2);

        assert!(host_covers("ads.com", "cdn-1.x.ads.com"));
        assert!(!host_covers("ads.com", "a_b.ads.com"));
        assert!(!host_covers("ads.com", "badads.com"));
    }

    #[test]
    fn shortcut_gates_subsumption() {
        let lines = ["||ads.com^", "||cdn.ads.com/x.js"];
        let mut entries = compile(&lines);
        assert!(subsumes(&entries[0], &entries[1]));

        entries[1].shortcut = Some("/x.js".to_string());
        assert!(!subsumes(&entries[0], &entries[1]));

        entries[1].shortcut = None;
        assert!(!subsumes(&entries[0], &entries[1]));
    }

    #[test]
    fn value_relations() {
        assert!(value_covers("*a.com", "b.a.com"));
        assert!(value_covers("*a.com", "*b.a.com"));
        assert!(!value_covers("a.com", "*a.com"));
        assert!(!value_covers("a.com", "b.a.com"));
        assert!(values_disjoint("*a.com", "b.com"));
        assert!(!values_disjoint("*a.com", "x.a.com"));
        assert!(!values_disjoint("*x.a.com", "*a.com"));
    }
}

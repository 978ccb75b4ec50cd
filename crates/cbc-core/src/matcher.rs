//! Trigger evaluation with Safari's semantics.
//!
//! Safari walks the rule list in order and an `ignore-previous-rules`
//! action discards everything triggered before it. The matcher reproduces
//! that so callers can check what a compiled list does to a request
//! without loading it into a browser.

use regex::{Regex, RegexBuilder};

use crate::entry::{Action, DomainCondition, Entry, Trigger};
use crate::types::{ActionType, LoadTypes, ResourceTypes};
use crate::url::{domain_value_matches, extract_host, is_same_or_subdomain};

// =============================================================================
// Request Context
// =============================================================================

/// A request as Safari sees it when evaluating triggers.
#[derive(Debug, Clone)]
pub struct RequestContext<'a> {
    /// Full request URL
    pub url: &'a str,
    /// Host of the page that issued the request
    pub page_host: &'a str,
    /// Exactly one resource type
    pub resource_type: ResourceTypes,
    pub load_type: LoadTypes,
}

impl<'a> RequestContext<'a> {
    /// Build a context, deriving the load type from the two hosts.
    pub fn new(url: &'a str, page_host: &'a str, resource_type: ResourceTypes) -> Self {
        let first_party = extract_host(url).is_some_and(|host| {
            is_same_or_subdomain(host, page_host) || is_same_or_subdomain(page_host, host)
        });
        Self {
            url,
            page_host,
            resource_type,
            load_type: if first_party {
                LoadTypes::FIRST_PARTY
            } else {
                LoadTypes::THIRD_PARTY
            },
        }
    }
}

// =============================================================================
// Trigger Matcher
// =============================================================================

/// One trigger with its url-filter compiled.
#[derive(Debug, Clone)]
pub struct TriggerMatcher<'e> {
    entry: &'e Entry,
    regex: Regex,
    shortcut: Option<String>,
}

impl<'e> TriggerMatcher<'e> {
    pub fn new(entry: &'e Entry) -> Result<Self, regex::Error> {
        let regex = RegexBuilder::new(&entry.trigger.url_filter)
            .case_insensitive(!entry.trigger.case_sensitive)
            .build()?;
        Ok(Self {
            entry,
            regex,
            shortcut: None,
        })
    }

    /// Literal the URL must contain before the regex is evaluated.
    pub fn with_shortcut(mut self, shortcut: Option<&str>) -> Self {
        self.shortcut = shortcut.filter(|s| !s.is_empty()).map(|s| {
            if self.entry.trigger.case_sensitive {
                s.to_string()
            } else {
                s.to_ascii_lowercase()
            }
        });
        self
    }

    pub fn entry(&self) -> &'e Entry {
        self.entry
    }

    pub fn matches(&self, ctx: &RequestContext<'_>) -> bool {
        let trigger = &self.entry.trigger;
        matches_domains(trigger, ctx.page_host)
            && matches_resource_type(trigger, ctx.resource_type)
            && trigger.load_type.map_or(true, |l| l.intersects(ctx.load_type))
            && self.matches_url(ctx.url)
    }

    fn matches_url(&self, url: &str) -> bool {
        if let Some(shortcut) = &self.shortcut {
            let found = if self.entry.trigger.case_sensitive {
                url.contains(shortcut.as_str())
            } else {
                url.to_ascii_lowercase().contains(shortcut.as_str())
            };
            if !found {
                return false;
            }
        }
        self.regex.is_match(url)
    }
}

fn matches_domains(trigger: &Trigger, page_host: &str) -> bool {
    match &trigger.domains {
        None => true,
        Some(DomainCondition::If(values)) => {
            values.iter().any(|v| domain_value_matches(v, page_host))
        }
        Some(DomainCondition::Unless(values)) => {
            !values.iter().any(|v| domain_value_matches(v, page_host))
        }
    }
}

fn matches_resource_type(trigger: &Trigger, resource_type: ResourceTypes) -> bool {
    let Some(mut allowed) = trigger.resource_type else {
        return true;
    };
    if allowed.contains(ResourceTypes::RAW) {
        allowed |= ResourceTypes::FETCH
            | ResourceTypes::WEBSOCKET
            | ResourceTypes::OTHER
            | ResourceTypes::PING;
    }
    allowed.intersects(resource_type)
}

// =============================================================================
// Matcher
// =============================================================================

/// Ordered rule list evaluated the way Safari does.
#[derive(Debug, Clone)]
pub struct Matcher<'e> {
    triggers: Vec<TriggerMatcher<'e>>,
}

impl<'e> Matcher<'e> {
    pub fn new(entries: &'e [Entry]) -> Result<Self, regex::Error> {
        let triggers = entries
            .iter()
            .map(TriggerMatcher::new)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { triggers })
    }

    /// Like [`Matcher::new`], with a URL prefilter literal per entry.
    pub fn with_shortcuts<'s>(
        entries: &'e [Entry],
        shortcuts: impl IntoIterator<Item = Option<&'s str>>,
    ) -> Result<Self, regex::Error> {
        let shortcuts = shortcuts.into_iter().chain(std::iter::repeat(None));
        let triggers = entries
            .iter()
            .zip(shortcuts)
            .map(|(entry, shortcut)| Ok(TriggerMatcher::new(entry)?.with_shortcut(shortcut)))
            .collect::<Result<Vec<_>, regex::Error>>()?;
        Ok(Self { triggers })
    }

    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }

    /// Actions still in effect after walking the whole list.
    pub fn match_request(&self, ctx: &RequestContext<'_>) -> Vec<&'e Action> {
        let mut actions: Vec<&'e Action> = Vec::new();
        for trigger in &self.triggers {
            if !trigger.matches(ctx) {
                continue;
            }
            let action = &trigger.entry().action;
            if action.action_type == ActionType::IgnorePreviousRules {
                actions.clear();
            } else {
                actions.push(action);
            }
        }
        actions
    }

    pub fn is_blocked(&self, ctx: &RequestContext<'_>) -> bool {
        self.match_request(ctx)
            .iter()
            .any(|action| action.action_type == ActionType::Block)
    }

    /// Selectors hidden on the page, in list order.
    pub fn hidden_selectors(&self, ctx: &RequestContext<'_>) -> Vec<&'e str> {
        self.match_request(ctx)
            .into_iter()
            .filter(|action| action.action_type == ActionType::CssDisplayNone)
            .filter_map(|action| action.selector.as_deref())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(url_filter: &str) -> Entry {
        Entry::new(Trigger::new(url_filter), Action::block())
    }

    #[test]
    fn blocks_matching_url() {
        let entries = vec![block(r"^[htpsw]+:\/\/([a-z0-9-]+\.)*ads\.com([\/:&\?].*)?$")];
        let matcher = Matcher::new(&entries).unwrap();

        let ctx = RequestContext::new("https://cdn.ads.com/x.js", "site.com", ResourceTypes::SCRIPT);
        assert!(matcher.is_blocked(&ctx));

        let ctx = RequestContext::new("https://ads.com.evil.org/", "site.com", ResourceTypes::SCRIPT);
        assert!(!matcher.is_blocked(&ctx));
    }

    #[test]
    fn ignore_previous_rules_clears_earlier_actions() {
        let entries = vec![
            block("ads"),
            Entry::new(Trigger::new("ads").with_if_domain(vec!["safe.com".to_string()]), Action::ignore_previous_rules()),
        ];
        let matcher = Matcher::new(&entries).unwrap();

        let on_safe = RequestContext::new("https://x.com/ads", "safe.com", ResourceTypes::IMAGE);
        assert!(!matcher.is_blocked(&on_safe));

        let elsewhere = RequestContext::new("https://x.com/ads", "other.com", ResourceTypes::IMAGE);
        assert!(matcher.is_blocked(&elsewhere));
    }

    #[test]
    fn respects_domain_conditions() {
        let entries = vec![Entry::new(
            Trigger::default().with_unless_domain(vec!["*example.com".to_string()]),
            Action::css_display_none(".ad"),
        )];
        let matcher = Matcher::new(&entries).unwrap();

        let ctx = RequestContext::new("https://www.example.com/", "www.example.com", ResourceTypes::DOCUMENT);
        assert!(matcher.hidden_selectors(&ctx).is_empty());

        let ctx = RequestContext::new("https://other.org/", "other.org", ResourceTypes::DOCUMENT);
        assert_eq!(matcher.hidden_selectors(&ctx), vec![".ad"]);
    }

    #[test]
    fn respects_resource_and_load_types() {
        let mut trigger = Trigger::new("tracker");
        trigger.resource_type = Some(ResourceTypes::SCRIPT);
        trigger.load_type = Some(LoadTypes::THIRD_PARTY);
        let entries = vec![Entry::new(trigger, Action::block())];
        let matcher = Matcher::new(&entries).unwrap();

        let third = RequestContext::new("https://t.net/tracker.js", "site.com", ResourceTypes::SCRIPT);
        assert!(matcher.is_blocked(&third));

        let image = RequestContext::new("https://t.net/tracker.js", "site.com", ResourceTypes::IMAGE);
        assert!(!matcher.is_blocked(&image));

        let first = RequestContext::new("https://cdn.site.com/tracker.js", "site.com", ResourceTypes::SCRIPT);
        assert!(!matcher.is_blocked(&first));
    }

    #[test]
    fn raw_covers_fetch_requests() {
        let mut trigger = Trigger::new("api");
        trigger.resource_type = Some(ResourceTypes::RAW);
        let entries = vec![Entry::new(trigger, Action::block())];
        let matcher = Matcher::new(&entries).unwrap();

        let ctx = RequestContext::new("https://x.com/api", "x.com", ResourceTypes::FETCH);
        assert!(matcher.is_blocked(&ctx));
    }

    #[test]
    fn shortcut_prefilters_and_respects_case() {
        let entry = block("banner");
        let trigger = TriggerMatcher::new(&entry).unwrap().with_shortcut(Some("BANNER"));
        let ctx = RequestContext::new("https://x.com/Banner.png", "x.com", ResourceTypes::IMAGE);
        assert!(trigger.matches(&ctx));

        let trigger = TriggerMatcher::new(&entry).unwrap().with_shortcut(Some("popup"));
        assert!(!trigger.matches(&ctx));
    }

    #[test]
    fn shortcuts_apply_in_entry_order() {
        let entries = vec![block("banner"), block("popup")];
        let matcher = Matcher::with_shortcuts(&entries, [Some("banner")]).unwrap();
        assert_eq!(matcher.len(), 2);

        let ctx = RequestContext::new("https://x.com/popup", "x.com", ResourceTypes::IMAGE);
        assert!(matcher.is_blocked(&ctx));

        let entries = vec![block("banner")];
        let matcher = Matcher::with_shortcuts(&entries, [Some("/ads/")]).unwrap();
        let ctx = RequestContext::new("https://x.com/banner", "x.com", ResourceTypes::IMAGE);
        assert!(!matcher.is_blocked(&ctx));
    }

    #[test]
    fn case_sensitive_filters() {
        let mut trigger = Trigger::new("Banner");
        trigger.case_sensitive = true;
        let entries = vec![Entry::new(trigger, Action::block())];
        let matcher = Matcher::new(&entries).unwrap();

        let lower = RequestContext::new("https://x.com/banner", "x.com", ResourceTypes::IMAGE);
        assert!(!matcher.is_blocked(&lower));
        let exact = RequestContext::new("https://x.com/Banner", "x.com", ResourceTypes::IMAGE);
        assert!(matcher.is_blocked(&exact));
    }
}

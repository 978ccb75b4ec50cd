use std::net::IpAddr;

use cbc_core::error::{ParseError, RuleFailure};
use cbc_core::RuleError;
use regex::Regex;

use crate::rule::{
    is_regex_pattern, ContentType, CosmeticType, DomainList, ExceptionScope, Modifiers, Rule,
    RuleKind, Scriptlet,
};

/// Result of parsing a batch of lines.
#[derive(Debug, Default)]
pub struct ParsedRules {
    pub rules: Vec<Rule>,
    pub failures: Vec<RuleFailure>,
    /// Lines that were neither blank nor comments
    pub total: usize,
}

pub fn parse_rules<S: AsRef<str>>(lines: &[S]) -> ParsedRules {
    let mut parsed = ParsedRules::default();

    for (index, raw_line) in lines.iter().enumerate() {
        match parse_rule(index, raw_line.as_ref()) {
            Ok(Some(rule)) => {
                parsed.total += 1;
                parsed.rules.push(rule);
            }
            Ok(None) => {}
            Err(error) => {
                parsed.total += 1;
                parsed.failures.push(RuleFailure {
                    line: index,
                    text: raw_line.as_ref().trim().to_string(),
                    error: RuleError::Parse(error),
                });
            }
        }
    }

    parsed
}

/// Parse one line. Blank lines and comments yield `Ok(None)`.
pub fn parse_rule(index: usize, raw_line: &str) -> Result<Option<Rule>, ParseError> {
    let line = raw_line.trim();
    if line.is_empty() || is_comment_line(line) {
        return Ok(None);
    }

    if let Some(rule) = parse_cosmetic_rule(index, line)? {
        return Ok(Some(rule));
    }

    parse_network_rule(index, line).map(Some)
}

fn is_comment_line(line: &str) -> bool {
    if line.starts_with('!') || line.starts_with('[') {
        return true;
    }
    line.starts_with('#') && !matches!(find_cosmetic_marker(line), Some((0, _)))
}

// =============================================================================
// Network Rules
// =============================================================================

fn parse_network_rule(index: usize, line: &str) -> Result<Rule, ParseError> {
    if let Some(host) = parse_hosts_file_domain(line)? {
        return Ok(Rule {
            line: index,
            text: line.to_string(),
            kind: RuleKind::Network,
            pattern: format!("||{host}^"),
            modifiers: Modifiers::default(),
            cosmetic: None,
            cosmetic_exception: false,
            scriptlet: None,
        });
    }

    let (kind, body) = match line.strip_prefix("@@") {
        Some(rest) => (RuleKind::Exception, rest.trim_start()),
        None => (RuleKind::Network, line),
    };

    let (pattern_part, options_text) = split_rule_options(body);
    let pattern = pattern_part.trim();
    let modifiers = match options_text {
        Some(options_text) => parse_options(options_text, kind == RuleKind::Exception)?,
        None => Modifiers::default(),
    };

    if pattern.is_empty() && options_text.map_or(true, |o| o.trim().is_empty()) {
        return Err(ParseError::EmptyPattern);
    }

    if pattern.chars().any(char::is_whitespace) {
        return Err(ParseError::UnknownSyntax);
    }

    if is_regex_pattern(pattern) {
        Regex::new(&pattern[1..pattern.len() - 1])
            .map_err(|e| ParseError::InvalidRegex(e.to_string()))?;
    }

    Ok(Rule {
        line: index,
        text: line.to_string(),
        kind,
        pattern: pattern.to_string(),
        modifiers,
        cosmetic: None,
        cosmetic_exception: false,
        scriptlet: None,
    })
}

fn split_rule_options(line: &str) -> (&str, Option<&str>) {
    if is_regex_pattern(line) {
        return (line, None);
    }
    if line.starts_with('/') {
        if let Some(pos) = line.rfind("/$") {
            if pos > 0 {
                return (&line[..=pos], Some(&line[pos + 2..]));
            }
        }
    }
    match line.rfind('$') {
        Some(pos) => (&line[..pos], Some(&line[pos + 1..])),
        None => (line, None),
    }
}

fn parse_hosts_file_domain(line: &str) -> Result<Option<String>, ParseError> {
    let mut parts = line.split_whitespace();
    let (Some(first), Some(second)) = (parts.next(), parts.next()) else {
        return Ok(None);
    };

    if first.parse::<IpAddr>().is_ok() {
        return normalize_domain(second).map(Some);
    }

    Ok(None)
}

fn parse_options(text: &str, is_exception: bool) -> Result<Modifiers, ParseError> {
    let mut modifiers = Modifiers::default();
    let mut type_include = ContentType::empty();
    let mut type_exclude = ContentType::empty();

    for raw in text.split(',') {
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }

        let raw_lower = raw.to_ascii_lowercase();
        let raw_lower = raw_lower.as_str();

        match raw_lower {
            "important" => {
                modifiers.important = true;
                continue;
            }
            "match-case" | "match_case" => {
                modifiers.match_case = true;
                continue;
            }
            "badfilter" => {
                modifiers.badfilter = true;
                continue;
            }
            "third-party" | "3p" | "~first-party" | "~1p" => {
                modifiers.third_party = Some(true);
                continue;
            }
            "~third-party" | "~3p" | "first-party" | "1p" => {
                modifiers.third_party = Some(false);
                continue;
            }
            _ => {}
        }

        if raw_lower.starts_with("domain=") {
            let parsed = parse_domain_list(&raw["domain=".len()..], '|')?;
            if parsed.is_empty() {
                return Err(ParseError::MalformedModifier(raw.to_string()));
            }
            modifiers.domains.permitted.extend(parsed.permitted);
            modifiers.domains.restricted.extend(parsed.restricted);
            continue;
        }

        let (name, value) = match raw_lower.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (raw_lower, None),
        };

        if is_unsupported_option(name) {
            modifiers.unsupported.push(name.to_string());
            continue;
        }

        if value.is_some() {
            return Err(ParseError::MalformedModifier(raw.to_string()));
        }

        if let Some(scope) = exception_scope(name) {
            if scope == ExceptionScope::DOCUMENT && !is_exception {
                type_include |= ContentType::DOCUMENT;
                continue;
            }
            if !is_exception {
                return Err(ParseError::ExceptionOnlyModifier(name.to_string()));
            }
            modifiers.exception_scope |= scope;
            continue;
        }

        let (negated, type_name) = match name.strip_prefix('~') {
            Some(rest) => (true, rest),
            None => (false, name),
        };

        if let Some(mask) = content_type_mask(type_name) {
            if negated {
                type_exclude |= mask;
            } else {
                type_include |= mask;
            }
            continue;
        }

        return Err(ParseError::UnknownModifier(name.to_string()));
    }

    modifiers.content_types = finalize_content_types(type_include, type_exclude)?;
    Ok(modifiers)
}

fn finalize_content_types(
    include: ContentType,
    exclude: ContentType,
) -> Result<Option<ContentType>, ParseError> {
    if include.is_empty() && exclude.is_empty() {
        return Ok(None);
    }
    let mask = if include.is_empty() {
        ContentType::DEFAULT - exclude
    } else {
        include - exclude
    };
    if mask.is_empty() {
        return Err(ParseError::MalformedModifier(
            "content type options exclude every request".to_string(),
        ));
    }
    if mask == ContentType::DEFAULT {
        return Ok(None);
    }
    Ok(Some(mask))
}

fn content_type_mask(name: &str) -> Option<ContentType> {
    match name {
        "script" => Some(ContentType::SCRIPT),
        "image" => Some(ContentType::IMAGE),
        "stylesheet" | "css" => Some(ContentType::STYLESHEET),
        "object" | "object-subrequest" => Some(ContentType::OBJECT),
        "subdocument" | "frame" => Some(ContentType::SUBDOCUMENT),
        "xmlhttprequest" | "xhr" => Some(ContentType::XMLHTTPREQUEST),
        "media" => Some(ContentType::MEDIA),
        "font" => Some(ContentType::FONT),
        "websocket" => Some(ContentType::WEBSOCKET),
        "webrtc" => Some(ContentType::WEBRTC),
        "ping" | "beacon" => Some(ContentType::PING),
        "other" => Some(ContentType::OTHER),
        "popup" => Some(ContentType::POPUP),
        "document" | "doc" => Some(ContentType::DOCUMENT),
        _ => None,
    }
}

fn exception_scope(name: &str) -> Option<ExceptionScope> {
    match name {
        "document" | "doc" => Some(ExceptionScope::DOCUMENT),
        "elemhide" | "ehide" => Some(ExceptionScope::ELEMHIDE),
        "generichide" | "ghide" => Some(ExceptionScope::GENERICHIDE),
        "jsinject" => Some(ExceptionScope::JSINJECT),
        "content" => Some(ExceptionScope::CONTENT),
        "urlblock" => Some(ExceptionScope::URLBLOCK),
        "genericblock" => Some(ExceptionScope::GENERICBLOCK),
        _ => None,
    }
}

fn is_unsupported_option(name: &str) -> bool {
    matches!(
        name,
        "csp"
            | "redirect"
            | "redirect-rule"
            | "removeparam"
            | "removeheader"
            | "replace"
            | "cookie"
            | "rewrite"
            | "empty"
            | "mp4"
            | "network"
            | "app"
            | "stealth"
            | "permissions"
            | "header"
            | "hls"
            | "jsonprune"
    )
}

// =============================================================================
// Domains
// =============================================================================

fn parse_domain_list(value: &str, separator: char) -> Result<DomainList, ParseError> {
    let mut list = DomainList::default();

    for raw in value.split(separator) {
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }

        let (is_restricted, domain_raw) = match raw.strip_prefix('~') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };

        let domain = normalize_domain(domain_raw)?;
        let target = if is_restricted {
            &mut list.restricted
        } else {
            &mut list.permitted
        };
        if !target.contains(&domain) {
            target.push(domain);
        }
    }

    Ok(list)
}

/// Lowercase a domain and convert it to punycode.
pub(crate) fn normalize_domain(host: &str) -> Result<String, ParseError> {
    let trimmed = host.trim().trim_matches('.');
    if trimmed.is_empty() {
        return Err(ParseError::InvalidDomain(host.to_string()));
    }

    if !trimmed
        .chars()
        .all(|c| !c.is_ascii() || c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_')
    {
        return Err(ParseError::InvalidDomain(host.to_string()));
    }

    match url::Host::parse(&trimmed.to_lowercase()) {
        Ok(url::Host::Domain(domain)) => Ok(domain),
        Ok(url::Host::Ipv4(addr)) => Ok(addr.to_string()),
        _ => Err(ParseError::InvalidDomain(host.to_string())),
    }
}

// =============================================================================
// Cosmetic Rules
// =============================================================================

const MARKERS: [(&str, CosmeticType, bool); 8] = [
    ("#@?#", CosmeticType::ExtendedCss, true),
    ("#@$#", CosmeticType::CssInject, true),
    ("#@%#", CosmeticType::Script, true),
    ("#@#", CosmeticType::ElementHiding, true),
    ("#?#", CosmeticType::ExtendedCss, false),
    ("#$#", CosmeticType::CssInject, false),
    ("#%#", CosmeticType::Script, false),
    ("##", CosmeticType::ElementHiding, false),
];

struct Marker {
    len: usize,
    cosmetic: CosmeticType,
    exception: bool,
}

fn find_cosmetic_marker(line: &str) -> Option<(usize, Marker)> {
    for (pos, _) in line.match_indices('#') {
        let rest = &line[pos..];
        for (marker, cosmetic, exception) in MARKERS {
            if rest.starts_with(marker) {
                return Some((
                    pos,
                    Marker {
                        len: marker.len(),
                        cosmetic,
                        exception,
                    },
                ));
            }
        }
    }
    None
}

const EXTENDED_PSEUDO_CLASSES: [&str; 20] = [
    ":has-text(",
    ":contains(",
    ":-abp-has(",
    ":-abp-contains(",
    ":-abp-properties(",
    ":matches-css(",
    ":matches-css-before(",
    ":matches-css-after(",
    ":matches-attr(",
    ":matches-property(",
    ":min-text-length(",
    ":xpath(",
    ":nth-ancestor(",
    ":upward(",
    ":remove(",
    ":if(",
    ":if-not(",
    ":watch-attr(",
    ":style(",
    ":others(",
];

pub(crate) fn is_extended_selector(selector: &str) -> bool {
    selector.contains("[-ext-") || EXTENDED_PSEUDO_CLASSES.iter().any(|p| selector.contains(p))
}

fn parse_cosmetic_rule(index: usize, line: &str) -> Result<Option<Rule>, ParseError> {
    let Some((pos, marker)) = find_cosmetic_marker(line) else {
        return Ok(None);
    };

    let domains_text = &line[..pos];
    if domains_text
        .chars()
        .any(|c| matches!(c, '/' | '|' | '^' | '$' | '?' | '*' | '='))
    {
        return Ok(None);
    }

    let body = line[pos + marker.len..].trim();
    if body.is_empty() {
        return Err(ParseError::EmptyPattern);
    }

    let modifiers = Modifiers {
        domains: parse_domain_list(domains_text, ',')?,
        ..Modifiers::default()
    };

    let mut rule = Rule {
        line: index,
        text: line.to_string(),
        kind: RuleKind::Cosmetic,
        pattern: body.to_string(),
        modifiers,
        cosmetic: Some(marker.cosmetic),
        cosmetic_exception: marker.exception,
        scriptlet: None,
    };

    match marker.cosmetic {
        CosmeticType::ElementHiding => {
            if let Some(args) = body.strip_prefix("+js(") {
                let args = args
                    .strip_suffix(')')
                    .ok_or_else(|| ParseError::MalformedScriptlet(body.to_string()))?;
                let scriptlet = parse_ubo_scriptlet(args, marker.exception)?;
                return Ok(Some(into_scriptlet_rule(rule, scriptlet)));
            }
            if body.contains('{') || body.contains('}') {
                return Err(ParseError::InvalidSelector(body.to_string()));
            }
            if is_extended_selector(body) {
                rule.cosmetic = Some(CosmeticType::ExtendedCss);
            }
        }
        CosmeticType::Script => {
            if let Some(call) = body.strip_prefix("//scriptlet(") {
                let args = call
                    .strip_suffix(')')
                    .ok_or_else(|| ParseError::MalformedScriptlet(body.to_string()))?;
                let scriptlet = parse_quoted_scriptlet(args, marker.exception)?;
                return Ok(Some(into_scriptlet_rule(rule, scriptlet)));
            }
        }
        CosmeticType::ExtendedCss => {
            if body.contains('{') || body.contains('}') {
                return Err(ParseError::InvalidSelector(body.to_string()));
            }
        }
        CosmeticType::CssInject => {
            if !body.contains('{') || !body.ends_with('}') {
                return Err(ParseError::InvalidSelector(body.to_string()));
            }
        }
    }

    Ok(Some(rule))
}

fn into_scriptlet_rule(rule: Rule, scriptlet: Scriptlet) -> Rule {
    Rule {
        kind: RuleKind::Scriptlet,
        pattern: scriptlet.name.clone(),
        cosmetic: None,
        scriptlet: Some(scriptlet),
        ..rule
    }
}

/// `name, arg1, arg2` as written inside `+js(...)`.
fn parse_ubo_scriptlet(args: &str, exception: bool) -> Result<Scriptlet, ParseError> {
    let mut parts = args.split(',').map(str::trim);
    let name = parts.next().unwrap_or_default().to_string();
    if name.is_empty() && !exception {
        return Err(ParseError::MalformedScriptlet(args.to_string()));
    }
    Ok(Scriptlet {
        name,
        args: parts.map(str::to_string).collect(),
    })
}

/// `'name', 'arg1', "arg2"` as written inside `//scriptlet(...)`.
fn parse_quoted_scriptlet(args: &str, exception: bool) -> Result<Scriptlet, ParseError> {
    let malformed = || ParseError::MalformedScriptlet(args.to_string());
    let mut values = Vec::new();
    let mut chars = args.chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        let Some(quote) = chars.next() else {
            break;
        };
        if quote != '\'' && quote != '"' {
            return Err(malformed());
        }

        let mut value = String::new();
        let mut closed = false;
        while let Some(c) = chars.next() {
            match c {
                '\\' => value.push(chars.next().ok_or_else(malformed)?),
                c if c == quote => {
                    closed = true;
                    break;
                }
                c => value.push(c),
            }
        }
        if !closed {
            return Err(malformed());
        }
        values.push(value);

        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        match chars.next() {
            Some(',') => continue,
            None => break,
            Some(_) => return Err(malformed()),
        }
    }

    let mut values = values.into_iter();
    let name = values.next().unwrap_or_default();
    if name.is_empty() && !exception {
        return Err(malformed());
    }
    Ok(Scriptlet {
        name,
        args: values.collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Rule {
        parse_rule(0, line).unwrap().unwrap()
    }

    #[test]
    fn skips_blank_and_comment_lines() {
        assert_eq!(parse_rule(0, "   "), Ok(None));
        assert_eq!(parse_rule(0, "! Title: list"), Ok(None));
        assert_eq!(parse_rule(0, "[Adblock Plus 2.0]"), Ok(None));
        assert_eq!(parse_rule(0, "# hosts comment"), Ok(None));
        assert!(parse_rule(0, "##.banner").unwrap().is_some());
    }

    #[test]
    fn parses_network_rule_with_options() {
        let rule = parse("||ads.example.com^$script,third-party,domain=a.com|~b.com,important");
        assert_eq!(rule.kind, RuleKind::Network);
        assert_eq!(rule.pattern, "||ads.example.com^");
        assert_eq!(rule.modifiers.content_types, Some(ContentType::SCRIPT));
        assert_eq!(rule.modifiers.third_party, Some(true));
        assert!(rule.modifiers.important);
        assert_eq!(rule.modifiers.domains.permitted, vec!["a.com"]);
        assert_eq!(rule.modifiers.domains.restricted, vec!["b.com"]);
    }

    #[test]
    fn parses_exception_scopes() {
        let rule = parse("@@||example.com^$document,elemhide");
        assert_eq!(rule.kind, RuleKind::Exception);
        assert_eq!(
            rule.modifiers.exception_scope,
            ExceptionScope::DOCUMENT | ExceptionScope::ELEMHIDE
        );
        assert_eq!(rule.modifiers.content_types, None);
    }

    #[test]
    fn document_on_blocking_rule_is_a_content_type() {
        let rule = parse("||example.com^$document");
        assert_eq!(rule.modifiers.content_types, Some(ContentType::DOCUMENT));
        assert!(rule.modifiers.exception_scope.is_empty());
    }

    #[test]
    fn exception_only_modifier_on_blocking_rule_fails() {
        assert_eq!(
            parse_rule(0, "||example.com^$elemhide"),
            Err(ParseError::ExceptionOnlyModifier("elemhide".to_string()))
        );
    }

    #[test]
    fn negated_types_complement_default_set() {
        let rule = parse("||example.com^$~script");
        let types = rule.modifiers.content_types.unwrap();
        assert!(!types.contains(ContentType::SCRIPT));
        assert!(types.contains(ContentType::IMAGE));
        assert!(!types.contains(ContentType::OBJECT));

        let rule = parse("||example.com^$~object");
        assert_eq!(rule.modifiers.content_types, None);
    }

    #[test]
    fn rejects_unknown_and_malformed_modifiers() {
        assert_eq!(
            parse_rule(0, "||example.com^$frobnicate"),
            Err(ParseError::UnknownModifier("frobnicate".to_string()))
        );
        assert!(matches!(
            parse_rule(0, "||example.com^$script=1"),
            Err(ParseError::MalformedModifier(_))
        ));
        assert!(matches!(
            parse_rule(0, "||example.com^$script,~script"),
            Err(ParseError::MalformedModifier(_))
        ));
    }

    #[test]
    fn keeps_unsupported_options_for_the_compiler() {
        let rule = parse("||example.com^$csp=script-src 'none'");
        assert_eq!(rule.modifiers.unsupported, vec!["csp"]);
    }

    #[test]
    fn regex_rules_keep_trailing_dollar() {
        let rule = parse("/banner[0-9]+$/");
        assert!(rule.is_regex());
        assert_eq!(rule.pattern, "/banner[0-9]+$/");

        let rule = parse("/ads[0-9]/$image");
        assert_eq!(rule.pattern, "/ads[0-9]/");
        assert_eq!(rule.modifiers.content_types, Some(ContentType::IMAGE));

        assert!(matches!(parse_rule(0, "/ads(/"), Err(ParseError::InvalidRegex(_))));
    }

    #[test]
    fn empty_pattern_fails() {
        assert_eq!(parse_rule(0, "@@"), Err(ParseError::EmptyPattern));
        assert_eq!(parse_rule(0, "example.com##"), Err(ParseError::EmptyPattern));
        assert!(parse_rule(0, "$domain=example.com,script").unwrap().is_some());
    }

    #[test]
    fn parses_hosts_file_lines() {
        let rule = parse("0.0.0.0 tracker.example.com");
        assert_eq!(rule.pattern, "||tracker.example.com^");
        assert_eq!(rule.kind, RuleKind::Network);

        assert_eq!(parse_rule(0, "ads banner"), Err(ParseError::UnknownSyntax));
    }

    #[test]
    fn normalizes_domains_to_punycode() {
        let rule = parse("ПРИМЕР.рф##.ad");
        assert_eq!(rule.modifiers.domains.permitted, vec!["xn--e1afmkfd.xn--p1ai"]);
        assert!(matches!(
            parse_rule(0, "exa mple.com,b.com##.ad"),
            Err(ParseError::InvalidDomain(_))
        ));
    }

    #[test]
    fn parses_cosmetic_markers() {
        let rule = parse("example.com,~sub.example.com##.banner");
        assert_eq!(rule.kind, RuleKind::Cosmetic);
        assert_eq!(rule.cosmetic, Some(CosmeticType::ElementHiding));
        assert_eq!(rule.pattern, ".banner");
        assert_eq!(rule.modifiers.domains.permitted, vec!["example.com"]);
        assert_eq!(rule.modifiers.domains.restricted, vec!["sub.example.com"]);

        let rule = parse("example.com#@#.banner");
        assert!(rule.cosmetic_exception);

        let rule = parse("##div:has-text(Sponsored)");
        assert_eq!(rule.cosmetic, Some(CosmeticType::ExtendedCss));

        let rule = parse("example.com#$#body { overflow: auto !important; }");
        assert_eq!(rule.cosmetic, Some(CosmeticType::CssInject));

        let rule = parse("example.com#%#window.ads = false;");
        assert_eq!(rule.cosmetic, Some(CosmeticType::Script));
    }

    #[test]
    fn rejects_braces_in_hiding_selector() {
        assert!(matches!(
            parse_rule(0, "##.ad { color: red }"),
            Err(ParseError::InvalidSelector(_))
        ));
    }

    #[test]
    fn parses_scriptlets_in_both_syntaxes() {
        let rule = parse("example.com##+js(set-constant, ads, false)");
        assert_eq!(rule.kind, RuleKind::Scriptlet);
        let scriptlet = rule.scriptlet.unwrap();
        assert_eq!(scriptlet.name, "set-constant");
        assert_eq!(scriptlet.args, vec!["ads", "false"]);

        let rule = parse(r#"example.com#%#//scriptlet('abort-on-property-read', "a\"b")"#);
        let scriptlet = rule.scriptlet.unwrap();
        assert_eq!(scriptlet.name, "abort-on-property-read");
        assert_eq!(scriptlet.args, vec!["a\"b"]);

        let rule = parse("example.com#@#+js()");
        assert!(rule.cosmetic_exception);
        assert_eq!(rule.scriptlet.unwrap().name, "");

        assert!(matches!(
            parse_rule(0, "example.com##+js()"),
            Err(ParseError::MalformedScriptlet(_))
        ));
        assert!(matches!(
            parse_rule(0, "example.com#%#//scriptlet('unterminated)"),
            Err(ParseError::MalformedScriptlet(_))
        ));
    }

    #[test]
    fn batch_counts_failures_without_aborting() {
        let lines = ["||a.com^", "", "! comment", "||b.com^$bogus", "##.ad"];
        let parsed = parse_rules(&lines);
        assert_eq!(parsed.total, 3);
        assert_eq!(parsed.rules.len(), 2);
        assert_eq!(parsed.failures.len(), 1);
        assert_eq!(parsed.failures[0].line, 3);
        assert_eq!(parsed.rules[1].line, 4);
    }
}

//! URL pattern translation: filter syntax to Safari's regex dialect.

use cbc_core::error::CompileError;
use cbc_core::MATCH_ALL_URLS;

use crate::rule::is_regex_pattern;

/// Replacement for a leading `||`: any scheme, any number of subdomains.
const DOMAIN_ANCHOR: &str = r"^[htpsw]+:\/\/([a-z0-9-]+\.)*";
/// Replacement for `^` inside a pattern.
const SEPARATOR: &str = r"[\/:&\?]";
/// Replacement for `^` closing a pattern: a separator or the end of the URL.
const SEPARATOR_END: &str = r"([\/:&\?].*)?$";

/// Translate a rule pattern into a `url-filter`.
///
/// `/regex/` patterns are passed through without their slashes after being
/// checked against what Safari's engine accepts.
pub fn to_url_filter(pattern: &str) -> Result<String, CompileError> {
    if is_regex_pattern(pattern) {
        let body = &pattern[1..pattern.len() - 1];
        validate_safari_regex(body)?;
        return Ok(body.to_string());
    }
    if !pattern.is_ascii() {
        return Err(CompileError::NonAsciiPattern);
    }
    Ok(pattern_to_regex(pattern))
}

pub fn pattern_to_regex(pattern: &str) -> String {
    let mut rest = pattern;
    let mut out = String::with_capacity(pattern.len() * 2);

    let domain_anchored = rest.starts_with("||");
    let start_anchored = !domain_anchored && rest.starts_with('|');
    if domain_anchored {
        rest = &rest[2..];
        out.push_str(DOMAIN_ANCHOR);
    } else if start_anchored {
        rest = &rest[1..];
        out.push('^');
    }

    let end_anchored = rest.ends_with('|');
    if end_anchored {
        rest = &rest[..rest.len() - 1];
    }

    if !domain_anchored && !start_anchored {
        rest = rest.trim_start_matches('*');
    }
    if !end_anchored {
        rest = rest.trim_end_matches('*');
    }

    if rest.is_empty() && out.is_empty() && !end_anchored {
        return MATCH_ALL_URLS.to_string();
    }

    let last = rest.len().saturating_sub(1);
    for (i, c) in rest.char_indices() {
        match c {
            '*' => out.push_str(".*"),
            '^' if i == last && !end_anchored => out.push_str(SEPARATOR_END),
            '^' => out.push_str(SEPARATOR),
            '.' | '+' | '?' | '$' | '{' | '}' | '(' | ')' | '[' | ']' | '/' | '\\' | '|' => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }

    if end_anchored {
        out.push('$');
    }
    out
}

/// Reject constructs Safari's regex engine does not implement.
pub fn validate_safari_regex(body: &str) -> Result<(), CompileError> {
    if !body.is_ascii() {
        return Err(CompileError::NonAsciiPattern);
    }

    let unsupported = |what: &str| Err(CompileError::UnsupportedRegex(what.to_string()));
    let mut chars = body.chars().peekable();
    let mut in_class = false;

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(e @ ('b' | 'B' | 'd' | 'D' | 'w' | 'W' | 's' | 'S')) => {
                    return unsupported(&format!("\\{e}"));
                }
                _ => {}
            },
            '[' => in_class = true,
            ']' => in_class = false,
            '|' if !in_class => return unsupported("|"),
            '{' | '}' if !in_class => return unsupported("{}"),
            '(' if !in_class && chars.peek() == Some(&'?') => return unsupported("(?"),
            _ => {}
        }
    }

    Ok(())
}

/// Longest literal the URL must contain for the pattern to match.
///
/// Prefilters URLs in the matcher and gates subsumption in the optimizer.
/// Never emitted.
pub fn extract_shortcut(pattern: &str, match_case: bool) -> Option<String> {
    let literal = if is_regex_pattern(pattern) {
        regex_shortcut(&pattern[1..pattern.len() - 1])?
    } else {
        pattern
            .split(['*', '^', '|'])
            .max_by_key(|part| part.len())
            .unwrap_or_default()
            .to_string()
    };

    if literal.is_empty() {
        return None;
    }
    Some(if match_case {
        literal
    } else {
        literal.to_ascii_lowercase()
    })
}

fn regex_shortcut(body: &str) -> Option<String> {
    let chars: Vec<char> = body.chars().collect();
    let mut best = String::new();
    let mut current = String::new();
    let mut i = 0;
    let mut depth = 0usize;

    let flush = |current: &mut String, best: &mut String| {
        if current.len() > best.len() {
            *best = std::mem::take(current);
        } else {
            current.clear();
        }
    };

    while i < chars.len() {
        let c = chars[i];
        let optional = matches!(chars.get(i + 1), Some('?' | '*' | '{'));
        match c {
            '(' => {
                depth += 1;
                flush(&mut current, &mut best);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                flush(&mut current, &mut best);
            }
            '|' if depth == 0 => return None,
            '[' => {
                flush(&mut current, &mut best);
                while i < chars.len() && chars[i] != ']' {
                    if chars[i] == '\\' {
                        i += 1;
                    }
                    i += 1;
                }
            }
            '\\' => {
                i += 1;
                match chars.get(i) {
                    Some(&e) if e.is_ascii_punctuation() && depth == 0 => {
                        let optional = matches!(chars.get(i + 1), Some('?' | '*' | '{'));
                        if optional {
                            flush(&mut current, &mut best);
                        } else {
                            current.push(e);
                        }
                    }
                    _ => flush(&mut current, &mut best),
                }
            }
            '.' | '^' | '$' | '+' | '?' | '*' | '{' | '}' | '|' => {
                flush(&mut current, &mut best);
            }
            _ if depth > 0 => {}
            _ if optional => flush(&mut current, &mut best),
            c => current.push(c),
        }
        i += 1;
    }
    flush(&mut current, &mut best);

    Some(best)
}

/// Host named by a `||host` pattern, if one is spelled out literally.
///
/// Returns the host and whether the pattern is exactly `||host^`.
pub fn extract_host(pattern: &str) -> Option<(String, bool)> {
    let rest = pattern.strip_prefix("||")?;
    let end = rest.find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_')))?;
    if end == 0 || !matches!(rest.as_bytes()[end], b'^' | b'/' | b':') {
        return None;
    }
    let host = rest[..end].to_ascii_lowercase();
    let pure = &rest[end..] == "^";
    Some((host, pure))
}

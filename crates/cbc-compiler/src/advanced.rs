//! Advanced blocking payload: rules Safari's native schema cannot express.
//!
//! Entries use the same `{trigger, action}` shape with the extra action
//! types, and are applied by a companion engine rather than Safari itself.

use cbc_core::error::CompileError;
use cbc_core::{Action, ActionType, AdvancedBlockingFormat, ConversionError, Entry, Trigger};
use serde::Serialize;

use crate::compiler::{domain_condition, page_scope_trigger};
use crate::rule::{CosmeticType, ExceptionScope, Rule, RuleKind};

/// `scriptletParam` value.
#[derive(Debug, Serialize)]
struct ScriptletParam<'a> {
    name: &'a str,
    args: &'a [String],
}

#[derive(Debug, Default)]
pub struct AdvancedCompiled {
    pub entries: Vec<Entry>,
    /// Rules that could not be compiled, by input line
    pub failures: Vec<(usize, CompileError)>,
    /// Input lines of every rule the payload carries
    pub sources: Vec<usize>,
}

#[derive(Default)]
struct Sections {
    scripts: Vec<Entry>,
    script_exceptions: Vec<Entry>,
    css_generic: Vec<Entry>,
    generichide_exceptions: Vec<Entry>,
    css_domain: Vec<Entry>,
    elemhide_exceptions: Vec<Entry>,
    document_exceptions: Vec<Entry>,
}

/// Compile advanced rules, plus the network exceptions that switch them
/// off on a page.
///
/// Each exception only reaches back over the rules it cancels, mirroring the
/// native group order: scripts and scriptlets, `$jsinject` exceptions,
/// generic CSS, `$generichide` exceptions, domain CSS, `$elemhide`
/// exceptions, then `$document` exceptions.
pub fn compile_advanced(rules: &[Rule]) -> Result<AdvancedCompiled, ConversionError> {
    let mut compiled = AdvancedCompiled::default();
    let mut sections = Sections::default();

    for rule in rules {
        if rule.kind == RuleKind::Exception {
            add_page_exception(rule, &mut sections, &mut compiled.sources);
            continue;
        }
        if !rule.is_advanced() || rule.cosmetic_exception {
            continue;
        }

        match compile_advanced_rule(rule)? {
            Ok(entry) => {
                let section = match entry.action.action_type {
                    ActionType::CssExtended | ActionType::CssInject => {
                        if entry.trigger.if_domain().is_some() {
                            &mut sections.css_domain
                        } else {
                            &mut sections.css_generic
                        }
                    }
                    _ => &mut sections.scripts,
                };
                section.push(entry);
                compiled.sources.push(rule.line);
            }
            Err(error) => compiled.failures.push((rule.line, error)),
        }
    }

    let Sections {
        scripts,
        script_exceptions,
        css_generic,
        generichide_exceptions,
        css_domain,
        elemhide_exceptions,
        document_exceptions,
    } = sections;
    compiled.entries = scripts
        .into_iter()
        .chain(script_exceptions)
        .chain(css_generic)
        .chain(generichide_exceptions)
        .chain(css_domain)
        .chain(elemhide_exceptions)
        .chain(document_exceptions)
        .collect();
    compiled.sources.sort_unstable();
    Ok(compiled)
}

fn add_page_exception(rule: &Rule, sections: &mut Sections, sources: &mut Vec<usize>) {
    let scope = rule.modifiers.exception_scope;
    let mut targets: Vec<&mut Vec<Entry>> = Vec::new();
    if scope.contains(ExceptionScope::DOCUMENT) {
        targets.push(&mut sections.document_exceptions);
    } else {
        if scope.contains(ExceptionScope::JSINJECT) {
            targets.push(&mut sections.script_exceptions);
        }
        if scope.contains(ExceptionScope::ELEMHIDE) {
            targets.push(&mut sections.elemhide_exceptions);
        } else if scope.contains(ExceptionScope::GENERICHIDE) {
            targets.push(&mut sections.generichide_exceptions);
        }
    }
    if targets.is_empty() {
        return;
    }

    // A failing exception is already reported by the native compiler
    let Ok(trigger) = page_scope_trigger(rule) else {
        return;
    };
    for target in targets {
        target.push(Entry::new(trigger.clone(), Action::ignore_previous_rules()));
    }
    sources.push(rule.line);
}

/// The outer result carries serialization failures, the inner one rule errors.
fn compile_advanced_rule(rule: &Rule) -> Result<Result<Entry, CompileError>, ConversionError> {
    let domains = match domain_condition(&rule.modifiers.domains) {
        Ok(domains) => domains,
        Err(error) => return Ok(Err(error)),
    };
    let trigger = Trigger {
        domains,
        ..Trigger::default()
    };

    let body = rule.pattern.trim();
    let action = match (rule.kind, rule.cosmetic, &rule.scriptlet) {
        (RuleKind::Scriptlet, _, Some(scriptlet)) => {
            let param = serde_json::to_string(&ScriptletParam {
                name: &scriptlet.name,
                args: &scriptlet.args,
            })?;
            Action::scriptlet(scriptlet.name.clone(), param)
        }
        _ if body.is_empty() => return Ok(Err(CompileError::EmptySelector)),
        (_, Some(CosmeticType::ExtendedCss), _) => Action::css_extended(body),
        (_, Some(CosmeticType::CssInject), _) => Action::css_inject(body),
        (_, Some(CosmeticType::Script), _) => Action::script(body),
        _ => return Ok(Err(CompileError::EmptySelector)),
    };

    Ok(Ok(Entry::new(trigger, action)))
}

/// Encode the payload in the requested format.
///
/// `txt` lists the rule texts the payload was built from, cosmetic
/// exceptions targeting advanced rules included, in input order.
pub fn render_advanced(
    compiled: &AdvancedCompiled,
    rules: &[Rule],
    exceptions: &[Rule],
    format: AdvancedBlockingFormat,
) -> Result<String, ConversionError> {
    match format {
        AdvancedBlockingFormat::Json => Ok(serde_json::to_string(&compiled.entries)?),
        AdvancedBlockingFormat::Txt => {
            let mut lines: Vec<(usize, &str)> = rules
                .iter()
                .filter(|rule| compiled.sources.binary_search(&rule.line).is_ok())
                .chain(exceptions.iter().filter(|rule| rule.is_advanced()))
                .map(|rule| (rule.line, rule.text.as_str()))
                .collect();
            lines.sort_unstable_by_key(|(line, _)| *line);
            Ok(lines
                .into_iter()
                .map(|(_, text)| text)
                .collect::<Vec<_>>()
                .join("\n"))
        }
    }
}

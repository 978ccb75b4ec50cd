//! Conversion pipeline: lines in, [`ConversionResult`] out.

use std::collections::HashSet;

use cbc_core::error::{CompileError, RuleError, RuleFailure};
use cbc_core::{ConversionConfig, ConversionError, ConversionLogger, ConversionResult};

use crate::advanced::{compile_advanced, render_advanced, AdvancedCompiled};
use crate::compiler::{compile_rule, CompiledEntry};
use crate::cosmetic::apply_cosmetic_exceptions;
use crate::limiter::limit_and_serialize;
use crate::optimizer::{apply_badfilters, optimize_entries};
use crate::parser::parse_rules;
use crate::rule::Rule;
use crate::version_filter::{filter_for_version, promote_has_selectors};

/// Per-rule failures, each input line counted once.
#[derive(Default)]
struct FailureLog {
    failed: HashSet<usize>,
    failures: Vec<RuleFailure>,
}

impl FailureLog {
    fn record(
        &mut self,
        line: usize,
        text: &str,
        error: RuleError,
        logger: &dyn ConversionLogger,
    ) {
        if !self.failed.insert(line) {
            return;
        }
        logger.debug(&format!("line {}: {error}: {text}", line + 1));
        self.failures.push(RuleFailure {
            line,
            text: text.to_string(),
            error,
        });
    }

    fn record_rule(
        &mut self,
        rules: &[Rule],
        line: usize,
        error: RuleError,
        logger: &dyn ConversionLogger,
    ) {
        let text = rules
            .binary_search_by_key(&line, |rule| rule.line)
            .map(|index| rules[index].text.as_str())
            .unwrap_or_default();
        self.record(line, text, error, logger);
    }
}

/// Convert filter rules into a Safari content blocker.
///
/// Only configuration and serialization problems are returned as errors.
/// Rules that fail are counted and listed in the result.
pub fn convert_array<S: AsRef<str>>(
    lines: &[S],
    config: ConversionConfig,
    logger: &dyn ConversionLogger,
) -> Result<ConversionResult, ConversionError> {
    config.validate()?;

    let parsed = parse_rules(lines);
    let total = parsed.total;
    let mut log = FailureLog::default();
    for failure in parsed.failures {
        log.record(failure.line, &failure.text, failure.error, logger);
    }
    if total == 0 {
        let mut result = ConversionResult::empty();
        if config.advanced_blocking {
            result.advanced_blocking = Some(render_advanced(
                &AdvancedCompiled::default(),
                &[],
                &[],
                config.advanced_blocking_format,
            )?);
        }
        return Ok(result);
    }

    let mut rules = parsed.rules;
    let badfilter = apply_badfilters(&mut rules);
    if badfilter.badfilter_rules > 0 {
        logger.info(&format!(
            "{} badfilter rules cancelled {} rules",
            badfilter.badfilter_rules, badfilter.badfiltered_rules
        ));
    }

    let version = config.safari_version;
    let (mut rules, exceptions) = apply_cosmetic_exceptions(rules);
    if config.advanced_blocking {
        promote_has_selectors(&mut rules, version, logger);
    }

    let mut entries: Vec<CompiledEntry> = Vec::new();
    for rule in &rules {
        if rule.is_advanced() {
            if !config.advanced_blocking {
                log.record(
                    rule.line,
                    &rule.text,
                    CompileError::AdvancedBlockingDisabled.into(),
                    logger,
                );
            }
            continue;
        }
        match compile_rule(rule, logger) {
            Ok(compiled) => entries.extend(compiled),
            Err(error) => log.record(rule.line, &rule.text, error.into(), logger),
        }
    }
    entries.sort_by_key(|entry| entry.group);

    if config.optimize {
        let (optimized, stats) = optimize_entries(entries);
        logger.info(&format!(
            "optimized {} entries to {} ({} duplicates, {} subsumed, {} merged)",
            stats.before, stats.after, stats.deduped, stats.subsumed, stats.merged
        ));
        entries = optimized;
    }

    let filtered = filter_for_version(entries, version, logger);
    for (line, reason) in filtered.errored_sources {
        let error = RuleError::Unsupported {
            version: version.to_string(),
            reason,
        };
        log.record_rule(&rules, line, error, logger);
    }

    let payload = limit_and_serialize(
        filtered.entries.iter().map(|compiled| &compiled.entry),
        config.max_json_size_bytes,
        version.rules_limit(),
    )?;
    if payload.over_limit {
        logger.warn(&format!(
            "content blocker truncated to {} of {} entries",
            payload.count,
            filtered.entries.len()
        ));
    }

    let mut advanced_blocking = None;
    let mut advanced_blocking_count = 0;
    if config.advanced_blocking {
        let advanced = compile_advanced(&rules)?;
        for (line, error) in &advanced.failures {
            log.record_rule(&rules, *line, error.clone().into(), logger);
        }
        advanced_blocking_count = advanced.entries.len();
        advanced_blocking = Some(render_advanced(
            &advanced,
            &rules,
            &exceptions,
            config.advanced_blocking_format,
        )?);
    }

    let errors_count = log.failed.len();
    logger.info(&format!(
        "converted {} of {total} rules into {} entries",
        total - errors_count,
        payload.count
    ));

    Ok(ConversionResult {
        converted: payload.json,
        converted_count: total - errors_count,
        errors_count,
        total_converted_count: filtered.entries.len(),
        entries_count: payload.count,
        over_limit: payload.over_limit,
        advanced_blocking,
        advanced_blocking_count,
        failures: log.failures,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cbc_core::{AdvancedBlockingFormat, NoopLogger, SafariVersion};

    fn convert(lines: &[&str], config: ConversionConfig) -> ConversionResult {
        convert_array(lines, config, &NoopLogger).unwrap()
    }

    #[test]
    fn counts_every_rule_once() {
        let result = convert(
            &[
                "! comment",
                "||ads.com^",
                "||bad.com^$unknownopt",
                "##div:has-text(Ad)",
                "",
                "example.com##.banner",
            ],
            ConversionConfig::default(),
        );
        assert_eq!(result.converted_count, 2);
        assert_eq!(result.errors_count, 2);
        assert_eq!(result.failures.len(), 2);
        assert_eq!(result.failures[0].line, 2);
        assert_eq!(
            result.failures[1].error,
            RuleError::Compile(CompileError::AdvancedBlockingDisabled)
        );
        assert_eq!(result.entries_count, 2);
        assert_eq!(result.advanced_blocking, None);
    }

    #[test]
    fn output_follows_priority_groups() {
        let result = convert(
            &["@@||ads.com^$document", "||ads.com^", "example.com##.a", "##.b"],
            ConversionConfig::default(),
        );
        let value: serde_json::Value = serde_json::from_str(&result.converted).unwrap();
        let types: Vec<&str> = value
            .as_array()
            .unwrap()
            .iter()
            .map(|entry| entry["action"]["type"].as_str().unwrap())
            .collect();
        assert_eq!(
            types,
            vec!["css-display-none", "css-display-none", "block", "ignore-previous-rules"]
        );
        assert_eq!(value[0]["action"]["selector"], ".b");
    }

    #[test]
    fn version_errors_count_as_failures() {
        let config = ConversionConfig {
            safari_version: SafariVersion::new(15.0).unwrap(),
            ..ConversionConfig::default()
        };
        let result = convert(&["##div:has(.ad)", "##.ad"], config);
        assert_eq!(result.converted_count, 1);
        assert_eq!(result.errors_count, 1);
        assert!(matches!(
            result.failures[0].error,
            RuleError::Unsupported { .. }
        ));
        assert_eq!(result.failures[0].text, "##div:has(.ad)");
    }

    #[test]
    fn advanced_payload_when_requested() {
        let config = ConversionConfig {
            advanced_blocking: true,
            advanced_blocking_format: AdvancedBlockingFormat::Txt,
            ..ConversionConfig::default()
        };
        let result = convert(&["##div:has-text(Ad)", "##.ad"], config);
        assert_eq!(result.errors_count, 0);
        assert_eq!(result.advanced_blocking.as_deref(), Some("##div:has-text(Ad)"));
        assert_eq!(result.advanced_blocking_count, 1);
        assert_eq!(result.entries_count, 1);
    }

    #[test]
    fn has_selectors_move_to_advanced_payload_on_old_safari() {
        let config = ConversionConfig {
            safari_version: SafariVersion::new(15.0).unwrap(),
            advanced_blocking: true,
            ..ConversionConfig::default()
        };
        let result = convert(&["##div:has(.ad)", "##.ad"], config);
        assert_eq!(result.errors_count, 0);
        assert_eq!(result.entries_count, 1);
        assert_eq!(result.advanced_blocking_count, 1);

        let advanced: serde_json::Value =
            serde_json::from_str(result.advanced_blocking.as_deref().unwrap()).unwrap();
        assert_eq!(advanced[0]["action"]["type"], "css-extended");
        assert_eq!(advanced[0]["action"]["css"], "div:has(.ad)");
    }

    #[test]
    fn empty_input_keeps_payload_shape() {
        let json = ConversionConfig {
            advanced_blocking: true,
            ..ConversionConfig::default()
        };
        let result = convert(&["! only a comment", ""], json);
        assert_eq!(result.advanced_blocking.as_deref(), Some("[]"));
        assert_eq!(result.advanced_blocking_count, 0);

        let txt = ConversionConfig {
            advanced_blocking: true,
            advanced_blocking_format: AdvancedBlockingFormat::Txt,
            ..ConversionConfig::default()
        };
        assert_eq!(convert(&[], txt).advanced_blocking.as_deref(), Some(""));

        assert_eq!(convert(&[], ConversionConfig::default()).advanced_blocking, None);
    }

    #[test]
    fn rejects_tiny_budget_before_reading_rules() {
        let config = ConversionConfig {
            max_json_size_bytes: Some(1),
            ..ConversionConfig::default()
        };
        let err = convert_array(&["||ads.com^"], config, &NoopLogger).unwrap_err();
        assert!(matches!(err, ConversionError::Configuration(_)));
    }
}

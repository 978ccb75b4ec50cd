//! Size-bounded serialization of the native rule list.

use cbc_core::config::EMPTY_PAYLOAD_LEN;
use cbc_core::{ConversionError, Entry};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitedPayload {
    /// Compact JSON array
    pub json: String,
    /// Entries written to `json`
    pub count: usize,
    /// At least one entry did not fit
    pub over_limit: bool,
}

/// Serialize entries in order until the byte budget or the rule cap is hit.
///
/// Only schema types reach the encoder, so compiler working state can
/// never leak into the payload.
pub fn limit_and_serialize<'a, I>(
    entries: I,
    max_bytes: Option<usize>,
    rules_limit: usize,
) -> Result<LimitedPayload, ConversionError>
where
    I: IntoIterator<Item = &'a Entry>,
{
    let mut json = String::from("[");
    let mut count = 0usize;
    let mut over_limit = false;

    for entry in entries {
        if count >= rules_limit {
            over_limit = true;
            break;
        }

        let encoded = serde_json::to_string(entry)?;
        let separator = usize::from(count > 0);
        if let Some(max_bytes) = max_bytes {
            // +1 for the closing bracket
            if json.len() + separator + encoded.len() + 1 > max_bytes {
                over_limit = true;
                break;
            }
        }

        if separator == 1 {
            json.push(',');
        }
        json.push_str(&encoded);
        count += 1;
    }
    json.push(']');

    debug_assert!(count > 0 || json.len() == EMPTY_PAYLOAD_LEN);
    Ok(LimitedPayload {
        json,
        count,
        over_limit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cbc_core::{Action, Trigger};

    fn entries(count: usize) -> Vec<Entry> {
        (0..count)
            .map(|i| Entry::new(Trigger::new(format!("ads{i}")), Action::block()))
            .collect()
    }

    #[test]
    fn unbounded_writes_everything() {
        let entries = entries(3);
        let payload = limit_and_serialize(&entries, None, usize::MAX).unwrap();
        assert_eq!(payload.count, 3);
        assert!(!payload.over_limit);
        let parsed: serde_json::Value = serde_json::from_str(&payload.json).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 3);
        assert_eq!(payload.json, serde_json::to_string(&entries).unwrap());
    }

    #[test]
    fn empty_list_is_empty_array() {
        let empty: Vec<Entry> = Vec::new();
        let payload = limit_and_serialize(&empty, Some(2), 10).unwrap();
        assert_eq!(payload.json, "[]");
        assert_eq!(payload.count, 0);
        assert!(!payload.over_limit);
    }

    #[test]
    fn truncates_to_byte_budget() {
        let entries = entries(10);
        let full = limit_and_serialize(&entries, None, usize::MAX).unwrap();

        let budget = full.json.len() / 2;
        let payload = limit_and_serialize(&entries, Some(budget), usize::MAX).unwrap();
        assert!(payload.over_limit);
        assert!(payload.json.len() <= budget);
        assert!(payload.count < 10);
        assert!(full.json.starts_with(payload.json.trim_end_matches(']')));

        let exact = limit_and_serialize(&entries, Some(full.json.len()), usize::MAX).unwrap();
        assert!(!exact.over_limit);
        assert_eq!(exact.json, full.json);
    }

    #[test]
    fn stops_at_rules_limit() {
        let entries = entries(5);
        let payload = limit_and_serialize(&entries, None, 3).unwrap();
        assert_eq!(payload.count, 3);
        assert!(payload.over_limit);

        let payload = limit_and_serialize(&entries, None, 5).unwrap();
        assert!(!payload.over_limit);
    }
}

//! Status extraction from HelmRelease documents
//!
//! The HelmRelease status is traversed as semi-structured JSON rather than
//! through generated CRD types, so field extraction keeps working across
//! helm-controller API versions as long as field names stay consistent.
//! Decoding is deliberately permissive: a single malformed entry is dropped
//! while its siblings survive, preserving partial information over total
//! failure.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::models::{CheckError, Condition, HistoryEntry, TestHook};

/// Decoded `status` subtree of a HelmRelease document
#[derive(Debug, Default)]
pub struct ReleaseStatus {
    pub conditions: Vec<Condition>,
    pub test_hooks: Vec<TestHook>,
    pub ready: bool,
}

/// Extract conditions, test hooks, and the derived readiness flag
///
/// A missing or non-mapping `status` is an error; missing `conditions` or
/// `testHooks` keys are not and yield empty sequences.
pub fn extract_status(doc: &Value) -> Result<ReleaseStatus, CheckError> {
    let status = doc.get("status").ok_or(CheckError::MissingStatus)?;
    let status = status
        .as_object()
        .ok_or_else(|| CheckError::MalformedStatus("status is not a mapping".to_string()))?;

    let mut out = ReleaseStatus::default();

    if let Some(conditions) = status.get("conditions").and_then(Value::as_array) {
        for entry in conditions {
            let Some(map) = entry.as_object() else {
                tracing::debug!("skipping non-mapping condition entry");
                continue;
            };
            let condition = Condition {
                type_: string_field(map, "type"),
                status: string_field(map, "status"),
                reason: string_field(map, "reason"),
                message: string_field(map, "message"),
                last_transition_time: map
                    .get("lastTransitionTime")
                    .and_then(Value::as_str)
                    .and_then(parse_timestamp),
            };
            if condition.signals_ready() {
                out.ready = true;
            }
            out.conditions.push(condition);
        }
    }

    if let Some(hooks) = status.get("testHooks").and_then(Value::as_array) {
        for entry in hooks {
            let Some(map) = entry.as_object() else {
                tracing::debug!("skipping non-mapping test hook entry");
                continue;
            };
            out.test_hooks.push(TestHook {
                type_: string_field(map, "type"),
                status: string_field(map, "status"),
                message: string_field(map, "message"),
            });
        }
    }

    Ok(out)
}

/// Extract revision history from a HelmRelease document
///
/// Entries must carry an integer `version` and a string `chartVersion`;
/// anything else is skipped so schema drift across chart versions cannot
/// abort extraction. An absent history is simply empty.
pub fn extract_history(doc: &Value) -> Vec<HistoryEntry> {
    let Some(history) = doc.pointer("/status/history").and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut entries = Vec::new();
    for entry in history {
        let Some(map) = entry.as_object() else {
            tracing::debug!("skipping non-mapping history entry");
            continue;
        };
        let version = map.get("version").and_then(Value::as_i64);
        let chart_version = map.get("chartVersion").and_then(Value::as_str);
        let (Some(version), Some(chart_version)) = (version, chart_version) else {
            tracing::debug!("skipping history entry with unexpected version/chartVersion");
            continue;
        };
        entries.push(HistoryEntry {
            version,
            chart_version: chart_version.to_string(),
            test_hooks: map.get("testHooks").and_then(Value::as_object).cloned(),
        });
    }
    entries
}

fn string_field(map: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_string)
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

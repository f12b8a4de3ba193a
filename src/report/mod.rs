//! Report rendering for release check results
//!
//! Rendering is pure: the same result value always yields identical text
//! and nothing is mutated. A result carrying an error short-circuits to a
//! single error line; every other section is omitted.

use std::fmt::Write;

use crate::models::ReleaseResult;

/// Number of history entries shown in verbose mode
const HISTORY_LIMIT: usize = 3;

/// Renders per-release reports and the batch summary
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportFormatter {
    pub verbose: bool,
}

impl ReportFormatter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Render a single release result
    pub fn format_result(&self, result: &ReleaseResult) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "\n━━━ HelmRelease: {} ━━━", result.name);

        if let Some(err) = &result.error {
            let _ = writeln!(out, "  ❌ Error: {}", err);
            return out;
        }

        let (icon, label) = if result.ready {
            ("✅", "Ready")
        } else {
            ("❌", "Not Ready")
        };
        let _ = writeln!(out, "  {} Status: {}", icon, label);

        if !result.conditions.is_empty() {
            let _ = writeln!(out, "\n  📋 Conditions:");
            for cond in &result.conditions {
                let icon = if cond.is_true() { "✓" } else { "✗" };
                let _ = writeln!(
                    out,
                    "    {} {}: {} (Reason: {})",
                    icon,
                    display(&cond.type_),
                    display(&cond.status),
                    display(&cond.reason)
                );
                if self.verbose {
                    if let Some(message) = cond.message.as_deref().filter(|m| !m.is_empty()) {
                        let _ = writeln!(out, "      └─ {}", message);
                    }
                    if let Some(at) = cond.last_transition_time {
                        let _ = writeln!(
                            out,
                            "      └─ Last transition: {}",
                            at.format("%Y-%m-%d %H:%M:%S UTC")
                        );
                    }
                }
            }
        }

        let sections = [
            ("🚀 Deployments", "replicas", &result.deployments),
            ("🔧 DaemonSets", "pods", &result.daemon_sets),
        ];
        for (heading, noun, workloads) in sections {
            if workloads.is_empty() {
                continue;
            }
            let _ = writeln!(out, "\n  {}:", heading);
            for workload in workloads.iter() {
                let icon = if workload.is_healthy() { "✅" } else { "⚠️" };
                let _ = writeln!(
                    out,
                    "    {} {}: {}/{} {} ready",
                    icon, workload.name, workload.ready, workload.total, noun
                );
            }
        }

        if !result.test_hooks.is_empty() {
            let _ = writeln!(out, "\n  🧪 Test Hooks:");
            for hook in &result.test_hooks {
                let _ = writeln!(
                    out,
                    "    • {}: {}",
                    display(&hook.type_),
                    display(&hook.status)
                );
                if self.verbose {
                    if let Some(message) = hook.message.as_deref().filter(|m| !m.is_empty()) {
                        let _ = writeln!(out, "      └─ {}", message);
                    }
                }
            }
        }

        // History is assumed newest-first as the API supplies it; not re-sorted
        if self.verbose && !result.history.is_empty() {
            let _ = writeln!(out, "\n  📜 History:");
            for entry in result.history.iter().take(HISTORY_LIMIT) {
                let _ = writeln!(
                    out,
                    "    • Version {} (Chart: {})",
                    entry.version, entry.chart_version
                );
            }
        }

        out
    }

    /// Render the batch summary
    ///
    /// Results partition into ready (Ready, error-free, all workloads
    /// healthy) and failed; failed names are listed in input order.
    pub fn format_summary(&self, results: &[ReleaseResult]) -> String {
        let total = results.len();
        let ready = results.iter().filter(|r| r.is_fully_healthy()).count();
        let failed: Vec<&str> = results
            .iter()
            .filter(|r| !r.is_fully_healthy())
            .map(|r| r.name.as_str())
            .collect();

        let rule = "═".repeat(50);
        let mut out = String::new();
        let _ = writeln!(out, "\n{}", rule);
        let _ = writeln!(out, "📊 Summary: {}/{} HelmReleases Ready", ready, total);

        if failed.is_empty() {
            let _ = writeln!(out, "\n✅ All components are healthy!");
        } else {
            let _ = writeln!(out, "\n⚠️  Failed/Not Ready Components:");
            for name in &failed {
                let _ = writeln!(out, "   • {}", name);
            }
        }
        let _ = writeln!(out, "{}", rule);
        out
    }
}

/// Render an optional field, keeping absence distinguishable from text
fn display(field: &Option<String>) -> &str {
    field.as_deref().unwrap_or("<absent>")
}

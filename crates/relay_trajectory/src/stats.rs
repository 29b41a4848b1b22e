//! Context window utilization statistics.

use chrono::{DateTime, Utc};
use relay_storage::CallRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn is_zero(value: &u64) -> bool {
    *value == 0
}

fn is_zero_f64(value: &f64) -> bool {
    *value == 0.0
}

fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Context utilization across a set of calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextStats {
    /// Totals across all calls
    pub summary: ContextSummary,
    /// Breakdown by capability, budgeted calls only
    pub by_capability: BTreeMap<String, CapabilityContextStats>,
    /// Per-call details, when requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calls: Option<Vec<CallContextDetail>>,
}

/// Aggregate context statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextSummary {
    /// Calls analyzed
    pub total_calls: u64,
    /// Calls whose endpoint had a known context budget
    pub calls_with_budget: u64,
    /// Prompt tokens over budget, in percent
    pub avg_utilization: f64,
    /// Budgeted calls that were truncated, in percent
    pub truncation_rate: f64,
    /// Sum of budgets
    pub total_budget: u64,
    /// Sum of prompt tokens of budgeted calls
    pub total_used: u64,
}

/// Context statistics for one capability.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CapabilityContextStats {
    /// Budgeted calls
    pub call_count: u64,
    /// Mean budget
    #[serde(default, skip_serializing_if = "is_zero")]
    pub avg_budget: u64,
    /// Mean prompt tokens
    #[serde(default, skip_serializing_if = "is_zero")]
    pub avg_used: u64,
    /// Prompt tokens over budget, in percent
    pub avg_utilization: f64,
    /// Truncated calls, in percent
    pub truncation_rate: f64,
    /// Highest single-call utilization
    #[serde(default, skip_serializing_if = "is_zero_f64")]
    pub max_utilization: f64,
}

/// Context usage of one call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallContextDetail {
    /// Request id
    pub request_id: String,
    /// Correlation id
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub trace_id: String,
    /// Capability requested
    pub capability: String,
    /// Model that answered
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub model: String,
    /// Context budget
    pub budget: u64,
    /// Prompt tokens
    pub used: u64,
    /// Prompt tokens over budget, in percent
    pub utilization: f64,
    /// Whether the caller cut context to fit
    pub truncated: bool,
    /// Call start
    pub timestamp: DateTime<Utc>,
}

#[derive(Default)]
struct Accumulator {
    budget: u64,
    used: u64,
    calls: u64,
    truncated: u64,
    max_utilization: f64,
}

impl ContextStats {
    /// Compute statistics, optionally restricted to one capability.
    ///
    /// Only calls with a non-zero budget contribute to utilization, the
    /// per-capability breakdown and the details; every matching call counts
    /// towards `total_calls`.
    ///
    /// # Examples
    ///
    /// ```
    /// use relay_storage::CallRecord;
    /// use relay_trajectory::ContextStats;
    ///
    /// let call = CallRecord {
    ///     capability: "coding".into(),
    ///     context_budget: 1000,
    ///     prompt_tokens: 250,
    ///     ..CallRecord::default()
    /// };
    /// let stats = ContextStats::from_calls(&[call, CallRecord::default()], None, false);
    ///
    /// assert_eq!(stats.summary.total_calls, 2);
    /// assert_eq!(stats.summary.calls_with_budget, 1);
    /// assert_eq!(stats.summary.avg_utilization, 25.0);
    /// assert_eq!(stats.by_capability["coding"].avg_used, 250);
    /// ```
    pub fn from_calls(calls: &[CallRecord], capability: Option<&str>, details: bool) -> Self {
        let mut stats = Self {
            calls: details.then(Vec::new),
            ..Self::default()
        };
        let mut per_capability: BTreeMap<String, Accumulator> = BTreeMap::new();
        let mut truncated = 0u64;

        let matching = calls
            .iter()
            .filter(|call| capability.is_none_or(|c| call.capability == c));
        for call in matching {
            stats.summary.total_calls += 1;
            if call.context_budget == 0 {
                continue;
            }

            stats.summary.calls_with_budget += 1;
            stats.summary.total_budget += call.context_budget;
            stats.summary.total_used += call.prompt_tokens;
            if call.context_truncated {
                truncated += 1;
            }

            let utilization = percent(call.prompt_tokens, call.context_budget);
            let acc = per_capability.entry(call.capability.clone()).or_default();
            acc.budget += call.context_budget;
            acc.used += call.prompt_tokens;
            acc.calls += 1;
            if call.context_truncated {
                acc.truncated += 1;
            }
            acc.max_utilization = acc.max_utilization.max(utilization);

            if let Some(details) = stats.calls.as_mut() {
                details.push(CallContextDetail {
                    request_id: call.request_id.clone(),
                    trace_id: call.trace_id.clone(),
                    capability: call.capability.clone(),
                    model: call.model.clone(),
                    budget: call.context_budget,
                    used: call.prompt_tokens,
                    utilization,
                    truncated: call.context_truncated,
                    timestamp: call.started_at,
                });
            }
        }

        stats.summary.avg_utilization =
            percent(stats.summary.total_used, stats.summary.total_budget);
        stats.summary.truncation_rate = percent(truncated, stats.summary.calls_with_budget);

        stats.by_capability = per_capability
            .into_iter()
            .map(|(name, acc)| {
                let entry = CapabilityContextStats {
                    call_count: acc.calls,
                    avg_budget: acc.budget / acc.calls,
                    avg_used: acc.used / acc.calls,
                    avg_utilization: percent(acc.used, acc.budget),
                    truncation_rate: percent(acc.truncated, acc.calls),
                    max_utilization: acc.max_utilization,
                };
                (name, entry)
            })
            .collect();

        stats
    }
}

//! Duration-based process health metrics.
//!
//! Each metric is the mean elapsed time between two lifecycle timestamps,
//! across the documents where both are present — a document that never
//! reached the second timestamp is excluded, not counted as zero. Pure,
//! read-only reporting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::SlaTargets;
use crate::model::{Invoice, Quote, WorkOrder};

/// Compliance bucket for one metric, by percentage of its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlaStatus {
    Excellent,
    Good,
    Warning,
    Critical,
}

impl SlaStatus {
    fn from_percent(percent: f64) -> Self {
        if percent <= 50.0 {
            SlaStatus::Excellent
        } else if percent <= 80.0 {
            SlaStatus::Good
        } else if percent <= 100.0 {
            SlaStatus::Warning
        } else {
            SlaStatus::Critical
        }
    }
}

impl std::fmt::Display for SlaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SlaStatus::Excellent => "uitstekend",
            SlaStatus::Good => "goed",
            SlaStatus::Warning => "waarschuwing",
            SlaStatus::Critical => "kritiek",
        };
        write!(f, "{label}")
    }
}

/// One measured metric against its target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlaMetric {
    pub name: String,
    pub actual_hours: f64,
    pub target_hours: f64,
    pub percent_of_target: f64,
    pub status: SlaStatus,
    pub sample_count: usize,
}

impl SlaMetric {
    fn build(name: &str, durations_hours: Vec<f64>, target_hours: f64) -> Self {
        let sample_count = durations_hours.len();
        let actual_hours = if sample_count == 0 {
            0.0
        } else {
            durations_hours.iter().sum::<f64>() / sample_count as f64
        };
        let percent_of_target = if target_hours > 0.0 {
            actual_hours / target_hours * 100.0
        } else {
            0.0
        };
        Self {
            name: name.to_string(),
            actual_hours,
            target_hours,
            percent_of_target,
            status: SlaStatus::from_percent(percent_of_target),
            sample_count,
        }
    }

    pub fn is_compliant(&self) -> bool {
        self.actual_hours <= self.target_hours
    }
}

/// Full dashboard: the four metrics plus the fraction that meets target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlaReport {
    pub metrics: Vec<SlaMetric>,
    pub overall_compliance: f64,
}

/// Computes the four standard metrics over read snapshots.
pub fn compute_sla_dashboard(
    quotes: &[Quote],
    work_orders: &[WorkOrder],
    invoices: &[Invoice],
    targets: &SlaTargets,
) -> SlaReport {
    let quote_response = SlaMetric::build(
        "Reactietijd offerte",
        durations(quotes, |q| (q.timestamps.created, q.timestamps.sent)),
        targets.quote_response_hours,
    );
    let quote_to_work_order = SlaMetric::build(
        "Offerte naar werkbon",
        durations(quotes, |q| {
            (q.timestamps.approved, q.timestamps.converted_to_work_order)
        }),
        targets.quote_to_work_order_hours,
    );
    let work_order_completion = SlaMetric::build(
        "Doorlooptijd werkbon",
        durations(work_orders, |w| (w.timestamps.created, w.timestamps.completed)),
        targets.work_order_completion_hours,
    );
    let invoice_payment = SlaMetric::build(
        "Betaaltermijn factuur",
        durations(invoices, |i| (i.timestamps.sent, i.timestamps.paid)),
        targets.invoice_payment_hours,
    );

    let metrics = vec![
        quote_response,
        quote_to_work_order,
        work_order_completion,
        invoice_payment,
    ];
    let compliant = metrics.iter().filter(|m| m.is_compliant()).count();
    let overall_compliance = compliant as f64 / metrics.len() as f64;

    SlaReport {
        metrics,
        overall_compliance,
    }
}

// Elapsed hours between two timestamps, for documents carrying both.
fn durations<T>(
    documents: &[T],
    pick: impl Fn(&T) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>),
) -> Vec<f64> {
    documents
        .iter()
        .filter_map(|doc| match pick(doc) {
            (Some(start), Some(end)) => Some((end - start).num_minutes() as f64 / 60.0),
            _ => None,
        })
        .collect()
}

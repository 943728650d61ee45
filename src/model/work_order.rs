use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::set_once;

/// The three states of a work order. `Completed` makes the order
/// read-mostly: only its notes trail may still grow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkOrderStatus {
    #[serde(rename = "To Do")]
    ToDo,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Completed")]
    Completed,
}

impl WorkOrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkOrderStatus::ToDo => "To Do",
            WorkOrderStatus::InProgress => "In Progress",
            WorkOrderStatus::Completed => "Completed",
        }
    }
}

impl std::fmt::Display for WorkOrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A stock article required to execute a work order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequiredItem {
    pub inventory_id: String,
    pub description: String,
    pub quantity: Decimal,
}

/// Lifecycle timestamps of a work order, written at most once each.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkOrderTimestamps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<DateTime<Utc>>,
}

impl WorkOrderTimestamps {
    pub fn mark_status(&mut self, status: WorkOrderStatus, at: DateTime<Utc>) {
        if status == WorkOrderStatus::Completed {
            set_once(&mut self.completed, at);
        }
    }
}

/// An internal job record, optionally linked to the quote that originated
/// it and the invoice that bills it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkOrder {
    pub id: String,
    pub customer_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    pub status: WorkOrderStatus,
    #[serde(default)]
    pub required_inventory: Vec<RequiredItem>,
    pub estimated_hours: Decimal,
    pub estimated_cost: Decimal,
    #[serde(default)]
    pub timestamps: WorkOrderTimestamps,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_id: Option<String>,
    #[serde(default)]
    pub notes: Vec<String>,
}

impl WorkOrder {
    /// A work order still counts toward an employee's workload until it
    /// reaches `Completed`.
    pub fn is_active(&self) -> bool {
        self.status != WorkOrderStatus::Completed
    }
}

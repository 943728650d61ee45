//! Document store adapter.
//!
//! The engine itself only consumes read snapshots and produces replacement
//! values; this module supplies the snapshot type plus a JSON file adapter
//! for the CLI and tests. Persistence behind a real database belongs to
//! the host application.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::model::{Customer, Employee, Invoice, Quote, WorkOrder};

/// A full snapshot of the administration's documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub quotes: Vec<Quote>,
    #[serde(default)]
    pub invoices: Vec<Invoice>,
    #[serde(default)]
    pub work_orders: Vec<WorkOrder>,
    #[serde(default)]
    pub customers: Vec<Customer>,
    #[serde(default)]
    pub employees: Vec<Employee>,
}

impl Dataset {
    pub fn quote(&self, id: &str) -> Option<&Quote> {
        self.quotes.iter().find(|q| q.id == id)
    }

    pub fn invoice(&self, id: &str) -> Option<&Invoice> {
        self.invoices.iter().find(|i| i.id == id)
    }

    pub fn work_order(&self, id: &str) -> Option<&WorkOrder> {
        self.work_orders.iter().find(|w| w.id == id)
    }

    /// Resolves an optional link field. A dangling link (set, but the
    /// target is gone) resolves to `None`; the caller decides whether to
    /// surface the mismatch.
    pub fn resolve_work_order(&self, link: Option<&str>) -> Option<&WorkOrder> {
        link.and_then(|id| self.work_order(id))
    }

    pub fn resolve_invoice(&self, link: Option<&str>) -> Option<&Invoice> {
        link.and_then(|id| self.invoice(id))
    }

    /// All invoice numbers in use, for gap-free numbering of the next one.
    pub fn invoice_numbers(&self) -> impl Iterator<Item = &str> {
        self.invoices.iter().map(|i| i.invoice_number.as_str())
    }

    /// Replaces the stored version of a quote, or inserts a new one.
    pub fn upsert_quote(&mut self, quote: Quote) {
        match self.quotes.iter_mut().find(|q| q.id == quote.id) {
            Some(slot) => *slot = quote,
            None => self.quotes.push(quote),
        }
    }

    pub fn upsert_invoice(&mut self, invoice: Invoice) {
        match self.invoices.iter_mut().find(|i| i.id == invoice.id) {
            Some(slot) => *slot = invoice,
            None => self.invoices.push(invoice),
        }
    }

    pub fn upsert_work_order(&mut self, order: WorkOrder) {
        match self.work_orders.iter_mut().find(|w| w.id == order.id) {
            Some(slot) => *slot = order,
            None => self.work_orders.push(order),
        }
    }

    /// Deletion is a pure filter: no cascade, links on surviving documents
    /// simply become dangling and resolve as absent from then on.
    pub fn remove_quote(&mut self, id: &str) -> bool {
        let before = self.quotes.len();
        self.quotes.retain(|q| q.id != id);
        self.quotes.len() != before
    }

    pub fn remove_invoice(&mut self, id: &str) -> bool {
        let before = self.invoices.len();
        self.invoices.retain(|i| i.id != id);
        self.invoices.len() != before
    }

    pub fn remove_work_order(&mut self, id: &str) -> bool {
        let before = self.work_orders.len();
        self.work_orders.retain(|w| w.id != id);
        self.work_orders.len() != before
    }
}

/// JSON file adapter for a [`Dataset`].
///
/// Writes are whole-file replacements without per-document versioning, so
/// exactly one process may mutate a given file; concurrent writers would
/// lose updates. A missing file loads as an empty dataset.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Dataset, EngineError> {
        if !self.path.exists() {
            return Ok(Dataset::default());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn save(&self, dataset: &Dataset) -> Result<(), EngineError> {
        let json = serde_json::to_string_pretty(dataset)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

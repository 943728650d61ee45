mod customer;
mod employee;
mod history;
mod invoice;
mod money;
mod quote;
mod work_order;

pub use customer::{Customer, find_customer};
pub use employee::Employee;
pub use history::{Actor, HistoryEntry};
pub use invoice::{
    Invoice, InvoiceStatus, InvoiceTimestamps, ReminderState, next_invoice_number,
};
pub use money::{LaborLine, LineItem, Totals};
pub use quote::{Quote, QuoteStatus, QuoteTimestamps};
pub use work_order::{RequiredItem, WorkOrder, WorkOrderStatus, WorkOrderTimestamps};

use chrono::{DateTime, Utc};

// Shared set-once rule for sparse timestamp fields.
pub(crate) fn set_once(slot: &mut Option<DateTime<Utc>>, at: DateTime<Utc>) {
    if slot.is_none() {
        *slot = Some(at);
    }
}

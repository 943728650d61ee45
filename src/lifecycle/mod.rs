//! Guarded lifecycle operations per document type.
//!
//! Every operation is a total function of `(current state, intent, actor,
//! now)` returning the replacement state; rejections surface as
//! [`EngineError`](crate::error::EngineError), never as a panic. Conversions
//! live with their source document: quote conversions in [`quote`], the
//! work-order → invoice conversion in [`work_order`], the invoice →
//! work-order conversion in [`invoice`].

pub mod invoice;
pub mod quote;
pub mod work_order;

use rust_decimal::Decimal;

use crate::model::{LaborLine, LineItem, RequiredItem};

// Stock lines are the items that reference an inventory article.
pub(crate) fn required_inventory_from_items(items: &[LineItem]) -> Vec<RequiredItem> {
    items
        .iter()
        .filter_map(|item| {
            item.inventory_id.as_ref().map(|inventory_id| RequiredItem {
                inventory_id: inventory_id.clone(),
                description: item.description.clone(),
                quantity: item.quantity,
            })
        })
        .collect()
}

pub(crate) fn labor_hours(labor: &[LaborLine]) -> Decimal {
    labor.iter().map(|line| line.hours).sum()
}

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money::Money;

/// Header fields that a reviewer must see filled in before the order is usable.
pub const CRITICAL_FIELDS: [&str; 3] = ["invoice_number", "sold_to", "order_date"];

/// One product line of a sales order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub line_no: u32,
    pub description: String,
    pub manufacturer: String,
    pub size: String,
    pub style: String,
    pub color: String,
    pub pad: String,
    pub rug_pad: String,
    pub quantity: Decimal,
    pub unit_price: Money,
    pub amount: Money,
}

impl Default for LineItem {
    fn default() -> Self {
        Self {
            line_no: 1,
            description: "Carpet / Rug".to_string(),
            manufacturer: String::new(),
            size: String::new(),
            style: String::new(),
            color: String::new(),
            pad: String::new(),
            rug_pad: String::new(),
            quantity: Decimal::ONE,
            unit_price: Money::zero(),
            amount: Money::zero(),
        }
    }
}

/// A sales order as read off the paper form.
///
/// Dates are ISO `YYYY-MM-DD` strings and every header field is empty when
/// nothing usable was found; the record is always produced and left for a
/// human to correct.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub invoice_number: String,
    pub sold_to: String,
    pub directions: String,
    pub email: String,
    pub order_date: String,
    pub installation_date: String,
    pub home_phone: String,
    pub cell_phone: String,
    pub installed_by: String,
    pub salesperson: String,
    pub items: Vec<LineItem>,
}

impl OrderRecord {
    /// Names of the critical header fields that came back empty.
    pub fn missing_critical_fields(&self) -> Vec<&'static str> {
        let values = [&self.invoice_number, &self.sold_to, &self.order_date];
        CRITICAL_FIELDS
            .iter()
            .zip(values)
            .filter(|(_, v)| v.trim().is_empty())
            .map(|(name, _)| *name)
            .collect()
    }

    pub fn totals(&self, tax_rate_percent: Decimal, deposit: Money) -> Totals {
        Totals::compute(&self.items, tax_rate_percent, deposit)
    }
}

/// Order totals as the storage layer records them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub subtotal: Money,
    pub sales_tax: Money,
    pub total: Money,
    pub balance: Money,
}

impl Totals {
    pub fn compute(items: &[LineItem], tax_rate_percent: Decimal, deposit: Money) -> Self {
        let subtotal: Money = items.iter().map(|it| it.amount).sum();
        let sales_tax = subtotal.percent(tax_rate_percent);
        let total = subtotal + sales_tax;
        Totals {
            subtotal,
            sales_tax,
            total,
            balance: total - deposit,
        }
    }
}

pub mod money;
pub mod record;

pub use money::Money;
pub use record::{LineItem, OrderRecord, Totals, CRITICAL_FIELDS};

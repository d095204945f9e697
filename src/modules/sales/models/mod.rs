pub mod sale;

pub use sale::{NewSale, PaymentMethod, RecordedSale, SaleAmounts, SaleLine, SaleTransaction};

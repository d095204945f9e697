//! Showroom Finance Library
//!
//! Installment (cicilan) credit engine for a car dealership: schedule
//! generation, the installment ledger, overdue classification, customer
//! credit profiles and the invoice/payment ledger, served over HTTP.

pub mod config;
pub mod core;
pub mod middleware;
pub mod modules;

// Re-export commonly used types
pub use modules::credit;
pub use modules::installments;
pub use modules::invoices;
pub use modules::sales;

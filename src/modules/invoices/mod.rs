pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{AgingReport, Invoice, InvoiceStatus, Payment, PaymentType};
pub use repositories::{InvoiceRepository, PaymentRepository};
pub use services::{InvoiceService, PaymentService};

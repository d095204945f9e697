pub mod invoice_service;
pub mod payment_service;

pub use invoice_service::{InvoiceService, ManualInvoice, RecordPayment};
pub use payment_service::{PaymentService, StandalonePayment};

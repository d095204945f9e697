pub mod aging;
pub mod invoice;
pub mod payment;

pub use aging::{AgingBucket, AgingReport, BucketTotal};
pub use invoice::{Invoice, InvoiceDetail, InvoiceNumber, InvoiceStatus, NewInvoice, OpenInvoice};
pub use payment::{
    ApprovalStatus, LedgerPayment, NewPayment, Payment, PaymentType, DEFAULT_PAYMENT_STATUS,
};

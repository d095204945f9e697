use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::info;

use crate::core::{business_today, validate_limit, validate_offset, AppError, Money, Result};
use crate::modules::invoices::models::{
    ApprovalStatus, LedgerPayment, NewPayment, Payment, PaymentType, DEFAULT_PAYMENT_STATUS,
};
use crate::modules::invoices::repositories::PaymentRepository;

/// Width of `payment.status`
const STATUS_MAX_LEN: usize = 20;
/// Width of `payment.reference`
const REFERENCE_MAX_LEN: usize = 255;

/// Payment entered straight into the ledger, optionally tied to a sale
#[derive(Debug, Clone)]
pub struct StandalonePayment {
    pub transaction_id: Option<i64>,
    pub amount: Decimal,
    pub kind: PaymentType,
    /// Defaults to today
    pub date: Option<NaiveDate>,
    /// Defaults to `completed`
    pub status: Option<String>,
    pub reference: Option<String>,
    pub note: Option<String>,
}

impl StandalonePayment {
    /// Validate and build the row to insert; the client is resolved later
    pub fn to_new_payment(&self, today: NaiveDate) -> Result<NewPayment> {
        let amount = Money::ensure_positive(self.amount, "jumlah")?;

        let status = match self.status.as_deref().map(str::trim) {
            Some(status) if !status.is_empty() => status.to_string(),
            _ => DEFAULT_PAYMENT_STATUS.to_string(),
        };
        if status.chars().count() > STATUS_MAX_LEN {
            return Err(AppError::validation(format!(
                "status cannot exceed {} characters",
                STATUS_MAX_LEN
            )));
        }
        if let Some(reference) = &self.reference {
            if reference.chars().count() > REFERENCE_MAX_LEN {
                return Err(AppError::validation(format!(
                    "reference cannot exceed {} characters",
                    REFERENCE_MAX_LEN
                )));
            }
        }

        Ok(NewPayment {
            transaction_id: self.transaction_id,
            status,
            reference: self.reference.clone(),
            note: self.note.clone(),
            ..NewPayment::approved(amount, self.kind, self.date.unwrap_or(today))
        })
    }
}

/// Payment ledger entries and finance approval of recorded payments
pub struct PaymentService {
    payments: PaymentRepository,
}

impl PaymentService {
    pub fn new(payments: PaymentRepository) -> Self {
        Self { payments }
    }

    /// Record a payment outside the invoice flow; it is approved on entry
    pub async fn record(&self, request: StandalonePayment) -> Result<Payment> {
        let mut payment = request.to_new_payment(business_today())?;

        if let Some(transaction_id) = payment.transaction_id {
            let client_id = self
                .payments
                .sale_client(transaction_id)
                .await?
                .ok_or_else(|| AppError::not_found(format!("Transaction {} not found", transaction_id)))?;
            payment.client_id = Some(client_id);
        }

        let payment = self.payments.create(&payment).await?;

        info!(
            payment_id = payment.id,
            transaction_id = ?payment.transaction_id,
            amount = %Money::format_rupiah(payment.amount),
            kind = %payment.kind,
            "Payment recorded"
        );

        Ok(payment)
    }

    /// Every payment, newest first
    pub async fn list_ledger(&self, limit: i64, offset: i64) -> Result<Vec<LedgerPayment>> {
        let limit = validate_limit(limit)?;
        let offset = validate_offset(offset)?;

        self.payments.list_ledger(limit, offset).await
    }

    pub async fn list_pending(&self, limit: i64) -> Result<Vec<Payment>> {
        let limit = validate_limit(limit)?;
        self.payments.list_pending(limit).await
    }

    pub async fn approve(&self, payment_id: i64, approved_by: &str) -> Result<Payment> {
        self.decide(payment_id, ApprovalStatus::Approved, approved_by).await
    }

    pub async fn reject(&self, payment_id: i64, approved_by: &str) -> Result<Payment> {
        self.decide(payment_id, ApprovalStatus::Rejected, approved_by).await
    }

    async fn decide(&self, payment_id: i64, status: ApprovalStatus, approved_by: &str) -> Result<Payment> {
        let approved_by = approved_by.trim();
        if approved_by.is_empty() {
            return Err(AppError::validation("approved_by is required"));
        }
        if approved_by.chars().count() > 100 {
            return Err(AppError::validation("approved_by cannot exceed 100 characters"));
        }

        let payment = self
            .payments
            .set_approval(payment_id, status, approved_by)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Payment {} not found", payment_id)))?;

        info!(payment_id, approval_status = %status, approved_by, "Payment approval recorded");

        Ok(payment)
    }
}

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{MySql, Transaction};
use tracing::{info, warn};

use crate::config::{FinancePolicy, MAX_DUE_DAYS};
use crate::core::{
    add_days, business_today, validate_limit, validate_offset, AppError, Money, Result,
};
use crate::modules::invoices::models::{
    AgingReport, Invoice, InvoiceDetail, InvoiceNumber, InvoiceStatus, NewInvoice, NewPayment,
    OpenInvoice, Payment, PaymentType,
};
use crate::modules::invoices::repositories::{InvoiceRepository, PaymentRepository};
use crate::modules::sales::models::SaleTransaction;
use crate::modules::sales::repositories::SaleRepository;

/// Payment handed in by finance staff against an invoice
#[derive(Debug, Clone)]
pub struct RecordPayment {
    pub amount: Decimal,
    pub kind: PaymentType,
    /// Defaults to today
    pub date: Option<NaiveDate>,
    pub reference: Option<String>,
    pub note: Option<String>,
}

/// Charge not tied to a sale
#[derive(Debug, Clone)]
pub struct ManualInvoice {
    pub client_id: i64,
    pub date: NaiveDate,
    pub total_amount: Decimal,
    /// Defaults to the configured invoice term
    pub due_days: Option<i64>,
}

/// Service for invoice business logic
pub struct InvoiceService {
    invoices: InvoiceRepository,
    payments: PaymentRepository,
    policy: FinancePolicy,
}

impl InvoiceService {
    pub fn new(invoices: InvoiceRepository, payments: PaymentRepository, policy: FinancePolicy) -> Self {
        Self {
            invoices,
            payments,
            policy,
        }
    }

    /// Invoice a sale; returns the existing main invoice when there is one
    pub async fn create_from_transaction(&self, sale: &SaleTransaction) -> Result<Invoice> {
        let mut tx = self.invoices.pool().begin().await?;
        let (invoice, _) = Self::invoice_sale_with_tx(&mut tx, sale, &self.policy).await?;
        tx.commit().await?;

        Ok(invoice)
    }

    /// Invoice a sale inside the caller's transaction.
    ///
    /// Cash sales are invoiced as paid and get a matching cash payment.
    /// The flag tells whether a new invoice was written.
    pub async fn invoice_sale_with_tx(
        tx: &mut Transaction<'_, MySql>,
        sale: &SaleTransaction,
        policy: &FinancePolicy,
    ) -> Result<(Invoice, bool)> {
        if let Some(existing) = InvoiceRepository::find_main_for_sale_with_tx(tx, sale.id).await? {
            info!(
                transaction_id = sale.id,
                invoice_id = existing.id,
                "Invoice already exists for sale (idempotent request)"
            );
            return Ok((existing, false));
        }

        let sale_date = sale.date.unwrap_or_else(business_today);
        let due_date = add_days(sale_date, policy.invoice_due_days, "Invoice due date")?;
        let (status, paid_amount) = if sale.is_cash() {
            (InvoiceStatus::Paid, sale.total)
        } else {
            (InvoiceStatus::Outstanding, Decimal::ZERO)
        };

        let invoice = InvoiceRepository::create_with_tx(
            tx,
            &NewInvoice {
                transaction_id: Some(sale.id),
                client_id: Some(sale.client_id),
                number: InvoiceNumber::for_sale(sale.id, sale_date),
                status,
                total_amount: sale.total,
                paid_amount,
                due_date: Some(due_date),
            },
        )
        .await?;

        if sale.is_cash() && sale.total > Decimal::ZERO {
            let payment = NewPayment::approved(sale.total, PaymentType::Cash, sale_date)
                .for_invoice(invoice.id)
                .for_sale(sale.id, sale.client_id);
            PaymentRepository::create_with_tx(tx, &payment).await?;
        }

        info!(
            transaction_id = sale.id,
            invoice_id = invoice.id,
            number = %invoice.number,
            status = %invoice.status,
            total = %Money::format_rupiah(invoice.total_amount),
            "Invoice created for sale"
        );

        Ok((invoice, true))
    }

    /// Record a payment and move the invoice to the status its amounts imply.
    ///
    /// The invoice row stays locked from read to update.
    pub async fn record_payment(&self, invoice_id: i64, request: RecordPayment) -> Result<(Payment, Invoice)> {
        Money::ensure_positive(request.amount, "jumlah")?;

        let mut tx = self.invoices.pool().begin().await?;

        let invoice = InvoiceRepository::find_by_id_for_update(&mut tx, invoice_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Invoice {} not found", invoice_id)))?;

        if invoice.status == InvoiceStatus::Cancelled {
            return Err(AppError::validation(format!(
                "Invoice {} is cancelled and cannot take payments",
                invoice_id
            )));
        }

        let paid_amount = Money::checked_add(invoice.paid_amount, request.amount, "paid_amount")?;

        let payment = NewPayment {
            reference: request.reference,
            note: request.note,
            ..NewPayment::approved(
                request.amount,
                request.kind,
                request.date.unwrap_or_else(business_today),
            )
            .for_invoice(invoice.id)
        };
        let payment = PaymentRepository::create_with_tx(&mut tx, &payment).await?;

        let status = InvoiceStatus::derive(paid_amount, invoice.total_amount);
        InvoiceRepository::update_paid_with_tx(&mut tx, invoice.id, paid_amount, status).await?;

        tx.commit().await?;

        info!(
            invoice_id,
            payment_id = payment.id,
            amount = %Money::format_rupiah(payment.amount),
            kind = %payment.kind,
            previous_status = %invoice.status,
            status = %status,
            "Payment recorded against invoice"
        );

        let updated = Invoice {
            paid_amount,
            status,
            ..invoice
        };

        Ok((payment, updated))
    }

    /// Remaining receivables bucketed by days past due
    pub async fn aging_report(&self, as_of: NaiveDate) -> Result<AgingReport> {
        let invoices = self.invoices.list_receivable().await?;
        Ok(AgingReport::build(&invoices, as_of))
    }

    /// Create an invoice for a client outside any sale
    pub async fn create_manual(&self, request: ManualInvoice) -> Result<Invoice> {
        Money::ensure_non_negative(request.total_amount, "total_amount")?;
        let due_days = request.due_days.unwrap_or(self.policy.invoice_due_days);
        Self::validate_due_days(due_days)?;
        let due_date = add_days(request.date, due_days, "due_date")?;

        let mut tx = self.invoices.pool().begin().await?;

        if !InvoiceRepository::client_exists_with_tx(&mut tx, request.client_id).await? {
            return Err(AppError::not_found(format!("Client {} not found", request.client_id)));
        }

        let invoice = InvoiceRepository::create_with_tx(
            &mut tx,
            &NewInvoice {
                transaction_id: None,
                client_id: Some(request.client_id),
                number: InvoiceNumber::manual(request.client_id, request.date, Utc::now()),
                status: InvoiceStatus::Outstanding,
                total_amount: Money::round(request.total_amount),
                paid_amount: Decimal::ZERO,
                due_date: Some(due_date),
            },
        )
        .await?;

        tx.commit().await?;

        info!(
            invoice_id = invoice.id,
            client_id = request.client_id,
            number = %invoice.number,
            "Manual invoice created"
        );

        Ok(invoice)
    }

    pub fn validate_due_days(due_days: i64) -> Result<i64> {
        if due_days < 0 {
            return Err(AppError::validation(format!(
                "due_days cannot be negative, got {}",
                due_days
            )));
        }
        if due_days > MAX_DUE_DAYS {
            return Err(AppError::validation(format!(
                "due_days cannot exceed {}, got {}",
                MAX_DUE_DAYS, due_days
            )));
        }
        Ok(due_days)
    }

    /// Outstanding and partially paid invoices, earliest due first
    pub async fn list_open(&self, limit: i64, offset: i64) -> Result<Vec<OpenInvoice>> {
        let limit = validate_limit(limit)?;
        let offset = validate_offset(offset)?;

        self.invoices.list_open(limit, offset).await
    }

    pub async fn invoice_detail(&self, invoice_id: i64) -> Result<InvoiceDetail> {
        let invoice = self
            .invoices
            .find_by_id(invoice_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Invoice {} not found", invoice_id)))?;
        let payments = self.payments.list_for_invoice(invoice_id).await?;

        Ok(InvoiceDetail {
            remaining: invoice.remaining(),
            invoice,
            payments,
        })
    }

    /// Invoice every sale that has no main invoice yet, all or nothing
    pub async fn generate_from_transactions(&self) -> Result<u64> {
        let mut tx = self.invoices.pool().begin().await?;

        let sales = SaleRepository::list_uninvoiced_with_tx(&mut tx).await?;
        let mut created = 0u64;
        for sale in &sales {
            let (_, is_new) = Self::invoice_sale_with_tx(&mut tx, sale, &self.policy).await?;
            if is_new {
                created += 1;
            } else {
                warn!(transaction_id = sale.id, "Sale listed as uninvoiced already had an invoice");
            }
        }

        tx.commit().await?;

        info!(count = created, "Invoices generated from existing sales");

        Ok(created)
    }
}

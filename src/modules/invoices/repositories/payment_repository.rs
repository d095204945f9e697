// MySQL access for the `payment` table

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{MySql, MySqlPool, Transaction};

use crate::core::{AppError, Result};
use crate::modules::invoices::models::{ApprovalStatus, LedgerPayment, NewPayment, Payment};

const PAYMENT_COLUMNS: &str = r#"
    kd_payment, kd_invoice, kd_transaksi, kd_client, jumlah, jenis, tanggal,
    status, reference, note, approval_status, approved_by, approved_at, created_at
"#;

const LEDGER_COLUMNS: &str = r#"
    p.kd_payment, p.kd_invoice, p.kd_transaksi, p.kd_client, p.jumlah, p.jenis, p.tanggal,
    p.status, p.reference, p.note, p.approval_status, p.approved_by, p.approved_at, p.created_at
"#;

/// Repository for payments
#[derive(Clone)]
pub struct PaymentRepository {
    pool: MySqlPool,
}

impl PaymentRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Insert a payment and read it back
    pub async fn create_with_tx(
        tx: &mut Transaction<'_, MySql>,
        payment: &NewPayment,
    ) -> Result<Payment> {
        let approved_at = match payment.approval_status {
            ApprovalStatus::Pending => None,
            ApprovalStatus::Approved | ApprovalStatus::Rejected => Some(Utc::now()),
        };

        let result = sqlx::query(
            r#"
            INSERT INTO payment (
                kd_invoice, kd_transaksi, kd_client, jumlah, jenis, tanggal,
                status, reference, note, approval_status, approved_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(payment.invoice_id)
        .bind(payment.transaction_id)
        .bind(payment.client_id)
        .bind(payment.amount)
        .bind(payment.kind.as_str())
        .bind(payment.date)
        .bind(&payment.status)
        .bind(&payment.reference)
        .bind(&payment.note)
        .bind(payment.approval_status.as_str())
        .bind(approved_at)
        .execute(&mut **tx)
        .await?;

        let payment_id = result.last_insert_id() as i64;
        let row = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {} FROM payment WHERE kd_payment = ?",
            PAYMENT_COLUMNS
        ))
        .bind(payment_id)
        .fetch_one(&mut **tx)
        .await?;

        row.try_into()
    }

    /// Insert a standalone payment in its own transaction
    pub async fn create(&self, payment: &NewPayment) -> Result<Payment> {
        let mut tx = self.pool.begin().await?;
        let created = Self::create_with_tx(&mut tx, payment).await?;
        tx.commit().await?;

        Ok(created)
    }

    /// Client of a sale, `None` when the sale does not exist
    pub async fn sale_client(&self, transaction_id: i64) -> Result<Option<i64>> {
        let client: Option<i64> =
            sqlx::query_scalar("SELECT kd_client FROM transaksi WHERE kd_transaksi = ?")
                .bind(transaction_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(client)
    }

    /// All payments, newest first, with client name and invoice number
    pub async fn list_ledger(&self, limit: i64, offset: i64) -> Result<Vec<LedgerPayment>> {
        let rows = sqlx::query_as::<_, LedgerPaymentRow>(&format!(
            r#"
            SELECT {}, c.nama_client, i.nomor_invoice
            FROM payment p
            LEFT JOIN client c ON c.kd_client = p.kd_client
            LEFT JOIN invoice i ON i.kd_invoice = p.kd_invoice
            ORDER BY p.tanggal DESC, p.kd_payment DESC
            LIMIT ? OFFSET ?
            "#,
            LEDGER_COLUMNS
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(LedgerPayment::try_from).collect()
    }

    pub async fn find_by_id(&self, payment_id: i64) -> Result<Option<Payment>> {
        let row = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {} FROM payment WHERE kd_payment = ?",
            PAYMENT_COLUMNS
        ))
        .bind(payment_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Payment::try_from).transpose()
    }

    /// Payments of an invoice, newest first
    pub async fn list_for_invoice(&self, invoice_id: i64) -> Result<Vec<Payment>> {
        let rows = sqlx::query_as::<_, PaymentRow>(&format!(
            r#"
            SELECT {} FROM payment
            WHERE kd_invoice = ?
            ORDER BY tanggal DESC, kd_payment DESC
            "#,
            PAYMENT_COLUMNS
        ))
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Payment::try_from).collect()
    }

    /// Payments awaiting a finance decision, newest first
    pub async fn list_pending(&self, limit: i64) -> Result<Vec<Payment>> {
        let rows = sqlx::query_as::<_, PaymentRow>(&format!(
            r#"
            SELECT {} FROM payment
            WHERE approval_status = 'pending'
            ORDER BY tanggal DESC, kd_payment DESC
            LIMIT ?
            "#,
            PAYMENT_COLUMNS
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Payment::try_from).collect()
    }

    /// Record an approval decision; only the approval fields change
    pub async fn set_approval(
        &self,
        payment_id: i64,
        status: ApprovalStatus,
        approved_by: &str,
    ) -> Result<Option<Payment>> {
        let mut tx = self.pool.begin().await?;

        let locked: Option<i64> =
            sqlx::query_scalar("SELECT kd_payment FROM payment WHERE kd_payment = ? FOR UPDATE")
                .bind(payment_id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Ok(None);
        }

        sqlx::query(
            r#"
            UPDATE payment
            SET approval_status = ?, approved_by = ?, approved_at = ?
            WHERE kd_payment = ?
            "#,
        )
        .bind(status.as_str())
        .bind(approved_by)
        .bind(Utc::now())
        .bind(payment_id)
        .execute(&mut *tx)
        .await?;

        let row = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {} FROM payment WHERE kd_payment = ?",
            PAYMENT_COLUMNS
        ))
        .bind(payment_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(row.try_into()?))
    }
}

/// Database row representation for the payment table
#[derive(sqlx::FromRow)]
struct PaymentRow {
    kd_payment: i64,
    kd_invoice: Option<i64>,
    kd_transaksi: Option<i64>,
    kd_client: Option<i64>,
    jumlah: Decimal,
    jenis: String,
    tanggal: NaiveDate,
    status: String,
    reference: Option<String>,
    note: Option<String>,
    approval_status: String,
    approved_by: Option<String>,
    approved_at: Option<DateTime<Utc>>,
    created_at: Option<DateTime<Utc>>,
}

#[derive(sqlx::FromRow)]
struct LedgerPaymentRow {
    #[sqlx(flatten)]
    payment: PaymentRow,
    nama_client: Option<String>,
    nomor_invoice: Option<String>,
}

impl TryFrom<LedgerPaymentRow> for LedgerPayment {
    type Error = AppError;

    fn try_from(row: LedgerPaymentRow) -> Result<Self> {
        Ok(LedgerPayment {
            payment: row.payment.try_into()?,
            client_name: row.nama_client,
            invoice_number: row.nomor_invoice,
        })
    }
}

impl TryFrom<PaymentRow> for Payment {
    type Error = AppError;

    fn try_from(row: PaymentRow) -> Result<Self> {
        Ok(Payment {
            id: row.kd_payment,
            invoice_id: row.kd_invoice,
            transaction_id: row.kd_transaksi,
            client_id: row.kd_client,
            amount: row.jumlah,
            kind: row.jenis.parse().map_err(|_| {
                AppError::Internal(format!("Invalid payment type stored on payment {}", row.kd_payment))
            })?,
            date: row.tanggal,
            status: row.status,
            reference: row.reference,
            note: row.note,
            approval_status: row.approval_status.try_into()?,
            approved_by: row.approved_by,
            approved_at: row.approved_at,
            created_at: row.created_at,
        })
    }
}

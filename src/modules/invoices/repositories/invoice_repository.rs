// MySQL access for the `invoice` table.
// Writers take a transaction; the paid amount is only ever changed while
// the invoice row is locked with SELECT ... FOR UPDATE.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{MySql, MySqlPool, Transaction};

use crate::core::{AppError, Result};
use crate::modules::invoices::models::{Invoice, InvoiceStatus, NewInvoice, OpenInvoice};

const INVOICE_COLUMNS: &str = r#"
    i.kd_invoice, i.kd_transaksi, i.kd_client, i.nomor_invoice, i.status,
    i.total_amount, i.paid_amount, i.tanggal_jatuh_tempo, i.created_at
"#;

/// Repository for invoices
#[derive(Clone)]
pub struct InvoiceRepository {
    pool: MySqlPool,
}

impl InvoiceRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    pub async fn find_by_id(&self, invoice_id: i64) -> Result<Option<Invoice>> {
        let row = sqlx::query_as::<_, InvoiceRow>(&format!(
            "SELECT {} FROM invoice i WHERE i.kd_invoice = ?",
            INVOICE_COLUMNS
        ))
        .bind(invoice_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Invoice::try_from).transpose()
    }

    /// Lock an invoice row for the rest of the transaction
    pub async fn find_by_id_for_update(
        tx: &mut Transaction<'_, MySql>,
        invoice_id: i64,
    ) -> Result<Option<Invoice>> {
        let row = sqlx::query_as::<_, InvoiceRow>(&format!(
            "SELECT {} FROM invoice i WHERE i.kd_invoice = ? FOR UPDATE",
            INVOICE_COLUMNS
        ))
        .bind(invoice_id)
        .fetch_optional(&mut **tx)
        .await?;

        row.map(Invoice::try_from).transpose()
    }

    /// Main invoice of a sale, ignoring its down-payment invoice
    pub async fn find_main_for_sale_with_tx(
        tx: &mut Transaction<'_, MySql>,
        transaction_id: i64,
    ) -> Result<Option<Invoice>> {
        let row = sqlx::query_as::<_, InvoiceRow>(&format!(
            r#"
            SELECT {} FROM invoice i
            WHERE i.kd_transaksi = ? AND i.nomor_invoice NOT LIKE 'INV-DP-%'
            ORDER BY i.kd_invoice ASC
            LIMIT 1
            "#,
            INVOICE_COLUMNS
        ))
        .bind(transaction_id)
        .fetch_optional(&mut **tx)
        .await?;

        row.map(Invoice::try_from).transpose()
    }

    /// Insert an invoice and read it back
    pub async fn create_with_tx(
        tx: &mut Transaction<'_, MySql>,
        invoice: &NewInvoice,
    ) -> Result<Invoice> {
        let result = sqlx::query(
            r#"
            INSERT INTO invoice (
                kd_transaksi, kd_client, nomor_invoice, status,
                total_amount, paid_amount, tanggal_jatuh_tempo
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(invoice.transaction_id)
        .bind(invoice.client_id)
        .bind(&invoice.number)
        .bind(invoice.status.as_str())
        .bind(invoice.total_amount)
        .bind(invoice.paid_amount)
        .bind(invoice.due_date)
        .execute(&mut **tx)
        .await?;

        let invoice_id = result.last_insert_id() as i64;
        let row = sqlx::query_as::<_, InvoiceRow>(&format!(
            "SELECT {} FROM invoice i WHERE i.kd_invoice = ?",
            INVOICE_COLUMNS
        ))
        .bind(invoice_id)
        .fetch_one(&mut **tx)
        .await?;

        row.try_into()
    }

    /// Store a new running total and the status it implies
    pub async fn update_paid_with_tx(
        tx: &mut Transaction<'_, MySql>,
        invoice_id: i64,
        paid_amount: Decimal,
        status: InvoiceStatus,
    ) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE invoice
            SET paid_amount = ?, status = ?, updated_at = CURRENT_TIMESTAMP
            WHERE kd_invoice = ?
            "#,
        )
        .bind(paid_amount)
        .bind(status.as_str())
        .bind(invoice_id)
        .execute(&mut **tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Invoice {} not found", invoice_id)));
        }

        Ok(())
    }

    /// Invoices that may still carry a balance
    pub async fn list_receivable(&self) -> Result<Vec<Invoice>> {
        let rows = sqlx::query_as::<_, InvoiceRow>(&format!(
            r#"
            SELECT {} FROM invoice i
            WHERE i.status IN ('outstanding', 'partial', 'overdue')
            "#,
            INVOICE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Invoice::try_from).collect()
    }

    /// Outstanding and partially paid invoices, earliest due first
    pub async fn list_open(&self, limit: i64, offset: i64) -> Result<Vec<OpenInvoice>> {
        let rows = sqlx::query_as::<_, OpenInvoiceRow>(&format!(
            r#"
            SELECT {}, COALESCE(ct.nama_client, cm.nama_client) AS nama_client
            FROM invoice i
            LEFT JOIN transaksi t ON t.kd_transaksi = i.kd_transaksi
            LEFT JOIN client ct ON ct.kd_client = t.kd_client
            LEFT JOIN client cm ON cm.kd_client = i.kd_client
            WHERE i.status IN ('outstanding', 'partial')
            ORDER BY i.tanggal_jatuh_tempo IS NULL, i.tanggal_jatuh_tempo ASC, i.kd_invoice ASC
            LIMIT ? OFFSET ?
            "#,
            INVOICE_COLUMNS
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(OpenInvoice {
                    client_name: row.nama_client.unwrap_or_else(|| "Unknown".to_string()),
                    invoice: row.invoice.try_into()?,
                })
            })
            .collect()
    }

    pub async fn client_exists_with_tx(tx: &mut Transaction<'_, MySql>, client_id: i64) -> Result<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT kd_client FROM client WHERE kd_client = ?")
            .bind(client_id)
            .fetch_optional(&mut **tx)
            .await?;

        Ok(found.is_some())
    }
}

/// Database row representation for the invoice table
#[derive(sqlx::FromRow)]
struct InvoiceRow {
    kd_invoice: i64,
    kd_transaksi: Option<i64>,
    kd_client: Option<i64>,
    nomor_invoice: String,
    status: String,
    total_amount: Decimal,
    paid_amount: Decimal,
    tanggal_jatuh_tempo: Option<NaiveDate>,
    created_at: Option<DateTime<Utc>>,
}

#[derive(sqlx::FromRow)]
struct OpenInvoiceRow {
    #[sqlx(flatten)]
    invoice: InvoiceRow,
    nama_client: Option<String>,
}

impl TryFrom<InvoiceRow> for Invoice {
    type Error = AppError;

    fn try_from(row: InvoiceRow) -> Result<Self> {
        Ok(Invoice {
            id: row.kd_invoice,
            transaction_id: row.kd_transaksi,
            client_id: row.kd_client,
            number: row.nomor_invoice,
            status: row.status.try_into()?,
            total_amount: row.total_amount,
            paid_amount: row.paid_amount,
            due_date: row.tanggal_jatuh_tempo,
            created_at: row.created_at,
        })
    }
}

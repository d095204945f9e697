use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{MySql, MySqlPool, Transaction};

use crate::core::{AppError, Result};
use crate::modules::sales::models::{NewSale, PaymentMethod, SaleTransaction};

const SALE_COLUMNS: &str = r#"
    t.kd_transaksi, t.kd_client, t.kd_sales, t.tanggal,
    t.metode_pembayaran, t.total_harga, t.status
"#;

/// Repository for sale transactions (`transaksi`)
#[derive(Clone)]
pub struct SaleRepository {
    pool: MySqlPool,
}

impl SaleRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Insert the header of a sale for an existing client
    pub async fn create_with_tx(
        tx: &mut Transaction<'_, MySql>,
        sale: &NewSale,
        total: Decimal,
    ) -> Result<SaleTransaction> {
        let client: Option<i64> = sqlx::query_scalar("SELECT kd_client FROM client WHERE kd_client = ?")
            .bind(sale.client_id)
            .fetch_optional(&mut **tx)
            .await?;
        if client.is_none() {
            return Err(AppError::not_found(format!("Client {} not found", sale.client_id)));
        }

        let status = match sale.method {
            PaymentMethod::Cash => "completed",
            PaymentMethod::Transfer | PaymentMethod::Cicilan => "pending",
        };

        let result = sqlx::query(
            r#"
            INSERT INTO transaksi (kd_client, kd_sales, tanggal, metode_pembayaran, total_harga, status)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(sale.client_id)
        .bind(sale.sales_id)
        .bind(sale.date)
        .bind(sale.method.as_str())
        .bind(total)
        .bind(status)
        .execute(&mut **tx)
        .await?;

        let transaction_id = result.last_insert_id() as i64;
        let row = sqlx::query_as::<_, SaleRow>(&format!(
            "SELECT {} FROM transaksi t WHERE t.kd_transaksi = ?",
            SALE_COLUMNS
        ))
        .bind(transaction_id)
        .fetch_one(&mut **tx)
        .await?;

        Ok(row.into())
    }

    pub async fn find_by_id(&self, transaction_id: i64) -> Result<Option<SaleTransaction>> {
        let row = sqlx::query_as::<_, SaleRow>(&format!(
            "SELECT {} FROM transaksi t WHERE t.kd_transaksi = ?",
            SALE_COLUMNS
        ))
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(SaleTransaction::from))
    }

    /// Sales with no main invoice yet, oldest first
    pub async fn list_uninvoiced_with_tx(
        tx: &mut Transaction<'_, MySql>,
    ) -> Result<Vec<SaleTransaction>> {
        let rows = sqlx::query_as::<_, SaleRow>(&format!(
            r#"
            SELECT {} FROM transaksi t
            WHERE NOT EXISTS (
                SELECT 1 FROM invoice i
                WHERE i.kd_transaksi = t.kd_transaksi
                  AND i.nomor_invoice NOT LIKE 'INV-DP-%'
            )
            ORDER BY t.kd_transaksi ASC
            FOR UPDATE
            "#,
            SALE_COLUMNS
        ))
        .fetch_all(&mut **tx)
        .await?;

        Ok(rows.into_iter().map(SaleTransaction::from).collect())
    }
}

/// Database row representation for the transaksi table
#[derive(sqlx::FromRow)]
struct SaleRow {
    kd_transaksi: i64,
    kd_client: i64,
    kd_sales: Option<i64>,
    tanggal: Option<NaiveDate>,
    metode_pembayaran: String,
    total_harga: Decimal,
    status: String,
}

impl From<SaleRow> for SaleTransaction {
    fn from(row: SaleRow) -> Self {
        SaleTransaction {
            id: row.kd_transaksi,
            client_id: row.kd_client,
            sales_id: row.kd_sales,
            date: row.tanggal,
            method: row.metode_pembayaran,
            total: row.total_harga,
            status: row.status,
        }
    }
}

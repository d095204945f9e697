use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::MySqlPool;

use crate::core::{AppError, Result};
use crate::modules::credit::models::{
    CreditAggregates, CreditProfile, HighRiskCustomer, HistoryLine, PaidLineDates,
};

/// Storage operations behind the credit profile aggregator
#[async_trait]
pub trait CreditProfileRepository: Send + Sync {
    /// Name of the client, `None` when the client does not exist
    async fn client_name(&self, client_id: i64) -> Result<Option<String>>;

    /// Existing profile, or a fresh one with default values
    async fn get_or_create(&self, client_id: i64, default_limit: Decimal) -> Result<CreditProfile>;

    /// Due and payment dates of every paid line of the client's plans
    async fn paid_line_dates(&self, client_id: i64) -> Result<Vec<PaidLineDates>>;

    async fn transaction_count(&self, client_id: i64) -> Result<i64>;

    /// Sum of the client's pending line amounts
    async fn pending_total(&self, client_id: i64) -> Result<Decimal>;

    async fn save_aggregates(&self, client_id: i64, aggregates: &CreditAggregates) -> Result<CreditProfile>;

    async fn set_credit_limit(&self, client_id: i64, limit: Decimal) -> Result<CreditProfile>;

    async fn set_blacklist(&self, client_id: i64, blacklisted: bool, reason: Option<&str>) -> Result<CreditProfile>;

    /// Blacklisted first, then lowest score
    async fn high_risk(&self, limit: i64) -> Result<Vec<HighRiskCustomer>>;

    /// The client's installment lines, newest first
    async fn history_lines(&self, client_id: i64, limit: i64) -> Result<Vec<HistoryLine>>;
}

/// MySQL implementation of CreditProfileRepository
pub struct MySqlCreditProfileRepository {
    pool: MySqlPool,
}

impl MySqlCreditProfileRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn find_by_client(&self, client_id: i64) -> Result<Option<CreditProfile>> {
        let row = sqlx::query_as::<_, CreditProfileRow>(
            r#"
            SELECT kd_profile, kd_client, credit_limit, total_outstanding, payment_score,
                   total_transaksi, total_bayar_tepat, total_telat, is_blacklist, alasan_blacklist
            FROM customer_credit_profile
            WHERE kd_client = ?
            "#,
        )
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CreditProfile::from))
    }

    async fn require_by_client(&self, client_id: i64) -> Result<CreditProfile> {
        self.find_by_client(client_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Credit profile for client {} not found", client_id)))
    }
}

#[async_trait]
impl CreditProfileRepository for MySqlCreditProfileRepository {
    async fn client_name(&self, client_id: i64) -> Result<Option<String>> {
        let name: Option<String> =
            sqlx::query_scalar("SELECT nama_client FROM client WHERE kd_client = ?")
                .bind(client_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(name)
    }

    async fn get_or_create(&self, client_id: i64, default_limit: Decimal) -> Result<CreditProfile> {
        if let Some(profile) = self.find_by_client(client_id).await? {
            return Ok(profile);
        }

        // Concurrent first access: the unique key on kd_client keeps a single row
        sqlx::query(
            r#"
            INSERT INTO customer_credit_profile (
                kd_client, credit_limit, total_outstanding, payment_score,
                total_transaksi, total_bayar_tepat, total_telat, is_blacklist
            ) VALUES (?, ?, 0, 100, 0, 0, 0, FALSE)
            ON DUPLICATE KEY UPDATE kd_client = kd_client
            "#,
        )
        .bind(client_id)
        .bind(default_limit)
        .execute(&self.pool)
        .await?;

        self.require_by_client(client_id).await
    }

    async fn paid_line_dates(&self, client_id: i64) -> Result<Vec<PaidLineDates>> {
        let rows: Vec<(Option<NaiveDate>, Option<NaiveDate>)> = sqlx::query_as(
            r#"
            SELECT s.tgl_jatuh_tempo, s.tgl_pembayaran
            FROM cicilan_schedule s
            JOIN cicilan c ON c.kd_cicilan = s.kd_cicilan
            JOIN transaksi t ON t.kd_transaksi = c.kd_transaksi
            WHERE t.kd_client = ? AND s.status = 'paid'
            "#,
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(due_date, paid_date)| PaidLineDates { due_date, paid_date })
            .collect())
    }

    async fn transaction_count(&self, client_id: i64) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transaksi WHERE kd_client = ?")
            .bind(client_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn pending_total(&self, client_id: i64) -> Result<Decimal> {
        let total: Decimal = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(s.jumlah), 0)
            FROM cicilan_schedule s
            JOIN cicilan c ON c.kd_cicilan = s.kd_cicilan
            JOIN transaksi t ON t.kd_transaksi = c.kd_transaksi
            WHERE t.kd_client = ? AND s.status = 'pending'
            "#,
        )
        .bind(client_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    async fn save_aggregates(&self, client_id: i64, aggregates: &CreditAggregates) -> Result<CreditProfile> {
        sqlx::query(
            r#"
            UPDATE customer_credit_profile
            SET total_transaksi = ?, total_bayar_tepat = ?, total_telat = ?,
                payment_score = ?, total_outstanding = ?
            WHERE kd_client = ?
            "#,
        )
        .bind(aggregates.total_transactions)
        .bind(aggregates.on_time_count)
        .bind(aggregates.late_count)
        .bind(aggregates.payment_score)
        .bind(aggregates.total_outstanding)
        .bind(client_id)
        .execute(&self.pool)
        .await?;

        self.require_by_client(client_id).await
    }

    async fn set_credit_limit(&self, client_id: i64, limit: Decimal) -> Result<CreditProfile> {
        sqlx::query("UPDATE customer_credit_profile SET credit_limit = ? WHERE kd_client = ?")
            .bind(limit)
            .bind(client_id)
            .execute(&self.pool)
            .await?;

        self.require_by_client(client_id).await
    }

    async fn set_blacklist(&self, client_id: i64, blacklisted: bool, reason: Option<&str>) -> Result<CreditProfile> {
        sqlx::query(
            "UPDATE customer_credit_profile SET is_blacklist = ?, alasan_blacklist = ? WHERE kd_client = ?",
        )
        .bind(blacklisted)
        .bind(reason)
        .bind(client_id)
        .execute(&self.pool)
        .await?;

        self.require_by_client(client_id).await
    }

    async fn high_risk(&self, limit: i64) -> Result<Vec<HighRiskCustomer>> {
        let rows = sqlx::query_as::<_, HighRiskRow>(
            r#"
            SELECT p.kd_client, c.nama_client, p.payment_score, p.total_telat,
                   p.is_blacklist, p.total_outstanding
            FROM customer_credit_profile p
            LEFT JOIN client c ON c.kd_client = p.kd_client
            ORDER BY p.is_blacklist DESC, p.payment_score ASC, p.kd_client ASC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(HighRiskCustomer::from).collect())
    }

    async fn history_lines(&self, client_id: i64, limit: i64) -> Result<Vec<HistoryLine>> {
        let rows = sqlx::query_as::<_, HistoryRow>(
            r#"
            SELECT s.kd_schedule, s.nomor_cicilan, s.jumlah, s.tgl_jatuh_tempo,
                   s.tgl_pembayaran, s.status, c.kd_transaksi
            FROM cicilan_schedule s
            JOIN cicilan c ON c.kd_cicilan = s.kd_cicilan
            JOIN transaksi t ON t.kd_transaksi = c.kd_transaksi
            WHERE t.kd_client = ?
            ORDER BY s.created_at DESC, s.kd_schedule DESC
            LIMIT ?
            "#,
        )
        .bind(client_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(HistoryLine {
                    line_id: row.kd_schedule,
                    sequence: row.nomor_cicilan,
                    amount: row.jumlah,
                    due_date: row.tgl_jatuh_tempo,
                    paid_date: row.tgl_pembayaran,
                    status: row.status.parse()?,
                    transaction_id: row.kd_transaksi,
                })
            })
            .collect()
    }
}

#[derive(sqlx::FromRow)]
struct CreditProfileRow {
    kd_profile: i64,
    kd_client: i64,
    credit_limit: Option<Decimal>,
    total_outstanding: Decimal,
    payment_score: Decimal,
    total_transaksi: i32,
    total_bayar_tepat: i32,
    total_telat: i32,
    is_blacklist: bool,
    alasan_blacklist: Option<String>,
}

impl From<CreditProfileRow> for CreditProfile {
    fn from(row: CreditProfileRow) -> Self {
        CreditProfile {
            id: row.kd_profile,
            client_id: row.kd_client,
            credit_limit: row.credit_limit,
            total_outstanding: row.total_outstanding,
            payment_score: row.payment_score,
            total_transactions: row.total_transaksi,
            on_time_count: row.total_bayar_tepat,
            late_count: row.total_telat,
            is_blacklisted: row.is_blacklist,
            blacklist_reason: row.alasan_blacklist,
        }
    }
}

#[derive(sqlx::FromRow)]
struct HighRiskRow {
    kd_client: i64,
    nama_client: Option<String>,
    payment_score: Decimal,
    total_telat: i32,
    is_blacklist: bool,
    total_outstanding: Decimal,
}

impl From<HighRiskRow> for HighRiskCustomer {
    fn from(row: HighRiskRow) -> Self {
        HighRiskCustomer {
            client_id: row.kd_client,
            client_name: row.nama_client.unwrap_or_else(|| "Unknown".to_string()),
            payment_score: row.payment_score,
            late_count: row.total_telat,
            is_blacklisted: row.is_blacklist,
            total_outstanding: row.total_outstanding,
        }
    }
}

#[derive(sqlx::FromRow)]
struct HistoryRow {
    kd_schedule: i64,
    nomor_cicilan: i32,
    jumlah: Decimal,
    tgl_jatuh_tempo: NaiveDate,
    tgl_pembayaran: Option<NaiveDate>,
    status: String,
    kd_transaksi: i64,
}

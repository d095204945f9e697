// MySQL access for installment plans (`cicilan`) and their lines
// (`cicilan_schedule`). Mutations run inside a single transaction;
// dropping an uncommitted transaction rolls it back.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{MySql, MySqlPool, Transaction};

use crate::core::{AppError, Result};
use crate::modules::installments::models::{
    append_note, InstallmentLine, InstallmentPlan, LineStatus, NewInstallmentLine,
    NewInstallmentPlan,
};

const LINE_COLUMNS: &str = r#"
    kd_schedule, kd_cicilan, nomor_cicilan, jumlah, tgl_jatuh_tempo,
    status, tgl_pembayaran, kd_payment, catatan
"#;

/// Line marked paid together with the client owning its plan
#[derive(Debug, Clone)]
pub struct PaidLine {
    pub line: InstallmentLine,
    pub client_id: i64,
}

/// Pending line with the identities needed by the overdue report
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PendingLine {
    pub kd_schedule: i64,
    pub kd_cicilan: i64,
    pub kd_transaksi: i64,
    pub kd_client: i64,
    pub nama_client: Option<String>,
    pub username_client: Option<String>,
    pub nomor_cicilan: i32,
    pub jumlah: Decimal,
    pub tgl_jatuh_tempo: NaiveDate,
}

/// Minimal view of a client's line for aggregation
#[derive(Debug, Clone)]
pub struct ClientLine {
    pub status: LineStatus,
    pub amount: Decimal,
    pub due_date: NaiveDate,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ActivePlanRow {
    pub kd_cicilan: i64,
    pub kd_transaksi: i64,
    pub kd_client: i64,
    pub nama_client: Option<String>,
    pub tenor: Option<i32>,
    pub total_amount: Decimal,
    pub paid_count: i64,
    pub pending_count: i64,
    pub tanggal: Option<NaiveDate>,
}

/// Repository for installment plans and schedule lines
#[derive(Clone)]
pub struct InstallmentRepository {
    pool: MySqlPool,
}

impl InstallmentRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Find a plan with the date of its owning sale
    pub async fn find_plan(&self, plan_id: i64) -> Result<Option<InstallmentPlan>> {
        let row = sqlx::query_as::<_, InstallmentPlanRow>(
            r#"
            SELECT c.kd_cicilan, c.kd_transaksi, c.jumlah_cicilan, c.tenor,
                   c.tgl_jatuh_tempo, c.status, t.tanggal
            FROM cicilan c
            LEFT JOIN transaksi t ON t.kd_transaksi = c.kd_transaksi
            WHERE c.kd_cicilan = ?
            "#,
        )
        .bind(plan_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(InstallmentPlan::from))
    }

    /// Insert a plan for an existing sale transaction
    pub async fn create_plan(&self, plan: &NewInstallmentPlan) -> Result<i64> {
        let mut tx = self.pool.begin().await?;
        let plan_id = self.create_plan_with_tx(&mut tx, plan).await?;
        tx.commit().await?;

        Ok(plan_id)
    }

    /// Insert a plan within an existing transaction.
    ///
    /// A sale owns at most one plan; a second one is a validation error.
    pub async fn create_plan_with_tx(
        &self,
        tx: &mut Transaction<'_, MySql>,
        plan: &NewInstallmentPlan,
    ) -> Result<i64> {
        let sale_exists: Option<i64> =
            sqlx::query_scalar("SELECT kd_transaksi FROM transaksi WHERE kd_transaksi = ? FOR UPDATE")
                .bind(plan.transaction_id)
                .fetch_optional(&mut **tx)
                .await?;
        if sale_exists.is_none() {
            return Err(AppError::not_found(format!(
                "Transaction {} not found",
                plan.transaction_id
            )));
        }

        let existing: Option<i64> =
            sqlx::query_scalar("SELECT kd_cicilan FROM cicilan WHERE kd_transaksi = ?")
                .bind(plan.transaction_id)
                .fetch_optional(&mut **tx)
                .await?;
        if let Some(plan_id) = existing {
            return Err(AppError::validation(format!(
                "Transaction {} already has installment plan {}",
                plan.transaction_id, plan_id
            )));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO cicilan (kd_transaksi, jumlah_cicilan, tenor, tgl_jatuh_tempo, status)
            VALUES (?, ?, ?, ?, 'pending')
            "#,
        )
        .bind(plan.transaction_id)
        .bind(plan.total_amount)
        .bind(plan.tenor)
        .bind(plan.legacy_due_date)
        .execute(&mut **tx)
        .await?;

        Ok(result.last_insert_id() as i64)
    }

    /// Replace every line of a plan in one transaction
    pub async fn replace_schedule(&self, plan_id: i64, lines: &[NewInstallmentLine]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        self.replace_schedule_with_tx(&mut tx, plan_id, lines).await?;
        tx.commit().await?;

        Ok(())
    }

    /// Delete existing lines of the plan and insert `lines`
    pub async fn replace_schedule_with_tx(
        &self,
        tx: &mut Transaction<'_, MySql>,
        plan_id: i64,
        lines: &[NewInstallmentLine],
    ) -> Result<()> {
        sqlx::query("DELETE FROM cicilan_schedule WHERE kd_cicilan = ?")
            .bind(plan_id)
            .execute(&mut **tx)
            .await?;

        for line in lines {
            sqlx::query(
                r#"
                INSERT INTO cicilan_schedule (
                    kd_cicilan, nomor_cicilan, jumlah, tgl_jatuh_tempo, status
                ) VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(plan_id)
            .bind(line.sequence)
            .bind(line.amount)
            .bind(line.due_date)
            .bind(LineStatus::Pending.as_str())
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }

    /// All lines of a plan ordered by sequence
    pub async fn list_lines(&self, plan_id: i64) -> Result<Vec<InstallmentLine>> {
        let rows = sqlx::query_as::<_, InstallmentLineRow>(&format!(
            "SELECT {} FROM cicilan_schedule WHERE kd_cicilan = ? ORDER BY nomor_cicilan ASC",
            LINE_COLUMNS
        ))
        .bind(plan_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(InstallmentLine::try_from).collect()
    }

    pub async fn find_line(&self, line_id: i64) -> Result<Option<InstallmentLine>> {
        let row = sqlx::query_as::<_, InstallmentLineRow>(&format!(
            "SELECT {} FROM cicilan_schedule WHERE kd_schedule = ?",
            LINE_COLUMNS
        ))
        .bind(line_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(InstallmentLine::try_from).transpose()
    }

    /// Set a line to paid and resolve the client owning it.
    ///
    /// Re-applying overwrites the payment date; the payment link is only
    /// replaced when a new one is given.
    pub async fn mark_paid(
        &self,
        line_id: i64,
        payment_id: Option<i64>,
        paid_date: NaiveDate,
    ) -> Result<Option<PaidLine>> {
        let mut tx = self.pool.begin().await?;

        let locked: Option<i64> = sqlx::query_scalar(
            "SELECT kd_schedule FROM cicilan_schedule WHERE kd_schedule = ? FOR UPDATE",
        )
        .bind(line_id)
        .fetch_optional(&mut *tx)
        .await?;
        if locked.is_none() {
            return Ok(None);
        }

        sqlx::query(
            r#"
            UPDATE cicilan_schedule
            SET status = ?, tgl_pembayaran = ?, kd_payment = COALESCE(?, kd_payment)
            WHERE kd_schedule = ?
            "#,
        )
        .bind(LineStatus::Paid.as_str())
        .bind(paid_date)
        .bind(payment_id)
        .bind(line_id)
        .execute(&mut *tx)
        .await?;

        let row = sqlx::query_as::<_, InstallmentLineRow>(&format!(
            "SELECT {} FROM cicilan_schedule WHERE kd_schedule = ?",
            LINE_COLUMNS
        ))
        .bind(line_id)
        .fetch_one(&mut *tx)
        .await?;

        let client_id: i64 = sqlx::query_scalar(
            r#"
            SELECT t.kd_client
            FROM cicilan c
            JOIN transaksi t ON t.kd_transaksi = c.kd_transaksi
            WHERE c.kd_cicilan = ?
            "#,
        )
        .bind(row.kd_cicilan)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(PaidLine {
            line: row.try_into()?,
            client_id,
        }))
    }

    /// Append a dated note to a line, returning the full notes text
    pub async fn append_note(&self, line_id: i64, date: NaiveDate, text: &str) -> Result<Option<String>> {
        let mut tx = self.pool.begin().await?;

        let current: Option<Option<String>> = sqlx::query_scalar(
            "SELECT catatan FROM cicilan_schedule WHERE kd_schedule = ? FOR UPDATE",
        )
        .bind(line_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(current) = current else {
            return Ok(None);
        };

        let notes = append_note(current.as_deref(), date, text)?;

        sqlx::query("UPDATE cicilan_schedule SET catatan = ? WHERE kd_schedule = ?")
            .bind(&notes)
            .bind(line_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Some(notes))
    }

    /// Pending lines of every plan, earliest due first
    pub async fn pending_lines(&self) -> Result<Vec<PendingLine>> {
        let rows = sqlx::query_as::<_, PendingLine>(
            r#"
            SELECT s.kd_schedule, s.kd_cicilan, c.kd_transaksi, t.kd_client,
                   cl.nama_client, cl.username_client,
                   s.nomor_cicilan, s.jumlah, s.tgl_jatuh_tempo
            FROM cicilan_schedule s
            JOIN cicilan c ON c.kd_cicilan = s.kd_cicilan
            JOIN transaksi t ON t.kd_transaksi = c.kd_transaksi
            LEFT JOIN client cl ON cl.kd_client = t.kd_client
            WHERE s.status = 'pending'
            ORDER BY s.tgl_jatuh_tempo ASC, s.kd_schedule ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Plans with at least one pending line and their line counts
    pub async fn active_plans(&self, limit: i64) -> Result<Vec<ActivePlanRow>> {
        let rows = sqlx::query_as::<_, ActivePlanRow>(
            r#"
            SELECT c.kd_cicilan, c.kd_transaksi, t.kd_client, cl.nama_client, c.tenor,
                   COALESCE(SUM(s.jumlah), 0) AS total_amount,
                   CAST(COALESCE(SUM(CASE WHEN s.status = 'paid' THEN 1 ELSE 0 END), 0) AS SIGNED) AS paid_count,
                   CAST(COALESCE(SUM(CASE WHEN s.status = 'pending' THEN 1 ELSE 0 END), 0) AS SIGNED) AS pending_count,
                   t.tanggal
            FROM cicilan c
            JOIN transaksi t ON t.kd_transaksi = c.kd_transaksi
            LEFT JOIN client cl ON cl.kd_client = t.kd_client
            JOIN cicilan_schedule s ON s.kd_cicilan = c.kd_cicilan
            GROUP BY c.kd_cicilan, c.kd_transaksi, t.kd_client, cl.nama_client, c.tenor, t.tanggal
            HAVING pending_count > 0
            ORDER BY c.kd_cicilan ASC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Every line of every plan belonging to the client's sales
    pub async fn client_lines(&self, client_id: i64) -> Result<Vec<ClientLine>> {
        let rows = sqlx::query_as::<_, ClientLineRow>(
            r#"
            SELECT s.status, s.jumlah, s.tgl_jatuh_tempo
            FROM cicilan_schedule s
            JOIN cicilan c ON c.kd_cicilan = s.kd_cicilan
            JOIN transaksi t ON t.kd_transaksi = c.kd_transaksi
            WHERE t.kd_client = ?
            "#,
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(ClientLine {
                    status: row.status.parse()?,
                    amount: row.jumlah,
                    due_date: row.tgl_jatuh_tempo,
                })
            })
            .collect()
    }
}

/// Database row representation for the cicilan table
#[derive(sqlx::FromRow)]
struct InstallmentPlanRow {
    kd_cicilan: i64,
    kd_transaksi: i64,
    jumlah_cicilan: Decimal,
    tenor: Option<i32>,
    tgl_jatuh_tempo: Option<NaiveDate>,
    status: String,
    tanggal: Option<NaiveDate>,
}

impl From<InstallmentPlanRow> for InstallmentPlan {
    fn from(row: InstallmentPlanRow) -> Self {
        InstallmentPlan {
            id: row.kd_cicilan,
            transaction_id: row.kd_transaksi,
            total_amount: row.jumlah_cicilan,
            tenor: row.tenor,
            legacy_due_date: row.tgl_jatuh_tempo,
            status: row.status,
            transaction_date: row.tanggal,
        }
    }
}

/// Database row representation for the cicilan_schedule table
#[derive(sqlx::FromRow)]
struct InstallmentLineRow {
    kd_schedule: i64,
    kd_cicilan: i64,
    nomor_cicilan: i32,
    jumlah: Decimal,
    tgl_jatuh_tempo: NaiveDate,
    status: String,
    tgl_pembayaran: Option<NaiveDate>,
    kd_payment: Option<i64>,
    catatan: Option<String>,
}

impl TryFrom<InstallmentLineRow> for InstallmentLine {
    type Error = AppError;

    fn try_from(row: InstallmentLineRow) -> Result<Self> {
        Ok(InstallmentLine {
            id: row.kd_schedule,
            plan_id: row.kd_cicilan,
            sequence: row.nomor_cicilan,
            amount: row.jumlah,
            due_date: row.tgl_jatuh_tempo,
            status: row.status.try_into()?,
            paid_date: row.tgl_pembayaran,
            payment_id: row.kd_payment,
            notes: row.catatan,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ClientLineRow {
    status: String,
    jumlah: Decimal,
    tgl_jatuh_tempo: NaiveDate,
}

// Sale transaction (`transaksi`) and the intake request that creates one

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{AppError, Money, Result};
use crate::modules::installments::models::{InstallmentLine, InstallmentPlan};
use crate::modules::installments::services::ScheduleGenerator;
use crate::modules::invoices::models::Invoice;

/// How the customer settles the sale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Transfer,
    /// Financed through an installment plan
    Cicilan,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Transfer => "transfer",
            PaymentMethod::Cicilan => "cicilan",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "transfer" => Ok(PaymentMethod::Transfer),
            "cicilan" => Ok(PaymentMethod::Cicilan),
            other => Err(AppError::validation(format!(
                "metode_pembayaran must be one of cash, transfer, cicilan; got '{}'",
                other
            ))),
        }
    }
}

/// A recorded sale
#[derive(Debug, Clone, Serialize)]
pub struct SaleTransaction {
    pub id: i64,
    pub client_id: i64,
    pub sales_id: Option<i64>,
    pub date: Option<NaiveDate>,
    /// Stored as free text by older back-office screens
    pub method: String,
    pub total: Decimal,
    pub status: String,
}

impl SaleTransaction {
    pub fn is_cash(&self) -> bool {
        self.method.trim().eq_ignore_ascii_case(PaymentMethod::Cash.as_str())
    }
}

/// One car on the sale
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaleLine {
    pub kd_mobil: Option<i64>,
    pub harga: Option<Decimal>,
    pub jumlah: Option<i32>,
    pub subtotal: Option<Decimal>,
}

impl SaleLine {
    /// Explicit subtotal, else unit price times quantity (one car by default)
    pub fn line_total(&self) -> Result<Decimal> {
        let total = match (self.subtotal, self.harga) {
            (Some(subtotal), _) => subtotal,
            (None, Some(price)) => {
                let quantity = self.jumlah.unwrap_or(1);
                if quantity <= 0 {
                    return Err(AppError::validation(format!(
                        "jumlah must be greater than 0, got {}",
                        quantity
                    )));
                }
                Money::ensure_non_negative(price, "harga")?;
                Money::checked_mul(price, Decimal::from(quantity), "subtotal")?
            }
            (None, None) => {
                return Err(AppError::validation(
                    "Each detail needs a subtotal or a harga",
                ))
            }
        };

        Money::ensure_non_negative(total, "subtotal")
    }
}

/// Intake of a new sale
#[derive(Debug, Clone)]
pub struct NewSale {
    pub client_id: i64,
    pub sales_id: Option<i64>,
    pub date: NaiveDate,
    pub method: PaymentMethod,
    pub lines: Vec<SaleLine>,
    pub down_payment: Decimal,
    /// Amount financed; defaults to total minus down payment
    pub financed_amount: Option<Decimal>,
    pub tenor: Option<i32>,
}

/// Validated amounts of a sale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleAmounts {
    pub total: Decimal,
    pub down_payment: Decimal,
    /// Present for installment sales only
    pub financed: Option<(Decimal, i32)>,
}

impl NewSale {
    pub fn amounts(&self) -> Result<SaleAmounts> {
        if self.lines.is_empty() {
            return Err(AppError::validation("A sale needs at least one detail"));
        }

        let mut total = Decimal::ZERO;
        for line in &self.lines {
            total = Money::checked_add(total, line.line_total()?, "total")?;
        }
        let total = Money::round(total);

        let down_payment = Money::ensure_non_negative(self.down_payment, "dp")?;
        if down_payment > total {
            return Err(AppError::validation(format!(
                "dp ({}) cannot exceed the sale total ({})",
                down_payment, total
            )));
        }
        if self.method == PaymentMethod::Cash && down_payment > Decimal::ZERO {
            return Err(AppError::validation("A cash sale cannot carry a dp"));
        }

        let financed = match self.method {
            PaymentMethod::Cicilan => {
                let tenor = self
                    .tenor
                    .ok_or_else(|| AppError::validation("tenor is required for cicilan sales"))?;
                ScheduleGenerator::validate_tenor(tenor)?;
                let amount = self.financed_amount.unwrap_or(total - down_payment);
                Some((Money::ensure_non_negative(amount, "jumlah_cicilan")?, tenor))
            }
            PaymentMethod::Cash | PaymentMethod::Transfer => None,
        };

        Ok(SaleAmounts {
            total,
            down_payment,
            financed,
        })
    }
}

/// Everything created by one sale intake
#[derive(Debug, Clone, Serialize)]
pub struct RecordedSale {
    pub sale: SaleTransaction,
    pub invoice: Invoice,
    pub down_payment_invoice: Option<Invoice>,
    pub plan: Option<InstallmentPlan>,
    pub schedule: Vec<InstallmentLine>,
}

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::modules::invoices::models::Invoice;

/// Receivable age band, by days past the due date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgingBucket {
    /// Not yet due, or due today
    Current,
    Days30To60,
    Days60To90,
    Days90Plus,
}

impl AgingBucket {
    /// Band for a signed day count; 1..=60 days overdue all land in `30_60`
    pub fn for_days(days_overdue: i64) -> Self {
        match days_overdue {
            d if d <= 0 => AgingBucket::Current,
            d if d <= 60 => AgingBucket::Days30To60,
            d if d <= 90 => AgingBucket::Days60To90,
            _ => AgingBucket::Days90Plus,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AgingBucket::Current => "current",
            AgingBucket::Days30To60 => "30_60",
            AgingBucket::Days60To90 => "60_90",
            AgingBucket::Days90Plus => "90_plus",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BucketTotal {
    pub count: i64,
    pub amount: Decimal,
}

impl BucketTotal {
    fn add(&mut self, amount: Decimal) {
        self.count += 1;
        self.amount += amount;
    }
}

/// Remaining receivables grouped by age
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AgingReport {
    pub current: BucketTotal,
    pub days_30_60: BucketTotal,
    pub days_60_90: BucketTotal,
    pub days_90_plus: BucketTotal,
    pub total: BucketTotal,
}

impl AgingReport {
    /// Bucket the remaining balance of every receivable invoice.
    /// Invoices without a due date are left out.
    pub fn build<'a>(invoices: impl IntoIterator<Item = &'a Invoice>, as_of: NaiveDate) -> Self {
        let mut report = AgingReport::default();

        for invoice in invoices {
            if !invoice.status.is_receivable() {
                continue;
            }
            let Some(days) = invoice.days_overdue(as_of) else {
                continue;
            };
            report.add(AgingBucket::for_days(days), invoice.remaining());
        }

        report
    }

    pub fn add(&mut self, bucket: AgingBucket, remaining: Decimal) {
        let slot = match bucket {
            AgingBucket::Current => &mut self.current,
            AgingBucket::Days30To60 => &mut self.days_30_60,
            AgingBucket::Days60To90 => &mut self.days_60_90,
            AgingBucket::Days90Plus => &mut self.days_90_plus,
        };
        slot.add(remaining);
        self.total.add(remaining);
    }

    pub fn bucket(&self, bucket: AgingBucket) -> BucketTotal {
        match bucket {
            AgingBucket::Current => self.current,
            AgingBucket::Days30To60 => self.days_30_60,
            AgingBucket::Days60To90 => self.days_60_90,
            AgingBucket::Days90Plus => self.days_90_plus,
        }
    }
}

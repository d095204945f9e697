pub mod installment_line;
pub mod installment_plan;
pub mod reports;

pub use installment_line::{append_note, InstallmentLine, LineStatus, NewInstallmentLine, NOTE_MAX_LEN};
pub use installment_plan::{InstallmentPlan, NewInstallmentPlan};
pub use reports::{ActivePlan, ClientInstallmentSummary, OverdueLine};

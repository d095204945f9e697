pub mod installment_repository;

pub use installment_repository::{ActivePlanRow, ClientLine, InstallmentRepository, PaidLine, PendingLine};

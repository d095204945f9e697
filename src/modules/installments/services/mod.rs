pub mod installment_service;
pub mod overdue;
pub mod schedule_generator;

pub use installment_service::InstallmentService;
pub use schedule_generator::{ScheduleGenerator, DEFAULT_TENOR, INSTALLMENT_STEP_DAYS, MAX_TENOR};

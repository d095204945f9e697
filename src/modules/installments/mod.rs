pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{InstallmentLine, InstallmentPlan, LineStatus};
pub use repositories::InstallmentRepository;
pub use services::{InstallmentService, ScheduleGenerator};

pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{CreditProfile, CreditProfileDetail, HighRiskCustomer, PaymentHistoryEntry};
pub use repositories::{CreditProfileRepository, MySqlCreditProfileRepository};
pub use services::{CreditProfileService, CreditRecompute};

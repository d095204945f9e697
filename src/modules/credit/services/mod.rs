pub mod credit_service;
pub mod scoring;

pub use credit_service::{CreditProfileService, CreditRecompute};

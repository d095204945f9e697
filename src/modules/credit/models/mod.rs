pub mod credit_profile;

pub use credit_profile::{
    CreditAggregates, CreditProfile, CreditProfileDetail, HighRiskCustomer, HistoryLine,
    PaidLineDates, PaymentHistoryEntry,
};

pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{NewSale, PaymentMethod, RecordedSale, SaleTransaction};
pub use repositories::SaleRepository;
pub use services::SaleService;

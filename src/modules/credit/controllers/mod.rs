pub mod credit_controller;

pub use credit_controller::configure;

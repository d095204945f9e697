pub mod invoice_controller;
pub mod payment_controller;

use actix_web::web;

/// Invoice ledger, payment ledger and payment approval routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    invoice_controller::configure(cfg);
    payment_controller::configure(cfg);
}

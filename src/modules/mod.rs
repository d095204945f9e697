pub mod credit;
pub mod health;
pub mod installments;
pub mod invoices;
pub mod sales;

use actix_web::web;

/// Mount every HTTP surface of the service
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    health::controllers::configure(cfg);
    sales::controllers::configure(cfg);
    installments::controllers::configure(cfg);
    credit::controllers::configure(cfg);
    invoices::controllers::configure(cfg);
}

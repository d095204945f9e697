// Test Server Helpers
//
// Wires an App the way main.rs does, minus the network-facing
// middleware (CORS, rate limiting).

use actix_web::web;
use showroom_finance::config::FinancePolicy;
use showroom_finance::middleware::{json_config, path_config, query_config};
use showroom_finance::modules::configure_routes;
use sqlx::MySqlPool;

/// Application state, extractor configs and every route
///
/// # Example
/// ```no_run
/// let app = test::init_service(
///     App::new().configure(configure_test_app(lazy_pool(), FinancePolicy::default())),
/// )
/// .await;
/// ```
pub fn configure_test_app(
    pool: MySqlPool,
    policy: FinancePolicy,
) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(web::Data::new(pool))
            .app_data(web::Data::new(policy))
            .app_data(json_config())
            .app_data(query_config())
            .app_data(path_config());
        configure_routes(cfg);
    }
}

pub mod error_handler;
pub mod rate_limit;
pub mod request_id;

pub use error_handler::{json_config, path_config, query_config, ErrorLogger};
pub use rate_limit::RateLimiter;
pub use request_id::{CorrelationId, RequestId};

pub mod error;
pub mod money;
pub mod pagination;
pub mod timezone;

pub use error::{AppError, Result};
pub use money::Money;
pub use pagination::{validate_limit, validate_offset};
pub use timezone::{add_days, business_today, parse_date};

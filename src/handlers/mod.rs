// Gateway module - controls public API for handlers
// Modules are private, only exported symbols are public

mod api;
mod health;
mod metrics;
mod root;
mod shared_types;

// Core handlers
pub use health::health_check;
pub use metrics::metrics_handler;
pub use root::root_handler;

// Demo API handlers
pub use api::{error_endpoint, get_data, not_found, slow_endpoint};

// Error responses
pub use shared_types::{AppError, UnhandledError};

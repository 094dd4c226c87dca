//! HTTP middleware

pub mod metrics;
pub mod mutation_log;
pub mod request_id;

pub use metrics::metrics_middleware;
pub use mutation_log::mutation_log_middleware;
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};

//! HTTP request execution against the configured backend

pub mod executor;
pub mod request;

pub use executor::{RequestExecutor, RequestExecutorBuilder};
pub use request::RequestOptions;

// Infrastructure layer - External dependencies and adapters
pub mod cache_interceptor;
pub mod cache_storage;
pub mod config;
pub mod http_fetch;
pub mod http_transport;
pub mod request_observer;

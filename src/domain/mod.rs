// Domain layer - Data model and invariants
pub mod cache_manifest;
pub mod dashboard;
pub mod series_buffer;
pub mod telemetry;

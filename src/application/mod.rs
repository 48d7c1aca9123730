// Application layer - Use cases and ports
pub mod cadence;
pub mod errors;
pub mod renderer;
pub mod sync_scheduler;
pub mod telemetry_repository;

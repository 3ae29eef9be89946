//! Quietreel Infrastructure Library
//!
//! Shared infrastructure for the Quietreel service:
//! - Middleware (request ID)
//! - Tracing initialization
//! - Transcode admission control

#[cfg(feature = "middleware")]
pub mod middleware;

#[cfg(feature = "observability-basic")]
pub mod telemetry;

#[cfg(feature = "capacity")]
pub mod capacity;

#[cfg(feature = "middleware")]
pub use middleware::{request_id_middleware, RequestId};

#[cfg(feature = "observability-basic")]
pub use telemetry::{init_telemetry, shutdown_telemetry};

#[cfg(feature = "capacity")]
pub use capacity::TranscodeSlots;

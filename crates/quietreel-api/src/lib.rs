//! Quietreel API Library
//!
//! HTTP handlers, request-flow services and application setup for the audio removal
//! service.

pub mod constants;
pub mod error;
mod handlers;
pub mod services;
pub mod setup;
pub mod state;
mod utils;

pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;

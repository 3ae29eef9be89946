//! Shared HTTP middleware for Quietreel services

pub mod request_id;

pub use request_id::{request_id_middleware, RequestId};

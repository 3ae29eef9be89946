//! Connectivity endpoints used by the frontend

use crate::constants::DEMO_MESSAGE;
use crate::state::AppState;
use axum::{extract::State, Json};
use chrono::Utc;
use quietreel_core::models::{DemoResponse, PingResponse};
use std::sync::Arc;

pub async fn ping(State(state): State<Arc<AppState>>) -> Json<PingResponse> {
    Json(PingResponse {
        message: state.config.ping_message().to_string(),
    })
}

pub async fn demo(State(state): State<Arc<AppState>>) -> Json<DemoResponse> {
    Json(DemoResponse {
        message: DEMO_MESSAGE.to_string(),
        timestamp: Some(Utc::now()),
        environment: Some(state.config.environment().to_string()),
    })
}

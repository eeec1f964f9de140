//! REST API Server for the bike service assistant
//!
//! Exposes the chat pipeline, the diagnosis tool and the cost estimator
//! over HTTP for the website frontend.

use axum::{
    extract::{Query, State},
    http::{header::USER_AGENT, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::device::DeviceContext;
use crate::engine::{AssistantService, RequestContext};
use crate::models::{BikeType, ServiceType};

const DEFAULT_HISTORY_LIMIT: usize = 20;
const MAX_HISTORY_LIMIT: usize = 100;

/// =============================
/// Request Models
/// =============================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DiagnoseRequest {
    pub description: String,
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EstimateRequest {
    pub bike_type: String,
    pub service_type: String,
    pub session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

/// =============================
/// Response Wrapper
/// =============================

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub timestamp: String,
}

impl ApiResponse {
    pub fn success<T: Serialize>(data: T) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(data).ok(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub service: AssistantService,
}

/// =============================
/// Helpers
/// =============================

fn stable_uuid_from_string(input: &str) -> uuid::Uuid {
    use sha2::{Digest, Sha256};

    let hash = Sha256::digest(input.as_bytes());
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&hash[..16]);

    // Set UUID version (4) and variant (RFC4122) bits.
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;

    uuid::Uuid::from_bytes(bytes)
}

/// Session ids that are not UUIDs map to a stable derived UUID
fn parse_session_id(value: Option<&str>) -> Option<uuid::Uuid> {
    match value {
        Some(v) if !v.trim().is_empty() => {
            Some(uuid::Uuid::parse_str(v).unwrap_or_else(|_| stable_uuid_from_string(v)))
        }
        _ => None,
    }
}

fn request_context(headers: &HeaderMap, session_id: Option<&str>) -> RequestContext {
    let user_agent = headers.get(USER_AGENT).and_then(|v| v.to_str().ok());

    RequestContext {
        session_id: parse_session_id(session_id),
        device: DeviceContext::from_user_agent(user_agent),
    }
}

fn with_session(mut data: serde_json::Value, ctx: &RequestContext) -> serde_json::Value {
    if let Some(session_id) = ctx.session_id {
        data["session_id"] = serde_json::json!(session_id.to_string());
    }
    data
}

/// =============================
/// Health Endpoint
/// =============================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// =============================
/// Chat Endpoint
/// =============================

async fn chat_handler(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(req): Json<ChatRequest>,
) -> (StatusCode, Json<ApiResponse>) {
    let ctx = request_context(&headers, req.session_id.as_deref());
    info!(session_id = ?ctx.session_id, device = ?ctx.device.device_type, "Received chat message");

    let reply = state.service.chat(&req.message, &ctx);
    let data = serde_json::to_value(&reply).unwrap_or(serde_json::Value::Null);

    (
        StatusCode::OK,
        Json(ApiResponse::success(with_session(data, &ctx))),
    )
}

/// =============================
/// Diagnosis Tool Endpoint
/// =============================

async fn diagnose_handler(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(req): Json<DiagnoseRequest>,
) -> (StatusCode, Json<ApiResponse>) {
    let ctx = request_context(&headers, req.session_id.as_deref());
    let diagnosis = state.service.diagnose(&req.description, &ctx);

    let data = serde_json::json!({ "diagnosis": diagnosis });
    (
        StatusCode::OK,
        Json(ApiResponse::success(with_session(data, &ctx))),
    )
}

/// =============================
/// Cost Estimate Endpoint
/// =============================

async fn estimate_handler(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(req): Json<EstimateRequest>,
) -> (StatusCode, Json<ApiResponse>) {
    let ctx = request_context(&headers, req.session_id.as_deref());

    match state
        .service
        .estimate(&req.bike_type, &req.service_type, &ctx)
    {
        Some(estimate) => {
            let data = serde_json::json!({ "estimate": estimate });
            (
                StatusCode::OK,
                Json(ApiResponse::success(with_session(data, &ctx))),
            )
        }
        None => (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(format!(
                "Unknown bike type '{}' or service type '{}'",
                req.bike_type, req.service_type
            ))),
        ),
    }
}

/// =============================
/// Catalog Endpoint
/// =============================

async fn catalog() -> Json<ApiResponse> {
    let bike_types: Vec<_> = BikeType::ALL
        .iter()
        .map(|b| serde_json::json!({ "id": b.token(), "name": b.display_name() }))
        .collect();
    let service_types: Vec<_> = ServiceType::ALL
        .iter()
        .map(|s| serde_json::json!({ "id": s.token(), "name": s.display_name() }))
        .collect();

    Json(ApiResponse::success(serde_json::json!({
        "bike_types": bike_types,
        "service_types": service_types,
    })))
}

/// =============================
/// Interaction History Endpoint
/// =============================

async fn interactions_handler(
    State(state): State<ApiState>,
    Query(query): Query<HistoryQuery>,
) -> (StatusCode, Json<ApiResponse>) {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .min(MAX_HISTORY_LIMIT);

    match state.service.recorder().log().recent(limit).await {
        Ok(records) => (StatusCode::OK, Json(ApiResponse::success(records))),
        Err(e) => {
            warn!("Failed to load interaction history: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse::error(format!(
                    "Interaction history unavailable: {}",
                    e
                ))),
            )
        }
    }
}

/// =============================
/// Router
/// =============================

pub fn create_router(service: AssistantService) -> Router {
    let state = ApiState { service };

    Router::new()
        .route("/health", get(health))
        .route("/api/chat", post(chat_handler))
        .route("/api/diagnose", post(diagnose_handler))
        .route("/api/estimate", post(estimate_handler))
        .route("/api/catalog", get(catalog))
        .route("/api/interactions", get(interactions_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    service: AssistantService,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(service);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}

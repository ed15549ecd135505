//! API Request Handlers

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use super::types::*;
use crate::core::{AccountClassifier, AddressExtractor, ChainReader, Presenter};
use crate::models::{AppError, BotConfig, SolAddress};
use crate::utils::constants::APP_VERSION;
use crate::utils::telemetry::{BotTelemetry, TelemetryStats};

/// Chain handle shared by the bot and the API
pub type SharedChain = Arc<dyn ChainReader>;

/// Shared application state
pub struct AppState {
    pub extractor: AddressExtractor,
    pub classifier: AccountClassifier<SharedChain>,
    pub presenter: Presenter,
    pub telemetry: Arc<BotTelemetry>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: &BotConfig, chain: SharedChain, telemetry: Arc<BotTelemetry>) -> Self {
        Self {
            extractor: AddressExtractor::from_config(config),
            classifier: AccountClassifier::new(chain),
            presenter: Presenter::from_config(config),
            telemetry,
            start_time: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, (StatusCode, Json<ApiResponse<()>>)>;

fn latency_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// Map an AppError onto its HTTP status and error envelope
fn error_response(err: &AppError, start: Instant) -> (StatusCode, Json<ApiResponse<()>>) {
    let status =
        StatusCode::from_u16(err.code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(ApiResponse::error(ApiError::from(err), latency_ms(start))),
    )
}

// ============================================
// Health Check
// ============================================

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthData>> {
    let start = Instant::now();

    let data = HealthData {
        status: "healthy".to_string(),
        version: APP_VERSION.to_string(),
        uptime_seconds: state.uptime_seconds(),
    };

    Json(ApiResponse::success(data, latency_ms(start)))
}

// ============================================
// Stats
// ============================================

pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<ApiResponse<TelemetryStats>> {
    let start = Instant::now();
    Json(ApiResponse::success(
        state.telemetry.snapshot(),
        latency_ms(start),
    ))
}

// ============================================
// Address Lookup
// ============================================

pub async fn lookup_address(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
) -> ApiResult<LookupData> {
    let start = Instant::now();

    let address = SolAddress::parse(address.trim())
        .map_err(|e| error_response(&AppError::bad_request(e.message), start))?;

    let classification = state.classifier.classify(&address).await.map_err(|e| {
        if !e.code.is_silent() {
            warn!(address = %address, code = e.code_str(), "Lookup failed: {}", e.message);
        }
        error_response(&e, start)
    })?;

    let reply = state.presenter.render(&classification);

    info!(
        address = %address,
        kind = classification.kind.as_str(),
        latency_ms = latency_ms(start),
        "🔍 API lookup complete"
    );

    Ok(Json(ApiResponse::success(
        LookupData {
            classification,
            reply,
        },
        latency_ms(start),
    )))
}

// ============================================
// Address Extraction
// ============================================

pub async fn extract_addresses(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ExtractRequest>,
) -> Json<ApiResponse<ExtractData>> {
    let start = Instant::now();
    let addresses = state.extractor.extract(&req.text);

    Json(ApiResponse::success(
        ExtractData {
            count: addresses.len(),
            addresses,
        },
        latency_ms(start),
    ))
}

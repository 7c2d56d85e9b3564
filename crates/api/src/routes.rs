use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use vriksh_core::alerts;
use vriksh_core::domain::prediction::{PreHarvestRequest, PreHarvestResponse};
use vriksh_core::domain::records::{
    find_by_harvest, Alert, BestMarketRecord, MarketPriceEntry, ProfitRecord, RiskResponse,
};
use vriksh_core::error::ArtifactError;
use vriksh_core::model::ModelGateway;
use vriksh_core::storage::{self, ArtifactStore};

use crate::error::{internal, load_failure, ApiError, Resource};

const MARKET_PRICES: Resource = Resource {
    file: storage::MARKET_PRICES_FILE,
    unavailable: "Market prices data is not available yet.",
    failed: "Failed to load market prices.",
};

const PROFIT: Resource = Resource {
    file: storage::PROFIT_FILE,
    unavailable: "Profit data is not available yet.",
    failed: "Failed to load profit data.",
};

const BEST_MARKET: Resource = Resource {
    file: storage::BEST_MARKET_FILE,
    unavailable: "Best market recommendations are not available yet.",
    failed: "Failed to load best market data.",
};

const RISK: Resource = Resource {
    file: storage::RISK_FILE,
    unavailable: "Risk data is not available yet.",
    failed: "Failed to load risk data.",
};

#[derive(Debug, Clone)]
pub struct AppState {
    pub store: ArtifactStore,
    pub gateway: Arc<ModelGateway>,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/market-prices", get(get_market_prices))
        .route("/profit", get(get_profit))
        .route("/best-market/:harvest_id", get(get_best_market))
        .route("/risk/:harvest_id", get(get_risk))
        .route("/alerts", get(get_alerts))
        .route("/predict-yield", post(predict_yield))
        .with_state(state)
        .layer(CorsLayer::very_permissive())
        .layer(TraceLayer::new_for_http())
}

/// Artifact loads are blocking file reads; run them on the blocking pool.
async fn read_artifact<T, F>(
    state: &AppState,
    read: F,
) -> Result<Result<T, ArtifactError>, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&ArtifactStore) -> Result<T, ArtifactError> + Send + 'static,
{
    let store = state.store.clone();
    tokio::task::spawn_blocking(move || read(&store))
        .await
        .map_err(|e| internal(anyhow::Error::new(e), "Failed to read artifact."))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn get_market_prices(
    State(state): State<AppState>,
) -> Result<Json<Vec<MarketPriceEntry>>, ApiError> {
    let rows = read_artifact(&state, ArtifactStore::load_market_prices)
        .await?
        .map_err(|e| load_failure(e, &MARKET_PRICES))?;
    Ok(Json(rows))
}

async fn get_profit(State(state): State<AppState>) -> Result<Json<Vec<ProfitRecord>>, ApiError> {
    let records = read_artifact(&state, ArtifactStore::load_profit)
        .await?
        .map_err(|e| load_failure(e, &PROFIT))?;
    Ok(Json(records))
}

async fn get_best_market(
    State(state): State<AppState>,
    harvest_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<BestMarketRecord>, ApiError> {
    let Path(harvest_id) = harvest_id?;
    let records = read_artifact(&state, ArtifactStore::load_best_market)
        .await?
        .map_err(|e| load_failure(e, &BEST_MARKET))?;

    find_by_harvest(records, harvest_id).map(Json).ok_or_else(|| {
        ApiError::NotFound(format!(
            "Best market recommendation not found for harvest_id={harvest_id}."
        ))
    })
}

async fn get_risk(
    State(state): State<AppState>,
    harvest_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<RiskResponse>, ApiError> {
    let Path(harvest_id) = harvest_id?;
    let records = read_artifact(&state, ArtifactStore::load_risk)
        .await?
        .map_err(|e| load_failure(e, &RISK))?;

    let record = find_by_harvest(records, harvest_id).ok_or_else(|| {
        ApiError::NotFound(format!("Risk score not found for harvest_id={harvest_id}."))
    })?;

    record
        .to_response()
        .map(Json)
        .map_err(|e| internal(e, RISK.failed))
}

async fn get_alerts(State(state): State<AppState>) -> Result<Json<Vec<Alert>>, ApiError> {
    match read_artifact(&state, alerts::derive_alerts).await? {
        Ok(alerts) => Ok(Json(alerts)),
        Err(e) if e.is_not_found() => {
            tracing::warn!(file = RISK.file, "risk artifact not found while deriving alerts");
            Ok(Json(Vec::new()))
        }
        Err(e) => Err(internal(anyhow::Error::new(e), "Failed to derive alerts.")),
    }
}

async fn predict_yield(
    State(state): State<AppState>,
    payload: Result<Json<PreHarvestRequest>, JsonRejection>,
) -> Result<Json<PreHarvestResponse>, ApiError> {
    let Json(payload) = payload?;
    let request = payload.validate()?;

    let Some(model) = state.gateway.get_model().await else {
        tracing::error!(path = %state.gateway.path().display(), "pre-harvest model is not available");
        return Err(ApiError::Unavailable(
            "Pre-harvest prediction model is currently unavailable.".to_string(),
        ));
    };

    let predicted_yield = model
        .predict(&request.features())
        .map_err(|e| internal(e, "Failed to compute yield prediction."))?;

    Ok(Json(PreHarvestResponse::from_yield(
        predicted_yield,
        request.expected_price_per_unit,
    )))
}

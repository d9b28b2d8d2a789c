use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{ContractId, PeriodInput};
use super::engine::{BillingEngine, EngineError};
use super::repository::{ChargeStore, ConfigStore};

/// Body of a calculation request. `as_of_date` defaults to the period start.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationRequest {
    #[serde(default)]
    pub as_of_date: Option<NaiveDate>,
    pub period: PeriodInput,
}

/// Router builder exposing the calculation endpoint.
pub fn billing_router<C, S>(engine: Arc<BillingEngine<C, S>>) -> Router
where
    C: ConfigStore + 'static,
    S: ChargeStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/contracts/:contract_id/calculations",
            post(calculate_handler::<C, S>),
        )
        .with_state(engine)
}

pub(crate) async fn calculate_handler<C, S>(
    State(engine): State<Arc<BillingEngine<C, S>>>,
    Path(contract_id): Path<String>,
    axum::Json(request): axum::Json<CalculationRequest>,
) -> Response
where
    C: ConfigStore + 'static,
    S: ChargeStore + 'static,
{
    let contract_id = ContractId(contract_id);
    let as_of = request.as_of_date.unwrap_or(request.period.period_start);

    match engine.calculate(&contract_id, as_of, &request.period) {
        Ok(result) => (StatusCode::OK, axum::Json(result)).into_response(),
        Err(err) => engine_error_response(&err),
    }
}

pub fn engine_error_response(err: &EngineError) -> Response {
    let status = match err {
        EngineError::ConfigNotFound { .. } => StatusCode::NOT_FOUND,
        EngineError::ConfigAmbiguous { .. } => StatusCode::CONFLICT,
        EngineError::InvalidChargeDefinition { .. }
        | EngineError::InvalidConfiguration { .. }
        | EngineError::AmountOverflow => StatusCode::UNPROCESSABLE_ENTITY,
        EngineError::InvalidPeriod(_) => StatusCode::BAD_REQUEST,
        EngineError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
    };

    let mut payload = json!({
        "error": err.to_string(),
        "kind": err.kind(),
    });
    match err {
        EngineError::ConfigAmbiguous {
            configuration_ids, ..
        } => {
            payload["configurationIds"] = json!(configuration_ids);
        }
        EngineError::InvalidChargeDefinition { charges } => {
            payload["charges"] = json!(charges);
        }
        EngineError::InvalidConfiguration {
            configuration_id,
            defect,
        } => {
            payload["configurationId"] = json!(configuration_id);
            payload["defect"] = json!(defect);
        }
        _ => {}
    }

    (status, axum::Json(payload)).into_response()
}

use super::common::*;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::billing::domain::{ConfigurationId, PaymentConfiguration};
use crate::billing::engine::{BillingEngine, EngineError};
use crate::billing::evaluation::EngineSettings;
use crate::billing::router::{billing_router, engine_error_response, CalculationRequest};

fn calculation_request(uri: &str, body: Value) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::post(uri)
        .header(axum::http::header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(
            serde_json::to_vec(&body).expect("serializable"),
        ))
        .expect("request builds")
}

fn april_body(sales: &str) -> Value {
    json!({
        "period": {
            "periodStart": "2024-04-01",
            "periodEnd": "2024-04-30",
            "reportedSales": sales,
            "unitsSold": "0"
        }
    })
}

#[tokio::test]
async fn calculation_route_returns_breakdown() {
    let engine = Arc::new(build_engine(
        vec![configuration(Some("10000.00"))],
        vec![
            fixed("c-base", "5000.00"),
            percentage("c-turnover", dec!(2)),
        ],
    ));
    let router = billing_router(engine);

    let response = router
        .oneshot(calculation_request(
            &format!("/api/v1/contracts/{CONTRACT}/calculations"),
            april_body("200000.00"),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["subtotal"], "9000.00");
    assert_eq!(body["finalAmount"], "10000.00");
    assert_eq!(body["guaranteeAdjustment"], "1000.00");
    assert_eq!(body["minimumGuaranteeApplied"], true);
    assert_eq!(body["chargeBreakdown"][1]["chargeId"], "c-turnover");
    assert_eq!(body["chargeBreakdown"][1]["type"], "PercentageOfSales");
    assert_eq!(body["chargeBreakdown"][1]["amount"], "4000.00");
    assert!(body["chargeBreakdown"][0].get("skipReason").is_none());
}

#[tokio::test]
async fn calculation_route_reports_missing_configuration() {
    let router = billing_router(Arc::new(build_engine(Vec::new(), Vec::new())));

    let response = router
        .oneshot(calculation_request(
            "/api/v1/contracts/CT-UNKNOWN/calculations",
            april_body("0"),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = read_json_body(response).await;
    assert_eq!(body["kind"], "config_not_found");
}

#[tokio::test]
async fn calculation_route_honours_explicit_as_of_date() {
    let expired = PaymentConfiguration {
        effective_to: Some(date(2024, 3, 31)),
        ..configuration(None)
    };
    let router = billing_router(Arc::new(build_engine(
        vec![expired],
        vec![fixed("c-base", "10.00")],
    )));
    let mut body = april_body("0");
    body["asOfDate"] = json!("2024-03-31");

    let response = router
        .oneshot(calculation_request(
            &format!("/api/v1/contracts/{CONTRACT}/calculations"),
            body,
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn handler_returns_conflict_for_overlapping_configurations() {
    let amendment = PaymentConfiguration {
        id: ConfigurationId("cfg-amendment".to_string()),
        ..configuration(None)
    };
    let engine = Arc::new(build_engine(
        vec![configuration(None), amendment],
        Vec::new(),
    ));
    let request: CalculationRequest =
        serde_json::from_value(april_body("0")).expect("request parses");

    let response = crate::billing::router::calculate_handler::<
        crate::billing::snapshot::BillingSnapshot,
        crate::billing::snapshot::BillingSnapshot,
    >(State(engine), Path(CONTRACT.to_string()), axum::Json(request))
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = read_json_body(response).await;
    assert_eq!(
        body["configurationIds"],
        json!(["cfg-amendment", "cfg-market-hall"])
    );
}

#[tokio::test]
async fn handler_returns_unprocessable_with_offending_charges() {
    let engine = Arc::new(build_engine(
        vec![configuration(None)],
        vec![untyped("c-turnover", "PercentageOfSales")],
    ));
    let request: CalculationRequest =
        serde_json::from_value(april_body("100.00")).expect("request parses");

    let response = crate::billing::router::calculate_handler::<
        crate::billing::snapshot::BillingSnapshot,
        crate::billing::snapshot::BillingSnapshot,
    >(State(engine), Path(CONTRACT.to_string()), axum::Json(request))
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert_eq!(body["kind"], "invalid_charge_definition");
    assert_eq!(body["charges"][0]["chargeId"], "c-turnover");
    assert_eq!(
        body["charges"][0]["defects"][0],
        json!({"defect": "missing_parameter", "parameter": "percentage"})
    );
}

#[tokio::test]
async fn handler_returns_unavailable_when_store_is_down() {
    let engine = Arc::new(BillingEngine::new(
        Arc::new(UnavailableStore),
        Arc::new(UnavailableStore),
        EngineSettings::default(),
    ));
    let request: CalculationRequest =
        serde_json::from_value(april_body("0")).expect("request parses");

    let response = crate::billing::router::calculate_handler::<UnavailableStore, UnavailableStore>(
        State(engine),
        Path(CONTRACT.to_string()),
        axum::Json(request),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn inverted_period_maps_to_bad_request() {
    let err = EngineError::InvalidPeriod(crate::billing::domain::PeriodError::InvertedPeriod {
        period_start: date(2024, 4, 30),
        period_end: date(2024, 4, 1),
    });

    let response = engine_error_response(&err);

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json_body(response).await;
    assert_eq!(body["kind"], "invalid_period");
}

#[tokio::test]
async fn calculation_route_requires_units_sold() {
    let router = billing_router(Arc::new(build_engine(
        vec![configuration(None)],
        vec![per_unit("c-cups", "2.00", "cup")],
    )));
    let mut body = april_body("0");
    body["period"]
        .as_object_mut()
        .expect("period object")
        .remove("unitsSold");

    let response = router
        .oneshot(calculation_request(
            &format!("/api/v1/contracts/{CONTRACT}/calculations"),
            body,
        ))
        .await
        .expect("router responds");

    assert!(response.status().is_client_error());
}

#[test]
fn period_without_units_sold_does_not_deserialize() {
    let parsed = serde_json::from_str::<crate::billing::domain::PeriodInput>(
        r#"{"periodStart":"2024-04-01","periodEnd":"2024-04-30","reportedSales":"0.00"}"#,
    );

    assert!(parsed.is_err());
}

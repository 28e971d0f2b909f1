use axum::{
    Router,
    extract::{Json, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::core::{
    ActualsByMonth, DEFAULT_DURATION_MONTHS, SimulationInput, SimulationResult, calculate_as_of,
};

mod cli;

pub use cli::{Cli, Command, ServeArgs, SimulateArgs, defaults_json, run_simulate_command};

pub const MAX_DURATION_MONTHS: u32 = 600;

#[derive(Debug, Error, PartialEq)]
pub enum RequestError {
    #[error("invalid simulation inputs: {0}")]
    InvalidInputs(String),
    #[error("durationMonths must be <= {max}, got {got}")]
    DurationTooLong { got: i64, max: u32 },
    #[error("actuals are keyed by 1-based month; month 0 is not valid")]
    ActualsMonthZero,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulatePayload {
    inputs: Option<Value>,
    duration_months: Option<i64>,
    actuals: ActualsByMonth,
    today: Option<NaiveDate>,
}

#[derive(Debug)]
struct ApiRequest {
    inputs: SimulationInput,
    duration_months: u32,
    actuals: ActualsByMonth,
    today: NaiveDate,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulateResponse {
    duration_months: u32,
    today: NaiveDate,
    #[serde(flatten)]
    result: SimulationResult,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/api/simulate", post(simulate_post_handler))
        .route("/api/defaults", get(defaults_handler))
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "simulation HTTP API listening");
    info!("local access: http://127.0.0.1:{port}/api/defaults");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn defaults_handler() -> Response {
    json_response(StatusCode::OK, SimulationInput::default())
}

async fn simulate_post_handler(payload: Result<Json<SimulatePayload>, JsonRejection>) -> Response {
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "rejected simulate payload");
            return error_response(rejection.status(), &rejection.body_text());
        }
    };

    let request = match api_request_from_payload(payload, Local::now().date_naive()) {
        Ok(request) => request,
        Err(err) => {
            warn!(%err, "invalid simulate request");
            return error_response(StatusCode::BAD_REQUEST, &err.to_string());
        }
    };

    json_response(StatusCode::OK, build_simulate_response(request))
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn api_request_from_json(json: &str, local_today: NaiveDate) -> Result<ApiRequest, RequestError> {
    let payload = serde_json::from_str::<SimulatePayload>(json)
        .map_err(|e| RequestError::InvalidInputs(e.to_string()))?;
    api_request_from_payload(payload, local_today)
}

fn api_request_from_payload(
    payload: SimulatePayload,
    local_today: NaiveDate,
) -> Result<ApiRequest, RequestError> {
    let today = payload.today.unwrap_or(local_today);

    let inputs = match payload.inputs {
        Some(mut value) => {
            // Partial records start on the request's reference day, like the defaults.
            if let Some(fields) = value.as_object_mut() {
                fields
                    .entry("startDate")
                    .or_insert_with(|| Value::String(today.to_string()));
            }
            serde_json::from_value::<SimulationInput>(value)
                .map_err(|e| RequestError::InvalidInputs(e.to_string()))?
        }
        None => SimulationInput::defaults_as_of(today),
    };

    let requested = payload
        .duration_months
        .unwrap_or(i64::from(DEFAULT_DURATION_MONTHS));
    if requested > i64::from(MAX_DURATION_MONTHS) {
        return Err(RequestError::DurationTooLong {
            got: requested,
            max: MAX_DURATION_MONTHS,
        });
    }
    let duration_months = u32::try_from(requested.max(0)).unwrap_or(0);

    if payload.actuals.contains_key(&0) {
        return Err(RequestError::ActualsMonthZero);
    }

    Ok(ApiRequest {
        inputs,
        duration_months,
        actuals: payload.actuals,
        today,
    })
}

fn build_simulate_response(request: ApiRequest) -> SimulateResponse {
    let result = calculate_as_of(
        &request.inputs,
        request.duration_months,
        &request.actuals,
        request.today,
    );
    SimulateResponse {
        duration_months: request.duration_months,
        today: request.today,
        result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 20).expect("valid date")
    }

    #[test]
    fn empty_payload_uses_defaults_and_default_duration() {
        let request = api_request_from_json("{}", local_today()).expect("json should parse");
        assert_eq!(request.duration_months, DEFAULT_DURATION_MONTHS);
        assert_eq!(request.today, local_today());
        assert_eq!(request.inputs, SimulationInput::defaults_as_of(local_today()));
        assert!(request.actuals.is_empty());
    }

    #[test]
    fn api_request_from_json_parses_web_keys() {
        let json = r#"{
          "inputs": {
            "avgSaleValue": 420000,
            "taxRate": 8.5,
            "startDate": "2025-01-01",
            "expansionStartMonth": 5,
            "percRampaMes1": 40,
            "custoSetupInicial": 8000
          },
          "durationMonths": 24,
          "today": "2025-04-15",
          "actuals": {
            "1": { "salesCount": 2, "monthlyCashFlow": null },
            "2": { "actualRentalsCount": 0 }
          }
        }"#;
        let request = api_request_from_json(json, local_today()).expect("json should parse");
        let inputs = &request.inputs;

        assert_eq!(inputs.avg_sale_value, 420_000.0);
        assert_eq!(inputs.tax_rate, 8.5);
        assert_eq!(inputs.expansion_start_month, 5);
        assert_eq!(inputs.ramp_month1_percent, 40.0);
        assert_eq!(inputs.setup_cost, 8_000.0);
        assert_eq!(
            inputs.start_date,
            NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid date")
        );
        assert_eq!(inputs.slow_start_months, 3);
        assert_eq!(request.duration_months, 24);
        assert_eq!(
            request.today,
            NaiveDate::from_ymd_opt(2025, 4, 15).expect("valid date")
        );
        assert_eq!(request.actuals[&1].sales_count, Some(2.0));
        assert_eq!(request.actuals[&1].monthly_cash_flow, None);
        assert_eq!(request.actuals[&2].rentals_count, Some(0.0));
    }

    #[test]
    fn partial_inputs_start_on_request_reference_day() {
        let json = r#"{ "inputs": { "taxRate": 5 }, "today": "2024-10-03" }"#;
        let request = api_request_from_json(json, local_today()).expect("json should parse");
        assert_eq!(
            request.inputs.start_date,
            NaiveDate::from_ymd_opt(2024, 10, 3).expect("valid date")
        );
    }

    #[test]
    fn negative_duration_runs_as_empty_projection() {
        let request = api_request_from_json(r#"{ "durationMonths": -3 }"#, local_today())
            .expect("json should parse");
        assert_eq!(request.duration_months, 0);
        let response = build_simulate_response(request);
        assert!(response.result.months.is_empty());
        assert_eq!(response.result.totals.avg_break_even_point, 0.0);
    }

    #[test]
    fn rejects_duration_above_cap() {
        let err = api_request_from_json(r#"{ "durationMonths": 601 }"#, local_today())
            .expect_err("must reject long durations");
        assert_eq!(
            err,
            RequestError::DurationTooLong {
                got: 601,
                max: MAX_DURATION_MONTHS
            }
        );
    }

    #[test]
    fn rejects_month_zero_actuals() {
        let err = api_request_from_json(r#"{ "actuals": { "0": { "salesCount": 1 } } }"#, local_today())
            .expect_err("must reject month 0");
        assert_eq!(err, RequestError::ActualsMonthZero);
    }

    #[test]
    fn rejects_non_object_inputs() {
        let err = api_request_from_json(r#"{ "inputs": 12 }"#, local_today())
            .expect_err("must reject scalar inputs");
        assert!(err.to_string().contains("invalid simulation inputs"));
    }

    #[test]
    fn simulate_response_serialization_contains_expected_fields() {
        let request = api_request_from_json(r#"{ "durationMonths": 3 }"#, local_today())
            .expect("json should parse");
        let response = build_simulate_response(request);
        let json = serde_json::to_string(&response).expect("response should serialize");

        assert!(json.contains("\"durationMonths\":3"));
        assert!(json.contains("\"currentMonthIndex\""));
        assert!(json.contains("\"months\""));
        assert!(json.contains("\"totals\""));
        assert!(json.contains("\"summary\""));
        assert!(json.contains("\"accumulatedCashFlow\""));
        assert!(json.contains("\"actualSalesCount\":null"));
        assert!(json.contains("\"isViable\""));
        assert!(json.contains("\"bufferMet\""));
    }

    #[test]
    fn past_month_actuals_flow_through_the_request() {
        let json = r#"{
          "inputs": { "startDate": "2025-01-01" },
          "today": "2025-03-10",
          "durationMonths": 4,
          "actuals": { "1": { "salesCount": 7 }, "3": { "salesCount": 9 } }
        }"#;
        let request = api_request_from_json(json, local_today()).expect("json should parse");
        let response = build_simulate_response(request);
        let months = &response.result.months;

        assert_eq!(response.result.current_month_index, 3);
        assert_eq!(months[0].sales_count, 7.0);
        assert_eq!(months[0].actual_sales_count, Some(7.0));
        // month 3 is the current month, not past
        assert_eq!(months[2].sales_count, 3.0);
        assert_eq!(months[2].actual_sales_count, None);
    }
}

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::{json, Value};

use super::decision::{DecisionError, EligibilityVerdict};
use super::form::{SubmissionOutcome, SubmissionPhase};
use super::presentation::{ModelMetricsView, VerdictView};
use super::service::EligibilityService;
use crate::error::AppError;

/// Router exposing the eligibility check and the model metrics fetch.
pub fn eligibility_router(service: Arc<EligibilityService>) -> Router {
    Router::new()
        .route("/api/v1/loan/eligibility", post(submit_handler))
        .route("/api/v1/loan/models/metrics", get(metrics_handler))
        .with_state(service)
}

#[derive(Debug, Serialize)]
struct EligibilityResponse {
    received_at: DateTime<Local>,
    verdict: EligibilityVerdict,
    view: VerdictView,
}

pub(crate) async fn submit_handler(
    State(service): State<Arc<EligibilityService>>,
    Json(payload): Json<BTreeMap<String, Value>>,
) -> Response {
    let mut entries = BTreeMap::new();
    for (name, value) in payload {
        entries.insert(name, raw_input(value));
    }

    let form = match service.submit(&entries).await {
        Ok(form) => form,
        Err(unknown) => {
            let payload = json!({ "error": unknown.to_string() });
            return (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response();
        }
    };

    match form.phase() {
        SubmissionPhase::Settled(SubmissionOutcome::Verdict(verdict)) => {
            let response = EligibilityResponse {
                received_at: Local::now(),
                verdict: verdict.clone(),
                view: VerdictView::for_verdict(verdict),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        SubmissionPhase::Settled(SubmissionOutcome::ValidationFailed) => {
            let errors: BTreeMap<&str, &str> = form
                .errors()
                .iter()
                .map(|(name, error)| (*name, error.message.as_str()))
                .collect();
            let payload = json!({ "errors": errors });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        SubmissionPhase::Settled(SubmissionOutcome::DecisionFailed(error)) => {
            let status = match error {
                DecisionError::RemoteUnavailable(_) | DecisionError::InvalidResponse(_) => {
                    StatusCode::BAD_GATEWAY
                }
            };
            let payload = json!({ "error": error.to_string() });
            (status, Json(payload)).into_response()
        }
        // A fresh form settles on submit; anything else is a bug surfaced
        // plainly rather than masked.
        other => {
            let payload = json!({ "error": format!("submission did not settle: {other:?}") });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn metrics_handler(
    State(service): State<Arc<EligibilityService>>,
) -> Result<Json<ModelMetricsView>, AppError> {
    let metrics = service.model_metrics().await?;
    Ok(Json(ModelMetricsView::from_metrics(metrics)))
}

/// Accept scalar JSON values as raw input; anything non-scalar validates the
/// same as an empty entry.
fn raw_input(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

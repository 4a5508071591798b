use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use super::{DecisionError, DecisionFuture, DecisionStrategy, EligibilityVerdict};
use crate::workflows::eligibility::form::FormValues;

/// Constant applicant identifier carried in every prediction request.
pub const APPLICANT_LOAN_ID: u64 = 1;

/// Body of a prediction call: model selection plus the applicant features.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionRequest {
    pub model: String,
    pub features: Value,
}

impl PredictionRequest {
    /// Serialize form values plus the constant `loan_id` into the features
    /// object the prediction endpoint expects.
    pub fn from_values(model: &str, values: &FormValues) -> Self {
        let mut features = Map::new();
        features.insert("loan_id".to_string(), Value::from(APPLICANT_LOAN_ID));
        for (name, value) in values.iter() {
            features.insert(name.to_string(), Value::String(value.to_string()));
        }

        Self {
            model: model.to_string(),
            features: Value::Object(features),
        }
    }
}

/// The decoded slice of the prediction response; any shape beyond these two
/// fields is opaque to this service and ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PredictionResponse {
    pub loan_status: String,
    pub selected_model: String,
}

pub type TransportFuture<'a, T> =
    Pin<Box<dyn Future<Output = Result<T, DecisionError>> + Send + 'a>>;

/// Transport seam for the prediction call so tests can exercise the remote
/// strategy without a live endpoint.
pub trait PredictionTransport: Send + Sync {
    fn predict(&self, request: PredictionRequest) -> TransportFuture<'_, PredictionResponse>;
}

/// Strategy that delegates the verdict to the remote prediction service.
/// A failed call is not retried; the applicant may resubmit.
pub struct RemotePredictionStrategy<T> {
    transport: Arc<T>,
    model: String,
}

impl<T: PredictionTransport> RemotePredictionStrategy<T> {
    pub fn new(transport: Arc<T>, model: impl Into<String>) -> Self {
        Self {
            transport,
            model: model.into(),
        }
    }
}

impl<T: PredictionTransport> DecisionStrategy for RemotePredictionStrategy<T> {
    fn evaluate<'a>(&'a self, values: &'a FormValues) -> DecisionFuture<'a> {
        let request = PredictionRequest::from_values(&self.model, values);
        Box::pin(async move {
            let response = self.transport.predict(request).await?;
            debug!(
                loan_status = %response.loan_status,
                selected_model = %response.selected_model,
                "prediction service settled"
            );
            Ok(EligibilityVerdict::Remote {
                loan_status: response.loan_status,
                selected_model: response.selected_model,
            })
        })
    }

    fn name(&self) -> &'static str {
        "remote-prediction"
    }
}

/// One model's advertised accuracy, fetched independently of any submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetric {
    pub model_name: String,
    pub accuracy: f64,
}

/// Failure modes of the metrics fetch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MetricsError {
    #[error("metrics endpoint unavailable: {0}")]
    Unavailable(String),
    #[error("metrics endpoint returned an undecodable response: {0}")]
    Decode(String),
}

pub type MetricsFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Vec<ModelMetric>, MetricsError>> + Send + 'a>>;

/// On-demand source of model accuracy figures.
pub trait ModelMetricsSource: Send + Sync {
    fn model_metrics(&self) -> MetricsFuture<'_>;
}

/// Metrics source for deployments with no remote service configured; always
/// yields an empty sequence, which consumers must tolerate.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRemoteMetrics;

impl ModelMetricsSource for NoRemoteMetrics {
    fn model_metrics(&self) -> MetricsFuture<'_> {
        Box::pin(async { Ok(Vec::new()) })
    }
}

#[derive(Debug, Deserialize)]
struct MetricsEntry {
    accuracy: f64,
}

/// HTTP client for the prediction service, covering both the prediction call
/// and the metrics fetch.
#[derive(Debug, Clone)]
pub struct HttpPredictionClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpPredictionClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }
}

impl PredictionTransport for HttpPredictionClient {
    fn predict(&self, request: PredictionRequest) -> TransportFuture<'_, PredictionResponse> {
        Box::pin(async move {
            let response = self
                .http
                .post(self.endpoint("predict"))
                .json(&request)
                .send()
                .await
                .map_err(|err| DecisionError::RemoteUnavailable(err.to_string()))?
                .error_for_status()
                .map_err(|err| DecisionError::RemoteUnavailable(err.to_string()))?;

            response
                .json::<PredictionResponse>()
                .await
                .map_err(|err| DecisionError::InvalidResponse(err.to_string()))
        })
    }
}

impl ModelMetricsSource for HttpPredictionClient {
    fn model_metrics(&self) -> MetricsFuture<'_> {
        Box::pin(async move {
            let response = self
                .http
                .get(self.endpoint("metrics"))
                .send()
                .await
                .map_err(|err| MetricsError::Unavailable(err.to_string()))?
                .error_for_status()
                .map_err(|err| MetricsError::Unavailable(err.to_string()))?;

            // Ordering follows the response map's iteration order and is not
            // guaranteed stable; callers must not depend on it.
            let payload: HashMap<String, MetricsEntry> = response
                .json()
                .await
                .map_err(|err| MetricsError::Decode(err.to_string()))?;

            Ok(payload
                .into_iter()
                .map(|(model_name, entry)| ModelMetric {
                    model_name,
                    accuracy: entry.accuracy,
                })
                .collect())
        })
    }
}

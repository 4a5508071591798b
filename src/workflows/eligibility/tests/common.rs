use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::workflows::eligibility::decision::{
    DecisionError, DecisionFuture, DecisionStrategy, EligibilityVerdict, LocalDecision,
    MetricsError, MetricsFuture, ModelMetric, ModelMetricsSource, PredictionRequest,
    PredictionResponse, PredictionTransport, TransportFuture,
};
use crate::workflows::eligibility::form::{FormController, FormValues};
use crate::workflows::eligibility::schema::application_fields;
use crate::workflows::eligibility::service::EligibilityService;

/// A complete, valid application that the local rules accept.
pub(super) fn eligible_entries() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("no_of_dependents".to_string(), "2".to_string()),
        ("education".to_string(), "Graduate".to_string()),
        ("self_employed".to_string(), "No".to_string()),
        ("income_annum".to_string(), "9600000".to_string()),
        ("loan_amount".to_string(), "2000000".to_string()),
        ("loan_term".to_string(), "10".to_string()),
        ("cibil_score".to_string(), "780".to_string()),
        ("residential_assets_value".to_string(), "2400000".to_string()),
        ("commercial_assets_value".to_string(), "1200000".to_string()),
        ("luxury_assets_value".to_string(), "800000".to_string()),
        ("bank_asset_value".to_string(), "500000".to_string()),
    ])
}

/// Values with the four decision inputs set and everything else valid.
pub(super) fn decision_values(
    cibil: &str,
    income: &str,
    loan: &str,
    term: &str,
) -> FormValues {
    let mut values = FormValues::empty(application_fields());
    for (name, value) in eligible_entries() {
        if let Some(descriptor) = crate::workflows::eligibility::schema::field_descriptor(&name) {
            values.set(descriptor.name, value);
        }
    }
    values.set("cibil_score", cibil.to_string());
    values.set("income_annum", income.to_string());
    values.set("loan_amount", loan.to_string());
    values.set("loan_term", term.to_string());
    values
}

pub(super) fn controller_with(strategy: Arc<dyn DecisionStrategy>) -> FormController {
    FormController::new(application_fields(), strategy)
}

pub(super) fn fill(form: &mut FormController, entries: &BTreeMap<String, String>) {
    for (name, value) in entries {
        form.on_field_change(name, value.clone())
            .expect("entry names match the schema");
    }
}

pub(super) fn local_service() -> EligibilityService {
    EligibilityService::new(
        Arc::new(crate::workflows::eligibility::decision::LocalRuleStrategy),
        Arc::new(crate::workflows::eligibility::decision::NoRemoteMetrics),
    )
}

/// Strategy returning a fixed verdict while counting invocations.
pub(super) struct StaticStrategy {
    pub(super) verdict: EligibilityVerdict,
    pub(super) calls: AtomicUsize,
}

impl StaticStrategy {
    pub(super) fn eligible() -> Self {
        Self {
            verdict: EligibilityVerdict::Local {
                decision: LocalDecision::Eligible,
            },
            calls: AtomicUsize::new(0),
        }
    }

    pub(super) fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DecisionStrategy for StaticStrategy {
    fn evaluate<'a>(&'a self, _values: &'a FormValues) -> DecisionFuture<'a> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let verdict = self.verdict.clone();
        Box::pin(async move { Ok(verdict) })
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

/// Strategy that always fails with the given error.
pub(super) struct FailingStrategy(pub(super) DecisionError);

impl DecisionStrategy for FailingStrategy {
    fn evaluate<'a>(&'a self, _values: &'a FormValues) -> DecisionFuture<'a> {
        let error = self.0.clone();
        Box::pin(async move { Err(error) })
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

/// Fails the first call with a transport error, then succeeds, so tests can
/// drive the settle-and-resubmit path.
pub(super) struct FlakyStrategy {
    failed: AtomicBool,
}

impl FlakyStrategy {
    pub(super) fn new() -> Self {
        Self {
            failed: AtomicBool::new(false),
        }
    }
}

impl DecisionStrategy for FlakyStrategy {
    fn evaluate<'a>(&'a self, _values: &'a FormValues) -> DecisionFuture<'a> {
        let first = !self.failed.swap(true, Ordering::SeqCst);
        Box::pin(async move {
            if first {
                Err(DecisionError::RemoteUnavailable(
                    "connection refused".to_string(),
                ))
            } else {
                Ok(EligibilityVerdict::Local {
                    decision: LocalDecision::Eligible,
                })
            }
        })
    }

    fn name(&self) -> &'static str {
        "flaky"
    }
}

/// Transport returning a fixed response and capturing the last request.
pub(super) struct StaticTransport {
    pub(super) response: PredictionResponse,
    pub(super) requests: Mutex<Vec<PredictionRequest>>,
}

impl StaticTransport {
    pub(super) fn approving() -> Self {
        Self {
            response: PredictionResponse {
                loan_status: "Approved".to_string(),
                selected_model: "xgboost".to_string(),
            },
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn last_request(&self) -> Option<PredictionRequest> {
        self.requests
            .lock()
            .expect("transport mutex poisoned")
            .last()
            .cloned()
    }
}

impl PredictionTransport for StaticTransport {
    fn predict(&self, request: PredictionRequest) -> TransportFuture<'_, PredictionResponse> {
        self.requests
            .lock()
            .expect("transport mutex poisoned")
            .push(request);
        let response = self.response.clone();
        Box::pin(async move { Ok(response) })
    }
}

/// Transport that simulates a connection failure.
pub(super) struct FailingTransport;

impl PredictionTransport for FailingTransport {
    fn predict(&self, _request: PredictionRequest) -> TransportFuture<'_, PredictionResponse> {
        Box::pin(async {
            Err(DecisionError::RemoteUnavailable(
                "connection reset by peer".to_string(),
            ))
        })
    }
}

/// Metrics source returning a fixed listing.
pub(super) struct StaticMetrics(pub(super) Vec<ModelMetric>);

impl ModelMetricsSource for StaticMetrics {
    fn model_metrics(&self) -> MetricsFuture<'_> {
        let metrics = self.0.clone();
        Box::pin(async move { Ok(metrics) })
    }
}

/// Metrics source that simulates an unreachable endpoint.
pub(super) struct FailingMetrics;

impl ModelMetricsSource for FailingMetrics {
    fn model_metrics(&self) -> MetricsFuture<'_> {
        Box::pin(async {
            Err(MetricsError::Unavailable(
                "connection refused".to_string(),
            ))
        })
    }
}

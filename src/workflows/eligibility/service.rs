use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::info;

use super::decision::{DecisionStrategy, MetricsError, ModelMetric, ModelMetricsSource};
use super::form::{FormController, UnknownField};
use super::schema::application_fields;

/// Service composing the application schema, the configured decision
/// strategy, and the metrics source.
pub struct EligibilityService {
    strategy: Arc<dyn DecisionStrategy>,
    metrics: Arc<dyn ModelMetricsSource>,
}

impl EligibilityService {
    pub fn new(strategy: Arc<dyn DecisionStrategy>, metrics: Arc<dyn ModelMetricsSource>) -> Self {
        info!(strategy = strategy.name(), "eligibility service configured");
        Self { strategy, metrics }
    }

    /// Fresh form controller bound to the configured strategy.
    pub fn new_form(&self) -> FormController {
        FormController::new(application_fields(), Arc::clone(&self.strategy))
    }

    /// Run one submission end to end: apply the entries as user edits, then
    /// submit. Fields absent from `entries` stay empty and fail validation as
    /// `Required`. The settled controller is returned so callers can inspect
    /// the phase, errors, and verdict.
    pub async fn submit(
        &self,
        entries: &BTreeMap<String, String>,
    ) -> Result<FormController, UnknownField> {
        let mut form = self.new_form();
        for (name, value) in entries {
            form.on_field_change(name, value.clone())?;
        }
        form.submit().await;
        Ok(form)
    }

    /// Fetch the model accuracy listing; independent of any submission.
    pub async fn model_metrics(&self) -> Result<Vec<ModelMetric>, MetricsError> {
        self.metrics.model_metrics().await
    }
}

//! Schema-driven loan application intake and eligibility workflow.
//!
//! One declarative field schema drives rendering metadata and validation-rule
//! derivation; the form controller owns the submission lifecycle and hands
//! validated values to the configured decision strategy.

pub mod decision;
mod form;
pub mod presentation;
pub mod router;
mod schema;
pub mod service;
mod validation;

#[cfg(test)]
mod tests;

pub use decision::{
    DecisionError, DecisionStrategy, EligibilityVerdict, HttpPredictionClient, LocalDecision,
    LocalRuleStrategy, MetricsError, MetricsFuture, ModelMetric, ModelMetricsSource,
    NoRemoteMetrics, PredictionRequest, PredictionResponse, PredictionTransport,
    RemotePredictionStrategy, TransportFuture,
};
pub use form::{
    FieldView, FormController, FormValues, FormView, SubmissionOutcome, SubmissionPhase,
    UnknownField,
};
pub use presentation::{ModelMetricsView, VerdictTone, VerdictView};
pub use router::eligibility_router;
pub use schema::{application_fields, field_descriptor, Bounds, FieldDescriptor, FieldKind};
pub use service::EligibilityService;
pub use validation::{FieldError, FieldRule, RuleSet, ValidationErrors, ValidationFailure};

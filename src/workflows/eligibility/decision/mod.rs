//! Eligibility decision strategies.
//!
//! One [`DecisionStrategy`] is active per deployment, chosen at construction
//! time: the local deterministic rule set or the remote prediction service.
//! The engine never falls back from one strategy to the other.

mod local;
mod remote;

pub use local::LocalRuleStrategy;
pub use remote::{
    HttpPredictionClient, MetricsError, MetricsFuture, ModelMetric, ModelMetricsSource,
    NoRemoteMetrics, PredictionRequest, PredictionResponse, PredictionTransport,
    RemotePredictionStrategy, TransportFuture, APPLICANT_LOAN_ID,
};

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use super::form::FormValues;

/// Outcome of one submission attempt. Created fresh per submission and
/// superseded, never merged, by the next submission's result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum EligibilityVerdict {
    Local { decision: LocalDecision },
    Remote {
        loan_status: String,
        selected_model: String,
    },
}

/// Verdict of the local rule evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocalDecision {
    Eligible,
    NotEligible,
}

impl LocalDecision {
    pub const fn label(self) -> &'static str {
        match self {
            LocalDecision::Eligible => "Eligible for Loan",
            LocalDecision::NotEligible => "Not Eligible for Loan",
        }
    }
}

/// Failure modes shared by every strategy. Both are recoverable: the form
/// returns to an editable state and the applicant may resubmit.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecisionError {
    #[error("prediction service unavailable: {0}")]
    RemoteUnavailable(String),
    #[error("prediction service returned an undecodable response: {0}")]
    InvalidResponse(String),
}

pub type DecisionFuture<'a> =
    Pin<Box<dyn Future<Output = Result<EligibilityVerdict, DecisionError>> + Send + 'a>>;

/// Capability invoked by the form controller with a snapshot of validated
/// values. Implementations must not retry on failure; a failed call surfaces
/// immediately as a failed submission.
pub trait DecisionStrategy: Send + Sync {
    fn evaluate<'a>(&'a self, values: &'a FormValues) -> DecisionFuture<'a>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

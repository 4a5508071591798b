use serde::Serialize;

use super::decision::{EligibilityVerdict, LocalDecision, ModelMetric};

/// Whether the outcome renders as a positive or negative result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictTone {
    Positive,
    Negative,
}

/// Display-ready mapping of an [`EligibilityVerdict`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerdictView {
    pub headline: String,
    pub tone: VerdictTone,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl VerdictView {
    pub fn for_verdict(verdict: &EligibilityVerdict) -> Self {
        match verdict {
            EligibilityVerdict::Local { decision } => Self {
                headline: decision.label().to_string(),
                tone: match decision {
                    LocalDecision::Eligible => VerdictTone::Positive,
                    LocalDecision::NotEligible => VerdictTone::Negative,
                },
                detail: None,
            },
            EligibilityVerdict::Remote {
                loan_status,
                selected_model,
            } => {
                let lowered = loan_status.to_ascii_lowercase();
                // Negative markers win: "not eligible" contains "eligible".
                let negative = lowered.contains("not eligible")
                    || lowered.contains("not approve")
                    || lowered.contains("reject")
                    || lowered.contains("declin");
                let positive = !negative
                    && (lowered.contains("approve") || lowered.contains("eligible"));
                Self {
                    headline: loan_status.clone(),
                    tone: if positive {
                        VerdictTone::Positive
                    } else {
                        VerdictTone::Negative
                    },
                    detail: Some(format!("Decided by model '{selected_model}'.")),
                }
            }
        }
    }
}

/// Display-ready model accuracy listing. Shares the screen with the verdict
/// but has no relationship to it; an empty listing renders as such.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelMetricsView {
    pub models: Vec<ModelMetric>,
}

impl ModelMetricsView {
    pub fn from_metrics(models: Vec<ModelMetric>) -> Self {
        Self { models }
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

use super::{DecisionFuture, DecisionStrategy, EligibilityVerdict, LocalDecision};
use crate::workflows::eligibility::form::FormValues;

/// CIBIL score floor for an eligible application.
pub const MINIMUM_CIBIL_SCORE: f64 = 750.0;
/// The requested loan must stay strictly below this multiple of annual income.
pub const INCOME_MULTIPLE_CAP: f64 = 5.0;
/// Inclusive loan term window, in years.
pub const MINIMUM_TERM_YEARS: f64 = 2.0;
pub const MAXIMUM_TERM_YEARS: f64 = 20.0;

/// Pure, deterministic rule evaluation with no I/O.
///
/// All four clauses must hold for eligibility; this combination is a business
/// rule, not incidental. Unparseable inputs compare as NaN and therefore fail
/// every clause, yielding `NotEligible`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalRuleStrategy;

impl LocalRuleStrategy {
    pub fn decide(values: &FormValues) -> LocalDecision {
        let income = values.number("income_annum").unwrap_or(f64::NAN);
        let loan = values.number("loan_amount").unwrap_or(f64::NAN);
        let cibil = values.number("cibil_score").unwrap_or(f64::NAN);
        let term = values.number("loan_term").unwrap_or(f64::NAN);

        let eligible = cibil >= MINIMUM_CIBIL_SCORE
            && loan < income * INCOME_MULTIPLE_CAP
            && term >= MINIMUM_TERM_YEARS
            && term <= MAXIMUM_TERM_YEARS;

        if eligible {
            LocalDecision::Eligible
        } else {
            LocalDecision::NotEligible
        }
    }
}

impl DecisionStrategy for LocalRuleStrategy {
    fn evaluate<'a>(&'a self, values: &'a FormValues) -> DecisionFuture<'a> {
        let decision = Self::decide(values);
        Box::pin(async move { Ok(EligibilityVerdict::Local { decision }) })
    }

    fn name(&self) -> &'static str {
        "local-rules"
    }
}

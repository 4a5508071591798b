use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use super::decision::{DecisionError, DecisionStrategy, EligibilityVerdict};
use super::schema::FieldDescriptor;
use super::validation::{RuleSet, ValidationErrors};

/// Raised when input arrives for a field the schema does not declare.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown field '{0}'")]
pub struct UnknownField(pub String);

/// Raw input keyed by field name. The key set is always exactly the schema's
/// field set: every field is present from construction (possibly empty) and
/// no key can be added or removed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormValues {
    entries: BTreeMap<&'static str, String>,
}

impl FormValues {
    /// One empty entry per schema field.
    pub fn empty(schema: &'static [FieldDescriptor]) -> Self {
        let entries = schema
            .iter()
            .map(|descriptor| (descriptor.name, String::new()))
            .collect();
        Self { entries }
    }

    pub fn get(&self, name: &str) -> &str {
        self.entries.get(name).map(String::as_str).unwrap_or("")
    }

    pub(crate) fn set(&mut self, name: &'static str, value: String) {
        self.entries.insert(name, value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.entries.iter().map(|(name, value)| (*name, value.as_str()))
    }

    /// Parse a field as a real number, if it is one.
    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).trim().parse().ok()
    }
}

/// Lifecycle of one submission attempt. `Validating` and `Submitting` are
/// transient; `Settled` is the terminal state of the attempt and the machine
/// is re-entrant from it.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionPhase {
    Idle,
    Validating,
    Submitting,
    Settled(SubmissionOutcome),
}

/// How a submission attempt settled.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    Verdict(EligibilityVerdict),
    ValidationFailed,
    DecisionFailed(DecisionError),
}

/// Owns the form lifecycle: current values, touched set, error map, and the
/// submission phase. All mutation happens through its methods.
pub struct FormController {
    schema: &'static [FieldDescriptor],
    rules: RuleSet,
    strategy: Arc<dyn DecisionStrategy>,
    pub(crate) values: FormValues,
    pub(crate) touched: BTreeSet<&'static str>,
    pub(crate) errors: ValidationErrors,
    pub(crate) phase: SubmissionPhase,
}

impl FormController {
    pub fn new(schema: &'static [FieldDescriptor], strategy: Arc<dyn DecisionStrategy>) -> Self {
        Self {
            schema,
            rules: RuleSet::for_schema(schema),
            strategy,
            values: FormValues::empty(schema),
            touched: BTreeSet::new(),
            errors: ValidationErrors::new(),
            phase: SubmissionPhase::Idle,
        }
    }

    /// Record a user edit: update the value, mark the field touched, and
    /// revalidate that field. A full pass still runs on submit, so the error
    /// map converges to the same set either way.
    pub fn on_field_change(
        &mut self,
        name: &str,
        value: impl Into<String>,
    ) -> Result<(), UnknownField> {
        let descriptor = self
            .schema
            .iter()
            .find(|descriptor| descriptor.name == name)
            .ok_or_else(|| UnknownField(name.to_string()))?;

        self.values.set(descriptor.name, value.into());
        self.touched.insert(descriptor.name);

        let rule = self
            .rules
            .rule(descriptor.name)
            .ok_or_else(|| UnknownField(name.to_string()))?;
        match rule.evaluate(self.values.get(descriptor.name)) {
            Some(error) => {
                self.errors.insert(descriptor.name, error);
            }
            None => {
                self.errors.remove(descriptor.name);
            }
        }

        Ok(())
    }

    /// Run one submission attempt to settlement.
    ///
    /// A full validation pass runs first; any failure settles the attempt
    /// without invoking the decision strategy and marks every field touched
    /// so all errors become visible. While a previous attempt is still
    /// submitting, the request is ignored.
    pub async fn submit(&mut self) -> &SubmissionPhase {
        if matches!(self.phase, SubmissionPhase::Submitting) {
            debug!("submission already in flight, ignoring submit request");
            return &self.phase;
        }

        self.phase = SubmissionPhase::Validating;
        self.errors = self.rules.validate(&self.values);
        if !self.errors.is_empty() {
            for descriptor in self.schema {
                self.touched.insert(descriptor.name);
            }
            self.phase = SubmissionPhase::Settled(SubmissionOutcome::ValidationFailed);
            return &self.phase;
        }

        self.phase = SubmissionPhase::Submitting;
        let snapshot = self.values.clone();
        let strategy = Arc::clone(&self.strategy);
        let result = strategy.evaluate(&snapshot).await;

        self.phase = match result {
            Ok(verdict) => SubmissionPhase::Settled(SubmissionOutcome::Verdict(verdict)),
            Err(error) => {
                debug!(strategy = strategy.name(), %error, "decision strategy failed");
                SubmissionPhase::Settled(SubmissionOutcome::DecisionFailed(error))
            }
        };
        &self.phase
    }

    pub fn phase(&self) -> &SubmissionPhase {
        &self.phase
    }

    /// True while a submission is in flight; gates the submit affordance.
    pub fn is_submitting(&self) -> bool {
        matches!(self.phase, SubmissionPhase::Submitting)
    }

    /// The verdict of the latest settled submission, if it produced one.
    pub fn latest_verdict(&self) -> Option<&EligibilityVerdict> {
        match &self.phase {
            SubmissionPhase::Settled(SubmissionOutcome::Verdict(verdict)) => Some(verdict),
            _ => None,
        }
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    /// Current error map, regardless of touched state.
    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Error messages gated by the touched set. Validation itself always runs
    /// against every field; only visibility is gated here.
    pub fn visible_errors(&self) -> BTreeMap<&'static str, &str> {
        self.errors
            .iter()
            .filter(|(name, _)| self.touched.contains(*name))
            .map(|(name, error)| (*name, error.message.as_str()))
            .collect()
    }

    /// Display-ready snapshot of the whole form.
    pub fn view(&self) -> FormView {
        let fields = self
            .schema
            .iter()
            .map(|descriptor| FieldView {
                name: descriptor.name,
                label: descriptor.label,
                options: descriptor.kind.options(),
                value: self.values.get(descriptor.name).to_string(),
                error: self
                    .touched
                    .contains(descriptor.name)
                    .then(|| self.errors.get(descriptor.name))
                    .flatten()
                    .map(|error| error.message.clone()),
            })
            .collect();

        FormView {
            fields,
            submitting: self.is_submitting(),
        }
    }
}

/// Render contract for one field: identity, shape metadata, current value,
/// and the error message when the field is both touched and invalid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldView {
    pub name: &'static str,
    pub label: &'static str,
    pub options: &'static [&'static str],
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Render contract for the form as a whole.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormView {
    pub fields: Vec<FieldView>,
    pub submitting: bool,
}

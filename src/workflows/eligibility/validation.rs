use std::collections::BTreeMap;

use serde::Serialize;

use super::form::FormValues;
use super::schema::{Bounds, FieldDescriptor, FieldKind};

/// Ways a single field can fail validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ValidationFailure {
    Required,
    NotNumeric,
    BelowMinimum { min: f64 },
    AboveMaximum { max: f64 },
    InvalidOption { value: String },
}

/// A failure paired with its display message, keyed by field in
/// [`ValidationErrors`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub failure: ValidationFailure,
    pub message: String,
}

/// Wholesale validation result: absence of an entry means the field is valid.
/// The key set is always a subset of the schema's field names.
pub type ValidationErrors = BTreeMap<&'static str, FieldError>;

/// Validation rule for one field, derived entirely from its descriptor so the
/// schema and the rules cannot drift apart.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    descriptor: &'static FieldDescriptor,
}

impl FieldRule {
    pub fn for_descriptor(descriptor: &'static FieldDescriptor) -> Self {
        Self { descriptor }
    }

    pub fn field_name(&self) -> &'static str {
        self.descriptor.name
    }

    /// Apply the rule to a raw input. `None` means the value is valid.
    pub fn check(&self, raw: &str) -> Option<ValidationFailure> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Some(ValidationFailure::Required);
        }

        match self.descriptor.kind {
            FieldKind::Number { bounds } => {
                let value: f64 = match trimmed.parse() {
                    Ok(value) => value,
                    Err(_) => return Some(ValidationFailure::NotNumeric),
                };
                // "NaN"/"inf" parse successfully but are not real amounts,
                // and NaN would slip past both bound comparisons below.
                if !value.is_finite() {
                    return Some(ValidationFailure::NotNumeric);
                }
                let bounds = bounds.unwrap_or(Bounds::NON_NEGATIVE);
                if value < bounds.min {
                    return Some(ValidationFailure::BelowMinimum { min: bounds.min });
                }
                if let Some(max) = bounds.max {
                    if value > max {
                        return Some(ValidationFailure::AboveMaximum { max });
                    }
                }
                None
            }
            // Defensive: a rendered select/radio only ever submits one of its
            // options, but the rule still rejects anything else.
            FieldKind::Select { options } | FieldKind::Radio { options } => {
                if options.contains(&trimmed) {
                    None
                } else {
                    Some(ValidationFailure::InvalidOption {
                        value: trimmed.to_string(),
                    })
                }
            }
            FieldKind::Text => None,
        }
    }

    /// Run the rule and attach the display message on failure.
    pub fn evaluate(&self, raw: &str) -> Option<FieldError> {
        self.check(raw).map(|failure| {
            let message = self.message(&failure);
            FieldError { failure, message }
        })
    }

    /// Human-readable message derived from the field label.
    pub fn message(&self, failure: &ValidationFailure) -> String {
        let subject = self.subject();
        match failure {
            ValidationFailure::Required => match self.descriptor.kind {
                FieldKind::Select { .. } | FieldKind::Radio { .. } => {
                    format!("Please select {subject}.")
                }
                FieldKind::Number { .. } | FieldKind::Text => {
                    format!("Please provide {subject}.")
                }
            },
            ValidationFailure::NotNumeric => {
                format!("{} must be a number.", capitalize(&subject))
            }
            ValidationFailure::BelowMinimum { min } if *min == 0.0 => {
                format!("{} cannot be negative.", capitalize(&subject))
            }
            ValidationFailure::BelowMinimum { min } => {
                format!("{} must be at least {}.", capitalize(&subject), bound(*min))
            }
            ValidationFailure::AboveMaximum { max } => {
                format!("{} cannot exceed {}.", capitalize(&subject), bound(*max))
            }
            ValidationFailure::InvalidOption { value } => {
                format!("'{value}' is not a valid choice for {subject}.")
            }
        }
    }

    /// Label stripped of its parenthesised hint, lowered for prose.
    fn subject(&self) -> String {
        let label = self.descriptor.label;
        let base = label.split('(').next().unwrap_or(label).trim();
        base.to_ascii_lowercase()
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn bound(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Per-field rules derived from a schema.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<FieldRule>,
}

impl RuleSet {
    pub fn for_schema(schema: &'static [FieldDescriptor]) -> Self {
        let rules = schema.iter().map(FieldRule::for_descriptor).collect();
        Self { rules }
    }

    pub fn rule(&self, name: &str) -> Option<&FieldRule> {
        self.rules.iter().find(|rule| rule.field_name() == name)
    }

    /// Recompute the full error map against every field's current value.
    pub fn validate(&self, values: &FormValues) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        for rule in &self.rules {
            if let Some(error) = rule.evaluate(values.get(rule.field_name())) {
                errors.insert(rule.field_name(), error);
            }
        }
        errors
    }
}

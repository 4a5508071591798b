use serde::Serialize;

/// Inclusive numeric bounds attached to a number field.
///
/// A missing `max` means the field is only bounded from below (monetary
/// amounts, dependent counts).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub min: f64,
    pub max: Option<f64>,
}

impl Bounds {
    /// Default rule applied to number fields that declare no explicit bounds.
    pub const NON_NEGATIVE: Bounds = Bounds {
        min: 0.0,
        max: None,
    };

    pub const fn at_least(min: f64) -> Self {
        Self { min, max: None }
    }

    pub const fn between(min: f64, max: f64) -> Self {
        Self {
            min,
            max: Some(max),
        }
    }
}

/// Shape of a single form input. Validation and rendering both dispatch on
/// this variant exhaustively, so an unhandled kind cannot fall through to a
/// default branch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    Number { bounds: Option<Bounds> },
    Select { options: &'static [&'static str] },
    Radio { options: &'static [&'static str] },
    Text,
}

impl FieldKind {
    /// Enumerated options for select/radio kinds, empty otherwise.
    pub fn options(&self) -> &'static [&'static str] {
        match self {
            FieldKind::Select { options } | FieldKind::Radio { options } => options,
            FieldKind::Number { .. } | FieldKind::Text => &[],
        }
    }
}

/// Schema entry describing one form input's identity, shape, and constraints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub label: &'static str,
    #[serde(flatten)]
    pub kind: FieldKind,
}

/// The loan application schema. Defined once, never mutated; every other
/// component derives "what fields exist" from this list, so adding a field
/// here is sufficient to get rendering metadata and validation for it.
pub const APPLICATION_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor {
        name: "no_of_dependents",
        label: "NO OF DEPENDENTS",
        kind: FieldKind::Number { bounds: None },
    },
    FieldDescriptor {
        name: "education",
        label: "EDUCATION",
        kind: FieldKind::Select {
            options: &["Graduate", "Non-Graduate"],
        },
    },
    FieldDescriptor {
        name: "self_employed",
        label: "SELF EMPLOYED",
        kind: FieldKind::Radio {
            options: &["Yes", "No"],
        },
    },
    FieldDescriptor {
        name: "income_annum",
        label: "INCOME (ANNUAL)",
        kind: FieldKind::Number {
            bounds: Some(Bounds::at_least(1.0)),
        },
    },
    FieldDescriptor {
        name: "loan_amount",
        label: "LOAN AMOUNT",
        kind: FieldKind::Number {
            bounds: Some(Bounds::at_least(1.0)),
        },
    },
    FieldDescriptor {
        name: "loan_term",
        label: "LOAN TERM (2-20 YEARS)",
        kind: FieldKind::Number {
            bounds: Some(Bounds::between(2.0, 20.0)),
        },
    },
    FieldDescriptor {
        name: "cibil_score",
        label: "CIBIL SCORE (300-900)",
        kind: FieldKind::Number {
            bounds: Some(Bounds::between(300.0, 900.0)),
        },
    },
    FieldDescriptor {
        name: "residential_assets_value",
        label: "RESIDENTIAL ASSETS VALUE",
        kind: FieldKind::Number { bounds: None },
    },
    FieldDescriptor {
        name: "commercial_assets_value",
        label: "COMMERCIAL ASSETS VALUE",
        kind: FieldKind::Number { bounds: None },
    },
    FieldDescriptor {
        name: "luxury_assets_value",
        label: "LUXURY ASSETS VALUE",
        kind: FieldKind::Number { bounds: None },
    },
    FieldDescriptor {
        name: "bank_asset_value",
        label: "BANK ASSET VALUE",
        kind: FieldKind::Number { bounds: None },
    },
];

/// Ordered application schema used by the workflow.
pub fn application_fields() -> &'static [FieldDescriptor] {
    APPLICATION_FIELDS
}

/// Look up a descriptor by field name.
pub fn field_descriptor(name: &str) -> Option<&'static FieldDescriptor> {
    APPLICATION_FIELDS
        .iter()
        .find(|descriptor| descriptor.name == name)
}

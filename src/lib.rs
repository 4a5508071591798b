//! Loan eligibility service: schema-driven application validation with local
//! or remote decisioning.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;

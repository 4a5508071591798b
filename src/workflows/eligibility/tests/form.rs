use super::common::*;
use crate::workflows::eligibility::decision::{
    DecisionError, EligibilityVerdict, LocalDecision,
};
use crate::workflows::eligibility::form::{SubmissionOutcome, SubmissionPhase};
use crate::workflows::eligibility::schema::application_fields;
use std::sync::Arc;

#[tokio::test]
async fn change_marks_touched_and_surfaces_only_that_error() {
    let strategy = Arc::new(StaticStrategy::eligible());
    let mut form = controller_with(strategy);

    form.on_field_change("cibil_score", "150")
        .expect("known field");

    let visible = form.visible_errors();
    assert_eq!(visible.len(), 1);
    assert!(visible.contains_key("cibil_score"));
    // Untouched fields are invalid too, but their errors stay hidden.
    assert!(form.errors().len() <= 1, "change revalidates one field only");
}

#[tokio::test]
async fn correcting_a_field_clears_its_error() {
    let strategy = Arc::new(StaticStrategy::eligible());
    let mut form = controller_with(strategy);

    form.on_field_change("cibil_score", "150")
        .expect("known field");
    assert!(!form.visible_errors().is_empty());

    form.on_field_change("cibil_score", "780")
        .expect("known field");
    assert!(form.visible_errors().is_empty());
}

#[tokio::test]
async fn unknown_field_is_rejected() {
    let strategy = Arc::new(StaticStrategy::eligible());
    let mut form = controller_with(strategy);

    let err = form
        .on_field_change("fico_score", "780")
        .expect_err("field is not in the schema");
    assert_eq!(err.0, "fico_score");
}

#[tokio::test]
async fn submit_blocks_on_validation_and_skips_the_strategy() {
    let strategy = Arc::new(StaticStrategy::eligible());
    let mut form = controller_with(strategy.clone());

    let phase = form.submit().await.clone();

    assert_eq!(
        phase,
        SubmissionPhase::Settled(SubmissionOutcome::ValidationFailed)
    );
    assert_eq!(strategy.call_count(), 0);
    // Failure marks every field touched so all errors become visible.
    assert_eq!(form.visible_errors().len(), application_fields().len());
    assert!(form.latest_verdict().is_none());
}

#[tokio::test]
async fn valid_submission_settles_with_the_strategy_verdict() {
    let strategy = Arc::new(StaticStrategy::eligible());
    let mut form = controller_with(strategy.clone());
    fill(&mut form, &eligible_entries());

    form.submit().await;

    assert_eq!(strategy.call_count(), 1);
    assert_eq!(
        form.latest_verdict(),
        Some(&EligibilityVerdict::Local {
            decision: LocalDecision::Eligible
        })
    );
    assert!(!form.is_submitting());
}

#[tokio::test]
async fn strategy_failure_keeps_values_and_allows_resubmission() {
    let strategy = Arc::new(FlakyStrategy::new());
    let mut form = controller_with(strategy);
    fill(&mut form, &eligible_entries());
    let before = form.values().clone();

    let phase = form.submit().await.clone();

    match phase {
        SubmissionPhase::Settled(SubmissionOutcome::DecisionFailed(
            DecisionError::RemoteUnavailable(_),
        )) => {}
        other => panic!("expected a remote failure, got {other:?}"),
    }
    assert_eq!(form.values(), &before, "failure retains no partial state");
    assert!(form.latest_verdict().is_none());
    assert!(form.errors().is_empty(), "values are still valid");

    // The machine is re-entrant from Settled; the retry succeeds.
    form.submit().await;
    assert!(form.latest_verdict().is_some());
}

#[tokio::test]
async fn submit_is_ignored_while_a_submission_is_in_flight() {
    let strategy = Arc::new(StaticStrategy::eligible());
    let mut form = controller_with(strategy.clone());
    fill(&mut form, &eligible_entries());

    form.phase = SubmissionPhase::Submitting;
    let phase = form.submit().await.clone();

    assert_eq!(phase, SubmissionPhase::Submitting);
    assert_eq!(strategy.call_count(), 0);
    assert!(form.is_submitting());
}

#[tokio::test]
async fn a_new_submission_supersedes_the_previous_verdict() {
    let strategy = Arc::new(StaticStrategy::eligible());
    let mut form = controller_with(strategy);
    fill(&mut form, &eligible_entries());

    form.submit().await;
    assert!(form.latest_verdict().is_some());

    form.on_field_change("cibil_score", "")
        .expect("known field");
    form.submit().await;

    assert_eq!(
        form.phase(),
        &SubmissionPhase::Settled(SubmissionOutcome::ValidationFailed)
    );
    assert!(form.latest_verdict().is_none(), "verdict is superseded");
}

#[tokio::test]
async fn view_mirrors_the_schema_order_and_gates_errors() {
    let strategy = Arc::new(StaticStrategy::eligible());
    let mut form = controller_with(strategy);
    form.on_field_change("loan_term", "25").expect("known field");

    let view = form.view();

    assert_eq!(view.fields.len(), application_fields().len());
    assert!(!view.submitting);
    for (field, descriptor) in view.fields.iter().zip(application_fields()) {
        assert_eq!(field.name, descriptor.name);
        assert_eq!(field.label, descriptor.label);
    }

    let term = view
        .fields
        .iter()
        .find(|field| field.name == "loan_term")
        .expect("term field rendered");
    assert_eq!(term.value, "25");
    assert!(term.error.is_some(), "touched invalid field shows its error");

    let cibil = view
        .fields
        .iter()
        .find(|field| field.name == "cibil_score")
        .expect("cibil field rendered");
    assert!(cibil.error.is_none(), "untouched field hides its error");
}

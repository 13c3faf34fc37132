//! Unit tests for checklist item intent resolution and outcome status.

use hermes_checklist::models::checklist::{
    ChecklistFinished, ChecklistItem, FinishStatus, ItemAnswer, StartChecklist,
};
use hermes_checklist::AppError;

fn request_with_defaults(items: Vec<ChecklistItem>) -> StartChecklist {
    StartChecklist {
        id: "c1".into(),
        items,
        end_text: String::new(),
        confirm_intent: Some("Yes".into()),
        disconfirm_intent: Some("No".into()),
        cancel_intent: Some("Cancel".into()),
        site_id: "kitchen".into(),
    }
}

#[test]
fn missing_item_intents_fall_back_to_defaults() {
    let req = request_with_defaults(vec![ChecklistItem::new("a", "milk?")]);

    let resolved = ChecklistItem::new("a", "milk?").with_defaults(&req);

    assert_eq!(resolved.confirm_intent.as_deref(), Some("Yes"));
    assert_eq!(resolved.disconfirm_intent.as_deref(), Some("No"));
    assert_eq!(resolved.cancel_intent.as_deref(), Some("Cancel"));
}

#[test]
fn item_intent_wins_over_default() {
    let req = request_with_defaults(Vec::new());
    let mut item = ChecklistItem::new("a", "milk?");
    item.disconfirm_intent = Some("Nope".into());

    let resolved = item.with_defaults(&req);

    assert_eq!(resolved.confirm_intent.as_deref(), Some("Yes"));
    assert_eq!(resolved.disconfirm_intent.as_deref(), Some("Nope"));
}

#[test]
fn empty_item_intent_counts_as_missing() {
    let req = request_with_defaults(Vec::new());
    let mut item = ChecklistItem::new("a", "milk?");
    item.confirm_intent = Some(String::new());

    assert_eq!(
        item.with_defaults(&req).confirm_intent.as_deref(),
        Some("Yes")
    );
}

#[test]
fn intent_filter_keeps_confirm_disconfirm_cancel_order() {
    let mut item = ChecklistItem::new("a", "milk?");
    item.cancel_intent = Some("Stop".into());
    item.confirm_intent = Some("Sure".into());

    assert_eq!(item.intent_filter(), ["Sure", "Stop"]);
}

#[test]
fn intent_filter_skips_empty_names() {
    let mut item = ChecklistItem::new("a", "milk?");
    item.confirm_intent = Some(String::new());
    item.disconfirm_intent = Some("No".into());

    assert_eq!(item.intent_filter(), ["No"]);
}

#[test]
fn cancel_takes_precedence_over_confirm() {
    let mut item = ChecklistItem::new("a", "milk?");
    item.confirm_intent = Some("Stop".into());
    item.disconfirm_intent = Some("Stop".into());
    item.cancel_intent = Some("Stop".into());

    assert_eq!(item.answer_for("Stop"), Some(ItemAnswer::Cancel));
}

#[test]
fn confirm_takes_precedence_over_disconfirm() {
    let mut item = ChecklistItem::new("a", "milk?");
    item.confirm_intent = Some("Maybe".into());
    item.disconfirm_intent = Some("Maybe".into());

    assert_eq!(item.answer_for("Maybe"), Some(ItemAnswer::Confirm));
}

#[test]
fn unrelated_intent_answers_nothing() {
    let req = request_with_defaults(Vec::new());
    let item = ChecklistItem::new("a", "milk?").with_defaults(&req);

    assert_eq!(item.answer_for("No"), Some(ItemAnswer::Disconfirm));
    assert_eq!(item.answer_for("GetWeather"), None);
    assert_eq!(item.answer_for(""), None);
}

#[test]
fn resolved_items_rejects_empty_checklist() {
    let req = request_with_defaults(Vec::new());

    let err = req.resolved_items().expect_err("no items");

    assert!(matches!(err, AppError::InvalidRequest(_)));
    assert_eq!(err.to_string(), "invalid request: checklist c1 has no items");
}

#[test]
fn resolved_items_rejects_item_without_intents() {
    let mut req = request_with_defaults(vec![ChecklistItem::new("a", "milk?")]);
    req.confirm_intent = None;
    req.disconfirm_intent = Some(String::new());
    req.cancel_intent = None;

    let err = req.resolved_items().expect_err("item a has nothing to match");

    assert!(matches!(err, AppError::InvalidRequest(ref msg) if msg.contains("item a")));
}

#[test]
fn resolved_items_preserves_order() {
    let req = request_with_defaults(vec![
        ChecklistItem::new("b", "eggs?"),
        ChecklistItem::new("a", "milk?"),
        ChecklistItem::new("c", "bread?"),
    ]);

    let ids: Vec<String> = req
        .resolved_items()
        .expect("valid request")
        .into_iter()
        .map(|item| item.id)
        .collect();

    assert_eq!(ids, ["b", "a", "c"]);
}

#[test]
fn pending_outcome_echoes_request() {
    let req = request_with_defaults(vec![ChecklistItem::new("a", "milk?")]);

    let outcome = ChecklistFinished::pending(&req);

    assert_eq!(outcome.id, "c1");
    assert_eq!(outcome.site_id, "kitchen");
    assert_eq!(outcome.status, FinishStatus::Unknown);
    assert!(outcome.confirmed_ids.is_empty());
    assert_eq!(outcome.cancelled_id, None);
}

#[test]
fn status_cancelled_wins_over_confirmations() {
    let req = request_with_defaults(Vec::new());
    let mut outcome = ChecklistFinished::pending(&req);
    outcome.confirmed_ids = vec!["a".into(), "b".into()];
    outcome.cancelled_id = Some("c".into());

    assert_eq!(outcome.compute_status(3), FinishStatus::Cancelled);
}

#[test]
fn status_reflects_confirmation_count() {
    let req = request_with_defaults(Vec::new());
    let mut outcome = ChecklistFinished::pending(&req);

    assert_eq!(outcome.compute_status(2), FinishStatus::NoneConfirmed);

    outcome.confirmed_ids.push("a".into());
    assert_eq!(outcome.compute_status(2), FinishStatus::SomeConfirmed);

    outcome.confirmed_ids.push("b".into());
    assert_eq!(outcome.compute_status(2), FinishStatus::AllConfirmed);
}

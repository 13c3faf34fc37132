//! End-to-end checklist flows through the reactor task: decoded Hermes
//! publishes in, encoded Hermes publishes out.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use hermes_checklist::bus::MessageBus;
use hermes_checklist::hermes::topics;
use hermes_checklist::orchestrator::checklist_session::SessionPhase;
use hermes_checklist::orchestrator::reactor::{run_reactor, Reactor, SiteFilter};

use super::test_helpers::{
    drive, intent, not_recognized, session_ended, session_started, start_checklist,
    RecordingBus,
};

fn groceries() -> (String, Value) {
    start_checklist("c1", &[("a", "milk?"), ("b", "eggs?")])
}

#[tokio::test]
async fn confirm_then_disconfirm_publishes_full_dialogue() {
    let bus = Arc::new(RecordingBus::default());

    let reactor = drive(
        Reactor::default(),
        Arc::clone(&bus),
        vec![
            groceries(),
            session_started("s1", "c1"),
            intent("s1", "Yes"),
            intent("s1", "No"),
            session_ended("s1"),
        ],
    )
    .await;

    let messages = bus.messages();
    assert_eq!(
        messages,
        vec![
            (
                topics::START_SESSION.to_owned(),
                json!({
                    "init": {
                        "type": "action",
                        "text": "milk?",
                        "intentFilter": ["Yes", "No", "Cancel"],
                        "canBeEnqueued": true,
                        "sendIntentNotRecognized": true
                    },
                    "customData": "c1",
                    "siteId": "default"
                }),
            ),
            (
                topics::CONTINUE_SESSION.to_owned(),
                json!({
                    "sessionId": "s1",
                    "text": "eggs?",
                    "intentFilter": ["Yes", "No", "Cancel"],
                    "sendIntentNotRecognized": true
                }),
            ),
            (
                topics::END_SESSION.to_owned(),
                json!({"sessionId": "s1", "text": "done"}),
            ),
            (
                topics::CHECKLIST_FINISHED.to_owned(),
                json!({
                    "id": "c1",
                    "status": "someConfirmed",
                    "confirmedIds": ["a"],
                    "cancelledId": null,
                    "siteId": "default"
                }),
            ),
        ]
    );
    assert_eq!(reactor.session().phase(), SessionPhase::Idle);
}

#[tokio::test]
async fn cancel_on_first_item_never_prompts_second() {
    let bus = Arc::new(RecordingBus::default());

    drive(
        Reactor::default(),
        Arc::clone(&bus),
        vec![
            groceries(),
            session_started("s1", "c1"),
            intent("s1", "Cancel"),
            intent("s1", "Yes"),
            session_ended("s1"),
        ],
    )
    .await;

    assert_eq!(
        bus.topics(),
        [
            topics::START_SESSION,
            topics::END_SESSION,
            topics::CHECKLIST_FINISHED
        ]
    );
    let (_, finished) = bus.messages().pop().expect("finished message");
    assert_eq!(finished["status"], "cancelled");
    assert_eq!(finished["cancelledId"], "a");
    assert_eq!(finished["confirmedIds"], json!([]));
}

#[tokio::test]
async fn not_recognized_repeats_prompt() {
    let bus = Arc::new(RecordingBus::default());

    let reactor = drive(
        Reactor::default(),
        Arc::clone(&bus),
        vec![
            groceries(),
            session_started("s1", "c1"),
            not_recognized("s1"),
            not_recognized("s1"),
        ],
    )
    .await;

    let messages = bus.messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[1], messages[2]);
    assert_eq!(messages[1].0, topics::CONTINUE_SESSION);
    assert_eq!(messages[1].1["text"], "milk?");
    assert_eq!(reactor.session().phase(), SessionPhase::AwaitingResponse);
}

#[tokio::test]
async fn stale_events_publish_nothing() {
    let bus = Arc::new(RecordingBus::default());

    let reactor = drive(
        Reactor::default(),
        Arc::clone(&bus),
        vec![
            groceries(),
            session_started("other", "someone-else"),
            session_started("s1", "c1"),
            intent("other", "Yes"),
            not_recognized("other"),
            session_ended("other"),
        ],
    )
    .await;

    assert_eq!(bus.topics(), [topics::START_SESSION]);
    assert_eq!(reactor.session().bus_session_id(), Some("s1"));
    assert!(reactor.session().confirmed_ids().is_empty());
}

#[tokio::test]
async fn invalid_request_is_dropped_and_reactor_keeps_running() {
    let bus = Arc::new(RecordingBus::default());

    drive(
        Reactor::default(),
        Arc::clone(&bus),
        vec![
            start_checklist("bad", &[]),
            start_checklist("c2", &[("x", "keys?")]),
            session_started("s2", "c2"),
            intent("s2", "Yes"),
            session_ended("s2"),
        ],
    )
    .await;

    let (_, finished) = bus.messages().pop().expect("finished message");
    assert_eq!(finished["id"], "c2");
    assert_eq!(finished["status"], "allConfirmed");
    assert_eq!(finished["confirmedIds"], json!(["x"]));
}

#[tokio::test]
async fn site_filter_ignores_foreign_requests() {
    let bus = Arc::new(RecordingBus::default());

    let reactor = drive(
        Reactor::new(SiteFilter::new(vec!["kitchen".into()])),
        Arc::clone(&bus),
        vec![groceries()],
    )
    .await;

    assert!(bus.topics().is_empty());
    assert_eq!(reactor.session().phase(), SessionPhase::Idle);
}

#[tokio::test]
async fn publish_failure_does_not_stop_reactor() {
    let bus = Arc::new(RecordingBus::failing_first(1));

    let reactor = drive(
        Reactor::default(),
        Arc::clone(&bus),
        vec![
            groceries(),
            session_started("s1", "c1"),
            intent("s1", "Yes"),
        ],
    )
    .await;

    // The startSession publish was refused; the session still advanced.
    assert_eq!(bus.topics(), [topics::CONTINUE_SESSION]);
    assert_eq!(
        reactor.session().current_item().map(|i| i.id.as_str()),
        Some("b")
    );
}

#[tokio::test]
async fn cancellation_stops_reactor_with_open_channel() {
    let bus: Arc<dyn MessageBus> = Arc::new(RecordingBus::default());
    let (_tx, rx) = mpsc::channel(1);
    let cancel = CancellationToken::new();

    let handle = tokio::spawn(run_reactor(Reactor::default(), rx, bus, cancel.clone()));
    cancel.cancel();

    let reactor = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("reactor stops promptly")
        .expect("reactor task completes");
    assert_eq!(reactor.session().phase(), SessionPhase::Idle);
}

#[tokio::test]
async fn session_ended_without_site_id_still_finishes() {
    let bus = Arc::new(RecordingBus::default());

    let reactor = drive(
        Reactor::default(),
        Arc::clone(&bus),
        vec![
            groceries(),
            session_started("s1", "c1"),
            intent("s1", "Yes"),
            intent("s1", "Yes"),
            (
                topics::SESSION_ENDED.to_owned(),
                json!({"sessionId": "s1", "termination": {"reason": "nominal"}}),
            ),
        ],
    )
    .await;

    let (topic, finished) = bus.messages().pop().expect("finished message");
    assert_eq!(topic, topics::CHECKLIST_FINISHED);
    assert_eq!(finished["status"], "allConfirmed");
    assert_eq!(reactor.session().phase(), SessionPhase::Idle);
}

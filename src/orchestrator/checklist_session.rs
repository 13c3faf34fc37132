//! Checklist session state machine.
//!
//! One [`ChecklistSession`] tracks at most one checklist run. Each inbound
//! event kind has exactly one transition method; every transition returns
//! the ordered list of messages it emits, possibly empty.
//!
//! ```text
//! Idle ──start──▶ AwaitingSessionStart ──sessionStarted──▶ AwaitingResponse
//!                                                           │  ▲
//!                               intent (items left) / retry └──┘
//!                                                           │
//!                          intent (last item or cancel) ───▶ Finalizing
//!                                                           │
//!                                      sessionEnded ───────▶ Idle
//! ```
//!
//! Events whose session id or correlation token do not match the active
//! run are stale and dropped without touching state.

use std::collections::VecDeque;

use tracing::{debug, info, warn};

use crate::hermes::OutboundMessage;
use crate::models::checklist::{ChecklistFinished, ChecklistItem, ItemAnswer, StartChecklist};
use crate::models::dialogue::{
    DialogueAction, DialogueContinueSession, DialogueEndSession, DialogueIntentNotRecognized,
    DialogueSessionEnded, DialogueSessionStarted, DialogueStartSession, NluIntent, SessionInit,
};
use crate::Result;

/// Observable phase of the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No checklist in flight.
    Idle,
    /// `startSession` sent; waiting for the platform to assign a session id.
    AwaitingSessionStart,
    /// An item has been asked; waiting for the user's answer.
    AwaitingResponse,
    /// `endSession` sent; waiting for `sessionEnded` to report the outcome.
    Finalizing,
}

/// Runtime state of the checklist in flight.
#[derive(Debug)]
struct ActiveChecklist {
    request: StartChecklist,
    pending: VecDeque<ChecklistItem>,
    current: ChecklistItem,
    bus_session_id: String,
    outcome: ChecklistFinished,
    ending: bool,
}

impl ActiveChecklist {
    fn prompt(&self) -> OutboundMessage {
        OutboundMessage::ContinueSession(DialogueContinueSession {
            session_id: self.bus_session_id.clone(),
            text: self.current.text.clone(),
            intent_filter: self.current.intent_filter(),
            send_intent_not_recognized: true,
        })
    }
}

/// Single-active-session checklist reactor state.
#[derive(Debug, Default)]
pub struct ChecklistSession {
    active: Option<ActiveChecklist>,
}

impl ChecklistSession {
    /// Create an idle session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        match &self.active {
            None => SessionPhase::Idle,
            Some(run) if run.bus_session_id.is_empty() => SessionPhase::AwaitingSessionStart,
            Some(run) if run.ending => SessionPhase::Finalizing,
            Some(_) => SessionPhase::AwaitingResponse,
        }
    }

    /// Id of the checklist in flight.
    #[must_use]
    pub fn checklist_id(&self) -> Option<&str> {
        self.active.as_ref().map(|run| run.request.id.as_str())
    }

    /// Item awaiting a response, with intents resolved.
    #[must_use]
    pub fn current_item(&self) -> Option<&ChecklistItem> {
        self.active.as_ref().map(|run| &run.current)
    }

    /// Number of items not yet presented.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.active.as_ref().map_or(0, |run| run.pending.len())
    }

    /// Item ids confirmed so far, in confirmation order.
    #[must_use]
    pub fn confirmed_ids(&self) -> &[String] {
        match &self.active {
            Some(run) => run.outcome.confirmed_ids.as_slice(),
            None => &[],
        }
    }

    /// Dialogue session id bound by `sessionStarted`, if any.
    #[must_use]
    pub fn bus_session_id(&self) -> Option<&str> {
        self.active
            .as_ref()
            .map(|run| run.bus_session_id.as_str())
            .filter(|id| !id.is_empty())
    }

    /// Begin a new checklist run and ask its first item.
    ///
    /// A run already in flight is replaced without notice to its requester.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidRequest` if the request has no items or an
    /// item has no resolvable intent. State is left untouched in that case.
    pub fn start(&mut self, request: StartChecklist) -> Result<Vec<OutboundMessage>> {
        let mut pending: VecDeque<ChecklistItem> = request.resolved_items()?.into();
        let Some(current) = pending.pop_front() else {
            return Ok(Vec::new());
        };

        if let Some(previous) = self.checklist_id() {
            warn!(
                previous_id = previous,
                checklist_id = request.id.as_str(),
                "replacing checklist in flight"
            );
        }

        info!(
            checklist_id = request.id.as_str(),
            site_id = request.site_id.as_str(),
            items = request.items.len(),
            "starting checklist"
        );
        debug!(?pending, ?current, "resolved checklist items");

        let begin = OutboundMessage::BeginSession(DialogueStartSession {
            init: SessionInit::Action(DialogueAction {
                text: current.text.clone(),
                intent_filter: current.intent_filter(),
                can_be_enqueued: true,
                send_intent_not_recognized: true,
            }),
            custom_data: Some(request.id.clone()),
            site_id: request.site_id.clone(),
        });

        self.active = Some(ActiveChecklist {
            outcome: ChecklistFinished::pending(&request),
            request,
            pending,
            current,
            bus_session_id: String::new(),
            ending: false,
        });

        Ok(vec![begin])
    }

    /// Bind the platform session id once the start is confirmed.
    pub fn session_started(&mut self, message: &DialogueSessionStarted) -> Vec<OutboundMessage> {
        let Some(run) = self.active.as_mut() else {
            debug!(session_id = message.session_id.as_str(), "no checklist in flight");
            return Vec::new();
        };

        if message.custom_data.as_deref() != Some(run.request.id.as_str()) {
            debug!(
                session_id = message.session_id.as_str(),
                custom_data = ?message.custom_data,
                "session started for another requester"
            );
            return Vec::new();
        }

        info!(
            checklist_id = run.request.id.as_str(),
            session_id = message.session_id.as_str(),
            "checklist session started"
        );
        run.bus_session_id.clone_from(&message.session_id);
        Vec::new()
    }

    /// Record the answer for the current item and ask the next one.
    ///
    /// An intent that answers nothing re-asks the current item.
    pub fn intent_recognized(&mut self, message: &NluIntent) -> Vec<OutboundMessage> {
        let Some(run) = self.awaiting_response(message.session_id.as_deref()) else {
            return Vec::new();
        };

        let intent_name = message.intent.intent_name.as_str();
        let item_id = run.current.id.clone();

        match run.current.answer_for(intent_name) {
            Some(ItemAnswer::Cancel) => {
                info!(item_id = item_id.as_str(), intent_name, "checklist cancelled");
                run.outcome.cancelled_id = Some(item_id);
                run.pending.clear();
            }
            Some(ItemAnswer::Confirm) => {
                info!(item_id = item_id.as_str(), intent_name, "item confirmed");
                run.outcome.confirmed_ids.push(item_id);
            }
            Some(ItemAnswer::Disconfirm) => {
                info!(item_id = item_id.as_str(), intent_name, "item disconfirmed");
            }
            None => {
                debug!(
                    item_id = item_id.as_str(),
                    intent_name,
                    "intent does not answer item, repeating"
                );
                return vec![run.prompt()];
            }
        }

        if let Some(next) = run.pending.pop_front() {
            run.current = next;
            return vec![run.prompt()];
        }

        run.ending = true;
        vec![OutboundMessage::EndSession(DialogueEndSession {
            session_id: run.bus_session_id.clone(),
            text: run.request.end_text.clone(),
        })]
    }

    /// Ask the current item again, unchanged.
    pub fn intent_not_recognized(
        &mut self,
        message: &DialogueIntentNotRecognized,
    ) -> Vec<OutboundMessage> {
        match self.awaiting_response(Some(&message.session_id)) {
            Some(run) => {
                debug!(item_id = run.current.id.as_str(), "intent not recognized, repeating");
                vec![run.prompt()]
            }
            None => Vec::new(),
        }
    }

    /// Report the outcome and return to idle.
    ///
    /// Partial progress counts: a session ended by the platform mid-list
    /// still reports what was answered so far.
    pub fn session_ended(&mut self, message: &DialogueSessionEnded) -> Vec<OutboundMessage> {
        let bound = self
            .bus_session_id()
            .is_some_and(|id| id == message.session_id);
        if !bound {
            debug!(session_id = message.session_id.as_str(), "stale session ended");
            return Vec::new();
        }

        let Some(run) = self.active.take() else {
            return Vec::new();
        };

        let mut outcome = run.outcome;
        outcome.status = outcome.compute_status(run.request.items.len());

        info!(
            checklist_id = outcome.id.as_str(),
            status = ?outcome.status,
            confirmed = outcome.confirmed_ids.len(),
            reason = ?message.termination.reason,
            "checklist finished"
        );

        vec![OutboundMessage::ChecklistFinished(outcome)]
    }

    fn awaiting_response(&mut self, session_id: Option<&str>) -> Option<&mut ActiveChecklist> {
        let phase = self.phase();
        let run = self.active.as_mut()?;

        if run.bus_session_id.is_empty() || session_id != Some(run.bus_session_id.as_str()) {
            debug!(?session_id, "event for another session");
            return None;
        }

        if phase == SessionPhase::Finalizing {
            debug!(?session_id, "checklist already ending");
            return None;
        }

        Some(run)
    }
}

//! Checklist orchestration: the session state machine and the reactor
//! that feeds it from the bus.

pub mod checklist_session;
pub mod reactor;

//! Domain model module declarations.

pub mod checklist;
pub mod dialogue;

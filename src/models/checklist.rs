//! Checklist request, item, and outcome models.

use serde::{Deserialize, Serialize};

use crate::{AppError, Result};

/// Site used when a request does not name one.
pub const DEFAULT_SITE_ID: &str = "default";

pub(crate) fn default_site_id() -> String {
    DEFAULT_SITE_ID.into()
}

/// Single yes/no prompt within a checklist.
///
/// Any intent left unset falls back to the checklist-level default of the
/// same kind when the request is accepted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    /// Identifier unique within the checklist.
    pub id: String,
    /// Prompt spoken for this item.
    pub text: String,
    /// Intent that confirms the item.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirm_intent: Option<String>,
    /// Intent that disconfirms the item.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disconfirm_intent: Option<String>,
    /// Intent that cancels the whole checklist while this item is active.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_intent: Option<String>,
}

impl ChecklistItem {
    /// Construct an item with no intent overrides.
    #[must_use]
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            confirm_intent: None,
            disconfirm_intent: None,
            cancel_intent: None,
        }
    }

    /// Copy of this item with each missing intent taken from `request`.
    ///
    /// An empty intent name counts as missing.
    #[must_use]
    pub fn with_defaults(&self, request: &StartChecklist) -> Self {
        Self {
            id: self.id.clone(),
            text: self.text.clone(),
            confirm_intent: first_present(
                self.confirm_intent.as_deref(),
                request.confirm_intent.as_deref(),
            ),
            disconfirm_intent: first_present(
                self.disconfirm_intent.as_deref(),
                request.disconfirm_intent.as_deref(),
            ),
            cancel_intent: first_present(
                self.cancel_intent.as_deref(),
                request.cancel_intent.as_deref(),
            ),
        }
    }

    /// Ordered confirm, disconfirm, cancel intents that are present.
    #[must_use]
    pub fn intent_filter(&self) -> Vec<String> {
        [
            self.confirm_intent.as_deref(),
            self.disconfirm_intent.as_deref(),
            self.cancel_intent.as_deref(),
        ]
        .into_iter()
        .filter_map(present)
        .map(str::to_owned)
        .collect()
    }

    /// Classify a recognized intent name against this item.
    ///
    /// Cancel takes precedence over confirm, which takes precedence over
    /// disconfirm.
    #[must_use]
    pub fn answer_for(&self, intent_name: &str) -> Option<ItemAnswer> {
        let is = |intent: Option<&str>| present(intent) == Some(intent_name);

        if is(self.cancel_intent.as_deref()) {
            Some(ItemAnswer::Cancel)
        } else if is(self.confirm_intent.as_deref()) {
            Some(ItemAnswer::Confirm)
        } else if is(self.disconfirm_intent.as_deref()) {
            Some(ItemAnswer::Disconfirm)
        } else {
            None
        }
    }
}

/// How a recognized intent answered the active item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemAnswer {
    /// Item confirmed.
    Confirm,
    /// Item disconfirmed.
    Disconfirm,
    /// Whole checklist cancelled.
    Cancel,
}

/// Request to begin a new checklist run (`rhasspy/checklist/start`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StartChecklist {
    /// Correlation identifier for this run.
    pub id: String,
    /// Items in presentation order.
    pub items: Vec<ChecklistItem>,
    /// Text spoken when the checklist finishes or is cancelled.
    #[serde(default)]
    pub end_text: String,
    /// Default confirm intent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirm_intent: Option<String>,
    /// Default disconfirm intent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disconfirm_intent: Option<String>,
    /// Default cancel intent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_intent: Option<String>,
    /// Hermes site the dialogue runs on.
    #[serde(default = "default_site_id")]
    pub site_id: String,
}

impl StartChecklist {
    /// Items with checklist defaults applied, validated for activation.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidRequest` if the item list is empty or any
    /// item ends up with no confirm, disconfirm, or cancel intent.
    pub fn resolved_items(&self) -> Result<Vec<ChecklistItem>> {
        if self.items.is_empty() {
            return Err(AppError::InvalidRequest(format!(
                "checklist {} has no items",
                self.id
            )));
        }

        let resolved: Vec<ChecklistItem> = self
            .items
            .iter()
            .map(|item| item.with_defaults(self))
            .collect();

        if let Some(item) = resolved.iter().find(|item| item.intent_filter().is_empty()) {
            return Err(AppError::InvalidRequest(format!(
                "item {} in checklist {} needs a confirm, disconfirm, or cancel intent",
                item.id, self.id
            )));
        }

        Ok(resolved)
    }
}

/// Final status of a checklist run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum FinishStatus {
    /// Not yet determined.
    #[default]
    Unknown,
    /// Every item was confirmed.
    AllConfirmed,
    /// At least one item, but not all, was confirmed.
    SomeConfirmed,
    /// No item was confirmed.
    NoneConfirmed,
    /// The checklist was cancelled.
    Cancelled,
}

/// Outcome reported when a checklist run ends (`rhasspy/checklist/finished`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistFinished {
    /// Identifier from the start request.
    pub id: String,
    /// Final status.
    pub status: FinishStatus,
    /// Confirmed item ids in confirmation order.
    #[serde(default)]
    pub confirmed_ids: Vec<String>,
    /// Item that was active when the checklist was cancelled.
    #[serde(default)]
    pub cancelled_id: Option<String>,
    /// Site from the start request.
    #[serde(default = "default_site_id")]
    pub site_id: String,
}

impl ChecklistFinished {
    /// Empty outcome for `request` with status `Unknown`.
    #[must_use]
    pub fn pending(request: &StartChecklist) -> Self {
        Self {
            id: request.id.clone(),
            status: FinishStatus::Unknown,
            confirmed_ids: Vec::new(),
            cancelled_id: None,
            site_id: request.site_id.clone(),
        }
    }

    /// Status implied by the accumulated answers for a checklist of
    /// `item_count` items.
    #[must_use]
    pub fn compute_status(&self, item_count: usize) -> FinishStatus {
        if self.cancelled_id.is_some() {
            FinishStatus::Cancelled
        } else if self.confirmed_ids.len() == item_count {
            FinishStatus::AllConfirmed
        } else if !self.confirmed_ids.is_empty() {
            FinishStatus::SomeConfirmed
        } else {
            FinishStatus::NoneConfirmed
        }
    }
}

fn present(intent: Option<&str>) -> Option<&str> {
    intent.filter(|name| !name.is_empty())
}

fn first_present(item: Option<&str>, fallback: Option<&str>) -> Option<String> {
    present(item).or_else(|| present(fallback)).map(str::to_owned)
}

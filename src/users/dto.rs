use serde::{Deserialize, Serialize};

/// Body fields accepted by create and update.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct UserPayload {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// `{"success": "...", "data": ...}`
#[derive(Debug, Serialize)]
pub struct SuccessBody<T: Serialize> {
    pub success: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// Same envelope under the historical misspelled key.
#[derive(Debug, Serialize)]
pub struct LegacySuccessBody<T: Serialize> {
    pub sucess: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// `{"error": "..."}`
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl<T: Serialize> SuccessBody<T> {
    pub fn with_data(message: &str, data: T) -> Self {
        Self {
            success: message.to_string(),
            data: Some(data),
        }
    }
}

impl SuccessBody<()> {
    pub fn message(message: &str) -> Self {
        Self {
            success: message.to_string(),
            data: None,
        }
    }
}

impl<T: Serialize> From<SuccessBody<T>> for LegacySuccessBody<T> {
    fn from(b: SuccessBody<T>) -> Self {
        Self {
            sucess: b.success,
            data: b.data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_only_envelope_has_no_data_key() {
        let json = serde_json::to_value(SuccessBody::message("Add user success")).unwrap();
        assert_eq!(json, serde_json::json!({"success": "Add user success"}));
    }

    #[test]
    fn legacy_envelope_uses_misspelled_key() {
        let body: LegacySuccessBody<Vec<u8>> =
            SuccessBody::with_data("Find all users success", vec![]).into();
        let json = serde_json::to_value(body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"sucess": "Find all users success", "data": []})
        );
    }

    #[test]
    fn payload_fields_default_to_none() {
        let p: UserPayload = serde_json::from_str(r#"{"name":"Alice"}"#).unwrap();
        assert_eq!(p.name.as_deref(), Some("Alice"));
        assert_eq!(p.email, None);
    }
}

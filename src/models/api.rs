use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The backend's failure payload. A loose union of RFC 7807 problem fields
/// and the envelope's own message/validation maps; any subset may be present.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub problem_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Field name -> list of messages, in document order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_errors: Option<Map<String, Value>>,
}

/// Pulls the first message of the first field out of a field-error map.
pub(crate) fn first_field_message(map: &Map<String, Value>) -> Option<String> {
    for messages in map.values() {
        match messages {
            Value::Array(list) => {
                if let Some(Value::String(first)) = list.first() {
                    return Some(first.clone());
                }
            }
            Value::String(single) => return Some(single.clone()),
            _ => {}
        }
    }
    None
}

/// Deserialize a success body, unwrapping the `{data: ...}` envelope when the
/// backend applied one and taking the body as-is when it did not.
pub fn unwrap_data<T: DeserializeOwned>(body: Value) -> Result<T, serde_json::Error> {
    let inner = match body {
        Value::Object(mut object) if object.contains_key("data") => {
            object.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    };
    serde_json::from_value(inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TokenPair;

    #[test]
    fn test_unwrap_enveloped_body() {
        let body = serde_json::json!({
            "data": {"accessToken": "a1", "refreshToken": "r1"},
            "success": true,
            "message": null
        });
        let pair: TokenPair = unwrap_data(body).expect("envelope should unwrap");
        assert_eq!(pair, TokenPair::new("a1", "r1"));
    }

    #[test]
    fn test_unwrap_bare_body() {
        let body = serde_json::json!({"accessToken": "a1", "refreshToken": "r1"});
        let pair: TokenPair = unwrap_data(body).expect("bare body should parse");
        assert_eq!(pair, TokenPair::new("a1", "r1"));
    }

    #[test]
    fn test_first_field_message_takes_document_order() {
        let body: ErrorBody = serde_json::from_str(
            r#"{"validationErrors": {"email": ["Email is required", "Email is invalid"], "name": ["Name is required"]}}"#,
        )
        .expect("error body should parse");
        let map = body.validation_errors.expect("map should be present");
        assert_eq!(
            first_field_message(&map).as_deref(),
            Some("Email is required")
        );
    }
}

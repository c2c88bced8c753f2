//! Function-call response envelope.
//!
//! The agent platform only accepts one shape back from an action-group
//! function:
//!
//! ```json
//! {
//!   "messageVersion": "1.0",
//!   "response": {
//!     "actionGroup": "...",
//!     "function": "...",
//!     "functionResponse": { "responseBody": { "TEXT": { "body": "..." } } }
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::action::ActionRequest;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub message_version: String,

    pub response: FunctionCallResponse,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_attributes: Option<serde_json::Map<String, serde_json::Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_session_attributes: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionCallResponse {
    pub action_group: String,
    pub function: String,
    pub function_response: FunctionResponse,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionResponse {
    pub response_body: ResponseBody,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseBody {
    #[serde(rename = "TEXT")]
    pub text: TextBody,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBody {
    pub body: String,
}

impl ResponseEnvelope {
    /// Wrap `body` for `request`, echoing its action group, function name,
    /// message version and session attributes verbatim.
    pub fn for_request(request: &ActionRequest, body: impl Into<String>) -> Self {
        Self {
            message_version: request.message_version.clone(),
            response: FunctionCallResponse {
                action_group: request.action_group.clone(),
                function: request.function.clone(),
                function_response: FunctionResponse {
                    response_body: ResponseBody {
                        text: TextBody { body: body.into() },
                    },
                },
            },
            session_attributes: request.session_attributes.clone(),
            prompt_session_attributes: request.prompt_session_attributes.clone(),
        }
    }

    /// The text body carried by this envelope.
    pub fn body(&self) -> &str {
        &self.response.function_response.response_body.text.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_matches_platform_shape() {
        let request = ActionRequest::new("CloudCraftTools", "create_s3_bucket");
        let envelope = ResponseEnvelope::for_request(&request, "Success: ok");
        let json = serde_json::to_value(&envelope).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "messageVersion": "1.0",
                "response": {
                    "actionGroup": "CloudCraftTools",
                    "function": "create_s3_bucket",
                    "functionResponse": {
                        "responseBody": { "TEXT": { "body": "Success: ok" } }
                    }
                }
            })
        );
    }

    #[test]
    fn session_attributes_are_echoed() {
        let mut request = ActionRequest::new("g", "f");
        let mut attrs = serde_json::Map::new();
        attrs.insert("bucket".into(), serde_json::json!("site"));
        request.session_attributes = Some(attrs.clone());

        let envelope = ResponseEnvelope::for_request(&request, "x");
        assert_eq!(envelope.session_attributes, Some(attrs));
        assert_eq!(envelope.body(), "x");
    }
}

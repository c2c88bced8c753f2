//! Actions: the closed set of provisioning operations the agent may call.
//!
//! The agent platform speaks in untyped terms: a function name plus a flat
//! list of `{name, value}` pairs. [`Action::parse`] is the single place where
//! that untyped shape becomes a typed [`Action`]; everything downstream
//! matches exhaustively on the enum.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::ActionError;

/// Region that must be created without an explicit location constraint.
pub const DEFAULT_REGION: &str = "us-east-1";

pub const BUCKET_NAME: &str = "bucket_name";
pub const REGION: &str = "region";
pub const FUNCTION_NAME: &str = "function_name";
pub const ROLE_ARN: &str = "role_arn";

/// One `{name, value}` pair as sent by the agent platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionParameter {
    pub name: String,

    /// Declared parameter type (the platform always sends `"string"` here)
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,

    pub value: String,
}

impl ActionParameter {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value_type: None,
            value: value.into(),
        }
    }
}

/// The function-call event delivered by the agent platform.
///
/// Fields the dispatcher does not interpret are kept in `extra` so the
/// request can be logged or forwarded without loss.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRequest {
    pub message_version: String,

    pub action_group: String,

    pub function: String,

    #[serde(default)]
    pub parameters: Vec<ActionParameter>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_attributes: Option<serde_json::Map<String, serde_json::Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_session_attributes: Option<serde_json::Map<String, serde_json::Value>>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ActionRequest {
    /// Create a request with the current platform message version.
    pub fn new(action_group: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            message_version: "1.0".into(),
            action_group: action_group.into(),
            function: function.into(),
            parameters: Vec::new(),
            session_attributes: None,
            prompt_session_attributes: None,
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.push(ActionParameter::new(name, value));
        self
    }

    /// Parameters as a name → value map. When a name repeats, the last
    /// occurrence wins.
    pub fn arguments(&self) -> HashMap<&str, &str> {
        arguments(&self.parameters)
    }

    /// Resolve this request into a typed action.
    pub fn action(&self) -> Result<Action, ActionError> {
        Action::parse(&self.function, &self.parameters)
    }
}

fn arguments(parameters: &[ActionParameter]) -> HashMap<&str, &str> {
    parameters
        .iter()
        .map(|p| (p.name.as_str(), p.value.as_str()))
        .collect()
}

/// Declared parameter of an action, as advertised in the action schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub required: bool,
}

/// The five action identifiers known to the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    CreateBucket,
    DisablePublicAccessBlock,
    SetPublicReadPolicy,
    EnableStaticHosting,
    CreatePlaceholderFunction,
}

impl ActionKind {
    pub const ALL: [ActionKind; 5] = [
        ActionKind::CreateBucket,
        ActionKind::DisablePublicAccessBlock,
        ActionKind::SetPublicReadPolicy,
        ActionKind::EnableStaticHosting,
        ActionKind::CreatePlaceholderFunction,
    ];

    /// Wire name used by the platform.
    pub fn name(self) -> &'static str {
        match self {
            ActionKind::CreateBucket => "create_s3_bucket",
            ActionKind::DisablePublicAccessBlock => "disable_s3_block_public_access",
            ActionKind::SetPublicReadPolicy => "set_public_read_policy",
            ActionKind::EnableStaticHosting => "configure_s3_static_hosting",
            ActionKind::CreatePlaceholderFunction => "create_hello_world_lambda",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn description(self) -> &'static str {
        match self {
            ActionKind::CreateBucket => "Creates a new Amazon S3 bucket.",
            ActionKind::DisablePublicAccessBlock => {
                "Disables block public access on an S3 bucket."
            }
            ActionKind::SetPublicReadPolicy => "Applies a public read-only policy to an S3 bucket.",
            ActionKind::EnableStaticHosting => "Enables static website hosting on a bucket.",
            ActionKind::CreatePlaceholderFunction => {
                "Creates a simple 'Hello World' Lambda function."
            }
        }
    }

    pub fn parameters(self) -> &'static [ParameterSpec] {
        const BUCKET: ParameterSpec = ParameterSpec {
            name: BUCKET_NAME,
            description: "Name of the S3 bucket.",
            required: true,
        };
        match self {
            ActionKind::CreateBucket => &[
                ParameterSpec {
                    name: BUCKET_NAME,
                    description: "Globally unique name for the bucket.",
                    required: true,
                },
                ParameterSpec {
                    name: REGION,
                    description: "The AWS region, e.g., us-east-1.",
                    required: true,
                },
            ],
            ActionKind::DisablePublicAccessBlock
            | ActionKind::SetPublicReadPolicy
            | ActionKind::EnableStaticHosting => &[BUCKET],
            ActionKind::CreatePlaceholderFunction => &[
                ParameterSpec {
                    name: FUNCTION_NAME,
                    description: "The name for the new Lambda function.",
                    required: true,
                },
                ParameterSpec {
                    name: ROLE_ARN,
                    description: "The ARN of the IAM role for the Lambda to assume.",
                    required: true,
                },
            ],
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed provisioning action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    CreateBucket { bucket_name: String, region: String },
    DisablePublicAccessBlock { bucket_name: String },
    SetPublicReadPolicy { bucket_name: String },
    EnableStaticHosting { bucket_name: String },
    CreatePlaceholderFunction { function_name: String, role_arn: String },
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::CreateBucket { .. } => ActionKind::CreateBucket,
            Action::DisablePublicAccessBlock { .. } => ActionKind::DisablePublicAccessBlock,
            Action::SetPublicReadPolicy { .. } => ActionKind::SetPublicReadPolicy,
            Action::EnableStaticHosting { .. } => ActionKind::EnableStaticHosting,
            Action::CreatePlaceholderFunction { .. } => ActionKind::CreatePlaceholderFunction,
        }
    }

    /// Build an action from the platform's function name and parameter list.
    ///
    /// Values are taken as-is; nothing beyond presence is checked here.
    /// A missing `region` falls back to [`DEFAULT_REGION`].
    pub fn parse(function: &str, parameters: &[ActionParameter]) -> Result<Self, ActionError> {
        let kind = ActionKind::from_name(function)
            .ok_or_else(|| ActionError::UnknownFunction(function.to_string()))?;
        let args = arguments(parameters);
        let required = |name: &str| {
            args.get(name)
                .map(|value| value.to_string())
                .ok_or_else(|| ActionError::MissingParameter {
                    function: function.to_string(),
                    parameter: name.to_string(),
                })
        };

        let action = match kind {
            ActionKind::CreateBucket => Action::CreateBucket {
                bucket_name: required(BUCKET_NAME)?,
                region: args
                    .get(REGION)
                    .map_or_else(|| DEFAULT_REGION.to_string(), |r| r.to_string()),
            },
            ActionKind::DisablePublicAccessBlock => Action::DisablePublicAccessBlock {
                bucket_name: required(BUCKET_NAME)?,
            },
            ActionKind::SetPublicReadPolicy => Action::SetPublicReadPolicy {
                bucket_name: required(BUCKET_NAME)?,
            },
            ActionKind::EnableStaticHosting => Action::EnableStaticHosting {
                bucket_name: required(BUCKET_NAME)?,
            },
            ActionKind::CreatePlaceholderFunction => Action::CreatePlaceholderFunction {
                function_name: required(FUNCTION_NAME)?,
                role_arn: required(ROLE_ARN)?,
            },
        };
        Ok(action)
    }
}

/// The human-readable result of a successful action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    pub message: String,
}

impl ActionOutcome {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Render an action result in the platform's text contract:
/// `Success: ...` or `Error: ...`.
pub fn response_body(result: &Result<ActionOutcome, ActionError>) -> String {
    match result {
        Ok(outcome) => format!("Success: {}", outcome.message),
        Err(err) => format!("Error: {err}"),
    }
}

//! Cloud service traits, the seams between CloudCraft and managed services.
//!
//! Each trait covers the handful of remote calls this system makes against
//! one service. `cloudcraft-aws` implements them over the AWS SDK; tests
//! implement them in memory. Every method is a single remote call with no
//! retries: failures come back as [`CloudError`] and the caller decides.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::mpsc;

use crate::error::CloudError;

// --- Object storage ---

/// A single object upload.
#[derive(Debug, Clone)]
pub struct PutObject {
    pub bucket: String,
    pub key: String,
    pub content_type: String,
    pub body: Vec<u8>,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Create a bucket. `location_constraint` must be `None` for the
    /// default region; the service rejects a redundant constraint.
    async fn create_bucket(
        &self,
        bucket: &str,
        location_constraint: Option<&str>,
    ) -> Result<(), CloudError>;

    /// Remove the bucket's public-access-block configuration.
    async fn delete_public_access_block(&self, bucket: &str) -> Result<(), CloudError>;

    /// Attach a bucket policy given as a JSON document.
    async fn put_bucket_policy(&self, bucket: &str, policy: &str) -> Result<(), CloudError>;

    /// Enable website hosting with the given index document.
    async fn put_bucket_website(&self, bucket: &str, index_document: &str)
    -> Result<(), CloudError>;

    async fn put_object(&self, object: PutObject) -> Result<(), CloudError>;
}

// --- Functions ---

/// Everything needed to create a function from an in-memory package.
#[derive(Debug, Clone)]
pub struct FunctionSpec {
    pub name: String,
    pub runtime: String,
    pub role_arn: String,
    pub handler: String,
    pub package: Vec<u8>,
    pub timeout_secs: Option<i32>,
    pub publish: bool,
}

#[async_trait]
pub trait FunctionService: Send + Sync {
    /// Create a function and return its ARN.
    ///
    /// A name collision surfaces as [`CloudError::Conflict`].
    async fn create_function(&self, spec: &FunctionSpec) -> Result<String, CloudError>;
}

// --- Agent runtime ---

/// One prompt sent to a hosted agent alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentInvocation {
    pub agent_id: String,
    pub agent_alias_id: String,
    pub session_id: String,
    pub input_text: String,
}

/// Raw completion bytes streamed back by the agent, in arrival order.
///
/// Chunk boundaries are arbitrary and may split a UTF-8 sequence.
pub type CompletionStream = mpsc::Receiver<Result<Vec<u8>, CloudError>>;

#[async_trait]
pub trait AgentRuntime: Send + Sync {
    /// Start an invocation. The agent owns conversation memory keyed by
    /// `session_id`.
    async fn invoke_agent(&self, invocation: &AgentInvocation)
    -> Result<CompletionStream, CloudError>;
}

/// Drain a completion stream into one string.
///
/// The first failed chunk aborts the collection. The joined bytes are
/// decoded once, so a reply that is not UTF-8 is a
/// [`CloudError::MalformedResponse`].
pub async fn collect_completion(mut stream: CompletionStream) -> Result<String, CloudError> {
    let mut bytes = Vec::new();
    while let Some(chunk) = stream.recv().await {
        bytes.extend_from_slice(&chunk?);
    }
    String::from_utf8(bytes).map_err(|e| {
        CloudError::MalformedResponse(format!("agent reply is not valid UTF-8: {e}"))
    })
}

// --- Identity ---

#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Create a role with the given trust policy and return its ARN.
    async fn create_role(&self, role_name: &str, trust_policy: &str) -> Result<String, CloudError>;

    async fn get_role_arn(&self, role_name: &str) -> Result<String, CloudError>;

    async fn attach_role_policy(&self, role_name: &str, policy_arn: &str)
    -> Result<(), CloudError>;

    async fn put_role_policy(
        &self,
        role_name: &str,
        policy_name: &str,
        policy_document: &str,
    ) -> Result<(), CloudError>;

    /// Account id of the calling credentials.
    async fn account_id(&self) -> Result<String, CloudError>;
}

// --- Agent definitions ---

/// Lifecycle status of a hosted agent definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentStatus {
    Creating,
    Preparing,
    Prepared,
    NotPrepared,
    Updating,
    Versioning,
    Deleting,
    Failed,
    Other(String),
}

impl AgentStatus {
    pub fn parse(status: &str) -> Self {
        match status {
            "CREATING" => AgentStatus::Creating,
            "PREPARING" => AgentStatus::Preparing,
            "PREPARED" => AgentStatus::Prepared,
            "NOT_PREPARED" => AgentStatus::NotPrepared,
            "UPDATING" => AgentStatus::Updating,
            "VERSIONING" => AgentStatus::Versioning,
            "DELETING" => AgentStatus::Deleting,
            "FAILED" => AgentStatus::Failed,
            other => AgentStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            AgentStatus::Creating => "CREATING",
            AgentStatus::Preparing => "PREPARING",
            AgentStatus::Prepared => "PREPARED",
            AgentStatus::NotPrepared => "NOT_PREPARED",
            AgentStatus::Updating => "UPDATING",
            AgentStatus::Versioning => "VERSIONING",
            AgentStatus::Deleting => "DELETING",
            AgentStatus::Failed => "FAILED",
            AgentStatus::Other(s) => s,
        }
    }
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct AgentDefinition {
    pub name: String,
    pub role_arn: String,
    pub foundation_model: String,
    pub instruction: String,
    pub idle_session_ttl_secs: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSummary {
    pub agent_id: String,
    pub name: String,
    pub status: AgentStatus,
}

/// One callable function in an action group's schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ParameterDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub value_type: String,
    pub required: bool,
}

#[derive(Debug, Clone)]
pub struct ActionGroupDefinition {
    pub agent_id: String,
    pub agent_version: String,
    pub name: String,
    /// ARN of the function that executes this group's calls.
    pub executor_arn: String,
    pub functions: Vec<FunctionDefinition>,
}

#[async_trait]
pub trait AgentCatalog: Send + Sync {
    async fn create_agent(&self, definition: &AgentDefinition) -> Result<AgentSummary, CloudError>;

    async fn find_agent_by_name(&self, name: &str) -> Result<Option<AgentSummary>, CloudError>;

    async fn get_agent(&self, agent_id: &str) -> Result<AgentSummary, CloudError>;

    async fn create_action_group(&self, group: &ActionGroupDefinition) -> Result<(), CloudError>;

    async fn prepare_agent(&self, agent_id: &str) -> Result<(), CloudError>;

    /// Create an alias and return its id.
    async fn create_alias(&self, agent_id: &str, alias_name: &str) -> Result<String, CloudError>;

    async fn find_alias_by_name(
        &self,
        agent_id: &str,
        alias_name: &str,
    ) -> Result<Option<String>, CloudError>;
}

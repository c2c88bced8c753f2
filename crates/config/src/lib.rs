//! Configuration loading, validation, and management for CloudCraft.
//!
//! Loads configuration from `~/.cloudcraft/config.toml` with environment
//! variable overrides. Validates all settings at startup. The resulting
//! [`AppConfig`] is built once in `main` and handed to each component; no
//! component reads configuration from globals.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_INSTRUCTION: &str = "\
You are CloudCraft Agent, an expert AWS DevOps assistant. Your purpose is to help users deploy and manage AWS resources using natural language.
1. Analyze the user's request to understand their goal.
2. If you need more information (like an IAM role ARN, which you cannot create yourself), you MUST ask the user for it. Do not guess or make up values.
3. Create a multi-step plan to achieve the goal using the available tools.
4. The sequence of operations is critical. For a static website, the order must be: create_s3_bucket, disable_s3_block_public_access, set_public_read_policy, and then configure_s3_static_hosting.
";

/// The root configuration structure.
///
/// Maps directly to `~/.cloudcraft/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Region for every service client
    #[serde(default = "default_region")]
    pub region: String,

    /// Hosted agent identifiers used by the relay
    #[serde(default)]
    pub agent: AgentConfig,

    /// Relay HTTP server
    #[serde(default)]
    pub relay: RelayConfig,

    /// One-time provisioning
    #[serde(default)]
    pub setup: SetupConfig,
}

fn default_region() -> String {
    "us-east-1".into()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default)]
    pub agent_id: String,

    #[serde(default)]
    pub agent_alias_id: String,

    /// Session used when a prompt arrives without one
    #[serde(default = "default_session_id")]
    pub default_session_id: String,
}

fn default_session_id() -> String {
    "default-session".into()
}

impl AgentConfig {
    /// Both identifiers are required before prompts can be relayed.
    pub fn is_configured(&self) -> bool {
        !self.agent_id.is_empty() && !self.agent_alias_id.is_empty()
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            agent_id: String::new(),
            agent_alias_id: String::new(),
            default_session_id: default_session_id(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origins; empty allows any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Maximum request body size for uploads
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    5001
}
fn default_max_upload_bytes() -> usize {
    25 * 1024 * 1024
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![],
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetupConfig {
    #[serde(default = "default_agent_name")]
    pub agent_name: String,

    /// Name of the dispatch function
    #[serde(default = "default_function_name")]
    pub function_name: String,

    #[serde(default = "default_function_role_name")]
    pub function_role_name: String,

    #[serde(default = "default_agent_role_name")]
    pub agent_role_name: String,

    #[serde(default = "default_foundation_model")]
    pub foundation_model: String,

    #[serde(default = "default_action_group_name")]
    pub action_group_name: String,

    #[serde(default = "default_alias_name")]
    pub alias_name: String,

    /// Zip containing the dispatch function's `bootstrap` binary
    #[serde(default = "default_package_path")]
    pub package_path: PathBuf,

    #[serde(default = "default_function_runtime")]
    pub function_runtime: String,

    #[serde(default = "default_function_handler")]
    pub function_handler: String,

    #[serde(default = "default_function_timeout_secs")]
    pub function_timeout_secs: i32,

    #[serde(default = "default_idle_session_ttl_secs")]
    pub idle_session_ttl_secs: i32,

    /// Pause after creating roles so they are assumable
    #[serde(default = "default_role_propagation_delay_secs")]
    pub role_propagation_delay_secs: u64,

    /// Instructions given to the agent definition
    #[serde(default = "default_instruction")]
    pub instruction: String,

    #[serde(default)]
    pub poll: PollConfig,
}

fn default_agent_name() -> String {
    "CloudCraftAgent-Automated".into()
}
fn default_function_name() -> String {
    "CloudCraftActionGroup-Automated".into()
}
fn default_function_role_name() -> String {
    "CloudCraftLambdaRole-Automated".into()
}
fn default_agent_role_name() -> String {
    "CloudCraftAgentRole-Automated".into()
}
fn default_foundation_model() -> String {
    "anthropic.claude-3-sonnet-20240229-v1:0".into()
}
fn default_action_group_name() -> String {
    "CloudCraftTools".into()
}
fn default_alias_name() -> String {
    "TestAlias".into()
}
fn default_package_path() -> PathBuf {
    PathBuf::from("target/lambda/cloudcraft-dispatch-fn/bootstrap.zip")
}
fn default_function_runtime() -> String {
    "provided.al2023".into()
}
fn default_function_handler() -> String {
    "bootstrap".into()
}
fn default_function_timeout_secs() -> i32 {
    120
}
fn default_idle_session_ttl_secs() -> i32 {
    600
}
fn default_role_propagation_delay_secs() -> u64 {
    10
}
fn default_instruction() -> String {
    DEFAULT_INSTRUCTION.into()
}

impl Default for SetupConfig {
    fn default() -> Self {
        Self {
            agent_name: default_agent_name(),
            function_name: default_function_name(),
            function_role_name: default_function_role_name(),
            agent_role_name: default_agent_role_name(),
            foundation_model: default_foundation_model(),
            action_group_name: default_action_group_name(),
            alias_name: default_alias_name(),
            package_path: default_package_path(),
            function_runtime: default_function_runtime(),
            function_handler: default_function_handler(),
            function_timeout_secs: default_function_timeout_secs(),
            idle_session_ttl_secs: default_idle_session_ttl_secs(),
            role_propagation_delay_secs: default_role_propagation_delay_secs(),
            instruction: default_instruction(),
            poll: PollConfig::default(),
        }
    }
}

/// Bounds for readiness polling during setup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    #[serde(default = "default_poll_interval_secs")]
    pub interval_secs: u64,

    #[serde(default = "default_poll_max_attempts")]
    pub max_attempts: u32,
}

fn default_poll_interval_secs() -> u64 {
    10
}
fn default_poll_max_attempts() -> u32 {
    60
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_poll_interval_secs(),
            max_attempts: default_poll_max_attempts(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.cloudcraft/config.toml).
    ///
    /// Environment variables override the file:
    /// - `CLOUDCRAFT_REGION`
    /// - `CLOUDCRAFT_AGENT_ID`
    /// - `CLOUDCRAFT_AGENT_ALIAS_ID`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(region) = lookup("CLOUDCRAFT_REGION") {
            self.region = region;
        }
        if let Some(agent_id) = lookup("CLOUDCRAFT_AGENT_ID") {
            self.agent.agent_id = agent_id;
        }
        if let Some(alias_id) = lookup("CLOUDCRAFT_AGENT_ALIAS_ID") {
            self.agent.agent_alias_id = alias_id;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".cloudcraft")
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.region.trim().is_empty() {
            return Err(ConfigError::ValidationError("region must not be empty".into()));
        }

        if self.relay.port == 0 {
            return Err(ConfigError::ValidationError(
                "relay.port must be non-zero".into(),
            ));
        }

        if self.setup.poll.interval_secs == 0 || self.setup.poll.max_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "setup.poll.interval_secs and setup.poll.max_attempts must be > 0".into(),
            ));
        }

        Ok(())
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            agent: AgentConfig::default(),
            relay: RelayConfig::default(),
            setup: SetupConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

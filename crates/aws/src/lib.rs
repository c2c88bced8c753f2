//! AWS implementations of the CloudCraft service traits.
//!
//! Each module wraps one SDK client and implements the matching trait from
//! `cloudcraft_core::cloud`. Clients are cheap to clone and safe to share
//! across requests; they carry no request-scoped state.
//!
//! [`AwsServices::load`] builds every client from one shared SDK config.

mod error;
pub mod bedrock;
pub mod iam;
pub mod lambda;
pub mod runtime;
pub mod s3;

use std::sync::Arc;

use aws_config::{BehaviorVersion, Region, SdkConfig};
use cloudcraft_core::cloud::{
    AgentCatalog, AgentRuntime, FunctionService, IdentityService, ObjectStore,
};

pub use bedrock::BedrockAgentCatalog;
pub use iam::IamIdentityService;
pub use lambda::LambdaFunctionService;
pub use runtime::BedrockAgentRuntime;
pub use s3::S3ObjectStore;

/// Load the shared SDK configuration (credentials chain, retry defaults)
/// for `region`.
pub async fn load_sdk_config(region: &str) -> SdkConfig {
    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.to_string()))
        .load()
        .await
}

/// All service clients, behind their trait objects.
#[derive(Clone)]
pub struct AwsServices {
    pub storage: Arc<dyn ObjectStore>,
    pub functions: Arc<dyn FunctionService>,
    pub identity: Arc<dyn IdentityService>,
    pub agents: Arc<dyn AgentCatalog>,
    pub runtime: Arc<dyn AgentRuntime>,
}

impl AwsServices {
    pub fn from_sdk_config(config: &SdkConfig) -> Self {
        Self {
            storage: Arc::new(S3ObjectStore::new(config)),
            functions: Arc::new(LambdaFunctionService::new(config)),
            identity: Arc::new(IamIdentityService::new(config)),
            agents: Arc::new(BedrockAgentCatalog::new(config)),
            runtime: Arc::new(BedrockAgentRuntime::new(config)),
        }
    }

    /// Build every client for `region`.
    pub async fn load(region: &str) -> Self {
        let config = load_sdk_config(region).await;
        tracing::debug!(region, "AWS clients initialised");
        Self::from_sdk_config(&config)
    }
}

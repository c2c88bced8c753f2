//! Lambda-backed [`FunctionService`].

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_lambda::Client;
use aws_sdk_lambda::primitives::Blob;
use aws_sdk_lambda::types::{FunctionCode, Runtime};
use cloudcraft_core::CloudError;
use cloudcraft_core::cloud::{FunctionService, FunctionSpec};

use crate::error::{missing, sdk_error};

#[derive(Clone)]
pub struct LambdaFunctionService {
    client: Client,
}

impl LambdaFunctionService {
    pub fn new(config: &SdkConfig) -> Self {
        Self::from_client(Client::new(config))
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FunctionService for LambdaFunctionService {
    async fn create_function(&self, spec: &FunctionSpec) -> Result<String, CloudError> {
        let code = FunctionCode::builder()
            .zip_file(Blob::new(spec.package.clone()))
            .build();

        let mut request = self
            .client
            .create_function()
            .function_name(&spec.name)
            .runtime(Runtime::from(spec.runtime.as_str()))
            .role(&spec.role_arn)
            .handler(&spec.handler)
            .code(code)
            .publish(spec.publish);
        if let Some(timeout) = spec.timeout_secs {
            request = request.timeout(timeout);
        }

        let output = request.send().await.map_err(sdk_error)?;
        output
            .function_arn()
            .map(str::to_string)
            .ok_or_else(|| missing("FunctionArn"))
    }
}

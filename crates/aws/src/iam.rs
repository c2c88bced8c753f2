//! IAM + STS backed [`IdentityService`].

use async_trait::async_trait;
use aws_config::SdkConfig;
use cloudcraft_core::CloudError;
use cloudcraft_core::cloud::IdentityService;

use crate::error::{missing, sdk_error};

#[derive(Clone)]
pub struct IamIdentityService {
    iam: aws_sdk_iam::Client,
    sts: aws_sdk_sts::Client,
}

impl IamIdentityService {
    pub fn new(config: &SdkConfig) -> Self {
        Self::from_clients(
            aws_sdk_iam::Client::new(config),
            aws_sdk_sts::Client::new(config),
        )
    }

    pub fn from_clients(iam: aws_sdk_iam::Client, sts: aws_sdk_sts::Client) -> Self {
        Self { iam, sts }
    }
}

#[async_trait]
impl IdentityService for IamIdentityService {
    async fn create_role(&self, role_name: &str, trust_policy: &str) -> Result<String, CloudError> {
        let output = self
            .iam
            .create_role()
            .role_name(role_name)
            .assume_role_policy_document(trust_policy)
            .send()
            .await
            .map_err(sdk_error)?;
        output
            .role()
            .map(|role| role.arn().to_string())
            .ok_or_else(|| missing("Role"))
    }

    async fn get_role_arn(&self, role_name: &str) -> Result<String, CloudError> {
        let output = self
            .iam
            .get_role()
            .role_name(role_name)
            .send()
            .await
            .map_err(sdk_error)?;
        output
            .role()
            .map(|role| role.arn().to_string())
            .ok_or_else(|| missing("Role"))
    }

    async fn attach_role_policy(
        &self,
        role_name: &str,
        policy_arn: &str,
    ) -> Result<(), CloudError> {
        self.iam
            .attach_role_policy()
            .role_name(role_name)
            .policy_arn(policy_arn)
            .send()
            .await
            .map_err(sdk_error)?;
        Ok(())
    }

    async fn put_role_policy(
        &self,
        role_name: &str,
        policy_name: &str,
        policy_document: &str,
    ) -> Result<(), CloudError> {
        self.iam
            .put_role_policy()
            .role_name(role_name)
            .policy_name(policy_name)
            .policy_document(policy_document)
            .send()
            .await
            .map_err(sdk_error)?;
        Ok(())
    }

    async fn account_id(&self) -> Result<String, CloudError> {
        let output = self
            .sts
            .get_caller_identity()
            .send()
            .await
            .map_err(sdk_error)?;
        output
            .account()
            .map(str::to_string)
            .ok_or_else(|| missing("Account"))
    }
}

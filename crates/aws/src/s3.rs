//! S3-backed [`ObjectStore`].

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{
    BucketLocationConstraint, CreateBucketConfiguration, IndexDocument, WebsiteConfiguration,
};
use cloudcraft_core::CloudError;
use cloudcraft_core::cloud::{ObjectStore, PutObject};
use tracing::debug;

use crate::error::{build_error, sdk_error};

#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    pub fn new(config: &SdkConfig) -> Self {
        Self::from_client(Client::new(config))
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn create_bucket(
        &self,
        bucket: &str,
        location_constraint: Option<&str>,
    ) -> Result<(), CloudError> {
        let mut request = self.client.create_bucket().bucket(bucket);
        if let Some(region) = location_constraint {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(region))
                    .build(),
            );
        }
        request.send().await.map_err(sdk_error)?;
        debug!(bucket, ?location_constraint, "CreateBucket succeeded");
        Ok(())
    }

    async fn delete_public_access_block(&self, bucket: &str) -> Result<(), CloudError> {
        self.client
            .delete_public_access_block()
            .bucket(bucket)
            .send()
            .await
            .map_err(sdk_error)?;
        Ok(())
    }

    async fn put_bucket_policy(&self, bucket: &str, policy: &str) -> Result<(), CloudError> {
        self.client
            .put_bucket_policy()
            .bucket(bucket)
            .policy(policy)
            .send()
            .await
            .map_err(sdk_error)?;
        Ok(())
    }

    async fn put_bucket_website(
        &self,
        bucket: &str,
        index_document: &str,
    ) -> Result<(), CloudError> {
        let index = IndexDocument::builder()
            .suffix(index_document)
            .build()
            .map_err(build_error)?;
        let website = WebsiteConfiguration::builder().index_document(index).build();

        self.client
            .put_bucket_website()
            .bucket(bucket)
            .website_configuration(website)
            .send()
            .await
            .map_err(sdk_error)?;
        Ok(())
    }

    async fn put_object(&self, object: PutObject) -> Result<(), CloudError> {
        let size = object.body.len();
        self.client
            .put_object()
            .bucket(&object.bucket)
            .key(&object.key)
            .content_type(&object.content_type)
            .body(ByteStream::from(object.body))
            .send()
            .await
            .map_err(sdk_error)?;
        debug!(bucket = %object.bucket, key = %object.key, size, "PutObject succeeded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_s3::operation::create_bucket::CreateBucketOutput;
    use aws_sdk_s3::error::ErrorMetadata;
    use aws_sdk_s3::operation::put_bucket_policy::PutBucketPolicyError;
    use aws_smithy_mocks::{mock, mock_client};

    #[tokio::test]
    async fn default_region_sends_no_location_constraint() {
        let rule = mock!(Client::create_bucket)
            .match_requests(|req| {
                req.bucket() == Some("my-site") && req.create_bucket_configuration().is_none()
            })
            .then_output(|| CreateBucketOutput::builder().build());
        let store = S3ObjectStore::from_client(mock_client!(aws_sdk_s3, [&rule]));

        store.create_bucket("my-site", None).await.unwrap();
        assert_eq!(rule.num_calls(), 1);
    }

    #[tokio::test]
    async fn other_region_sends_location_constraint() {
        let rule = mock!(Client::create_bucket)
            .match_requests(|req| {
                req.create_bucket_configuration()
                    .and_then(|config| config.location_constraint())
                    .map(|constraint| constraint.as_str())
                    == Some("eu-west-1")
            })
            .then_output(|| CreateBucketOutput::builder().build());
        let store = S3ObjectStore::from_client(mock_client!(aws_sdk_s3, [&rule]));

        store.create_bucket("my-site", Some("eu-west-1")).await.unwrap();
        assert_eq!(rule.num_calls(), 1);
    }

    #[tokio::test]
    async fn service_error_keeps_code_and_message() {
        let rule = mock!(Client::put_bucket_policy).then_error(|| {
            PutBucketPolicyError::generic(
                ErrorMetadata::builder()
                    .code("AccessDenied")
                    .message("Access Denied")
                    .build(),
            )
        });
        let store = S3ObjectStore::from_client(mock_client!(aws_sdk_s3, [&rule]));

        let err = store.put_bucket_policy("my-site", "{}").await.unwrap_err();
        match err {
            CloudError::Service { code, message } => {
                assert_eq!(code, "AccessDenied");
                assert_eq!(message, "Access Denied");
            }
            other => panic!("expected service error, got {other:?}"),
        }
    }
}

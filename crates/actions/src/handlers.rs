//! Action handlers, one remote provisioning call each.
//!
//! Handlers check no preconditions: a missing bucket, say, only surfaces
//! as the failure of the remote call itself. Every failure is returned as
//! an [`ActionError`]; handlers never panic past their own boundary.

use cloudcraft_core::action::DEFAULT_REGION;
use cloudcraft_core::cloud::{FunctionService, ObjectStore};
use cloudcraft_core::{ActionError, ActionOutcome, CloudError};

use crate::placeholder;

/// Index document used for static website hosting.
pub const INDEX_DOCUMENT: &str = "index.html";

fn failed(operation: impl Into<String>) -> impl FnOnce(CloudError) -> ActionError {
    let operation = operation.into();
    move |cause| ActionError::RemoteCallFailed { operation, cause }
}

/// Anonymous read access to every object in `bucket`.
pub fn public_read_policy(bucket: &str) -> String {
    serde_json::json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Sid": "PublicReadGetObject",
            "Effect": "Allow",
            "Principal": "*",
            "Action": ["s3:GetObject"],
            "Resource": format!("arn:aws:s3:::{bucket}/*")
        }]
    })
    .to_string()
}

/// Create a bucket. The default region is created without a location
/// constraint; any other region gets one.
pub async fn create_bucket(
    store: &dyn ObjectStore,
    bucket_name: &str,
    region: &str,
) -> Result<ActionOutcome, ActionError> {
    let location = (region != DEFAULT_REGION).then_some(region);
    store
        .create_bucket(bucket_name, location)
        .await
        .map_err(failed(format!("create bucket '{bucket_name}'")))?;
    Ok(ActionOutcome::new(format!(
        "Bucket '{bucket_name}' created in region {region}."
    )))
}

pub async fn disable_public_access_block(
    store: &dyn ObjectStore,
    bucket_name: &str,
) -> Result<ActionOutcome, ActionError> {
    store
        .delete_public_access_block(bucket_name)
        .await
        .map_err(failed("disable Block Public Access"))?;
    Ok(ActionOutcome::new(format!(
        "Disabled Block Public Access for '{bucket_name}'."
    )))
}

pub async fn set_public_read_policy(
    store: &dyn ObjectStore,
    bucket_name: &str,
) -> Result<ActionOutcome, ActionError> {
    store
        .put_bucket_policy(bucket_name, &public_read_policy(bucket_name))
        .await
        .map_err(failed("set bucket policy"))?;
    Ok(ActionOutcome::new(format!(
        "Set public read policy on '{bucket_name}'."
    )))
}

pub async fn enable_static_hosting(
    store: &dyn ObjectStore,
    bucket_name: &str,
) -> Result<ActionOutcome, ActionError> {
    store
        .put_bucket_website(bucket_name, INDEX_DOCUMENT)
        .await
        .map_err(failed("configure hosting"))?;
    Ok(ActionOutcome::new(format!(
        "Configured static hosting for '{bucket_name}'."
    )))
}

/// Create the placeholder function. A name collision is reported as
/// [`ActionError::ResourceConflict`], distinct from other failures.
pub async fn create_placeholder_function(
    functions: &dyn FunctionService,
    function_name: &str,
    role_arn: &str,
) -> Result<ActionOutcome, ActionError> {
    let operation = format!("create Lambda function '{function_name}'");
    let spec = placeholder::function_spec(function_name, role_arn)
        .map_err(failed(operation.clone()))?;

    match functions.create_function(&spec).await {
        Ok(arn) => Ok(ActionOutcome::new(format!(
            "Lambda function '{function_name}' created. ARN: {arn}"
        ))),
        Err(cause) if cause.is_conflict() => Err(ActionError::ResourceConflict {
            resource: "Lambda function".into(),
            name: function_name.to_string(),
        }),
        Err(cause) => Err(ActionError::RemoteCallFailed { operation, cause }),
    }
}

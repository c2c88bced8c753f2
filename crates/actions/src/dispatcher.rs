//! Action-group dispatcher.
//!
//! [`Dispatcher::execute`] routes a typed [`Action`] to its handler.
//! [`Dispatcher::dispatch`] is the platform adapter around it: it accepts the
//! raw function-call event and always returns a well-formed envelope, with
//! every failure rendered as `Error: ...` text instead of propagated.

use std::sync::Arc;
use std::time::Instant;

use cloudcraft_core::action::response_body;
use cloudcraft_core::cloud::{FunctionService, ObjectStore};
use cloudcraft_core::{Action, ActionError, ActionOutcome, ActionRequest, ResponseEnvelope};
use tracing::{info, warn};

use crate::handlers;

/// Routes agent function calls to the provisioning handlers.
#[derive(Clone)]
pub struct Dispatcher {
    storage: Arc<dyn ObjectStore>,
    functions: Arc<dyn FunctionService>,
}

impl Dispatcher {
    pub fn new(storage: Arc<dyn ObjectStore>, functions: Arc<dyn FunctionService>) -> Self {
        Self { storage, functions }
    }

    /// Run one action. Exactly one remote call is made.
    pub async fn execute(&self, action: &Action) -> Result<ActionOutcome, ActionError> {
        let storage = self.storage.as_ref();
        match action {
            Action::CreateBucket {
                bucket_name,
                region,
            } => handlers::create_bucket(storage, bucket_name, region).await,
            Action::DisablePublicAccessBlock { bucket_name } => {
                handlers::disable_public_access_block(storage, bucket_name).await
            }
            Action::SetPublicReadPolicy { bucket_name } => {
                handlers::set_public_read_policy(storage, bucket_name).await
            }
            Action::EnableStaticHosting { bucket_name } => {
                handlers::enable_static_hosting(storage, bucket_name).await
            }
            Action::CreatePlaceholderFunction {
                function_name,
                role_arn,
            } => {
                handlers::create_placeholder_function(
                    self.functions.as_ref(),
                    function_name,
                    role_arn,
                )
                .await
            }
        }
    }

    /// Handle one platform function-call event.
    ///
    /// Unknown functions and missing parameters never reach a handler.
    pub async fn dispatch(&self, request: &ActionRequest) -> ResponseEnvelope {
        let start = Instant::now();
        let result = match request.action() {
            Ok(action) => self.execute(&action).await,
            Err(e) => Err(e),
        };

        let elapsed_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => info!(
                action_group = %request.action_group,
                function = %request.function,
                elapsed_ms,
                "Action succeeded"
            ),
            Err(e) => warn!(
                action_group = %request.action_group,
                function = %request.function,
                elapsed_ms,
                error = %e,
                "Action failed"
            ),
        }

        ResponseEnvelope::for_request(request, response_body(&result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{MockFunctions, MockStore, StoreCall};
    use cloudcraft_core::CloudError;

    fn dispatcher(store: &Arc<MockStore>, functions: &Arc<MockFunctions>) -> Dispatcher {
        Dispatcher::new(store.clone(), functions.clone())
    }

    fn all_requests() -> Vec<ActionRequest> {
        vec![
            ActionRequest::new("CloudCraftTools", "create_s3_bucket")
                .with_parameter("bucket_name", "site")
                .with_parameter("region", "us-east-1"),
            ActionRequest::new("CloudCraftTools", "disable_s3_block_public_access")
                .with_parameter("bucket_name", "site"),
            ActionRequest::new("CloudCraftTools", "set_public_read_policy")
                .with_parameter("bucket_name", "site"),
            ActionRequest::new("CloudCraftTools", "configure_s3_static_hosting")
                .with_parameter("bucket_name", "site"),
            ActionRequest::new("CloudCraftTools", "create_hello_world_lambda")
                .with_parameter("function_name", "hello")
                .with_parameter("role_arn", "arn:aws:iam::123456789012:role/r"),
        ]
    }

    #[tokio::test]
    async fn every_action_succeeds_and_echoes_request() {
        let store = Arc::new(MockStore::new());
        let functions = Arc::new(MockFunctions::new());
        let dispatcher = dispatcher(&store, &functions);

        for request in all_requests() {
            let envelope = dispatcher.dispatch(&request).await;
            assert!(
                envelope.body().starts_with("Success: "),
                "{}: {}",
                request.function,
                envelope.body()
            );
            assert_eq!(envelope.message_version, "1.0");
            assert_eq!(envelope.response.action_group, "CloudCraftTools");
            assert_eq!(envelope.response.function, request.function);
        }

        assert_eq!(store.calls().len(), 4);
        assert_eq!(functions.created().len(), 1);
    }

    #[tokio::test]
    async fn every_action_reports_remote_failure() {
        let cause = CloudError::from_code("AccessDenied", "Access Denied for this principal");
        let store = Arc::new(MockStore::failing(cause.clone()));
        let functions = Arc::new(MockFunctions::failing(cause));
        let dispatcher = dispatcher(&store, &functions);

        for request in all_requests() {
            let envelope = dispatcher.dispatch(&request).await;
            let body = envelope.body();
            assert!(body.starts_with("Error: "), "{}: {body}", request.function);
            assert!(body.contains("Access Denied for this principal"), "{body}");
        }
    }

    #[tokio::test]
    async fn unknown_function_invokes_nothing() {
        let store = Arc::new(MockStore::new());
        let functions = Arc::new(MockFunctions::new());
        let dispatcher = dispatcher(&store, &functions);

        let request =
            ActionRequest::new("CloudCraftTools", "delete_everything").with_parameter("x", "y");
        let envelope = dispatcher.dispatch(&request).await;

        assert_eq!(envelope.body(), "Error: Unknown function 'delete_everything'");
        assert_eq!(envelope.response.function, "delete_everything");
        assert!(store.calls().is_empty());
        assert!(functions.created().is_empty());
    }

    #[tokio::test]
    async fn missing_parameter_invokes_nothing() {
        let store = Arc::new(MockStore::new());
        let functions = Arc::new(MockFunctions::new());
        let dispatcher = dispatcher(&store, &functions);

        let request = ActionRequest::new("CloudCraftTools", "set_public_read_policy");
        let envelope = dispatcher.dispatch(&request).await;

        assert!(envelope.body().starts_with("Error: Missing required parameter 'bucket_name'"));
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn bucket_region_controls_location_constraint() {
        let store = Arc::new(MockStore::new());
        let functions = Arc::new(MockFunctions::new());
        let dispatcher = dispatcher(&store, &functions);

        for region in ["us-east-1", "eu-west-1"] {
            let request = ActionRequest::new("CloudCraftTools", "create_s3_bucket")
                .with_parameter("bucket_name", "site")
                .with_parameter("region", region);
            let envelope = dispatcher.dispatch(&request).await;
            assert_eq!(
                envelope.body(),
                format!("Success: Bucket 'site' created in region {region}.")
            );
        }

        assert_eq!(
            store.calls(),
            vec![
                StoreCall::CreateBucket {
                    bucket: "site".into(),
                    location: None
                },
                StoreCall::CreateBucket {
                    bucket: "site".into(),
                    location: Some("eu-west-1".into())
                },
            ]
        );
    }

    #[tokio::test]
    async fn function_conflict_has_its_own_message() {
        let store = Arc::new(MockStore::new());
        let functions = Arc::new(MockFunctions::failing(CloudError::from_code(
            "ResourceConflictException",
            "Function already exist: hello",
        )));
        let dispatcher = dispatcher(&store, &functions);

        let request = ActionRequest::new("CloudCraftTools", "create_hello_world_lambda")
            .with_parameter("function_name", "hello")
            .with_parameter("role_arn", "arn:role");
        let envelope = dispatcher.dispatch(&request).await;
        assert_eq!(
            envelope.body(),
            "Error: Lambda function 'hello' already exists."
        );
    }

    #[tokio::test]
    async fn repeated_parameter_uses_last_value() {
        let store = Arc::new(MockStore::new());
        let functions = Arc::new(MockFunctions::new());
        let dispatcher = dispatcher(&store, &functions);

        let request = ActionRequest::new("CloudCraftTools", "configure_s3_static_hosting")
            .with_parameter("bucket_name", "first")
            .with_parameter("bucket_name", "second");
        dispatcher.dispatch(&request).await;

        assert_eq!(
            store.calls(),
            vec![StoreCall::PutBucketWebsite {
                bucket: "second".into(),
                index_document: "index.html".into()
            }]
        );
    }

    #[tokio::test]
    async fn session_attributes_are_echoed() {
        let store = Arc::new(MockStore::new());
        let functions = Arc::new(MockFunctions::new());
        let dispatcher = dispatcher(&store, &functions);

        let mut request = ActionRequest::new("CloudCraftTools", "set_public_read_policy")
            .with_parameter("bucket_name", "site");
        let mut attrs = serde_json::Map::new();
        attrs.insert("user".into(), serde_json::Value::String("alice".into()));
        request.session_attributes = Some(attrs.clone());

        let envelope = dispatcher.dispatch(&request).await;
        assert_eq!(envelope.session_attributes, Some(attrs));
    }
}

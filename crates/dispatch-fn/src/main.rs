//! Action-group dispatch function.
//!
//! Deployed as the executor of the agent's action group. Each invocation
//! carries one function call; the reply is always a response envelope, with
//! action failures reported in its text body.

use aws_config::BehaviorVersion;
use cloudcraft_actions::Dispatcher;
use cloudcraft_aws::AwsServices;
use cloudcraft_core::{ActionRequest, ResponseEnvelope};
use lambda_runtime::{Error, LambdaEvent, run, service_fn};
use tracing::info;

async fn handle(
    dispatcher: &Dispatcher,
    event: LambdaEvent<ActionRequest>,
) -> Result<ResponseEnvelope, Error> {
    let request = event.payload;
    let arguments = request.arguments();
    info!(
        request_id = %event.context.request_id,
        function = %request.function,
        ?arguments,
        "Received function call"
    );

    Ok(dispatcher.dispatch(&request).await)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_target(false)
        .without_time()
        .init();

    let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let services = AwsServices::from_sdk_config(&sdk_config);
    let dispatcher = Dispatcher::new(services.storage, services.functions);

    let dispatcher = &dispatcher;
    run(service_fn(move |event| async move { handle(dispatcher, event).await })).await
}

//! Bedrock Agent Runtime backed [`AgentRuntime`].

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_bedrockagentruntime::Client;
use aws_sdk_bedrockagentruntime::error::DisplayErrorContext;
use aws_sdk_bedrockagentruntime::types::ResponseStream;
use cloudcraft_core::CloudError;
use cloudcraft_core::cloud::{AgentInvocation, AgentRuntime, CompletionStream};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::sdk_error;

const CHUNK_BUFFER: usize = 32;

#[derive(Clone)]
pub struct BedrockAgentRuntime {
    client: Client,
}

impl BedrockAgentRuntime {
    pub fn new(config: &SdkConfig) -> Self {
        Self::from_client(Client::new(config))
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AgentRuntime for BedrockAgentRuntime {
    async fn invoke_agent(
        &self,
        invocation: &AgentInvocation,
    ) -> Result<CompletionStream, CloudError> {
        let mut output = self
            .client
            .invoke_agent()
            .agent_id(&invocation.agent_id)
            .agent_alias_id(&invocation.agent_alias_id)
            .session_id(&invocation.session_id)
            .input_text(&invocation.input_text)
            .send()
            .await
            .map_err(sdk_error)?;

        let (tx, rx) = mpsc::channel(CHUNK_BUFFER);
        tokio::spawn(async move {
            while deliver(step(output.completion.recv().await), &tx).await {}
        });

        Ok(rx)
    }
}

/// What the forwarding task does with one event from the completion stream.
#[derive(Debug, PartialEq)]
enum Step {
    Forward(Vec<u8>),
    Skip,
    Finish,
    Fail(String),
}

fn step<E: std::error::Error>(event: Result<Option<ResponseStream>, E>) -> Step {
    match event {
        Ok(Some(ResponseStream::Chunk(part))) => match part.bytes() {
            Some(bytes) => Step::Forward(bytes.as_ref().to_vec()),
            None => Step::Skip,
        },
        // Traces, return-control and file events carry no answer text
        Ok(Some(_)) => Step::Skip,
        Ok(None) => Step::Finish,
        Err(e) => Step::Fail(DisplayErrorContext(&e).to_string()),
    }
}

/// Apply one step. Returns `false` once the stream should stop.
async fn deliver(step: Step, tx: &mpsc::Sender<Result<Vec<u8>, CloudError>>) -> bool {
    match step {
        Step::Forward(bytes) => {
            if tx.send(Ok(bytes)).await.is_err() {
                debug!("Completion receiver dropped; abandoning stream");
                return false;
            }
            true
        }
        Step::Skip => true,
        Step::Finish => false,
        Step::Fail(message) => {
            warn!(error = %message, "Agent completion stream failed");
            let _ = tx.send(Err(CloudError::Stream(message))).await;
            false
        }
    }
}

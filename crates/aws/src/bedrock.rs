//! Bedrock Agent backed [`AgentCatalog`].
//!
//! Manages the agent definition itself: creation, action groups,
//! preparation and aliases. Invocation lives in [`crate::runtime`].

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_bedrockagent::Client;
use aws_sdk_bedrockagent::types::{
    ActionGroupExecutor, Function, FunctionSchema, ParameterDetail, Type,
};
use cloudcraft_core::CloudError;
use cloudcraft_core::cloud::{
    ActionGroupDefinition, AgentCatalog, AgentDefinition, AgentStatus, AgentSummary,
    FunctionDefinition,
};

use crate::error::{build_error, missing, sdk_error};

#[derive(Clone)]
pub struct BedrockAgentCatalog {
    client: Client,
}

impl BedrockAgentCatalog {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }
}

fn summary(agent: &aws_sdk_bedrockagent::types::Agent) -> AgentSummary {
    AgentSummary {
        agent_id: agent.agent_id().to_string(),
        name: agent.agent_name().to_string(),
        status: AgentStatus::parse(agent.agent_status().as_str()),
    }
}

fn to_sdk_function(definition: &FunctionDefinition) -> Result<Function, CloudError> {
    let mut builder = Function::builder()
        .name(&definition.name)
        .description(&definition.description);
    for param in &definition.parameters {
        let detail = ParameterDetail::builder()
            .description(&param.description)
            .r#type(Type::from(param.value_type.as_str()))
            .required(param.required)
            .build()
            .map_err(build_error)?;
        builder = builder.parameters(&param.name, detail);
    }
    builder.build().map_err(build_error)
}

#[async_trait]
impl AgentCatalog for BedrockAgentCatalog {
    async fn create_agent(&self, definition: &AgentDefinition) -> Result<AgentSummary, CloudError> {
        let output = self
            .client
            .create_agent()
            .agent_name(&definition.name)
            .agent_resource_role_arn(&definition.role_arn)
            .foundation_model(&definition.foundation_model)
            .instruction(&definition.instruction)
            .idle_session_ttl_in_seconds(definition.idle_session_ttl_secs)
            .send()
            .await
            .map_err(sdk_error)?;
        output.agent().map(summary).ok_or_else(|| missing("agent"))
    }

    async fn find_agent_by_name(&self, name: &str) -> Result<Option<AgentSummary>, CloudError> {
        let mut next_token: Option<String> = None;
        loop {
            let output = self
                .client
                .list_agents()
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(sdk_error)?;

            if let Some(found) = output
                .agent_summaries()
                .iter()
                .find(|agent| agent.agent_name() == name)
            {
                return Ok(Some(AgentSummary {
                    agent_id: found.agent_id().to_string(),
                    name: found.agent_name().to_string(),
                    status: AgentStatus::parse(found.agent_status().as_str()),
                }));
            }

            match output.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => return Ok(None),
            }
        }
    }

    async fn get_agent(&self, agent_id: &str) -> Result<AgentSummary, CloudError> {
        let output = self
            .client
            .get_agent()
            .agent_id(agent_id)
            .send()
            .await
            .map_err(sdk_error)?;
        output.agent().map(summary).ok_or_else(|| missing("agent"))
    }

    async fn create_action_group(&self, group: &ActionGroupDefinition) -> Result<(), CloudError> {
        let functions = group
            .functions
            .iter()
            .map(to_sdk_function)
            .collect::<Result<Vec<_>, _>>()?;

        self.client
            .create_agent_action_group()
            .agent_id(&group.agent_id)
            .agent_version(&group.agent_version)
            .action_group_name(&group.name)
            .action_group_executor(ActionGroupExecutor::Lambda(group.executor_arn.clone()))
            .function_schema(FunctionSchema::Functions(functions))
            .send()
            .await
            .map_err(sdk_error)?;
        Ok(())
    }

    async fn prepare_agent(&self, agent_id: &str) -> Result<(), CloudError> {
        self.client
            .prepare_agent()
            .agent_id(agent_id)
            .send()
            .await
            .map_err(sdk_error)?;
        Ok(())
    }

    async fn create_alias(&self, agent_id: &str, alias_name: &str) -> Result<String, CloudError> {
        let output = self
            .client
            .create_agent_alias()
            .agent_id(agent_id)
            .agent_alias_name(alias_name)
            .send()
            .await
            .map_err(sdk_error)?;
        output
            .agent_alias()
            .map(|alias| alias.agent_alias_id().to_string())
            .ok_or_else(|| missing("agentAlias"))
    }

    async fn find_alias_by_name(
        &self,
        agent_id: &str,
        alias_name: &str,
    ) -> Result<Option<String>, CloudError> {
        let mut next_token: Option<String> = None;
        loop {
            let output = self
                .client
                .list_agent_aliases()
                .agent_id(agent_id)
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(sdk_error)?;

            if let Some(found) = output
                .agent_alias_summaries()
                .iter()
                .find(|alias| alias.agent_alias_name() == alias_name)
            {
                return Ok(Some(found.agent_alias_id().to_string()));
            }

            match output.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => return Ok(None),
            }
        }
    }
}

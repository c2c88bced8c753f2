//! One-time infrastructure setup for the CloudCraft agent.
//!
//! [`Provisioner::run`] creates, in order: the dispatch function's role, the
//! agent's role, the dispatch function, the agent definition, its action
//! group, a prepared draft, and an alias. Every step tolerates the resource
//! already existing, so setup can be re-run after a partial failure. Waits
//! on remote state are bounded by [`PollPolicy`].

mod error;
pub mod policy;
pub mod wait;

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::info;

use cloudcraft_actions::action_schema;
use cloudcraft_config::SetupConfig;
use cloudcraft_core::cloud::{
    ActionGroupDefinition, AgentCatalog, AgentDefinition, AgentStatus, FunctionService,
    FunctionSpec, IdentityService,
};

pub use error::ProvisionError;
use error::at;
pub use wait::{PollPolicy, Readiness, wait_for};

/// Version of the agent that action groups are attached to before preparing.
const DRAFT_VERSION: &str = "DRAFT";

/// Identifiers of everything setup created or found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisionReport {
    pub function_role_arn: String,
    pub agent_role_arn: String,
    pub function_arn: String,
    pub agent_id: String,
    pub agent_alias_id: String,
}

impl ProvisionReport {
    /// The `[agent]` config section the relay needs.
    pub fn agent_snippet(&self) -> String {
        format!(
            "[agent]\nagent_id = \"{}\"\nagent_alias_id = \"{}\"\n",
            self.agent_id, self.agent_alias_id
        )
    }
}

pub struct Provisioner {
    identity: Arc<dyn IdentityService>,
    functions: Arc<dyn FunctionService>,
    agents: Arc<dyn AgentCatalog>,
    region: String,
    setup: SetupConfig,
}

impl Provisioner {
    pub fn new(
        identity: Arc<dyn IdentityService>,
        functions: Arc<dyn FunctionService>,
        agents: Arc<dyn AgentCatalog>,
        region: impl Into<String>,
        setup: SetupConfig,
    ) -> Self {
        Self {
            identity,
            functions,
            agents,
            region: region.into(),
            setup,
        }
    }

    fn poll_policy(&self) -> PollPolicy {
        PollPolicy::from(&self.setup.poll)
    }

    /// Run every setup step in order.
    pub async fn run(&self) -> Result<ProvisionReport, ProvisionError> {
        info!(step = 1, role = %self.setup.function_role_name, "Creating function role");
        let function_role_arn = self.function_role().await?;

        info!(step = 2, role = %self.setup.agent_role_name, "Creating agent role");
        let agent_role_arn = self.agent_role().await?;

        let delay = self.setup.role_propagation_delay_secs;
        info!(step = 3, delay_secs = delay, "Waiting for roles to propagate");
        tokio::time::sleep(Duration::from_secs(delay)).await;

        info!(step = 4, function = %self.setup.function_name, "Creating dispatch function");
        let function_arn = self.dispatch_function(&function_role_arn).await?;

        info!(step = 5, agent = %self.setup.agent_name, "Creating agent");
        let agent_id = self.agent(&agent_role_arn).await?;

        info!(step = 6, agent_id = %agent_id, "Waiting for agent creation");
        self.wait_until_created(&agent_id).await?;

        info!(step = 7, group = %self.setup.action_group_name, "Creating action group");
        self.action_group(&agent_id, &function_arn).await?;

        info!(step = 8, agent_id = %agent_id, "Preparing agent");
        self.prepare(&agent_id).await?;

        info!(step = 9, alias = %self.setup.alias_name, "Creating alias");
        let agent_alias_id = self.alias(&agent_id).await?;

        info!(agent_id = %agent_id, agent_alias_id = %agent_alias_id, "Setup complete");
        Ok(ProvisionReport {
            function_role_arn,
            agent_role_arn,
            function_arn,
            agent_id,
            agent_alias_id,
        })
    }

    /// Create `role_name`, or look up its ARN if it already exists.
    async fn ensure_role(
        &self,
        role_name: &str,
        trust_policy: &str,
    ) -> Result<String, ProvisionError> {
        match self.identity.create_role(role_name, trust_policy).await {
            Ok(arn) => Ok(arn),
            Err(e) if e.is_conflict() => {
                info!(role = %role_name, "Role already exists, fetching ARN");
                self.identity
                    .get_role_arn(role_name)
                    .await
                    .map_err(at("get role"))
            }
            Err(e) => Err(at("create role")(e)),
        }
    }

    async fn function_role(&self) -> Result<String, ProvisionError> {
        let role_name = &self.setup.function_role_name;
        let arn = self
            .ensure_role(
                role_name,
                &policy::trust_policy(policy::FUNCTION_SERVICE_PRINCIPAL),
            )
            .await?;
        for policy_arn in policy::FUNCTION_ROLE_POLICIES {
            self.identity
                .attach_role_policy(role_name, policy_arn)
                .await
                .map_err(at("attach role policy"))?;
        }
        Ok(arn)
    }

    async fn agent_role(&self) -> Result<String, ProvisionError> {
        let role_name = &self.setup.agent_role_name;
        let arn = self
            .ensure_role(role_name, &policy::trust_policy(policy::AGENT_SERVICE_PRINCIPAL))
            .await?;
        self.identity
            .put_role_policy(
                role_name,
                policy::MODEL_INVOKE_POLICY_NAME,
                &policy::model_invoke_policy(&self.region, &self.setup.foundation_model),
            )
            .await
            .map_err(at("put role policy"))?;
        Ok(arn)
    }

    async fn dispatch_function(&self, role_arn: &str) -> Result<String, ProvisionError> {
        let path = &self.setup.package_path;
        let package = tokio::fs::read(path)
            .await
            .map_err(|e| ProvisionError::Package {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        let spec = FunctionSpec {
            name: self.setup.function_name.clone(),
            runtime: self.setup.function_runtime.clone(),
            role_arn: role_arn.to_string(),
            handler: self.setup.function_handler.clone(),
            package,
            timeout_secs: Some(self.setup.function_timeout_secs),
            publish: true,
        };

        match self.functions.create_function(&spec).await {
            Ok(arn) => Ok(arn),
            Err(e) if e.is_conflict() => {
                info!(function = %spec.name, "Function already exists, skipping");
                let account = self
                    .identity
                    .account_id()
                    .await
                    .map_err(at("get caller identity"))?;
                Ok(format!(
                    "arn:aws:lambda:{}:{account}:function:{}",
                    self.region, spec.name
                ))
            }
            Err(e) => Err(at("create function")(e)),
        }
    }

    async fn agent(&self, role_arn: &str) -> Result<String, ProvisionError> {
        let definition = AgentDefinition {
            name: self.setup.agent_name.clone(),
            role_arn: role_arn.to_string(),
            foundation_model: self.setup.foundation_model.clone(),
            instruction: self.setup.instruction.clone(),
            idle_session_ttl_secs: self.setup.idle_session_ttl_secs,
        };

        match self.agents.create_agent(&definition).await {
            Ok(summary) => Ok(summary.agent_id),
            Err(e) if e.is_conflict() => {
                info!(agent = %definition.name, "Agent already exists, fetching details");
                self.agents
                    .find_agent_by_name(&definition.name)
                    .await
                    .map_err(at("list agents"))?
                    .map(|summary| summary.agent_id)
                    .ok_or(ProvisionError::NotFound {
                        kind: "Agent",
                        name: definition.name,
                    })
            }
            Err(e) => Err(at("create agent")(e)),
        }
    }

    async fn wait_until_created(&self, agent_id: &str) -> Result<(), ProvisionError> {
        let agents = &self.agents;
        wait_for("agent creation", self.poll_policy(), move || async move {
            let summary = agents.get_agent(agent_id).await.map_err(at("get agent"))?;
            info!(agent_id, status = %summary.status, "Agent status");
            Ok(match summary.status {
                AgentStatus::Creating => Readiness::Pending,
                _ => Readiness::Ready(()),
            })
        })
        .await
    }

    async fn action_group(&self, agent_id: &str, function_arn: &str) -> Result<(), ProvisionError> {
        let group = ActionGroupDefinition {
            agent_id: agent_id.to_string(),
            agent_version: DRAFT_VERSION.into(),
            name: self.setup.action_group_name.clone(),
            executor_arn: function_arn.to_string(),
            functions: action_schema(),
        };

        match self.agents.create_action_group(&group).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_conflict() => {
                info!(group = %group.name, "Action group already exists, skipping");
                Ok(())
            }
            Err(e) => Err(at("create action group")(e)),
        }
    }

    /// Start preparation and wait for `PREPARED`. `FAILED` aborts the wait.
    async fn prepare(&self, agent_id: &str) -> Result<(), ProvisionError> {
        self.agents
            .prepare_agent(agent_id)
            .await
            .map_err(at("prepare agent"))?;

        let agents = &self.agents;
        wait_for("agent preparation", self.poll_policy(), move || async move {
            let summary = agents.get_agent(agent_id).await.map_err(at("get agent"))?;
            info!(agent_id, status = %summary.status, "Agent status");
            match summary.status {
                AgentStatus::Prepared => Ok(Readiness::Ready(())),
                AgentStatus::Failed => Err(ProvisionError::AgentFailed {
                    agent_id: agent_id.to_string(),
                    status: summary.status.to_string(),
                }),
                _ => Ok(Readiness::Pending),
            }
        })
        .await
    }

    async fn alias(&self, agent_id: &str) -> Result<String, ProvisionError> {
        let alias_name = &self.setup.alias_name;
        match self.agents.create_alias(agent_id, alias_name).await {
            Ok(alias_id) => Ok(alias_id),
            Err(e) if e.is_conflict() => {
                info!(alias = %alias_name, "Alias already exists, fetching ID");
                self.agents
                    .find_alias_by_name(agent_id, alias_name)
                    .await
                    .map_err(at("list aliases"))?
                    .ok_or_else(|| ProvisionError::NotFound {
                        kind: "Alias",
                        name: alias_name.clone(),
                    })
            }
            Err(e) => Err(at("create alias")(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cloudcraft_core::CloudError;
    use cloudcraft_core::cloud::AgentSummary;
    use std::collections::VecDeque;
    use std::io::Write;
    use std::sync::Mutex;

    const ACCOUNT: &str = "123456789012";

    fn conflict(code: &str) -> CloudError {
        CloudError::from_code(code, "already exists")
    }

    fn role_arn(name: &str) -> String {
        format!("arn:aws:iam::{ACCOUNT}:role/{name}")
    }

    #[derive(Default)]
    struct MockIdentity {
        roles_exist: bool,
        attached: Mutex<Vec<(String, String)>>,
        inline: Mutex<Vec<(String, String, String)>>,
    }

    #[async_trait]
    impl IdentityService for MockIdentity {
        async fn create_role(&self, role_name: &str, _: &str) -> Result<String, CloudError> {
            if self.roles_exist {
                Err(conflict("EntityAlreadyExists"))
            } else {
                Ok(role_arn(role_name))
            }
        }

        async fn get_role_arn(&self, role_name: &str) -> Result<String, CloudError> {
            Ok(role_arn(role_name))
        }

        async fn attach_role_policy(
            &self,
            role_name: &str,
            policy_arn: &str,
        ) -> Result<(), CloudError> {
            self.attached
                .lock()
                .unwrap()
                .push((role_name.into(), policy_arn.into()));
            Ok(())
        }

        async fn put_role_policy(
            &self,
            role_name: &str,
            policy_name: &str,
            policy_document: &str,
        ) -> Result<(), CloudError> {
            self.inline.lock().unwrap().push((
                role_name.into(),
                policy_name.into(),
                policy_document.into(),
            ));
            Ok(())
        }

        async fn account_id(&self) -> Result<String, CloudError> {
            Ok(ACCOUNT.into())
        }
    }

    #[derive(Default)]
    struct MockFunctions {
        exists: bool,
        created: Mutex<Vec<FunctionSpec>>,
    }

    #[async_trait]
    impl FunctionService for MockFunctions {
        async fn create_function(&self, spec: &FunctionSpec) -> Result<String, CloudError> {
            self.created.lock().unwrap().push(spec.clone());
            if self.exists {
                Err(conflict("ResourceConflictException"))
            } else {
                Ok(format!("arn:aws:lambda:us-east-1:{ACCOUNT}:function:{}", spec.name))
            }
        }
    }

    /// Scripted agent catalog. `get_agent` pops statuses in order and keeps
    /// returning the last one.
    #[derive(Default)]
    struct MockCatalog {
        agent_exists: bool,
        existing_agent_listed: bool,
        group_exists: bool,
        alias_exists: bool,
        statuses: Mutex<VecDeque<AgentStatus>>,
        groups: Mutex<Vec<ActionGroupDefinition>>,
        prepared: Mutex<u32>,
        aliases: Mutex<Vec<String>>,
    }

    impl MockCatalog {
        fn with_statuses(statuses: &[AgentStatus]) -> Self {
            Self {
                statuses: Mutex::new(statuses.iter().cloned().collect()),
                ..Default::default()
            }
        }

        fn summary(status: AgentStatus) -> AgentSummary {
            AgentSummary {
                agent_id: "AGENT1".into(),
                name: "CloudCraftAgent-Automated".into(),
                status,
            }
        }
    }

    #[async_trait]
    impl AgentCatalog for MockCatalog {
        async fn create_agent(&self, _: &AgentDefinition) -> Result<AgentSummary, CloudError> {
            if self.agent_exists {
                Err(conflict("ConflictException"))
            } else {
                Ok(Self::summary(AgentStatus::Creating))
            }
        }

        async fn find_agent_by_name(&self, _: &str) -> Result<Option<AgentSummary>, CloudError> {
            Ok(self
                .existing_agent_listed
                .then(|| Self::summary(AgentStatus::NotPrepared)))
        }

        async fn get_agent(&self, _: &str) -> Result<AgentSummary, CloudError> {
            let mut statuses = self.statuses.lock().unwrap();
            let status = if statuses.len() > 1 {
                statuses.pop_front()
            } else {
                statuses.front().cloned()
            };
            Ok(Self::summary(status.unwrap_or(AgentStatus::Prepared)))
        }

        async fn create_action_group(&self, group: &ActionGroupDefinition) -> Result<(), CloudError> {
            self.groups.lock().unwrap().push(group.clone());
            if self.group_exists {
                Err(conflict("ConflictException"))
            } else {
                Ok(())
            }
        }

        async fn prepare_agent(&self, _: &str) -> Result<(), CloudError> {
            *self.prepared.lock().unwrap() += 1;
            Ok(())
        }

        async fn create_alias(&self, _: &str, alias_name: &str) -> Result<String, CloudError> {
            self.aliases.lock().unwrap().push(alias_name.into());
            if self.alias_exists {
                Err(conflict("ConflictException"))
            } else {
                Ok("ALIAS1".into())
            }
        }

        async fn find_alias_by_name(&self, _: &str, _: &str) -> Result<Option<String>, CloudError> {
            Ok(Some("EXISTING_ALIAS".into()))
        }
    }

    fn package_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"PK\x03\x04bootstrap").unwrap();
        file
    }

    fn setup(package: &tempfile::NamedTempFile) -> SetupConfig {
        let mut setup = SetupConfig {
            package_path: package.path().to_path_buf(),
            ..Default::default()
        };
        setup.poll.max_attempts = 3;
        setup
    }

    fn provisioner(
        identity: &Arc<MockIdentity>,
        functions: &Arc<MockFunctions>,
        catalog: &Arc<MockCatalog>,
        setup: SetupConfig,
    ) -> Provisioner {
        Provisioner::new(
            identity.clone(),
            functions.clone(),
            catalog.clone(),
            "us-east-1",
            setup,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn fresh_account_creates_everything() {
        let package = package_file();
        let identity = Arc::new(MockIdentity::default());
        let functions = Arc::new(MockFunctions::default());
        let catalog = Arc::new(MockCatalog::with_statuses(&[
            AgentStatus::Creating,
            AgentStatus::NotPrepared,
            AgentStatus::Preparing,
            AgentStatus::Prepared,
        ]));

        let report = provisioner(&identity, &functions, &catalog, setup(&package))
            .run()
            .await
            .unwrap();

        assert_eq!(
            report,
            ProvisionReport {
                function_role_arn: role_arn("CloudCraftLambdaRole-Automated"),
                agent_role_arn: role_arn("CloudCraftAgentRole-Automated"),
                function_arn: format!(
                    "arn:aws:lambda:us-east-1:{ACCOUNT}:function:CloudCraftActionGroup-Automated"
                ),
                agent_id: "AGENT1".into(),
                agent_alias_id: "ALIAS1".into(),
            }
        );

        let attached = identity.attached.lock().unwrap();
        assert_eq!(attached.len(), 3);
        assert!(attached.iter().all(|(role, _)| role == "CloudCraftLambdaRole-Automated"));

        let inline = identity.inline.lock().unwrap();
        assert_eq!(inline[0].0, "CloudCraftAgentRole-Automated");
        assert_eq!(inline[0].1, "AllowFoundationModelInvoke");
        assert!(inline[0].2.contains(
            "arn:aws:bedrock:us-east-1::foundation-model/anthropic.claude-3-sonnet-20240229-v1:0"
        ));

        let created = functions.created.lock().unwrap();
        assert_eq!(created[0].runtime, "provided.al2023");
        assert_eq!(created[0].handler, "bootstrap");
        assert_eq!(created[0].timeout_secs, Some(120));
        assert_eq!(created[0].package, b"PK\x03\x04bootstrap");

        let groups = catalog.groups.lock().unwrap();
        assert_eq!(groups[0].name, "CloudCraftTools");
        assert_eq!(groups[0].agent_version, "DRAFT");
        assert_eq!(groups[0].executor_arn, report.function_arn);
        assert_eq!(groups[0].functions.len(), 5);
        assert_eq!(*catalog.prepared.lock().unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn rerun_reuses_existing_resources() {
        let package = package_file();
        let identity = Arc::new(MockIdentity {
            roles_exist: true,
            ..Default::default()
        });
        let functions = Arc::new(MockFunctions {
            exists: true,
            ..Default::default()
        });
        let catalog = Arc::new(MockCatalog {
            agent_exists: true,
            existing_agent_listed: true,
            group_exists: true,
            alias_exists: true,
            statuses: Mutex::new(VecDeque::from([AgentStatus::Prepared])),
            ..Default::default()
        });

        let report = provisioner(&identity, &functions, &catalog, setup(&package))
            .run()
            .await
            .unwrap();

        assert_eq!(report.function_role_arn, role_arn("CloudCraftLambdaRole-Automated"));
        assert_eq!(
            report.function_arn,
            format!("arn:aws:lambda:us-east-1:{ACCOUNT}:function:CloudCraftActionGroup-Automated")
        );
        assert_eq!(report.agent_id, "AGENT1");
        assert_eq!(report.agent_alias_id, "EXISTING_ALIAS");
    }

    #[tokio::test(start_paused = true)]
    async fn existing_agent_missing_from_listing() {
        let package = package_file();
        let catalog = Arc::new(MockCatalog {
            agent_exists: true,
            ..Default::default()
        });

        let err = provisioner(
            &Arc::new(MockIdentity::default()),
            &Arc::new(MockFunctions::default()),
            &catalog,
            setup(&package),
        )
        .run()
        .await
        .unwrap_err();

        assert!(matches!(err, ProvisionError::NotFound { kind: "Agent", .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_preparation_aborts_before_alias() {
        let package = package_file();
        let catalog = Arc::new(MockCatalog::with_statuses(&[
            AgentStatus::NotPrepared,
            AgentStatus::Preparing,
            AgentStatus::Failed,
        ]));

        let err = provisioner(
            &Arc::new(MockIdentity::default()),
            &Arc::new(MockFunctions::default()),
            &catalog,
            setup(&package),
        )
        .run()
        .await
        .unwrap_err();

        match err {
            ProvisionError::AgentFailed { agent_id, status } => {
                assert_eq!(agent_id, "AGENT1");
                assert_eq!(status, "FAILED");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(catalog.aliases.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn stuck_creation_times_out() {
        let package = package_file();
        let catalog = Arc::new(MockCatalog::with_statuses(&[AgentStatus::Creating]));

        let err = provisioner(
            &Arc::new(MockIdentity::default()),
            &Arc::new(MockFunctions::default()),
            &catalog,
            setup(&package),
        )
        .run()
        .await
        .unwrap_err();

        match err {
            ProvisionError::TimedOut {
                resource, attempts, ..
            } => {
                assert_eq!(resource, "agent creation");
                assert_eq!(attempts, 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(catalog.groups.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn missing_package_stops_before_function() {
        let functions = Arc::new(MockFunctions::default());
        let setup = SetupConfig {
            package_path: "/nonexistent/bootstrap.zip".into(),
            ..Default::default()
        };

        let err = provisioner(
            &Arc::new(MockIdentity::default()),
            &functions,
            &Arc::new(MockCatalog::default()),
            setup,
        )
        .run()
        .await
        .unwrap_err();

        assert!(matches!(err, ProvisionError::Package { .. }));
        assert!(functions.created.lock().unwrap().is_empty());
    }

    #[test]
    fn snippet_is_agent_section() {
        let report = ProvisionReport {
            function_role_arn: String::new(),
            agent_role_arn: String::new(),
            function_arn: String::new(),
            agent_id: "A1".into(),
            agent_alias_id: "B2".into(),
        };
        assert_eq!(
            report.agent_snippet(),
            "[agent]\nagent_id = \"A1\"\nagent_alias_id = \"B2\"\n"
        );
    }
}

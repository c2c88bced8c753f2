//! `cloudcraft serve`: start the relay backend.

use cloudcraft_actions::Dispatcher;
use cloudcraft_aws::AwsServices;
use cloudcraft_config::AppConfig;
use cloudcraft_gateway::RelayState;

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.relay.port = port;
    }

    if !config.agent.is_configured() {
        return Err(
            "agent.agent_id and agent.agent_alias_id are not set; run `cloudcraft setup` first"
                .into(),
        );
    }

    println!("☁️  CloudCraft Relay");
    println!("   Listening: {}:{}", config.relay.host, config.relay.port);
    println!("   Agent: {} (alias {})", config.agent.agent_id, config.agent.agent_alias_id);
    println!("   Region: {}", config.region);

    let services = AwsServices::load(&config.region).await;
    let state = RelayState {
        dispatcher: Dispatcher::new(services.storage.clone(), services.functions.clone()),
        runtime: services.runtime,
        storage: services.storage,
        config,
    };

    cloudcraft_gateway::start(state).await?;

    Ok(())
}

//! `cloudcraft dispatch`: run one action-group event locally.
//!
//! Uses the same dispatcher the deployed function runs, against the
//! configured region, and prints the response envelope.

use std::io::Read;

use cloudcraft_actions::Dispatcher;
use cloudcraft_aws::AwsServices;
use cloudcraft_config::AppConfig;
use cloudcraft_core::ActionRequest;

/// Read an event from `source`, a file path or `-` for stdin.
fn read_event(source: &str) -> Result<ActionRequest, Box<dyn std::error::Error>> {
    let raw = if source == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(source).map_err(|e| format!("Failed to read {source}: {e}"))?
    };
    Ok(parse_event(&raw)?)
}

fn parse_event(raw: &str) -> Result<ActionRequest, serde_json::Error> {
    serde_json::from_str(raw)
}

pub async fn run(source: &str) -> Result<(), Box<dyn std::error::Error>> {
    let request = read_event(source)?;
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    let services = AwsServices::load(&config.region).await;
    let dispatcher = Dispatcher::new(services.storage, services.functions);

    let envelope = dispatcher.dispatch(&request).await;
    println!("{}", serde_json::to_string_pretty(&envelope)?);

    Ok(())
}

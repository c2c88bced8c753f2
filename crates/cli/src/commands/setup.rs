//! `cloudcraft setup`: provision the agent infrastructure.

use cloudcraft_aws::AwsServices;
use cloudcraft_config::AppConfig;
use cloudcraft_provision::Provisioner;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    println!("☁️  CloudCraft Setup");
    println!("   Region: {}", config.region);
    println!("   Agent: {}", config.setup.agent_name);
    println!("   Package: {}\n", config.setup.package_path.display());

    let services = AwsServices::load(&config.region).await;
    let provisioner = Provisioner::new(
        services.identity,
        services.functions,
        services.agents,
        config.region.clone(),
        config.setup,
    );

    let report = provisioner.run().await?;

    println!("\n✅ Setup complete");
    println!("   Function role: {}", report.function_role_arn);
    println!("   Agent role:    {}", report.agent_role_arn);
    println!("   Function:      {}", report.function_arn);
    println!(
        "\n📝 Add this to {}:\n",
        AppConfig::config_path().display()
    );
    println!("{}", report.agent_snippet());

    Ok(())
}

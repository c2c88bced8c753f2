//! `cloudcraft doctor`: diagnose configuration.

use cloudcraft_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 CloudCraft Doctor");
    println!("====================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_path();
    let config = if config_path.exists() {
        match AppConfig::load() {
            Ok(config) => {
                println!("  ✅ Config file valid");
                Some(config)
            }
            Err(e) => {
                println!("  ❌ Config file invalid: {e}");
                issues += 1;
                None
            }
        }
    } else {
        println!("  ❌ No config file, run `cloudcraft onboard`");
        issues += 1;
        None
    };

    if let Some(config) = config {
        println!("  ✅ Region: {}", config.region);

        if config.agent.is_configured() {
            println!(
                "  ✅ Agent configured: {} (alias {})",
                config.agent.agent_id, config.agent.agent_alias_id
            );
        } else {
            println!("  ⚠️  Agent ids missing, run `cloudcraft setup` and update [agent]");
            issues += 1;
        }

        if config.setup.package_path.exists() {
            println!(
                "  ✅ Dispatch package found: {}",
                config.setup.package_path.display()
            );
        } else {
            println!(
                "  ⚠️  Dispatch package not found at {} (needed by `cloudcraft setup`)",
                config.setup.package_path.display()
            );
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}

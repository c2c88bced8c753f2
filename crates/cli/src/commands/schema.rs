//! `cloudcraft schema`: print the action schema as JSON.

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let schema = cloudcraft_actions::action_schema();
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

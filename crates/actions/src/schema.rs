//! The function schema registered on the agent's action group.

use cloudcraft_core::ActionKind;
use cloudcraft_core::cloud::{FunctionDefinition, ParameterDefinition};

/// Every parameter is declared as a string.
const PARAMETER_TYPE: &str = "string";

/// Definitions for all five actions, in registration order.
pub fn action_schema() -> Vec<FunctionDefinition> {
    ActionKind::ALL
        .into_iter()
        .map(|kind| FunctionDefinition {
            name: kind.name().to_string(),
            description: kind.description().to_string(),
            parameters: kind
                .parameters()
                .iter()
                .map(|p| ParameterDefinition {
                    name: p.name.to_string(),
                    description: p.description.to_string(),
                    value_type: PARAMETER_TYPE.to_string(),
                    required: p.required,
                })
                .collect(),
        })
        .collect()
}

//! IAM policy documents used during setup.

use serde_json::json;

/// Managed policies attached to the dispatch function's role.
pub const FUNCTION_ROLE_POLICIES: [&str; 3] = [
    "arn:aws:iam::aws:policy/AmazonS3FullAccess",
    "arn:aws:iam::aws:policy/AWSLambda_FullAccess",
    "arn:aws:iam::aws:policy/AmazonAPIGatewayAdministrator",
];

/// Inline policy name on the agent role.
pub const MODEL_INVOKE_POLICY_NAME: &str = "AllowFoundationModelInvoke";

pub const FUNCTION_SERVICE_PRINCIPAL: &str = "lambda.amazonaws.com";
pub const AGENT_SERVICE_PRINCIPAL: &str = "bedrock.amazonaws.com";

/// Trust policy letting `service` assume the role.
pub fn trust_policy(service: &str) -> String {
    json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Effect": "Allow",
            "Principal": { "Service": service },
            "Action": "sts:AssumeRole"
        }]
    })
    .to_string()
}

pub fn foundation_model_arn(region: &str, model: &str) -> String {
    format!("arn:aws:bedrock:{region}::foundation-model/{model}")
}

/// Permission to invoke exactly one foundation model.
pub fn model_invoke_policy(region: &str, model: &str) -> String {
    json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Effect": "Allow",
            "Action": "bedrock:InvokeModel",
            "Resource": foundation_model_arn(region, model)
        }]
    })
    .to_string()
}

//! The placeholder function package.
//!
//! A minimal Python handler that returns `"Hello from Lambda!"`, zipped and
//! base64-encoded so the dispatch binary carries it without a file on disk.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use cloudcraft_core::CloudError;
use cloudcraft_core::cloud::FunctionSpec;

pub const RUNTIME: &str = "python3.12";
pub const HANDLER: &str = "lambda.lambda_handler";

const PACKAGE_BASE64: &str = "UEsDBBQAAAAIAAAAIVia2ArNcQAAAHsAAAAJAAAAbGFtYmRhLnB5HcwxDsIwDEDRPacwnlqpQhVjVxYG7oBS7ApQYleOU1FV3J3C3/7ynnlWc3gVlRAC8QQp5pHi7RGFElvDC4t3cFdxfns7BNgz9moCGxaPXstZiXGAU993gKPSus9PPFLNc2nwwikpTKYZrn/9gO0nfAFQSwECFAMUAAAACAAAACFYmtgKzXEAAAB7AAAACQAAAAAAAAAAAAAApAEAAAAAbGFtYmRhLnB5UEsFBgAAAAABAAEANwAAAJgAAAAAAA==";

/// Raw zip bytes of the placeholder package.
pub fn package() -> Result<Vec<u8>, CloudError> {
    STANDARD
        .decode(PACKAGE_BASE64)
        .map_err(|e| CloudError::InvalidRequest(format!("placeholder package is corrupt: {e}")))
}

/// Function spec for a placeholder named `function_name` running as `role_arn`.
pub fn function_spec(function_name: &str, role_arn: &str) -> Result<FunctionSpec, CloudError> {
    Ok(FunctionSpec {
        name: function_name.to_string(),
        runtime: RUNTIME.into(),
        role_arn: role_arn.to_string(),
        handler: HANDLER.into(),
        package: package()?,
        timeout_secs: None,
        publish: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_is_a_zip() {
        let bytes = package().unwrap();
        assert!(bytes.starts_with(b"PK\x03\x04"));
    }

    #[test]
    fn spec_uses_fixed_runtime() {
        let spec = function_spec("hello", "arn:aws:iam::123:role/r").unwrap();
        assert_eq!(spec.runtime, "python3.12");
        assert_eq!(spec.handler, "lambda.lambda_handler");
        assert!(spec.publish);
        assert!(!spec.package.is_empty());
    }
}

//! Conversion from SDK errors into [`CloudError`].

use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use cloudcraft_core::CloudError;

/// Classify an SDK error. Service errors keep their code and message;
/// anything without a code (dispatch, timeout, response parsing) becomes
/// [`CloudError::Transport`] with the full error chain.
pub(crate) fn sdk_error<E, R>(err: SdkError<E, R>) -> CloudError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    match err.code() {
        Some(code) => CloudError::from_code(code, err.message().unwrap_or_default()),
        None => CloudError::Transport(DisplayErrorContext(&err).to_string()),
    }
}

/// Builders reject requests missing a required member.
pub(crate) fn build_error(err: impl std::error::Error) -> CloudError {
    CloudError::InvalidRequest(err.to_string())
}

pub(crate) fn missing(field: &str) -> CloudError {
    CloudError::MalformedResponse(format!("response did not include {field}"))
}

//! Config validation module
//!
//! Validation rules:
//! - token present and non-empty
//! - stitch_url is an absolute http(s) URL

use contracts::{ContractError, TargetConfig};
use validator::Validate;

/// Validate a TargetConfig
///
/// Returns the first encountered error, or Ok(()).
pub fn validate(config: &TargetConfig) -> Result<(), ContractError> {
    if let Err(errors) = config.validate() {
        for (field, failures) in errors.field_errors() {
            if let Some(failure) = failures.first() {
                let message = failure
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| failure.code.to_string());
                return Err(ContractError::config_validation(field.to_string(), message));
            }
        }
    }
    validate_endpoint(config)?;
    Ok(())
}

/// Validate the endpoint URL scheme
fn validate_endpoint(config: &TargetConfig) -> Result<(), ContractError> {
    if !config.stitch_url.starts_with("http://") && !config.stitch_url.starts_with("https://") {
        return Err(ContractError::config_validation(
            "stitch_url",
            format!("not an http(s) URL: '{}'", config.stitch_url),
        ));
    }
    Ok(())
}

//! Request validation
//!
//! Structural problems with a request (missing provider, family or region, an
//! unsupported family, the wrong region) are hard errors carrying an
//! `ErrorCode` and a correlation id. Everything else is handled by the
//! estimators as a soft failure.

use crate::error::{CostctlError, ErrorCode, Result};
use crate::request::ResourceRequest;
use crate::service::ServiceFamily;

/// Only provider the embedded datasets cover
pub const SUPPORTED_PROVIDER: &str = "aws";

/// Correlation id from the request, or a fresh v4 UUID
pub fn correlation_id_for(request: &ResourceRequest) -> String {
    request
        .correlation_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

fn invalid(code: ErrorCode, field: &str, reason: String, correlation_id: &str) -> CostctlError {
    CostctlError::Validation {
        code,
        field: field.to_string(),
        reason,
        correlation_id: correlation_id.to_string(),
    }
}

/// Reject requests missing provider, service family or region
pub fn validate_required_fields(request: &ResourceRequest, correlation_id: &str) -> Result<()> {
    let required = [
        ("provider", &request.provider, ErrorCode::MissingProvider),
        (
            "service_family",
            &request.service_family,
            ErrorCode::MissingServiceFamily,
        ),
        ("region", &request.region, ErrorCode::MissingRegion),
    ];
    for (field, value, code) in required {
        if value.trim().is_empty() {
            return Err(invalid(
                code,
                field,
                format!("{} is required", field),
                correlation_id,
            ));
        }
    }
    Ok(())
}

pub fn validate_provider(provider: &str, correlation_id: &str) -> Result<()> {
    if !provider.trim().eq_ignore_ascii_case(SUPPORTED_PROVIDER) {
        return Err(invalid(
            ErrorCode::UnsupportedProvider,
            "provider",
            format!(
                "Provider {:?} is not supported (only {:?})",
                provider, SUPPORTED_PROVIDER
            ),
            correlation_id,
        ));
    }
    Ok(())
}

/// Normalize the family or fail with `UNSUPPORTED_SERVICE`
pub fn validate_service_family(raw: &str, correlation_id: &str) -> Result<ServiceFamily> {
    raw.parse::<ServiceFamily>().map_err(|err| {
        invalid(
            ErrorCode::UnsupportedService,
            "service_family",
            err.to_string(),
            correlation_id,
        )
    })
}

/// Region naming check: lowercase letters, digits and hyphens, e.g. "us-east-1"
pub fn validate_region_name(region: &str) -> std::result::Result<(), String> {
    if region.is_empty() {
        return Err("Region cannot be empty".to_string());
    }
    if region.len() > 32 {
        return Err(format!("Region name too long: {}", region));
    }
    if !region
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(format!(
            "Region must contain only lowercase letters, digits and hyphens, got: {}",
            region
        ));
    }
    if region.starts_with('-') || region.ends_with('-') {
        return Err(format!("Region cannot start or end with '-': {}", region));
    }
    Ok(())
}

/// The engine serves exactly one region
pub fn validate_region_matches(
    engine_region: &str,
    requested_region: &str,
    correlation_id: &str,
) -> Result<()> {
    if requested_region.trim() != engine_region {
        return Err(CostctlError::RegionMismatch {
            plugin_region: engine_region.to_string(),
            requested_region: requested_region.trim().to_string(),
            correlation_id: correlation_id.to_string(),
        });
    }
    Ok(())
}

/// Full structural validation of a request against the engine's region
pub fn validate_request(request: &ResourceRequest, engine_region: &str) -> Result<ServiceFamily> {
    let correlation_id = correlation_id_for(request);
    validate_required_fields(request, &correlation_id)?;
    validate_provider(&request.provider, &correlation_id)?;
    let service = validate_service_family(&request.service_family, &correlation_id)?;
    validate_region_matches(engine_region, &request.region, &correlation_id)?;
    Ok(service)
}

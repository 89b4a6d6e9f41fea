//! Exit codes for the costctl binary
//!
//! - `0` = Success
//! - `1` = Request error (validation failure, unsupported service, region mismatch)
//! - `2` = System error (I/O, serialization)
//! - `3` = Configuration error (config parse failure, invalid values, no data for region)

use crate::error::CostctlError;

pub mod codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 1;
    pub const SYSTEM_ERROR: i32 = 2;
    pub const CONFIG_ERROR: i32 = 3;
}

pub fn exit_code_for_error(error: &CostctlError) -> i32 {
    use CostctlError::*;
    match error {
        Config(_) => codes::CONFIG_ERROR,
        Validation { .. } | RegionMismatch { .. } => codes::USER_ERROR,
        Io(_) | Json(_) => codes::SYSTEM_ERROR,
    }
}

/// Exit code for an error that reached the CLI boundary
pub fn exit_code_for_anyhow_error(error: &anyhow::Error) -> i32 {
    if let Some(e) = error.downcast_ref::<CostctlError>() {
        return exit_code_for_error(e);
    }
    if error.downcast_ref::<crate::error::ConfigError>().is_some() {
        return codes::CONFIG_ERROR;
    }
    if error.downcast_ref::<std::io::Error>().is_some() {
        return codes::SYSTEM_ERROR;
    }
    codes::USER_ERROR
}

//! costctl library
//!
//! Offline cost and carbon estimation for AWS resources, backed by price data
//! compiled into the binary.

pub mod carbon;
pub mod config;
pub mod engine;
pub mod error;
pub mod estimate;
pub mod exit_codes;
pub mod pricing;
pub mod report;
pub mod request;
pub mod service;
pub mod validation;

// Re-export commonly used types
pub use carbon::CarbonEstimate;
pub use engine::{Engine, EngineConfig, Estimate, EstimateOptions, SupportQuery, SupportResult};
pub use error::{CostctlError, ErrorCode, Result};
pub use estimate::CostResult;
pub use request::ResourceRequest;
pub use service::ServiceFamily;

//! Estimation engine
//!
//! Owns the price index for one region and exposes the three operations the
//! RPC layer needs: capability check, projected cost and carbon. An `Engine`
//! is immutable after construction and can be shared across threads.

use crate::carbon::{self, CarbonEstimate};
use crate::error::{ConfigError, CostctlError, Result};
use crate::estimate::{self, CostResult};
use crate::pricing::{embedded, PriceIndex};
use crate::request::ResourceRequest;
use crate::service::ServiceFamily;
use crate::validation;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::sync::Once;
use tracing::{debug, warn};

/// Everything an engine needs, passed explicitly
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub region: String,
    pub currency: String,
    pub enhanced_diagnostics: bool,
    pub default_utilization: Option<f64>,
    /// Price document text for `region`
    pub dataset: Cow<'static, str>,
}

impl EngineConfig {
    /// Config backed by the embedded document for `region`
    pub fn embedded(region: &str) -> Option<Self> {
        embedded::dataset_for(region).map(|dataset| Self {
            region: region.to_string(),
            currency: "USD".to_string(),
            enhanced_diagnostics: false,
            default_utilization: None,
            dataset: Cow::Borrowed(dataset),
        })
    }

    pub fn with_enhanced_diagnostics(mut self, enabled: bool) -> Self {
        self.enhanced_diagnostics = enabled;
        self
    }

    pub fn with_default_utilization(mut self, utilization: Option<f64>) -> Self {
        self.default_utilization = utilization;
        self
    }
}

/// Capability question: can this engine estimate that kind of resource?
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportQuery {
    pub provider: String,
    pub service_family: String,
    pub region: String,
}

impl SupportQuery {
    pub fn new(
        provider: impl Into<String>,
        service_family: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            service_family: service_family.into(),
            region: region.into(),
        }
    }
}

impl From<&ResourceRequest> for SupportQuery {
    fn from(request: &ResourceRequest) -> Self {
        Self::new(
            request.provider.clone(),
            request.service_family.clone(),
            request.region.clone(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportResult {
    pub supported: bool,
    /// Why not, when unsupported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<ServiceFamily>,
}

/// Options for a combined estimate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EstimateOptions {
    pub include_carbon: bool,
    /// Utilization for carbon when the resource has no `utilization` tag
    pub utilization_override: Option<f64>,
}

/// Cost with the optional carbon metric attached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    pub cost: CostResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbon: Option<CarbonEstimate>,
}

#[derive(Debug)]
pub struct Engine {
    region: String,
    currency: String,
    enhanced_diagnostics: bool,
    default_utilization: Option<f64>,
    index: PriceIndex,
    currency_check: Once,
}

impl Engine {
    /// No I/O; the price document is parsed on first use
    pub fn new(config: EngineConfig) -> Self {
        Self {
            index: PriceIndex::new(config.region.clone(), config.dataset),
            region: config.region,
            currency: config.currency,
            enhanced_diagnostics: config.enhanced_diagnostics,
            default_utilization: config.default_utilization,
            currency_check: Once::new(),
        }
    }

    /// Engine over the embedded document for `region`
    pub fn from_embedded(region: &str) -> Result<Self> {
        let config = EngineConfig::embedded(region).ok_or_else(|| {
            CostctlError::Config(ConfigError::InvalidValue {
                field: "region".to_string(),
                reason: format!(
                    "no embedded price data for {} (available: {})",
                    region,
                    embedded::embedded_regions().join(", ")
                ),
            })
        })?;
        Ok(Self::new(config))
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn enhanced_diagnostics(&self) -> bool {
        self.enhanced_diagnostics
    }

    /// Describes the mismatch when the price data is not in the configured currency
    pub fn currency_mismatch(&self) -> Option<String> {
        let priced = self.index.currency();
        (!priced.eq_ignore_ascii_case(&self.currency)).then(|| {
            format!(
                "price data for {} is in {} but the engine is configured for {}; costs are reported in {}",
                self.region, priced, self.currency, priced
            )
        })
    }

    fn check_currency(&self) {
        self.currency_check.call_once(|| {
            if let Some(message) = self.currency_mismatch() {
                warn!("{}", message);
            }
        });
    }

    pub fn index(&self) -> &PriceIndex {
        &self.index
    }

    pub fn supports(&self, query: &SupportQuery) -> SupportResult {
        let correlation_id = uuid::Uuid::new_v4().to_string();
        let request = ResourceRequest::new(
            query.provider.clone(),
            query.service_family.clone(),
            "",
            query.region.clone(),
        );
        let check = validation::validate_required_fields(&request, &correlation_id)
            .and_then(|_| validation::validate_provider(&query.provider, &correlation_id))
            .and_then(|_| {
                validation::validate_service_family(&query.service_family, &correlation_id)
            })
            .and_then(|service| {
                validation::validate_region_matches(&self.region, &query.region, &correlation_id)
                    .map(|_| service)
            });

        match check {
            Ok(service) => SupportResult {
                supported: true,
                reason: None,
                service: Some(service),
            },
            Err(err) => {
                debug!("Unsupported {:?}: {}", query, err);
                let reason = match err {
                    CostctlError::Validation { reason, .. } => reason,
                    CostctlError::RegionMismatch {
                        plugin_region,
                        requested_region,
                        ..
                    } => format!(
                        "region {} is served by a different instance (this one serves {})",
                        requested_region, plugin_region
                    ),
                    other => other.to_string(),
                };
                SupportResult {
                    supported: false,
                    reason: Some(reason),
                    service: ServiceFamily::normalize(&query.service_family),
                }
            }
        }
    }

    /// Monthly cost projection. Errors only for structural problems; a
    /// missing price yields a $0 result with an explanatory detail.
    pub fn projected_cost(&self, request: &ResourceRequest) -> Result<CostResult> {
        let service = validation::validate_request(request, &self.region)?;
        self.check_currency();
        Ok(estimate::estimate(
            service,
            &self.index,
            request,
            self.enhanced_diagnostics,
        ))
    }

    /// Carbon for the request, `None` when it can't be estimated
    pub fn carbon(
        &self,
        request: &ResourceRequest,
        utilization_override: Option<f64>,
    ) -> Result<Option<CarbonEstimate>> {
        let service = validation::validate_request(request, &self.region)?;
        Ok(carbon::estimate(
            service,
            request,
            utilization_override,
            self.default_utilization,
        ))
    }

    pub fn estimate(&self, request: &ResourceRequest, options: &EstimateOptions) -> Result<Estimate> {
        let service = validation::validate_request(request, &self.region)?;
        self.check_currency();
        let cost = estimate::estimate(service, &self.index, request, self.enhanced_diagnostics);
        let carbon = if options.include_carbon {
            carbon::estimate(
                service,
                request,
                options.utilization_override,
                self.default_utilization,
            )
        } else {
            None
        };
        Ok(Estimate { cost, carbon })
    }
}

//! Per-service cost estimators
//!
//! Every estimator is a pure function of the price index and the request.
//! A missing price is a soft failure: the result costs $0 and the billing
//! detail says which price was unavailable. Malformed usage tags fall back to
//! documented defaults and are listed in `defaulted_fields`.

pub mod cloudwatch;
pub mod dynamodb;
pub mod ebs;
pub mod ec2;
pub mod eks;
pub mod elb;
pub mod lambda;
pub mod nat_gateway;
pub mod rds;
pub mod s3;

use crate::pricing::PriceIndex;
use crate::request::{ResourceRequest, UsageReader};
use crate::service::ServiceFamily;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Hours used to project hourly rates onto a month
pub const HOURS_PER_MONTH: f64 = 730.0;

/// Marker present in every soft-failure billing detail
pub const PRICING_UNAVAILABLE: &str = "pricing unavailable";

/// Suffix appended to inputs that fell back to a default
pub const DEFAULTED_MARKER: &str = " (defaulted)";

/// Outcome of a cost estimation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostResult {
    pub service: ServiceFamily,
    /// Primary rate of the formula (per hour, per GB-month, ...)
    pub unit_price: f64,
    pub currency: String,
    pub cost_per_month: f64,
    /// The formula actually applied, with defaulted inputs annotated
    pub billing_detail: String,
    pub defaulted_fields: BTreeSet<String>,
    /// False when a needed price was missing and the cost was reported as $0
    pub price_available: bool,
    /// Calculation steps, filled only with enhanced diagnostics enabled
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<String>,
}

/// Billing detail for a price that was not found
pub fn price_not_found_detail(service: ServiceFamily, what: &str, region: &str) -> String {
    format!(
        "{}: {} ({} not found in {} price data); cost reported as $0.00",
        service.display_name(),
        PRICING_UNAVAILABLE,
        what,
        region
    )
}

/// Billing detail for a category with no data at all in this region
pub fn category_unavailable_detail(service: ServiceFamily, region: &str) -> String {
    format!(
        "{}: {} ({} price data not found for {}); cost reported as $0.00",
        service.display_name(),
        PRICING_UNAVAILABLE,
        service.as_str(),
        region
    )
}

/// Billing detail for usage inputs whose cost overflows
pub fn usage_out_of_range_detail(service: ServiceFamily) -> String {
    format!(
        "{}: usage out of range (cost is not a finite amount); cost reported as $0.00",
        service.display_name()
    )
}

/// Money as shown in billing details
pub fn format_money(amount: f64) -> String {
    format!("${:.4}", amount)
}

/// Shared state for one estimation
pub struct EstimateContext<'a> {
    pub service: ServiceFamily,
    pub index: &'a PriceIndex,
    pub request: &'a ResourceRequest,
    pub usage: UsageReader<'a>,
    diagnostics: Option<Vec<String>>,
}

impl<'a> EstimateContext<'a> {
    pub fn new(
        service: ServiceFamily,
        index: &'a PriceIndex,
        request: &'a ResourceRequest,
        enhanced_diagnostics: bool,
    ) -> Self {
        Self {
            service,
            index,
            request,
            usage: UsageReader::new(request),
            diagnostics: enhanced_diagnostics.then(Vec::new),
        }
    }

    /// Record a calculation step
    pub fn step(&mut self, message: impl FnOnce() -> String) {
        let message = message();
        debug!("{} estimate: {}", self.service, message);
        if let Some(diagnostics) = self.diagnostics.as_mut() {
            diagnostics.push(message);
        }
    }

    /// `DEFAULTED_MARKER` when `field` fell back to a default, else empty
    pub fn marker(&self, field: &str) -> &'static str {
        if self.usage.is_defaulted(field) {
            DEFAULTED_MARKER
        } else {
            ""
        }
    }

    /// Record a default that didn't come from a usage tag (e.g. an empty SKU)
    pub fn record_default(&mut self, field: &str) {
        self.usage.record_default(field);
    }

    /// Trimmed SKU, or `None` when the request has none
    pub fn sku(&self) -> Option<&'a str> {
        let sku = self.request.sku.trim();
        (!sku.is_empty()).then_some(sku)
    }

    pub fn finish(self, unit_price: f64, cost_per_month: f64, billing_detail: String) -> CostResult {
        if !cost_per_month.is_finite() {
            return self.out_of_range();
        }
        CostResult {
            service: self.service,
            unit_price,
            currency: self.index.currency().to_string(),
            cost_per_month,
            billing_detail,
            defaulted_fields: self.usage.into_defaulted(),
            price_available: true,
            diagnostics: self.diagnostics.unwrap_or_default(),
        }
    }

    /// Soft failure for a specific missing price
    pub fn not_found(self, what: &str) -> CostResult {
        let detail = price_not_found_detail(self.service, what, self.index.region());
        self.soft_failure(detail)
    }

    /// Soft failure for a category absent from the region's data
    pub fn category_unavailable(self) -> CostResult {
        let detail = category_unavailable_detail(self.service, self.index.region());
        self.soft_failure(detail)
    }

    /// Usage so large the cost is not representable; reported as $0
    fn out_of_range(mut self) -> CostResult {
        let detail = usage_out_of_range_detail(self.service);
        warn!("{}", detail);
        self.record_default("usage");
        self.step(|| "cost overflowed, reporting $0".to_string());
        self.finish(0.0, 0.0, detail)
    }

    fn soft_failure(mut self, detail: String) -> CostResult {
        warn!("{}", detail);
        self.step(|| "no price found, reporting $0".to_string());
        let mut result = self.finish(0.0, 0.0, detail);
        result.price_available = false;
        result
    }
}

/// Run the estimator for `service`
pub fn estimate(
    service: ServiceFamily,
    index: &PriceIndex,
    request: &ResourceRequest,
    enhanced_diagnostics: bool,
) -> CostResult {
    let ctx = EstimateContext::new(service, index, request, enhanced_diagnostics);
    match service {
        ServiceFamily::Ec2 => ec2::estimate(ctx),
        ServiceFamily::Ebs => ebs::estimate(ctx),
        ServiceFamily::S3 => s3::estimate(ctx),
        ServiceFamily::Rds => rds::estimate(ctx),
        ServiceFamily::Eks => eks::estimate(ctx),
        ServiceFamily::Lambda => lambda::estimate(ctx),
        ServiceFamily::Elb => elb::estimate(ctx),
        ServiceFamily::NatGateway => nat_gateway::estimate(ctx),
        ServiceFamily::DynamoDb => dynamodb::estimate(ctx),
        ServiceFamily::CloudWatch => cloudwatch::estimate(ctx),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::pricing::embedded::dataset_for;
    use crate::pricing::PriceIndex;

    pub fn us_east_1() -> PriceIndex {
        PriceIndex::new("us-east-1", dataset_for("us-east-1").unwrap())
    }

    pub fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "expected {}, got {}",
            expected,
            actual
        );
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_soft_failure_shape_is_shared() {
        for service in ServiceFamily::ALL {
            let detail = price_not_found_detail(service, "sku x", "us-east-1");
            assert!(detail.contains(PRICING_UNAVAILABLE));
            assert!(detail.contains("not found"));
            let detail = category_unavailable_detail(service, "us-east-1");
            assert!(detail.contains(PRICING_UNAVAILABLE));
            assert!(detail.contains("not found"));
        }
    }

    #[test]
    fn test_diagnostics_only_when_enabled() {
        let index = us_east_1();
        let request = ResourceRequest::aws("ec2", "t3.micro", "us-east-1");
        let plain = estimate(ServiceFamily::Ec2, &index, &request, false);
        let enhanced = estimate(ServiceFamily::Ec2, &index, &request, true);
        assert!(plain.diagnostics.is_empty());
        assert!(!enhanced.diagnostics.is_empty());
        assert_eq!(plain.cost_per_month, enhanced.cost_per_month);
        assert_eq!(plain.billing_detail, enhanced.billing_detail);
    }

    #[test]
    fn test_marker_uses_shared_suffix() {
        let index = us_east_1();
        let request = ResourceRequest::aws("ebs", "gp3", "us-east-1");
        let mut ctx = EstimateContext::new(ServiceFamily::Ebs, &index, &request, false);
        assert_eq!(ctx.marker("size"), "");
        ctx.record_default("size");
        assert_eq!(ctx.marker("size"), DEFAULTED_MARKER);
    }

    #[test]
    fn test_non_finite_cost_reported_as_zero() {
        let index = us_east_1();
        let request = ResourceRequest::aws("elb", "alb", "us-east-1");
        let ctx = EstimateContext::new(ServiceFamily::Elb, &index, &request, false);
        let result = ctx.finish(0.0225, f64::INFINITY, "ELB alb: = $inf".to_string());
        assert_eq!(result.cost_per_month, 0.0);
        assert!(result.billing_detail.contains("usage out of range"));
        assert!(result.defaulted_fields.contains("usage"));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["cost_per_month"], 0.0);
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(7.592), "$7.5920");
        assert_eq!(format_money(0.0), "$0.0000");
    }
}

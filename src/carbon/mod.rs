//! Operational carbon estimation
//!
//! Runs independently of the cost estimators on the same request. A result is
//! `None` when the family has no methodology, the instance type has no known
//! hardware profile, or the region has no grid intensity. Absent is never
//! reported as zero.

pub mod coefficients;
pub mod formulas;
pub mod instance_specs;

use crate::estimate::ebs::DEFAULT_SIZE_GB as EBS_DEFAULT_SIZE_GB;
use crate::estimate::lambda::{DEFAULT_DURATION_MS, DEFAULT_MEMORY_MB, DEFAULT_REQUESTS};
use crate::estimate::rds::DEFAULT_STORAGE_GB as RDS_DEFAULT_STORAGE_GB;
use crate::pricing::LambdaArchitecture;
use crate::request::{parse_non_negative, ResourceRequest, UsageReader};
use crate::service::ServiceFamily;
use coefficients::*;
use formulas::{CpuLoad, StorageTechnology};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const CARBON_UNIT: &str = "gCO2e";

/// Carbon attached to a cost projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarbonEstimate {
    /// Operational emissions over the requested hours
    pub grams: f64,
    pub unit: String,
    /// Manufacturing emissions amortized over the same hours (compute only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embodied_grams: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl CarbonEstimate {
    pub fn operational(grams: f64) -> Self {
        Self {
            grams,
            unit: CARBON_UNIT.to_string(),
            embodied_grams: None,
            note: None,
        }
    }

    /// Explicit zero for control planes and network appliances
    pub fn shared_infrastructure() -> Self {
        Self {
            note: Some(SHARED_INFRASTRUCTURE_NOTE.to_string()),
            ..Self::operational(0.0)
        }
    }

    /// Operational plus embodied emissions
    pub fn total_grams(&self) -> f64 {
        self.grams + self.embodied_grams.unwrap_or(0.0)
    }
}

/// Utilization as a fraction. Values in (1, 100] are percentages.
pub fn parse_utilization(raw: &str) -> Option<f64> {
    parse_non_negative(raw).and_then(normalize_utilization)
}

fn normalize_utilization(value: f64) -> Option<f64> {
    if !value.is_finite() || value < 0.0 {
        None
    } else if value <= 1.0 {
        Some(value)
    } else if value <= 100.0 {
        Some(value / 100.0)
    } else {
        None
    }
}

/// Resource tag first, then the request override, then the configured
/// default, then `DEFAULT_UTILIZATION`
pub fn resolve_utilization(
    request: &ResourceRequest,
    utilization_override: Option<f64>,
    default_utilization: Option<f64>,
) -> f64 {
    let from_tag = ["utilization", "cpu_utilization"]
        .iter()
        .find_map(|key| request.tag(key))
        .and_then(|raw| {
            let parsed = parse_utilization(raw);
            if parsed.is_none() {
                warn!("Ignoring invalid utilization {:?}", raw);
            }
            parsed
        });

    from_tag
        .or_else(|| utilization_override.and_then(normalize_utilization))
        .or_else(|| default_utilization.and_then(normalize_utilization))
        .unwrap_or(DEFAULT_UTILIZATION)
}

/// Everything a family formula needs besides the request itself
struct CarbonContext<'a> {
    service: ServiceFamily,
    request: &'a ResourceRequest,
    usage: UsageReader<'a>,
    grid: f64,
    utilization: f64,
    hours: f64,
}

/// Estimate carbon for `service`. `None` means no estimate is available.
pub fn estimate(
    service: ServiceFamily,
    request: &ResourceRequest,
    utilization_override: Option<f64>,
    default_utilization: Option<f64>,
) -> Option<CarbonEstimate> {
    if service == ServiceFamily::CloudWatch {
        debug!("No carbon methodology for {}", service);
        return None;
    }

    let region = request.region.trim();
    let Some(grid) = grid_intensity(region) else {
        warn!(
            "No grid intensity for region {}, omitting carbon for {}",
            region, service
        );
        return None;
    };

    if matches!(
        service,
        ServiceFamily::Eks | ServiceFamily::Elb | ServiceFamily::NatGateway
    ) {
        return Some(CarbonEstimate::shared_infrastructure());
    }

    let mut usage = UsageReader::new(request);
    let hours = usage.number(&["hours"], HOURS_PER_MONTH);
    let ctx = CarbonContext {
        service,
        request,
        usage,
        grid,
        utilization: resolve_utilization(request, utilization_override, default_utilization),
        hours,
    };

    let result = match service {
        ServiceFamily::Ec2 => ec2(ctx),
        ServiceFamily::Rds => rds(ctx),
        ServiceFamily::Ebs => ebs(ctx),
        ServiceFamily::S3 => s3(ctx),
        ServiceFamily::DynamoDb => dynamodb(ctx),
        ServiceFamily::Lambda => lambda(ctx),
        ServiceFamily::Eks
        | ServiceFamily::Elb
        | ServiceFamily::NatGateway
        | ServiceFamily::CloudWatch => None,
    };
    if let Some(carbon) = &result {
        debug!("{} carbon: {:.4} {}", service, carbon.grams, carbon.unit);
    }
    result
}

fn compute_spec(ctx: &CarbonContext<'_>) -> Option<&'static instance_specs::InstanceSpec> {
    let sku = ctx.request.sku.trim();
    let spec = instance_specs::lookup(sku);
    if spec.is_none() {
        warn!(
            "No hardware profile for {} instance type {:?}, omitting carbon",
            ctx.service, sku
        );
    }
    spec
}

fn cpu_grams(ctx: &CarbonContext<'_>, spec: &instance_specs::InstanceSpec) -> f64 {
    let load = CpuLoad {
        min_watts: spec.processor.min_watts(),
        max_watts: spec.processor.max_watts(),
        utilization: ctx.utilization,
        vcpus: spec.vcpus as f64,
        hours: ctx.hours,
    };
    formulas::cpu_grams(&load, AWS_PUE, ctx.grid)
}

fn ec2(ctx: CarbonContext<'_>) -> Option<CarbonEstimate> {
    let spec = compute_spec(&ctx)?;
    let mut grams = cpu_grams(&ctx, spec);
    if let Some(gpu) = spec.gpu {
        grams += formulas::gpu_grams(
            gpu.count,
            gpu.tdp_watts,
            ctx.utilization,
            ctx.hours,
            AWS_PUE,
            ctx.grid,
        );
    }
    let embodied = formulas::embodied_grams(
        spec.vcpus,
        instance_specs::family_max_vcpus(spec),
        ctx.hours,
    );
    Some(CarbonEstimate {
        embodied_grams: Some(embodied),
        ..CarbonEstimate::operational(grams)
    })
}

fn rds(mut ctx: CarbonContext<'_>) -> Option<CarbonEstimate> {
    let spec = compute_spec(&ctx)?;
    let multi_az = ctx.usage.flag(&["multi_az"]);
    let size_gb = ctx.usage.number(
        &["storage_size", "size", "allocated_storage"],
        RDS_DEFAULT_STORAGE_GB,
    );
    let technology = match ctx.request.tag("storage_type").map(str::trim) {
        Some(t) if t.eq_ignore_ascii_case("standard") || t.eq_ignore_ascii_case("magnetic") => {
            StorageTechnology::Hdd
        }
        _ => StorageTechnology::Ssd,
    };
    let replication = if multi_az {
        RDS_MULTI_AZ_REPLICATION
    } else {
        RDS_REPLICATION
    };

    let deployments = if multi_az { 2.0 } else { 1.0 };
    let compute = cpu_grams(&ctx, spec) * deployments;
    let storage = formulas::storage_grams(
        size_gb,
        technology,
        replication,
        ctx.hours,
        AWS_PUE,
        ctx.grid,
    );
    Some(CarbonEstimate::operational(compute + storage))
}

fn ebs_technology(volume_type: &str) -> StorageTechnology {
    match volume_type.trim().to_lowercase().as_str() {
        "st1" | "sc1" | "standard" => StorageTechnology::Hdd,
        _ => StorageTechnology::Ssd,
    }
}

fn ebs(mut ctx: CarbonContext<'_>) -> Option<CarbonEstimate> {
    let size_gb = ctx
        .usage
        .number(&["size", "size_gb", "volume_size"], EBS_DEFAULT_SIZE_GB);
    let technology = ebs_technology(&ctx.request.sku);
    Some(CarbonEstimate::operational(formulas::storage_grams(
        size_gb,
        technology,
        EBS_REPLICATION,
        ctx.hours,
        AWS_PUE,
        ctx.grid,
    )))
}

fn s3(mut ctx: CarbonContext<'_>) -> Option<CarbonEstimate> {
    let size_gb = ctx.usage.number(&["size", "size_gb", "storage_gb"], 0.0);
    let class = ctx.request.sku.trim().to_uppercase().replace(['-', ' '], "_");
    let replication = if class.starts_with("ONEZONE") {
        S3_ONE_ZONE_REPLICATION
    } else {
        S3_REPLICATION
    };
    Some(CarbonEstimate::operational(formulas::storage_grams(
        size_gb,
        StorageTechnology::Hdd,
        replication,
        ctx.hours,
        AWS_PUE,
        ctx.grid,
    )))
}

fn dynamodb(mut ctx: CarbonContext<'_>) -> Option<CarbonEstimate> {
    let size_gb = ctx.usage.number(&["storage_gb", "size"], 0.0);
    Some(CarbonEstimate::operational(formulas::storage_grams(
        size_gb,
        StorageTechnology::Ssd,
        DYNAMODB_REPLICATION,
        ctx.hours,
        AWS_PUE,
        ctx.grid,
    )))
}

fn lambda(mut ctx: CarbonContext<'_>) -> Option<CarbonEstimate> {
    let requests = ctx
        .usage
        .number(&["requests_per_month", "requests"], DEFAULT_REQUESTS);
    let duration_ms = ctx
        .usage
        .number(&["duration_ms", "avg_duration_ms"], DEFAULT_DURATION_MS);
    let memory_mb = ctx.usage.number(&["memory_mb", "memory"], DEFAULT_MEMORY_MB);
    let architecture = ctx.usage.optional_choice(
        &["architecture", "arch"],
        LambdaArchitecture::parse,
        LambdaArchitecture::X86_64,
    );

    // One x86 vCPU for one hour at the resolved utilization
    let per_vcpu_hour = formulas::cpu_grams(
        &CpuLoad {
            min_watts: instance_specs::Processor::Intel.min_watts(),
            max_watts: instance_specs::Processor::Intel.max_watts(),
            utilization: ctx.utilization,
            vcpus: 1.0,
            hours: 1.0,
        },
        AWS_PUE,
        ctx.grid,
    );
    let vcpu_hours = formulas::serverless_vcpu_hours(memory_mb, duration_ms, requests);
    Some(CarbonEstimate::operational(formulas::serverless_grams(
        vcpu_hours,
        per_vcpu_hour,
        architecture == LambdaArchitecture::Arm64,
    )))
}

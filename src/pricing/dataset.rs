//! Wire format of the embedded per-region price documents
//!
//! Every category is optional and deserialized on its own, so a malformed
//! `dynamodb` section never prevents EC2 prices from loading.

use crate::pricing::tiered::TierRate;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Ec2PriceRecord {
    pub instance_type: String,
    #[serde(default = "default_os")]
    pub operating_system: String,
    #[serde(default = "default_tenancy")]
    pub tenancy: String,
    pub hourly: f64,
}

fn default_os() -> String {
    "linux".to_string()
}

fn default_tenancy() -> String {
    "shared".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct EbsPriceRecord {
    pub volume_type: String,
    pub per_gb_month: f64,
    #[serde(default)]
    pub per_iops_month: f64,
    #[serde(default)]
    pub per_mibps_month: f64,
    /// IOPS included with the volume at no charge
    #[serde(default)]
    pub included_iops: f64,
    /// Throughput (MiB/s) included with the volume at no charge
    #[serde(default)]
    pub included_mibps: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3PriceRecord {
    pub storage_class: String,
    pub storage_tiers: Vec<TierRate>,
    #[serde(default)]
    pub per_1k_put: f64,
    #[serde(default)]
    pub per_1k_get: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RdsInstanceRecord {
    pub instance_class: String,
    pub engine: String,
    pub hourly: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RdsStorageRecord {
    pub storage_type: String,
    pub per_gb_month: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RdsSection {
    #[serde(default)]
    pub instances: Vec<RdsInstanceRecord>,
    #[serde(default)]
    pub storage: Vec<RdsStorageRecord>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct EksSection {
    pub standard_hourly: f64,
    pub extended_hourly: f64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LambdaArchRecord {
    pub per_request: f64,
    pub per_gb_second: f64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LambdaSection {
    pub x86_64: LambdaArchRecord,
    pub arm64: LambdaArchRecord,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LoadBalancerRecord {
    pub hourly: f64,
    pub per_capacity_unit_hour: f64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ElbSection {
    pub alb: LoadBalancerRecord,
    pub nlb: LoadBalancerRecord,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct NatGatewaySection {
    pub hourly: f64,
    pub per_gb_processed: f64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DynamoDbSection {
    pub per_rcu_hour: f64,
    pub per_wcu_hour: f64,
    pub per_million_reads: f64,
    pub per_million_writes: f64,
    pub storage_per_gb_month: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CloudWatchSection {
    pub log_ingestion_tiers: Vec<TierRate>,
    pub log_storage_per_gb_month: f64,
    pub metric_tiers: Vec<TierRate>,
}

/// Top-level header, parsed before any category
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetHeader {
    pub region: String,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

//! Power, energy and emission coefficients
//!
//! Values follow the Cloud Carbon Footprint methodology for AWS.
//! Grid intensities are metric tons CO2e per kWh.

/// Power usage effectiveness applied to all IT energy
pub const AWS_PUE: f64 = 1.135;

/// Utilization assumed when neither the resource nor the request gives one
pub const DEFAULT_UTILIZATION: f64 = 0.5;

/// Hours of operation per month
pub const HOURS_PER_MONTH: f64 = 730.0;

/// SSD storage energy, Wh per TB-hour
pub const SSD_WH_PER_TB_HOUR: f64 = 1.2;
/// HDD storage energy, Wh per TB-hour
pub const HDD_WH_PER_TB_HOUR: f64 = 0.65;

pub const EBS_REPLICATION: f64 = 2.0;
pub const S3_REPLICATION: f64 = 3.0;
pub const S3_ONE_ZONE_REPLICATION: f64 = 1.0;
pub const DYNAMODB_REPLICATION: f64 = 3.0;
pub const RDS_REPLICATION: f64 = 1.0;
pub const RDS_MULTI_AZ_REPLICATION: f64 = 2.0;

/// Manufacturing emissions of one server, grams CO2e
pub const EMBODIED_GRAMS_PER_SERVER: f64 = 1_200_000.0;
/// Service life over which manufacturing emissions are spread
pub const HARDWARE_LIFESPAN_MONTHS: f64 = 48.0;

/// Lambda allocates one vCPU per this much memory
pub const LAMBDA_MB_PER_VCPU: f64 = 1769.0;
/// Energy multiplier for Graviton-based functions
pub const ARM64_EFFICIENCY_FACTOR: f64 = 0.8;

/// Grams per metric ton
pub const GRAMS_PER_TON: f64 = 1_000_000.0;

/// Note attached to families whose emissions are not independently meterable
pub const SHARED_INFRASTRUCTURE_NOTE: &str = "shared infrastructure, not independently meterable";

const GRID_INTENSITY: &[(&str, f64)] = &[
    ("us-east-1", 0.000379069),
    ("us-east-2", 0.000410608),
    ("us-west-1", 0.000322167),
    ("us-west-2", 0.000322167),
    ("us-gov-east-1", 0.000379069),
    ("us-gov-west-1", 0.000322167),
    ("ca-central-1", 0.00012),
    ("eu-west-1", 0.0002786),
    ("eu-west-2", 0.000225),
    ("eu-west-3", 0.0000511),
    ("eu-central-1", 0.000311),
    ("eu-north-1", 0.0000088),
    ("eu-south-1", 0.0002339),
    ("ap-south-1", 0.0007082),
    ("ap-east-1", 0.00071),
    ("ap-northeast-1", 0.0004658),
    ("ap-northeast-2", 0.0004156),
    ("ap-northeast-3", 0.0004658),
    ("ap-southeast-1", 0.000408),
    ("ap-southeast-2", 0.00079),
    ("sa-east-1", 0.0000617),
    ("me-south-1", 0.000505),
    ("af-south-1", 0.0009),
];

/// Grid carbon intensity for a region, tCO2e per kWh
pub fn grid_intensity(region: &str) -> Option<f64> {
    GRID_INTENSITY
        .iter()
        .find(|(name, _)| *name == region)
        .map(|(_, intensity)| *intensity)
}

/// Regions with a known grid intensity
pub fn grid_regions() -> impl Iterator<Item = &'static str> {
    GRID_INTENSITY.iter().map(|(name, _)| *name)
}

//! Price documents compiled into the binary
//!
//! Each process serves one region; which document it loads is decided by the
//! caller through `EngineConfig`, never by global state.

const US_EAST_1: &str = include_str!("../../data/pricing/us-east-1.json");
const US_WEST_2: &str = include_str!("../../data/pricing/us-west-2.json");
const EU_WEST_1: &str = include_str!("../../data/pricing/eu-west-1.json");

const EMBEDDED: &[(&str, &str)] = &[
    ("us-east-1", US_EAST_1),
    ("us-west-2", US_WEST_2),
    ("eu-west-1", EU_WEST_1),
];

/// Embedded price document for a region, if one was compiled in
pub fn dataset_for(region: &str) -> Option<&'static str> {
    EMBEDDED
        .iter()
        .find(|(name, _)| *name == region)
        .map(|(_, doc)| *doc)
}

/// Regions with an embedded price document
pub fn embedded_regions() -> Vec<&'static str> {
    EMBEDDED.iter().map(|(name, _)| *name).collect()
}

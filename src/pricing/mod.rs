//! Price data: embedded documents, the regional index, and tiered rates

pub mod dataset;
pub mod embedded;
pub mod index;
pub mod tiered;

pub use index::{LambdaArchitecture, LoadBalancerKind, LoadError, PriceCategory, PriceIndex};
pub use tiered::{calculate_tiered_cost, TierRate, TierSchedule, TieredCharge};

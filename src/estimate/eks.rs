//! EKS control plane: flat hourly rate, higher once a cluster version leaves standard support

use super::{format_money, CostResult, EstimateContext, HOURS_PER_MONTH};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportTier {
    Standard,
    Extended,
}

impl SupportTier {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "standard" => Some(SupportTier::Standard),
            "extended" => Some(SupportTier::Extended),
            _ => None,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            SupportTier::Standard => "standard",
            SupportTier::Extended => "extended",
        }
    }
}

pub fn estimate(mut ctx: EstimateContext<'_>) -> CostResult {
    let tier = ctx.usage.optional_choice(
        &["support_type", "support_tier"],
        SupportTier::parse,
        SupportTier::Standard,
    );

    let Some(prices) = ctx.index.eks() else {
        return ctx.category_unavailable();
    };

    let hourly = match tier {
        SupportTier::Standard => prices.standard_hourly,
        SupportTier::Extended => prices.extended_hourly,
    };
    let monthly = hourly * HOURS_PER_MONTH;
    ctx.step(|| format!("{} support control plane {} × {}", tier.as_str(), hourly, HOURS_PER_MONTH));

    let detail = format!(
        "EKS control plane ({} support{}): {}/hr × {} hrs = {}",
        tier.as_str(),
        ctx.marker("support_type"),
        hourly,
        HOURS_PER_MONTH,
        format_money(monthly)
    );
    ctx.finish(hourly, monthly, detail)
}

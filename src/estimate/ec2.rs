//! EC2 on-demand instances: hourly rate × hours per month

use super::{format_money, CostResult, EstimateContext, HOURS_PER_MONTH};
use crate::pricing::index::{normalize_operating_system, normalize_tenancy};

pub const DEFAULT_OPERATING_SYSTEM: &str = "linux";
pub const DEFAULT_TENANCY: &str = "shared";

pub fn estimate(mut ctx: EstimateContext<'_>) -> CostResult {
    let Some(instance_type) = ctx.sku() else {
        return ctx.not_found("instance type (empty sku)");
    };

    let os = ctx.usage.optional_choice(
        &["operating_system", "os", "platform"],
        normalize_operating_system,
        DEFAULT_OPERATING_SYSTEM,
    );
    let tenancy = ctx
        .usage
        .optional_choice(&["tenancy"], normalize_tenancy, DEFAULT_TENANCY);

    let Some(price) = ctx.index.ec2(instance_type, os, tenancy) else {
        return ctx.not_found(&format!("instance type {} ({}, {})", instance_type, os, tenancy));
    };

    let monthly = price.hourly * HOURS_PER_MONTH;
    ctx.step(|| format!("hourly rate {} for {} {} {}", price.hourly, instance_type, os, tenancy));
    ctx.step(|| format!("{} × {} hours = {}", price.hourly, HOURS_PER_MONTH, monthly));

    let detail = format!(
        "EC2 {} ({}{}, {}{}): {}/hr × {} hrs = {}",
        instance_type,
        os,
        ctx.marker("operating_system"),
        tenancy,
        ctx.marker("tenancy"),
        price.hourly,
        HOURS_PER_MONTH,
        format_money(monthly)
    );
    ctx.finish(price.hourly, monthly, detail)
}

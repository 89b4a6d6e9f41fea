//! Application and network load balancers: hourly plus capacity-unit hours

use super::{format_money, CostResult, EstimateContext, HOURS_PER_MONTH};
use crate::pricing::LoadBalancerKind;

pub fn estimate(mut ctx: EstimateContext<'_>) -> CostResult {
    // The family spelling itself ("nlb") can say which flavor is meant
    let hinted = LoadBalancerKind::parse(&ctx.request.service_family);
    let kind = match ctx.sku().and_then(LoadBalancerKind::parse).or(hinted) {
        Some(kind) => kind,
        None => ctx.usage.choice(
            &["load_balancer_type", "lb_type"],
            LoadBalancerKind::parse,
            LoadBalancerKind::Application,
        ),
    };
    let capacity_units = ctx
        .usage
        .optional_number(&["capacity_units", "lcu", "nlcu"])
        .unwrap_or(0.0);

    let Some(price) = ctx.index.load_balancer(kind) else {
        return ctx.category_unavailable();
    };

    let fixed = price.hourly * HOURS_PER_MONTH;
    let usage = capacity_units * price.per_capacity_unit_hour * HOURS_PER_MONTH;
    let total = fixed + usage;

    ctx.step(|| format!("{} fixed {} × {} = {}", kind.as_str(), price.hourly, HOURS_PER_MONTH, fixed));
    ctx.step(|| {
        format!(
            "{} capacity units × {} × {} = {}",
            capacity_units, price.per_capacity_unit_hour, HOURS_PER_MONTH, usage
        )
    });

    let detail = format!(
        "{}{}: {}/hr × {} hrs + {} capacity units × {}/unit-hr × {} hrs = {}",
        kind.as_str().to_uppercase(),
        ctx.marker("load_balancer_type"),
        price.hourly,
        HOURS_PER_MONTH,
        capacity_units,
        price.per_capacity_unit_hour,
        HOURS_PER_MONTH,
        format_money(total)
    );
    ctx.finish(price.hourly, total, detail)
}

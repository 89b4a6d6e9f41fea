//! NAT gateways: hourly charge plus per-GB data processing

use super::{format_money, CostResult, EstimateContext, HOURS_PER_MONTH};

pub fn estimate(mut ctx: EstimateContext<'_>) -> CostResult {
    let data_gb = ctx
        .usage
        .optional_number(&["data_processed_gb", "data_gb"])
        .unwrap_or(0.0);

    let Some(price) = ctx.index.nat_gateway() else {
        return ctx.category_unavailable();
    };

    let fixed = price.hourly * HOURS_PER_MONTH;
    let processing = data_gb * price.per_gb_processed;
    let total = fixed + processing;
    ctx.step(|| format!("fixed {} × {} = {}", price.hourly, HOURS_PER_MONTH, fixed));
    ctx.step(|| format!("{} GB × {} = {}", data_gb, price.per_gb_processed, processing));

    let detail = format!(
        "NAT gateway: {}/hr × {} hrs + {} GB{} × {}/GB = {}",
        price.hourly,
        HOURS_PER_MONTH,
        data_gb,
        ctx.marker("data_processed_gb"),
        price.per_gb_processed,
        format_money(total)
    );
    ctx.finish(price.hourly, total, detail)
}

#[cfg(test)]
mod tests {
    use crate::estimate::estimate;
    use crate::estimate::test_support::*;
    use crate::request::ResourceRequest;
    use crate::service::ServiceFamily;

    #[test]
    fn test_fixed_plus_processing() {
        let index = us_east_1();
        let req = ResourceRequest::aws("natgw", "", "us-east-1").with_tag("data_processed_gb", "100");
        let result = estimate(ServiceFamily::NatGateway, &index, &req, false);
        assert_close(result.cost_per_month, 0.045 * 730.0 + 4.5);
    }

    #[test]
    fn test_invalid_data_is_recorded() {
        let index = us_east_1();
        let req = ResourceRequest::aws("natgw", "", "us-east-1").with_tag("data_processed_gb", "lots");
        let result = estimate(ServiceFamily::NatGateway, &index, &req, false);
        assert_close(result.cost_per_month, 0.045 * 730.0);
        assert!(result.defaulted_fields.contains("data_processed_gb"));
        assert!(result.billing_detail.contains("(defaulted)"));
    }
}

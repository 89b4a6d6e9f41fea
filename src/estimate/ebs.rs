//! EBS volumes: capacity plus provisioned IOPS/throughput above the included baseline

use super::{format_money, CostResult, EstimateContext};

/// Size assumed when the request doesn't say
pub const DEFAULT_SIZE_GB: f64 = 8.0;
pub const DEFAULT_VOLUME_TYPE: &str = "gp2";

pub fn estimate(mut ctx: EstimateContext<'_>) -> CostResult {
    let volume_type = match ctx.sku() {
        Some(sku) => sku.to_lowercase(),
        None => {
            ctx.record_default("volume_type");
            DEFAULT_VOLUME_TYPE.to_string()
        }
    };
    let size_gb = ctx.usage.number(&["size", "size_gb", "volume_size"], DEFAULT_SIZE_GB);
    let iops = ctx.usage.optional_number(&["iops"]).unwrap_or(0.0);
    let throughput = ctx
        .usage
        .optional_number(&["throughput", "throughput_mibps"])
        .unwrap_or(0.0);

    let Some(price) = ctx.index.ebs(&volume_type).cloned() else {
        return ctx.not_found(&format!("volume type {}", volume_type));
    };

    let storage = size_gb * price.per_gb_month;
    let billable_iops = (iops - price.included_iops).max(0.0);
    let billable_mibps = (throughput - price.included_mibps).max(0.0);
    let iops_cost = billable_iops * price.per_iops_month;
    let throughput_cost = billable_mibps * price.per_mibps_month;
    let total = storage + iops_cost + throughput_cost;

    ctx.step(|| format!("storage {} GB × {} = {}", size_gb, price.per_gb_month, storage));
    ctx.step(|| {
        format!(
            "iops {} (included {}) → {} billable × {} = {}",
            iops, price.included_iops, billable_iops, price.per_iops_month, iops_cost
        )
    });
    ctx.step(|| {
        format!(
            "throughput {} MiB/s (included {}) → {} billable × {} = {}",
            throughput, price.included_mibps, billable_mibps, price.per_mibps_month, throughput_cost
        )
    });

    let mut detail = format!(
        "EBS {}{}: {} GB{} × {}/GB-month",
        volume_type,
        ctx.marker("volume_type"),
        size_gb,
        ctx.marker("size"),
        price.per_gb_month
    );
    if billable_iops > 0.0 && price.per_iops_month > 0.0 {
        detail.push_str(&format!(
            " + {} IOPS × {}/IOPS-month",
            billable_iops, price.per_iops_month
        ));
    }
    if billable_mibps > 0.0 && price.per_mibps_month > 0.0 {
        detail.push_str(&format!(
            " + {} MiB/s × {}/MiBps-month",
            billable_mibps, price.per_mibps_month
        ));
    }
    detail.push_str(&format!(" = {}", format_money(total)));

    ctx.finish(price.per_gb_month, total, detail)
}

#[cfg(test)]
mod tests {
    use crate::estimate::test_support::*;
    use crate::estimate::estimate;
    use crate::request::ResourceRequest;
    use crate::service::ServiceFamily;

    #[test]
    fn test_gp3_capacity() {
        let index = us_east_1();
        let req = ResourceRequest::aws("ebs", "gp3", "us-east-1").with_tag("size", "100");
        let result = estimate(ServiceFamily::Ebs, &index, &req, false);
        assert_eq!(result.cost_per_month, 8.0);
        assert_eq!(result.unit_price, 0.08);
        assert_eq!(
            result.billing_detail,
            "EBS gp3: 100 GB × 0.08/GB-month = $8.0000"
        );
    }

    #[test]
    fn test_missing_size_defaults_to_8gb() {
        let index = us_east_1();
        let req = ResourceRequest::aws("ebs", "gp3", "us-east-1");
        let result = estimate(ServiceFamily::Ebs, &index, &req, false);
        assert_close(result.cost_per_month, 8.0 * 0.08);
        assert!(result.defaulted_fields.contains("size"));
        assert!(result.billing_detail.contains("8 GB (defaulted)"));
    }

    #[test]
    fn test_empty_sku_defaults_to_gp2() {
        let index = us_east_1();
        let req = ResourceRequest::aws("ebs", "", "us-east-1").with_tag("size", "10");
        let result = estimate(ServiceFamily::Ebs, &index, &req, false);
        assert_close(result.cost_per_month, 1.0);
        assert!(result.defaulted_fields.contains("volume_type"));
        assert!(result.billing_detail.starts_with("EBS gp2 (defaulted)"));
    }

    #[test]
    fn test_gp3_extra_iops_and_throughput() {
        let index = us_east_1();
        let req = ResourceRequest::aws("ebs", "gp3", "us-east-1")
            .with_tag("size", "100")
            .with_tag("iops", "5000")
            .with_tag("throughput", "250");
        let result = estimate(ServiceFamily::Ebs, &index, &req, false);
        // 8.00 + 2000 × 0.005 + 125 × 0.04
        assert_close(result.cost_per_month, 8.0 + 10.0 + 5.0);
        assert!(result.billing_detail.contains("2000 IOPS"));
        assert!(result.billing_detail.contains("125 MiB/s"));
    }

    #[test]
    fn test_io1_bills_all_iops() {
        let index = us_east_1();
        let req = ResourceRequest::aws("ebs", "io1", "us-east-1")
            .with_tag("size", "100")
            .with_tag("iops", "1000");
        let result = estimate(ServiceFamily::Ebs, &index, &req, false);
        assert_close(result.cost_per_month, 12.5 + 65.0);
    }

    #[test]
    fn test_unknown_volume_type_soft_fails() {
        let index = us_east_1();
        let req = ResourceRequest::aws("ebs", "gp9", "us-east-1").with_tag("size", "100");
        let result = estimate(ServiceFamily::Ebs, &index, &req, false);
        assert_eq!(result.cost_per_month, 0.0);
        assert!(result.billing_detail.contains("volume type gp9 not found"));
    }
}

//! CloudWatch logs and custom metrics, both billed on tier schedules

use super::{format_money, CostResult, EstimateContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Logs,
    Metrics,
    Combined,
}

impl Component {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "logs" | "log" | "cloudwatch-logs" => Some(Component::Logs),
            "metrics" | "metric" | "cloudwatch-metrics" => Some(Component::Metrics),
            "combined" | "all" | "cloudwatch" => Some(Component::Combined),
            _ => None,
        }
    }

    /// Component implied by the family spelling, including Pulumi tokens
    fn from_family(raw: &str) -> Option<Self> {
        let family = raw.trim().to_lowercase();
        match family.split_once('/') {
            Some((_, resource)) if resource.starts_with("loggroup:") => Some(Component::Logs),
            Some((_, resource)) if resource.starts_with("metricalarm:") => Some(Component::Metrics),
            Some(_) => None,
            None => Self::parse(&family).filter(|c| *c != Component::Combined),
        }
    }

    fn includes_logs(&self) -> bool {
        matches!(self, Component::Logs | Component::Combined)
    }

    fn includes_metrics(&self) -> bool {
        matches!(self, Component::Metrics | Component::Combined)
    }
}

pub fn estimate(mut ctx: EstimateContext<'_>) -> CostResult {
    let hinted = Component::from_family(&ctx.request.service_family);
    let component = ctx
        .sku()
        .and_then(Component::parse)
        .or(hinted)
        .unwrap_or(Component::Combined);

    let ingestion_gb = component
        .includes_logs()
        .then(|| ctx.usage.number(&["log_ingestion_gb", "ingestion_gb"], 0.0));
    let storage_gb = component
        .includes_logs()
        .then(|| ctx.usage.number(&["log_storage_gb"], 0.0));
    let metrics = component
        .includes_metrics()
        .then(|| ctx.usage.number(&["custom_metrics", "metrics_count"], 0.0));

    let Some(prices) = ctx.index.cloudwatch().cloned() else {
        return ctx.category_unavailable();
    };

    let mut parts = Vec::new();
    let mut total = 0.0;

    if let Some(gb) = ingestion_gb {
        let charge = prices.log_ingestion.apply(gb);
        ctx.step(|| format!("log ingestion tiers: {} = {}", charge.describe(), charge.total));
        parts.push(format!(
            "ingestion {} GB{} ({})",
            gb,
            ctx.marker("log_ingestion_gb"),
            charge.describe()
        ));
        total += charge.total;
    }
    if let Some(gb) = storage_gb {
        let cost = gb * prices.log_storage_per_gb_month;
        ctx.step(|| format!("log storage {} × {} = {}", gb, prices.log_storage_per_gb_month, cost));
        parts.push(format!(
            "storage {} GB{} × {}/GB-month",
            gb,
            ctx.marker("log_storage_gb"),
            prices.log_storage_per_gb_month
        ));
        total += cost;
    }
    if let Some(count) = metrics {
        let charge = prices.metrics.apply(count);
        ctx.step(|| format!("metric tiers: {} = {}", charge.describe(), charge.total));
        parts.push(format!(
            "{} metrics{} ({})",
            count,
            ctx.marker("custom_metrics"),
            charge.describe()
        ));
        total += charge.total;
    }

    let unit_price = if component == Component::Metrics {
        prices.metrics.first_rate()
    } else {
        prices.log_ingestion.first_rate()
    };
    let detail = format!("CloudWatch: {} = {}", parts.join(" + "), format_money(total));
    ctx.finish(unit_price, total, detail)
}

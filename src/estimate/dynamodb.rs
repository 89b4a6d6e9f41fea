//! DynamoDB tables: provisioned capacity hours or on-demand requests, plus storage

use super::{format_money, CostResult, EstimateContext, HOURS_PER_MONTH};

pub const DEFAULT_CAPACITY_UNITS: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillingMode {
    Provisioned,
    OnDemand,
}

impl BillingMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().replace('-', "_").as_str() {
            "provisioned" => Some(BillingMode::Provisioned),
            "on_demand" | "ondemand" | "pay_per_request" => Some(BillingMode::OnDemand),
            _ => None,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            BillingMode::Provisioned => "provisioned",
            BillingMode::OnDemand => "on-demand",
        }
    }
}

pub fn estimate(mut ctx: EstimateContext<'_>) -> CostResult {
    let mode = match ctx.sku().and_then(BillingMode::parse) {
        Some(mode) => mode,
        None => ctx
            .usage
            .choice(&["billing_mode"], BillingMode::parse, BillingMode::OnDemand),
    };

    let (reads, writes) = match mode {
        BillingMode::Provisioned => (
            ctx.usage
                .number(&["read_capacity_units", "rcu"], DEFAULT_CAPACITY_UNITS),
            ctx.usage
                .number(&["write_capacity_units", "wcu"], DEFAULT_CAPACITY_UNITS),
        ),
        BillingMode::OnDemand => (
            ctx.usage.number(&["read_requests"], 0.0),
            ctx.usage.number(&["write_requests"], 0.0),
        ),
    };
    let storage_gb = ctx.usage.number(&["storage_gb", "size"], 0.0);

    let Some(price) = ctx.index.dynamodb() else {
        return ctx.category_unavailable();
    };

    let (read_cost, write_cost, unit_price) = match mode {
        BillingMode::Provisioned => (
            reads * price.per_rcu_hour * HOURS_PER_MONTH,
            writes * price.per_wcu_hour * HOURS_PER_MONTH,
            price.per_rcu_hour,
        ),
        BillingMode::OnDemand => (
            reads / 1_000_000.0 * price.per_million_reads,
            writes / 1_000_000.0 * price.per_million_writes,
            price.per_million_reads,
        ),
    };
    let storage_cost = storage_gb * price.storage_per_gb_month;
    let total = read_cost + write_cost + storage_cost;

    ctx.step(|| format!("{} reads → {}", reads, read_cost));
    ctx.step(|| format!("{} writes → {}", writes, write_cost));
    ctx.step(|| format!("{} GB × {} = {}", storage_gb, price.storage_per_gb_month, storage_cost));

    let capacity = match mode {
        BillingMode::Provisioned => format!(
            "{} RCU{} × {}/hr + {} WCU{} × {}/hr over {} hrs",
            reads,
            ctx.marker("read_capacity_units"),
            price.per_rcu_hour,
            writes,
            ctx.marker("write_capacity_units"),
            price.per_wcu_hour,
            HOURS_PER_MONTH
        ),
        BillingMode::OnDemand => format!(
            "{} reads{} × {}/M + {} writes{} × {}/M",
            reads,
            ctx.marker("read_requests"),
            price.per_million_reads,
            writes,
            ctx.marker("write_requests"),
            price.per_million_writes
        ),
    };
    let detail = format!(
        "DynamoDB {}{}: {} + {} GB{} × {}/GB-month = {}",
        mode.as_str(),
        ctx.marker("billing_mode"),
        capacity,
        storage_gb,
        ctx.marker("storage_gb"),
        price.storage_per_gb_month,
        format_money(total)
    );
    ctx.finish(unit_price, total, detail)
}

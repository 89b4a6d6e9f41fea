//! S3 storage: tiered GB-month storage plus PUT/GET request charges

use super::{format_money, CostResult, EstimateContext};

pub const DEFAULT_STORAGE_CLASS: &str = "STANDARD";
pub const DEFAULT_SIZE_GB: f64 = 0.0;

/// Accept the spellings people actually use for storage classes
fn normalize_storage_class(raw: &str) -> String {
    let upper = raw.trim().to_uppercase().replace(['-', ' '], "_");
    match upper.as_str() {
        "GLACIER_FLEXIBLE_RETRIEVAL" => "GLACIER".to_string(),
        "GLACIER_INSTANT_RETRIEVAL" => "GLACIER_IR".to_string(),
        "INFREQUENT_ACCESS" => "STANDARD_IA".to_string(),
        _ => upper,
    }
}

pub fn estimate(mut ctx: EstimateContext<'_>) -> CostResult {
    let storage_class = match ctx.sku() {
        Some(sku) => normalize_storage_class(sku),
        None => {
            ctx.record_default("storage_class");
            DEFAULT_STORAGE_CLASS.to_string()
        }
    };
    let size_gb = ctx.usage.number(&["size", "size_gb", "storage_gb"], DEFAULT_SIZE_GB);
    let puts = ctx.usage.optional_number(&["put_requests"]).unwrap_or(0.0);
    let gets = ctx.usage.optional_number(&["get_requests"]).unwrap_or(0.0);

    let Some(price) = ctx.index.s3(&storage_class).cloned() else {
        return ctx.not_found(&format!("storage class {}", storage_class));
    };

    let storage = price.storage.apply(size_gb);
    let put_cost = puts / 1000.0 * price.per_1k_put;
    let get_cost = gets / 1000.0 * price.per_1k_get;
    let total = storage.total + put_cost + get_cost;

    ctx.step(|| format!("storage tiers: {} = {}", storage.describe(), storage.total));
    ctx.step(|| format!("{} PUT × {}/1k = {}", puts, price.per_1k_put, put_cost));
    ctx.step(|| format!("{} GET × {}/1k = {}", gets, price.per_1k_get, get_cost));

    let mut detail = format!(
        "S3 {}{}: {} GB{} tiered ({})",
        storage_class,
        ctx.marker("storage_class"),
        size_gb,
        ctx.marker("size"),
        storage.describe()
    );
    if puts > 0.0 {
        detail.push_str(&format!(" + {} PUT × {}/1k", puts, price.per_1k_put));
    }
    if gets > 0.0 {
        detail.push_str(&format!(" + {} GET × {}/1k", gets, price.per_1k_get));
    }
    detail.push_str(&format!(" = {}", format_money(total)));

    ctx.finish(price.storage.first_rate(), total, detail)
}

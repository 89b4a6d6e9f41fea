//! RDS instances: instance hours plus allocated storage, doubled for Multi-AZ

use super::{format_money, CostResult, EstimateContext, HOURS_PER_MONTH};
use crate::pricing::index::normalize_rds_engine;

pub const DEFAULT_ENGINE: &str = "mysql";
pub const DEFAULT_STORAGE_TYPE: &str = "gp2";
pub const DEFAULT_STORAGE_GB: f64 = 20.0;

fn normalize_storage_type(raw: &str) -> Option<&'static str> {
    match raw.trim().to_lowercase().as_str() {
        "gp2" => Some("gp2"),
        "gp3" => Some("gp3"),
        "io1" => Some("io1"),
        "io2" => Some("io2"),
        "standard" | "magnetic" => Some("standard"),
        _ => None,
    }
}

pub fn estimate(mut ctx: EstimateContext<'_>) -> CostResult {
    let Some(instance_class) = ctx.sku() else {
        return ctx.not_found("instance class (empty sku)");
    };

    let engine = ctx
        .usage
        .choice(&["engine", "database_engine"], normalize_rds_engine, DEFAULT_ENGINE);
    let storage_type =
        ctx.usage
            .choice(&["storage_type"], normalize_storage_type, DEFAULT_STORAGE_TYPE);
    let size_gb = ctx
        .usage
        .number(&["storage_size", "size", "allocated_storage"], DEFAULT_STORAGE_GB);
    let multi_az = ctx.usage.flag(&["multi_az"]);

    let Some(hourly) = ctx.index.rds_instance(instance_class, engine) else {
        return ctx.not_found(&format!("instance class {} ({})", instance_class, engine));
    };
    let Some(storage_rate) = ctx.index.rds_storage(storage_type) else {
        return ctx.not_found(&format!("storage type {}", storage_type));
    };

    let deployments = if multi_az { 2.0 } else { 1.0 };
    let instance_cost = hourly * HOURS_PER_MONTH;
    let storage_cost = size_gb * storage_rate;
    let total = (instance_cost + storage_cost) * deployments;

    ctx.step(|| format!("instance {} × {} = {}", hourly, HOURS_PER_MONTH, instance_cost));
    ctx.step(|| format!("storage {} GB × {} = {}", size_gb, storage_rate, storage_cost));
    ctx.step(|| format!("deployments × {}", deployments));

    let mut detail = format!(
        "RDS {} {}{}: {}/hr × {} hrs + {} GB{} {}{} × {}/GB-month",
        instance_class,
        engine,
        ctx.marker("engine"),
        hourly,
        HOURS_PER_MONTH,
        size_gb,
        ctx.marker("storage_size"),
        storage_type,
        ctx.marker("storage_type"),
        storage_rate
    );
    if multi_az {
        detail.push_str(", Multi-AZ × 2");
    }
    detail.push_str(&format!(" = {}", format_money(total)));

    ctx.finish(hourly, total, detail)
}

//! Lambda: per-request charge plus GB-seconds of compute

use super::{format_money, CostResult, EstimateContext};
use crate::pricing::LambdaArchitecture;

pub const DEFAULT_MEMORY_MB: f64 = 128.0;
pub const DEFAULT_DURATION_MS: f64 = 100.0;
pub const DEFAULT_REQUESTS: f64 = 0.0;

pub fn estimate(mut ctx: EstimateContext<'_>) -> CostResult {
    let requests = ctx
        .usage
        .number(&["requests_per_month", "requests"], DEFAULT_REQUESTS);
    let duration_ms = ctx.usage.number(&["duration_ms", "avg_duration_ms"], DEFAULT_DURATION_MS);
    let memory_mb = ctx.usage.number(&["memory_mb", "memory"], DEFAULT_MEMORY_MB);
    let architecture = ctx.usage.optional_choice(
        &["architecture", "arch"],
        LambdaArchitecture::parse,
        LambdaArchitecture::X86_64,
    );

    let Some(price) = ctx.index.lambda(architecture) else {
        return ctx.category_unavailable();
    };

    let gb_seconds = (memory_mb / 1024.0) * (duration_ms / 1000.0) * requests;
    let request_cost = requests * price.per_request;
    let compute_cost = gb_seconds * price.per_gb_second;
    let total = request_cost + compute_cost;

    ctx.step(|| format!("{} requests × {} = {}", requests, price.per_request, request_cost));
    ctx.step(|| {
        format!(
            "{} MB × {} ms × {} requests = {} GB-s × {} = {}",
            memory_mb, duration_ms, requests, gb_seconds, price.per_gb_second, compute_cost
        )
    });

    let detail = format!(
        "Lambda {}{}: {} requests{} × {} + {} GB-s ({} MB{} × {} ms{}) × {} = {}",
        architecture.as_str(),
        ctx.marker("architecture"),
        requests,
        ctx.marker("requests_per_month"),
        price.per_request,
        gb_seconds,
        memory_mb,
        ctx.marker("memory_mb"),
        duration_ms,
        ctx.marker("duration_ms"),
        price.per_gb_second,
        format_money(total)
    );
    ctx.finish(price.per_gb_second, total, detail)
}

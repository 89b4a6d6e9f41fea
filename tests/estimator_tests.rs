//! Per-service cost estimates through the public engine

use costctl::estimate::PRICING_UNAVAILABLE;
use costctl::{Engine, EngineConfig, ResourceRequest, ServiceFamily};

fn engine() -> Engine {
    Engine::from_embedded("us-east-1").unwrap()
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {}, got {}",
        expected,
        actual
    );
}

#[test]
fn test_ec2_on_demand_linux() {
    let req = ResourceRequest::aws("ec2", "t3.micro", "us-east-1");
    let result = engine().projected_cost(&req).unwrap();
    assert_close(result.cost_per_month, 7.592);
    assert_eq!(result.unit_price, 0.0104);
    assert_eq!(result.currency, "USD");
    assert!(result.billing_detail.contains("0.0104"));
    assert!(result.billing_detail.contains("730"));
    assert!(result.defaulted_fields.is_empty());
}

#[test]
fn test_ebs_gp3_100gb() {
    let req = ResourceRequest::aws("ebs", "gp3", "us-east-1").with_tag("size", "100");
    let result = engine().projected_cost(&req).unwrap();
    assert_close(result.cost_per_month, 8.00);
    assert!(result.billing_detail.contains("100 GB"));
    assert!(result.billing_detail.contains("0.08"));
}

#[test]
fn test_ebs_malformed_size_defaults() {
    let req = ResourceRequest::aws("ebs", "gp3", "us-east-1").with_tag("size", "lots");
    let result = engine().projected_cost(&req).unwrap();
    assert_close(result.cost_per_month, 8.0 * 0.08);
    assert!(result.defaulted_fields.contains("size"));
    assert!(result.billing_detail.contains("(defaulted)"));
}

#[test]
fn test_pulumi_tokens_route_to_estimators() {
    let engine = engine();
    let cases = [
        ("aws:ec2/instance:Instance", "t3.micro", ServiceFamily::Ec2),
        ("aws:ebs/volume:Volume", "gp2", ServiceFamily::Ebs),
        ("aws:s3/bucketV2:BucketV2", "STANDARD", ServiceFamily::S3),
        ("aws:rds/instance:Instance", "db.t3.micro", ServiceFamily::Rds),
        ("aws:eks/cluster:Cluster", "", ServiceFamily::Eks),
        ("aws:lambda/function:Function", "", ServiceFamily::Lambda),
        ("aws:lb/loadBalancer:LoadBalancer", "alb", ServiceFamily::Elb),
        ("aws:ec2/natGateway:NatGateway", "", ServiceFamily::NatGateway),
        ("aws:dynamodb/table:Table", "", ServiceFamily::DynamoDb),
        ("aws:cloudwatch/logGroup:LogGroup", "", ServiceFamily::CloudWatch),
    ];
    for (token, sku, expected) in cases {
        let req = ResourceRequest::aws(token, sku, "us-east-1");
        let result = engine.projected_cost(&req).unwrap();
        assert_eq!(result.service, expected, "{}", token);
        assert!(result.price_available, "{}: {}", token, result.billing_detail);
    }
}

#[test]
fn test_unknown_sku_is_soft_failure() {
    let req = ResourceRequest::aws("ec2", "z9.enormous", "us-east-1");
    let result = engine().projected_cost(&req).unwrap();
    assert_eq!(result.cost_per_month, 0.0);
    assert!(!result.price_available);
    assert!(result.billing_detail.contains(PRICING_UNAVAILABLE));
    assert!(result.billing_detail.contains("z9.enormous"));
}

#[test]
fn test_empty_dataset_soft_fails_every_family() {
    let engine = Engine::new(EngineConfig {
        region: "us-east-1".to_string(),
        currency: "USD".to_string(),
        enhanced_diagnostics: false,
        default_utilization: None,
        dataset: r#"{"region": "us-east-1"}"#.into(),
    });
    for service in ServiceFamily::ALL {
        let req = ResourceRequest::aws(service.as_str(), "x", "us-east-1");
        let result = engine.projected_cost(&req).unwrap();
        assert_eq!(result.cost_per_month, 0.0, "{}", service);
        assert!(!result.billing_detail.is_empty());
        assert!(result.billing_detail.contains("not found"), "{}", result.billing_detail);
    }
}

#[test]
fn test_lambda_requests_and_compute() {
    let req = ResourceRequest::aws("lambda", "", "us-east-1")
        .with_tag("requests_per_month", "1000000")
        .with_tag("duration_ms", "200")
        .with_tag("memory_mb", "512");
    let result = engine().projected_cost(&req).unwrap();
    let gb_seconds = 1_000_000.0 * 0.2 * 0.5;
    assert_close(result.cost_per_month, 1_000_000.0 * 2e-7 + gb_seconds * 0.0000166667);
}

#[test]
fn test_cloudwatch_metrics_tiered() {
    let req = ResourceRequest::aws("cloudwatch", "metrics", "us-east-1")
        .with_tag("custom_metrics", "15000");
    let result = engine().projected_cost(&req).unwrap();
    assert_close(result.cost_per_month, 3_500.0);
}

#[test]
fn test_dynamodb_provisioned() {
    let req = ResourceRequest::aws("dynamodb", "provisioned", "us-east-1")
        .with_tag("read_capacity_units", "10")
        .with_tag("write_capacity_units", "10")
        .with_tag("storage_gb", "20");
    let result = engine().projected_cost(&req).unwrap();
    assert_close(
        result.cost_per_month,
        (10.0 * 0.00013 + 10.0 * 0.00065) * 730.0 + 20.0 * 0.25,
    );
}

#[test]
fn test_nat_gateway_and_elb() {
    let engine = engine();
    let nat = ResourceRequest::aws("natgw", "", "us-east-1").with_tag("data_processed_gb", "100");
    assert_close(
        engine.projected_cost(&nat).unwrap().cost_per_month,
        0.045 * 730.0 + 100.0 * 0.045,
    );
    let nlb = ResourceRequest::aws("nlb", "", "us-east-1").with_tag("capacity_units", "2");
    assert_close(
        engine.projected_cost(&nlb).unwrap().cost_per_month,
        0.0225 * 730.0 + 2.0 * 0.006 * 730.0,
    );
}

#[test]
fn test_enhanced_diagnostics_do_not_change_numbers() {
    let plain = engine();
    let enhanced = Engine::new(
        EngineConfig::embedded("us-east-1")
            .unwrap()
            .with_enhanced_diagnostics(true),
    );
    let req = ResourceRequest::aws("rds", "db.m5.large", "us-east-1")
        .with_tag("engine", "postgres")
        .with_tag("multi_az", "true");
    let a = plain.projected_cost(&req).unwrap();
    let b = enhanced.projected_cost(&req).unwrap();
    assert_eq!(a.cost_per_month, b.cost_per_month);
    assert_eq!(a.billing_detail, b.billing_detail);
    assert!(a.diagnostics.is_empty());
    assert!(!b.diagnostics.is_empty());
}

#[test]
fn test_huge_usage_is_defaulted_not_infinite() {
    let req = ResourceRequest::aws("elb", "alb", "us-east-1").with_tag("capacity_units", "1e308");
    let result = engine().projected_cost(&req).unwrap();
    assert!(result.cost_per_month.is_finite());
    assert_close(result.cost_per_month, 0.0225 * 730.0);
    assert!(result.defaulted_fields.contains("capacity_units"));
    assert!(!result.billing_detail.contains("inf"));

    let json = serde_json::to_value(&result).unwrap();
    assert!(json["cost_per_month"].is_number());
}

#[test]
fn test_blank_size_uses_alias() {
    let req = ResourceRequest::aws("ebs", "gp3", "us-east-1")
        .with_tag("size", "")
        .with_tag("size_gb", "100");
    let result = engine().projected_cost(&req).unwrap();
    assert_close(result.cost_per_month, 8.0);
    assert!(result.defaulted_fields.is_empty());
}

//! Regional price index: embedded data, isolation and concurrent first access

use costctl::pricing::embedded::{dataset_for, embedded_regions};
use costctl::pricing::{LambdaArchitecture, LoadBalancerKind, PriceCategory, PriceIndex};
use std::sync::Arc;
use std::thread;

fn us_east_1() -> PriceIndex {
    PriceIndex::new("us-east-1", dataset_for("us-east-1").unwrap())
}

#[test]
fn test_embedded_documents_load_cleanly() {
    for region in embedded_regions() {
        let index = PriceIndex::new(region, dataset_for(region).unwrap());
        assert!(
            index.load_errors().is_empty(),
            "{}: {:?}",
            region,
            index.load_errors()
        );
        assert!(index.entry_count() > 0);
        assert_eq!(index.currency(), "USD");
    }
}

#[test]
fn test_every_category_present_in_us_east_1() {
    let index = us_east_1();
    assert_eq!(index.ec2("t3.micro", "linux", "shared").unwrap().hourly, 0.0104);
    assert_eq!(index.ebs("gp3").unwrap().per_gb_month, 0.08);
    assert!(index.s3("STANDARD").is_some());
    assert_eq!(index.rds_instance("db.t3.micro", "mysql"), Some(0.017));
    assert_eq!(index.rds_storage("gp2"), Some(0.115));
    assert!(index.eks().is_some());
    assert!(index.lambda(LambdaArchitecture::Arm64).is_some());
    assert!(index.load_balancer(LoadBalancerKind::Network).is_some());
    assert!(index.nat_gateway().is_some());
    assert!(index.dynamodb().is_some());
    assert!(index.cloudwatch().is_some());
}

#[test]
fn test_regions_differ() {
    let east = us_east_1();
    let west = PriceIndex::new("eu-west-1", dataset_for("eu-west-1").unwrap());
    let a = east.ec2("m5.large", "linux", "shared").unwrap().hourly;
    let b = west.ec2("m5.large", "linux", "shared").unwrap().hourly;
    assert!(b > a);
}

#[test]
fn test_index_never_mixes_regions() {
    // us-west-2 data loaded into a us-east-1 index is rejected wholesale
    let index = PriceIndex::new("us-east-1", dataset_for("us-west-2").unwrap());
    assert!(index.ec2("t3.micro", "linux", "shared").is_none());
    assert!(index.eks().is_none());
    assert_eq!(index.entry_count(), 0);
    assert_eq!(index.load_errors()[0].category, PriceCategory::Dataset);
}

#[test]
fn test_unknown_keys_are_misses() {
    let index = us_east_1();
    assert!(index.ec2("z9.enormous", "linux", "shared").is_none());
    assert!(index.ebs("gp9").is_none());
    assert!(index.rds_instance("db.t3.micro", "db2").is_none());
}

#[test]
fn test_concurrent_first_access_initializes_once() {
    let index = Arc::new(us_east_1());
    let handles: Vec<_> = (0..16)
        .map(|_| {
            let index = Arc::clone(&index);
            thread::spawn(move || index.ec2("t3.micro", "linux", "shared").map(|p| p.hourly))
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), Some(0.0104));
    }
    assert!(index.is_initialized());
    assert!(index.load_errors().is_empty());
}

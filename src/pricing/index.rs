//! Regional price index
//!
//! Parses one region's price document into typed lookup maps exactly once,
//! on first access, then serves lock-free reads for the life of the index.
//! Malformed sections are recorded in `load_errors()` and leave their
//! category empty; other categories keep working.

use crate::pricing::dataset::{
    CloudWatchSection, DatasetHeader, DynamoDbSection, EbsPriceRecord, Ec2PriceRecord,
    EksSection, ElbSection, LambdaArchRecord, LambdaSection, LoadBalancerRecord,
    NatGatewaySection, RdsSection, S3PriceRecord,
};
use crate::pricing::tiered::TierSchedule;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;
use tracing::{info, warn};

/// Price categories held by the index, one per document section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceCategory {
    /// The document as a whole (syntax, header, region)
    Dataset,
    Ec2,
    Ebs,
    S3,
    Rds,
    Eks,
    Lambda,
    Elb,
    NatGateway,
    DynamoDb,
    CloudWatch,
}

impl PriceCategory {
    /// Key of the section in the price document
    pub fn key(&self) -> &'static str {
        match self {
            PriceCategory::Dataset => "dataset",
            PriceCategory::Ec2 => "ec2",
            PriceCategory::Ebs => "ebs",
            PriceCategory::S3 => "s3",
            PriceCategory::Rds => "rds",
            PriceCategory::Eks => "eks",
            PriceCategory::Lambda => "lambda",
            PriceCategory::Elb => "elb",
            PriceCategory::NatGateway => "nat_gateway",
            PriceCategory::DynamoDb => "dynamodb",
            PriceCategory::CloudWatch => "cloudwatch",
        }
    }
}

impl fmt::Display for PriceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A problem found while parsing the price document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadError {
    pub category: PriceCategory,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ec2Price {
    pub hourly: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct S3Price {
    pub storage: TierSchedule,
    pub per_1k_put: f64,
    pub per_1k_get: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CloudWatchPrices {
    pub log_ingestion: TierSchedule,
    pub log_storage_per_gb_month: f64,
    pub metrics: TierSchedule,
}

/// Lambda CPU architecture, each priced separately
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LambdaArchitecture {
    X86_64,
    Arm64,
}

impl LambdaArchitecture {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().replace('-', "_").as_str() {
            "x86_64" | "x86" | "amd64" => Some(LambdaArchitecture::X86_64),
            "arm64" | "arm" | "aarch64" | "graviton" => Some(LambdaArchitecture::Arm64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LambdaArchitecture::X86_64 => "x86_64",
            LambdaArchitecture::Arm64 => "arm64",
        }
    }
}

/// Load balancer flavor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadBalancerKind {
    Application,
    Network,
}

impl LoadBalancerKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "alb" | "application" => Some(LoadBalancerKind::Application),
            "nlb" | "network" => Some(LoadBalancerKind::Network),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LoadBalancerKind::Application => "alb",
            LoadBalancerKind::Network => "nlb",
        }
    }
}

/// Normalize an EC2 operating system label to the index key
pub fn normalize_operating_system(raw: &str) -> Option<&'static str> {
    match raw.trim().to_lowercase().as_str() {
        "linux" | "linux/unix" | "amazon linux" | "al2" | "al2023" | "ubuntu" => Some("linux"),
        "windows" | "win" => Some("windows"),
        "rhel" | "red hat enterprise linux" | "redhat" => Some("rhel"),
        "suse" | "sles" | "suse linux" => Some("suse"),
        _ => None,
    }
}

/// Normalize an EC2 tenancy label to the index key
pub fn normalize_tenancy(raw: &str) -> Option<&'static str> {
    match raw.trim().to_lowercase().as_str() {
        "shared" | "default" => Some("shared"),
        "dedicated" => Some("dedicated"),
        "host" | "dedicated-host" => Some("host"),
        _ => None,
    }
}

/// Normalize an RDS engine label to the index key
pub fn normalize_rds_engine(raw: &str) -> Option<&'static str> {
    match raw.trim().to_lowercase().as_str() {
        "mysql" => Some("mysql"),
        "postgres" | "postgresql" => Some("postgres"),
        "mariadb" => Some("mariadb"),
        "aurora-mysql" | "aurora" => Some("aurora-mysql"),
        "aurora-postgresql" | "aurora-postgres" => Some("aurora-postgresql"),
        "oracle" | "oracle-se2" => Some("oracle-se2"),
        "sqlserver" | "sqlserver-ex" | "sql-server" => Some("sqlserver-ex"),
        _ => None,
    }
}

fn key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[derive(Debug, Default)]
struct PriceTables {
    currency: String,
    ec2: HashMap<(String, String, String), Ec2Price>,
    ebs: HashMap<String, EbsPriceRecord>,
    s3: HashMap<String, S3Price>,
    rds_instances: HashMap<(String, String), f64>,
    rds_storage: HashMap<String, f64>,
    eks: Option<EksSection>,
    lambda: Option<LambdaSection>,
    elb: Option<ElbSection>,
    nat_gateway: Option<NatGatewaySection>,
    dynamodb: Option<DynamoDbSection>,
    cloudwatch: Option<CloudWatchPrices>,
    errors: Vec<LoadError>,
}

impl PriceTables {
    fn build(region: &str, source: &str) -> Self {
        let mut tables = PriceTables {
            currency: "USD".to_string(),
            ..Default::default()
        };

        let doc: serde_json::Value = match serde_json::from_str(source) {
            Ok(doc) => doc,
            Err(e) => {
                tables.record(PriceCategory::Dataset, format!("malformed price document: {}", e));
                return tables;
            }
        };

        let header = match DatasetHeader::deserialize(&doc) {
            Ok(header) => header,
            Err(e) => {
                tables.record(PriceCategory::Dataset, format!("invalid document header: {}", e));
                return tables;
            }
        };

        if header.region != region {
            tables.record(
                PriceCategory::Dataset,
                format!(
                    "price document is for region {} but index serves {}",
                    header.region, region
                ),
            );
            return tables;
        }
        tables.currency = header.currency;

        if let Some(records) = tables.section::<Vec<Ec2PriceRecord>>(&doc, PriceCategory::Ec2) {
            for r in records {
                let os = normalize_operating_system(&r.operating_system)
                    .map(str::to_string)
                    .unwrap_or_else(|| key(&r.operating_system));
                let tenancy = normalize_tenancy(&r.tenancy)
                    .map(str::to_string)
                    .unwrap_or_else(|| key(&r.tenancy));
                tables
                    .ec2
                    .entry((key(&r.instance_type), os, tenancy))
                    .or_insert(Ec2Price { hourly: r.hourly });
            }
        }

        if let Some(records) = tables.section::<Vec<EbsPriceRecord>>(&doc, PriceCategory::Ebs) {
            for r in records {
                tables.ebs.entry(key(&r.volume_type)).or_insert(r);
            }
        }

        if let Some(records) = tables.section::<Vec<S3PriceRecord>>(&doc, PriceCategory::S3) {
            for r in records {
                match TierSchedule::new(r.storage_tiers) {
                    Ok(storage) => {
                        tables.s3.entry(key(&r.storage_class)).or_insert(S3Price {
                            storage,
                            per_1k_put: r.per_1k_put,
                            per_1k_get: r.per_1k_get,
                        });
                    }
                    Err(e) => tables.record(
                        PriceCategory::S3,
                        format!("storage class {}: {}", r.storage_class, e),
                    ),
                }
            }
        }

        if let Some(section) = tables.section::<RdsSection>(&doc, PriceCategory::Rds) {
            for r in section.instances {
                let engine = normalize_rds_engine(&r.engine)
                    .map(str::to_string)
                    .unwrap_or_else(|| key(&r.engine));
                tables
                    .rds_instances
                    .entry((key(&r.instance_class), engine))
                    .or_insert(r.hourly);
            }
            for r in section.storage {
                tables
                    .rds_storage
                    .entry(key(&r.storage_type))
                    .or_insert(r.per_gb_month);
            }
        }

        tables.eks = tables.section(&doc, PriceCategory::Eks);
        tables.lambda = tables.section(&doc, PriceCategory::Lambda);
        tables.elb = tables.section(&doc, PriceCategory::Elb);
        tables.nat_gateway = tables.section(&doc, PriceCategory::NatGateway);
        tables.dynamodb = tables.section(&doc, PriceCategory::DynamoDb);

        if let Some(section) = tables.section::<CloudWatchSection>(&doc, PriceCategory::CloudWatch) {
            let ingestion = TierSchedule::new(section.log_ingestion_tiers);
            let metrics = TierSchedule::new(section.metric_tiers);
            match (ingestion, metrics) {
                (Ok(log_ingestion), Ok(metrics)) => {
                    tables.cloudwatch = Some(CloudWatchPrices {
                        log_ingestion,
                        log_storage_per_gb_month: section.log_storage_per_gb_month,
                        metrics,
                    });
                }
                (Err(e), _) => {
                    tables.record(PriceCategory::CloudWatch, format!("log ingestion tiers: {}", e))
                }
                (_, Err(e)) => tables.record(PriceCategory::CloudWatch, format!("metric tiers: {}", e)),
            }
        }

        tables
    }

    /// Deserialize one section. Absent sections are not errors.
    fn section<T: DeserializeOwned>(
        &mut self,
        doc: &serde_json::Value,
        category: PriceCategory,
    ) -> Option<T> {
        let value = doc.get(category.key())?;
        match T::deserialize(value) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                self.record(category, e.to_string());
                None
            }
        }
    }

    fn record(&mut self, category: PriceCategory, message: String) {
        warn!("Price index: {} section unavailable: {}", category, message);
        self.errors.push(LoadError { category, message });
    }

    fn entry_count(&self) -> usize {
        self.ec2.len()
            + self.ebs.len()
            + self.s3.len()
            + self.rds_instances.len()
            + self.rds_storage.len()
            + [
                self.eks.is_some(),
                self.lambda.is_some(),
                self.elb.is_some(),
                self.nat_gateway.is_some(),
                self.dynamodb.is_some(),
                self.cloudwatch.is_some(),
            ]
            .iter()
            .filter(|present| **present)
            .count()
    }
}

/// Read-only price lookups for one region
///
/// Construction does no work. The document is parsed on the first lookup,
/// exactly once even under concurrent first access, and never mutated after.
#[derive(Debug)]
pub struct PriceIndex {
    region: String,
    source: Cow<'static, str>,
    tables: OnceLock<PriceTables>,
}

impl PriceIndex {
    pub fn new(region: impl Into<String>, source: impl Into<Cow<'static, str>>) -> Self {
        Self {
            region: region.into(),
            source: source.into(),
            tables: OnceLock::new(),
        }
    }

    /// Region this index serves
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Parse the document if that hasn't happened yet
    pub fn initialize(&self) {
        let _ = self.tables();
    }

    pub fn is_initialized(&self) -> bool {
        self.tables.get().is_some()
    }

    fn tables(&self) -> &PriceTables {
        self.tables.get_or_init(|| {
            let tables = PriceTables::build(&self.region, &self.source);
            info!(
                "Price index initialized for {}: {} entries, {} load errors",
                self.region,
                tables.entry_count(),
                tables.errors.len()
            );
            tables
        })
    }

    pub fn currency(&self) -> &str {
        &self.tables().currency
    }

    pub fn load_errors(&self) -> &[LoadError] {
        &self.tables().errors
    }

    pub fn entry_count(&self) -> usize {
        self.tables().entry_count()
    }

    /// On-demand hourly rate for an instance type, OS and tenancy
    pub fn ec2(&self, instance_type: &str, operating_system: &str, tenancy: &str) -> Option<Ec2Price> {
        self.tables()
            .ec2
            .get(&(key(instance_type), key(operating_system), key(tenancy)))
            .copied()
    }

    pub fn ebs(&self, volume_type: &str) -> Option<&EbsPriceRecord> {
        self.tables().ebs.get(&key(volume_type))
    }

    pub fn s3(&self, storage_class: &str) -> Option<&S3Price> {
        self.tables().s3.get(&key(storage_class))
    }

    /// Hourly rate for an RDS instance class running a normalized engine
    pub fn rds_instance(&self, instance_class: &str, engine: &str) -> Option<f64> {
        self.tables()
            .rds_instances
            .get(&(key(instance_class), key(engine)))
            .copied()
    }

    pub fn rds_storage(&self, storage_type: &str) -> Option<f64> {
        self.tables().rds_storage.get(&key(storage_type)).copied()
    }

    pub fn eks(&self) -> Option<EksSection> {
        self.tables().eks
    }

    pub fn lambda(&self, architecture: LambdaArchitecture) -> Option<LambdaArchRecord> {
        self.tables().lambda.map(|section| match architecture {
            LambdaArchitecture::X86_64 => section.x86_64,
            LambdaArchitecture::Arm64 => section.arm64,
        })
    }

    pub fn load_balancer(&self, kind: LoadBalancerKind) -> Option<LoadBalancerRecord> {
        self.tables().elb.map(|section| match kind {
            LoadBalancerKind::Application => section.alb,
            LoadBalancerKind::Network => section.nlb,
        })
    }

    pub fn nat_gateway(&self) -> Option<NatGatewaySection> {
        self.tables().nat_gateway
    }

    pub fn dynamodb(&self) -> Option<DynamoDbSection> {
        self.tables().dynamodb
    }

    pub fn cloudwatch(&self) -> Option<&CloudWatchPrices> {
        self.tables().cloudwatch.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
        "region": "us-east-1",
        "currency": "USD",
        "ec2": [
            {"instance_type": "t3.micro", "operating_system": "Linux", "tenancy": "Shared", "hourly": 0.0104},
            {"instance_type": "t3.micro", "operating_system": "Windows", "tenancy": "Shared", "hourly": 0.0196}
        ],
        "ebs": [{"volume_type": "gp3", "per_gb_month": 0.08}],
        "dynamodb": {"per_rcu_hour": "not a number"}
    }"#;

    #[test]
    fn test_lazy_initialization() {
        let index = PriceIndex::new("us-east-1", DOC);
        assert!(!index.is_initialized());
        assert!(index.ec2("t3.micro", "linux", "shared").is_some());
        assert!(index.is_initialized());
    }

    #[test]
    fn test_keys_are_normalized() {
        let index = PriceIndex::new("us-east-1", DOC);
        assert_eq!(index.ec2("T3.Micro", "LINUX", "shared").unwrap().hourly, 0.0104);
        assert_eq!(index.ec2("t3.micro", "windows", "shared").unwrap().hourly, 0.0196);
        assert_eq!(index.ebs("GP3").unwrap().per_gb_month, 0.08);
    }

    #[test]
    fn test_malformed_section_is_isolated() {
        let index = PriceIndex::new("us-east-1", DOC);
        assert!(index.dynamodb().is_none());
        assert!(index.ebs("gp3").is_some());
        let errors = index.load_errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].category, PriceCategory::DynamoDb);
    }

    #[test]
    fn test_absent_section_is_not_an_error() {
        let index = PriceIndex::new("us-east-1", DOC);
        assert!(index.lambda(LambdaArchitecture::Arm64).is_none());
        assert!(index
            .load_errors()
            .iter()
            .all(|e| e.category != PriceCategory::Lambda));
    }

    #[test]
    fn test_malformed_document_reports_not_found() {
        let index = PriceIndex::new("us-east-1", "{ not json");
        assert!(index.ec2("t3.micro", "linux", "shared").is_none());
        assert_eq!(index.load_errors()[0].category, PriceCategory::Dataset);
        assert_eq!(index.entry_count(), 0);
    }

    #[test]
    fn test_foreign_region_document_is_rejected() {
        let index = PriceIndex::new("eu-west-1", DOC);
        assert!(index.ec2("t3.micro", "linux", "shared").is_none());
        assert!(index.ebs("gp3").is_none());
        assert!(index.load_errors()[0].message.contains("us-east-1"));
    }

    #[test]
    fn test_normalizers() {
        assert_eq!(normalize_operating_system("Linux/UNIX"), Some("linux"));
        assert_eq!(normalize_operating_system("beos"), None);
        assert_eq!(normalize_tenancy("default"), Some("shared"));
        assert_eq!(normalize_rds_engine("PostgreSQL"), Some("postgres"));
        assert_eq!(LambdaArchitecture::parse("ARM64"), Some(LambdaArchitecture::Arm64));
        assert_eq!(LoadBalancerKind::parse("network"), Some(LoadBalancerKind::Network));
    }
}

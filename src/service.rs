//! Supported resource families and the spelling normalization that selects them

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Closed set of resource families the engine can price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceFamily {
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

impl ServiceFamily {
    pub const ALL: [ServiceFamily; 10] = [
        ServiceFamily::Ec2,
        ServiceFamily::Ebs,
        ServiceFamily::S3,
        ServiceFamily::Rds,
        ServiceFamily::Eks,
        ServiceFamily::Lambda,
        ServiceFamily::Elb,
        ServiceFamily::NatGateway,
        ServiceFamily::DynamoDb,
        ServiceFamily::CloudWatch,
    ];

    /// Canonical identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceFamily::Ec2 => "ec2",
            ServiceFamily::Ebs => "ebs",
            ServiceFamily::S3 => "s3",
            ServiceFamily::Rds => "rds",
            ServiceFamily::Eks => "eks",
            ServiceFamily::Lambda => "lambda",
            ServiceFamily::Elb => "elb",
            ServiceFamily::NatGateway => "natgw",
            ServiceFamily::DynamoDb => "dynamodb",
            ServiceFamily::CloudWatch => "cloudwatch",
        }
    }

    /// Human-readable name used in billing details
    pub fn display_name(&self) -> &'static str {
        match self {
            ServiceFamily::Ec2 => "EC2 instance",
            ServiceFamily::Ebs => "EBS volume",
            ServiceFamily::S3 => "S3 storage",
            ServiceFamily::Rds => "RDS instance",
            ServiceFamily::Eks => "EKS cluster",
            ServiceFamily::Lambda => "Lambda function",
            ServiceFamily::Elb => "Load balancer",
            ServiceFamily::NatGateway => "NAT gateway",
            ServiceFamily::DynamoDb => "DynamoDB table",
            ServiceFamily::CloudWatch => "CloudWatch",
        }
    }

    /// Comma-separated canonical identifiers
    pub fn supported_names() -> String {
        Self::ALL
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Map any accepted spelling to a family.
    ///
    /// Accepts short names ("ec2", "natgw") and Pulumi-style resource type
    /// tokens ("aws:ec2/instance:Instance"). Matching is case-insensitive.
    pub fn normalize(raw: &str) -> Option<ServiceFamily> {
        let lower = raw.trim().to_lowercase();
        if lower.is_empty() {
            return None;
        }

        if let Some(rest) = lower.strip_prefix("aws:") {
            return Self::from_resource_token(rest);
        }

        match lower.as_str() {
            "ec2" | "instance" | "ec2-instance" => Some(ServiceFamily::Ec2),
            "ebs" | "volume" | "ebs-volume" => Some(ServiceFamily::Ebs),
            "s3" | "bucket" => Some(ServiceFamily::S3),
            "rds" | "db" | "rds-instance" => Some(ServiceFamily::Rds),
            "eks" | "eks-cluster" => Some(ServiceFamily::Eks),
            "lambda" | "function" => Some(ServiceFamily::Lambda),
            "elb" | "alb" | "nlb" | "lb" | "loadbalancer" | "load-balancer" => {
                Some(ServiceFamily::Elb)
            }
            "natgw" | "nat_gateway" | "nat-gateway" | "natgateway" => {
                Some(ServiceFamily::NatGateway)
            }
            "dynamodb" | "dynamo" => Some(ServiceFamily::DynamoDb),
            "cloudwatch" | "logs" | "metrics" | "cloudwatch-logs" | "cloudwatch-metrics" => {
                Some(ServiceFamily::CloudWatch)
            }
            _ => None,
        }
    }

    /// `module/resource:Type` (the part after "aws:")
    fn from_resource_token(rest: &str) -> Option<ServiceFamily> {
        let (module, tail) = match rest.split_once('/') {
            Some((module, tail)) => (module, tail),
            None => (rest.split(':').next().unwrap_or(rest), ""),
        };
        let resource = tail.split(':').next().unwrap_or("");

        match (module, resource) {
            ("ec2", "instance") => Some(ServiceFamily::Ec2),
            ("ec2", "natgateway") => Some(ServiceFamily::NatGateway),
            ("ec2", "volume") | ("ebs", _) => Some(ServiceFamily::Ebs),
            ("s3", _) => Some(ServiceFamily::S3),
            ("rds", "instance") => Some(ServiceFamily::Rds),
            ("eks", "cluster") => Some(ServiceFamily::Eks),
            ("lambda", "function") => Some(ServiceFamily::Lambda),
            ("lb", "loadbalancer") | ("alb", "loadbalancer") | ("elb", "loadbalancer") => {
                Some(ServiceFamily::Elb)
            }
            ("dynamodb", "table") => Some(ServiceFamily::DynamoDb),
            ("cloudwatch", "loggroup") | ("cloudwatch", "metricalarm") => {
                Some(ServiceFamily::CloudWatch)
            }
            _ => None,
        }
    }
}

impl fmt::Display for ServiceFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A spelling that matches no supported family
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Service family {name:?} is not supported. Supported: {supported}", supported = ServiceFamily::supported_names())]
pub struct UnknownServiceFamily {
    pub name: String,
}

impl FromStr for ServiceFamily {
    type Err = UnknownServiceFamily;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::normalize(s).ok_or_else(|| UnknownServiceFamily {
            name: s.to_string(),
        })
    }
}

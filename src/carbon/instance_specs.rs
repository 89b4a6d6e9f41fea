//! Hardware facts used by the compute carbon formulas

/// Processor family and its per-vCPU power envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Processor {
    Intel,
    Amd,
    Graviton,
}

impl Processor {
    /// Average watts per vCPU at idle
    pub fn min_watts(&self) -> f64 {
        match self {
            Processor::Intel => 0.74,
            Processor::Amd => 0.82,
            Processor::Graviton => 0.47,
        }
    }

    /// Average watts per vCPU at full load
    pub fn max_watts(&self) -> f64 {
        match self {
            Processor::Intel => 3.5,
            Processor::Amd => 2.55,
            Processor::Graviton => 1.69,
        }
    }
}

/// Attached accelerators
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gpu {
    pub count: u32,
    /// Thermal design power of one GPU, watts
    pub tdp_watts: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstanceSpec {
    pub instance_type: &'static str,
    pub vcpus: u32,
    pub processor: Processor,
    pub gpu: Option<Gpu>,
}

const T4: f64 = 70.0;
const A10G: f64 = 300.0;
const V100: f64 = 300.0;
const A100: f64 = 400.0;

const fn cpu(instance_type: &'static str, vcpus: u32, processor: Processor) -> InstanceSpec {
    InstanceSpec {
        instance_type,
        vcpus,
        processor,
        gpu: None,
    }
}

const fn gpu(instance_type: &'static str, vcpus: u32, count: u32, tdp_watts: f64) -> InstanceSpec {
    InstanceSpec {
        instance_type,
        vcpus,
        processor: Processor::Intel,
        gpu: Some(Gpu { count, tdp_watts }),
    }
}

use self::Processor::{Amd, Graviton, Intel};

const SPECS: &[InstanceSpec] = &[
    cpu("t3.nano", 2, Intel),
    cpu("t3.micro", 2, Intel),
    cpu("t3.small", 2, Intel),
    cpu("t3.medium", 2, Intel),
    cpu("t3.large", 2, Intel),
    cpu("t3.xlarge", 4, Intel),
    cpu("t3.2xlarge", 8, Intel),
    cpu("t3a.micro", 2, Amd),
    cpu("t3a.medium", 2, Amd),
    cpu("t3a.2xlarge", 8, Amd),
    cpu("t4g.micro", 2, Graviton),
    cpu("t4g.small", 2, Graviton),
    cpu("t4g.medium", 2, Graviton),
    cpu("t4g.large", 2, Graviton),
    cpu("t4g.2xlarge", 8, Graviton),
    cpu("m5.large", 2, Intel),
    cpu("m5.xlarge", 4, Intel),
    cpu("m5.2xlarge", 8, Intel),
    cpu("m5.4xlarge", 16, Intel),
    cpu("m5.8xlarge", 32, Intel),
    cpu("m5.24xlarge", 96, Intel),
    cpu("m6i.large", 2, Intel),
    cpu("m6i.xlarge", 4, Intel),
    cpu("m6i.32xlarge", 128, Intel),
    cpu("m6a.large", 2, Amd),
    cpu("m6a.48xlarge", 192, Amd),
    cpu("m6g.large", 2, Graviton),
    cpu("m6g.xlarge", 4, Graviton),
    cpu("m6g.16xlarge", 64, Graviton),
    cpu("c5.large", 2, Intel),
    cpu("c5.xlarge", 4, Intel),
    cpu("c5.2xlarge", 8, Intel),
    cpu("c5.24xlarge", 96, Intel),
    cpu("c6g.large", 2, Graviton),
    cpu("c6g.16xlarge", 64, Graviton),
    cpu("r5.large", 2, Intel),
    cpu("r5.xlarge", 4, Intel),
    cpu("r5.24xlarge", 96, Intel),
    gpu("g4dn.xlarge", 4, 1, T4),
    gpu("g4dn.2xlarge", 8, 1, T4),
    gpu("g4dn.12xlarge", 48, 4, T4),
    gpu("g4dn.metal", 96, 8, T4),
    gpu("g5.xlarge", 4, 1, A10G),
    gpu("g5.48xlarge", 192, 8, A10G),
    gpu("p3.2xlarge", 8, 1, V100),
    gpu("p3.8xlarge", 32, 4, V100),
    gpu("p3.16xlarge", 64, 8, V100),
    gpu("p4d.24xlarge", 96, 8, A100),
];

/// Hardware facts for an instance type. RDS classes ("db.m5.large") resolve
/// to the underlying instance type.
pub fn lookup(instance_type: &str) -> Option<&'static InstanceSpec> {
    let normalized = instance_type.trim().to_lowercase();
    let bare = normalized.strip_prefix("db.").unwrap_or(&normalized);
    SPECS.iter().find(|spec| spec.instance_type == bare)
}

/// Family part of an instance type ("m5" for "m5.large")
pub fn family(instance_type: &str) -> &str {
    instance_type.split('.').next().unwrap_or(instance_type)
}

/// Largest vCPU count in the instance's family, i.e. the whole host
pub fn family_max_vcpus(spec: &InstanceSpec) -> u32 {
    let family_name = family(spec.instance_type);
    SPECS
        .iter()
        .filter(|other| family(other.instance_type) == family_name)
        .map(|other| other.vcpus)
        .max()
        .unwrap_or(spec.vcpus)
}

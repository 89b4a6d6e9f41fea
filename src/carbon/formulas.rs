//! Physical formulas behind the carbon estimate
//!
//! All functions are pure. Energy is computed in kWh, scaled by PUE, then
//! converted with the grid intensity (tCO2e/kWh) to grams.

use super::coefficients::{
    ARM64_EFFICIENCY_FACTOR, EMBODIED_GRAMS_PER_SERVER, GRAMS_PER_TON, HARDWARE_LIFESPAN_MONTHS,
    HDD_WH_PER_TB_HOUR, HOURS_PER_MONTH, LAMBDA_MB_PER_VCPU, SSD_WH_PER_TB_HOUR,
};

/// Storage medium
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageTechnology {
    Ssd,
    Hdd,
}

impl StorageTechnology {
    /// Wh per TB-hour
    pub fn coefficient(&self) -> f64 {
        match self {
            StorageTechnology::Ssd => SSD_WH_PER_TB_HOUR,
            StorageTechnology::Hdd => HDD_WH_PER_TB_HOUR,
        }
    }
}

/// Grams CO2e for `energy_kwh` of IT energy
pub fn energy_to_grams(energy_kwh: f64, pue: f64, grid_intensity: f64) -> f64 {
    energy_kwh * pue * grid_intensity * GRAMS_PER_TON
}

/// Inputs of the CPU power curve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CpuLoad {
    pub min_watts: f64,
    pub max_watts: f64,
    pub utilization: f64,
    pub vcpus: f64,
    pub hours: f64,
}

impl CpuLoad {
    /// Linear interpolation between idle and full-load watts per vCPU
    pub fn average_watts(&self) -> f64 {
        self.min_watts + self.utilization * (self.max_watts - self.min_watts)
    }

    pub fn energy_kwh(&self) -> f64 {
        self.average_watts() * self.vcpus * self.hours / 1000.0
    }
}

pub fn cpu_grams(load: &CpuLoad, pue: f64, grid_intensity: f64) -> f64 {
    energy_to_grams(load.energy_kwh(), pue, grid_intensity)
}

/// GPU energy: every accelerator draws TDP × utilization
pub fn gpu_energy_kwh(gpu_count: u32, tdp_watts: f64, utilization: f64, hours: f64) -> f64 {
    let watts = gpu_count as f64 * tdp_watts * utilization;
    watts * hours / 1000.0
}

pub fn gpu_grams(
    gpu_count: u32,
    tdp_watts: f64,
    utilization: f64,
    hours: f64,
    pue: f64,
    grid_intensity: f64,
) -> f64 {
    energy_to_grams(
        gpu_energy_kwh(gpu_count, tdp_watts, utilization, hours),
        pue,
        grid_intensity,
    )
}

/// Storage energy in kWh: TB × Wh/TB-hour × replicas × hours
pub fn storage_energy_kwh(
    size_gb: f64,
    technology: StorageTechnology,
    replication: f64,
    hours: f64,
) -> f64 {
    let watt_hours = (size_gb / 1000.0) * technology.coefficient() * replication * hours;
    watt_hours / 1000.0
}

pub fn storage_grams(
    size_gb: f64,
    technology: StorageTechnology,
    replication: f64,
    hours: f64,
    pue: f64,
    grid_intensity: f64,
) -> f64 {
    energy_to_grams(
        storage_energy_kwh(size_gb, technology, replication, hours),
        pue,
        grid_intensity,
    )
}

/// Serverless invocations expressed as vCPU-hours
pub fn serverless_vcpu_hours(memory_mb: f64, duration_ms: f64, requests: f64) -> f64 {
    let vcpus = memory_mb / LAMBDA_MB_PER_VCPU;
    let compute_hours = requests * (duration_ms / 1000.0) / 3600.0;
    vcpus * compute_hours
}

/// Serverless carbon: vCPU-hours × grams per vCPU-hour × architecture factor
pub fn serverless_grams(vcpu_hours: f64, grams_per_vcpu_hour: f64, arm64: bool) -> f64 {
    let factor = if arm64 { ARM64_EFFICIENCY_FACTOR } else { 1.0 };
    vcpu_hours * grams_per_vcpu_hour * factor
}

/// Manufacturing emissions attributable to an instance over `hours`
pub fn embodied_grams(vcpus: u32, family_max_vcpus: u32, hours: f64) -> f64 {
    if family_max_vcpus == 0 {
        return 0.0;
    }
    let monthly_server = EMBODIED_GRAMS_PER_SERVER / HARDWARE_LIFESPAN_MONTHS;
    let share = vcpus as f64 / family_max_vcpus as f64;
    monthly_server * share * (hours / HOURS_PER_MONTH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carbon::coefficients::AWS_PUE;

    #[test]
    fn test_cpu_formula() {
        let load = CpuLoad {
            min_watts: 10.0,
            max_watts: 50.0,
            utilization: 0.5,
            vcpus: 2.0,
            hours: 730.0,
        };
        assert_eq!(load.average_watts(), 30.0);
        let expected = 30.0 * 2.0 * 730.0 / 1000.0 * 1.135 * 0.000379 * 1_000_000.0;
        let grams = cpu_grams(&load, 1.135, 0.000379);
        assert!((grams - expected).abs() < 1e-6, "grams={}", grams);
    }

    #[test]
    fn test_gpu_formula() {
        // 4 × 300 W × 0.5 = 600 W for 10 h = 6 kWh
        assert!((gpu_energy_kwh(4, 300.0, 0.5, 10.0) - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_storage_formula() {
        // 1000 GB SSD, 2 replicas, 730 h = 1 × 1.2 × 2 × 730 Wh
        let kwh = storage_energy_kwh(1000.0, StorageTechnology::Ssd, 2.0, 730.0);
        assert!((kwh - 1.752).abs() < 1e-12);
        assert!(
            storage_grams(100.0, StorageTechnology::Hdd, 3.0, 730.0, AWS_PUE, 0.0003)
                < storage_grams(100.0, StorageTechnology::Ssd, 3.0, 730.0, AWS_PUE, 0.0003)
        );
    }

    #[test]
    fn test_serverless_formula() {
        let vcpu_hours = serverless_vcpu_hours(1769.0, 1000.0, 3600.0);
        assert!((vcpu_hours - 1.0).abs() < 1e-12);
        assert_eq!(serverless_grams(1.0, 10.0, false), 10.0);
        assert_eq!(serverless_grams(1.0, 10.0, true), 8.0);
    }

    #[test]
    fn test_embodied_formula() {
        // Whole host for a month = one lifespan month of the server
        assert!((embodied_grams(96, 96, 730.0) - 25_000.0).abs() < 1e-9);
        assert!((embodied_grams(2, 8, 730.0) - 6_250.0).abs() < 1e-9);
        assert_eq!(embodied_grams(2, 0, 730.0), 0.0);
    }
}

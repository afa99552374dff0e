//! Typed queries into the OS metric providers.
//!
//! [`HardwareProbe`] is the seam between the collector and whatever gathers the
//! raw numbers. The production implementation is [`crate::metrics::SysinfoProbe`];
//! tests substitute their own.

use crate::error::ProbeError;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryStat {
    pub total: u64,
    pub free: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiskUsage {
    pub total: u64,
    pub used: u64,
    pub free: u64,
}

/// Static description of one logical core.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CpuStat {
    pub index: usize,
    pub vendor_id: String,
    pub family: String,
    pub cores: usize,
    pub model_name: String,
    pub mhz: u64,
}

/// Utilization sample for the core identified by `index`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CpuPercent {
    pub index: usize,
    pub percent: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostStat {
    pub hostname: String,
    pub uptime: Duration,
    pub procs: u64,
    pub os: String,
    pub platform: String,
    pub host_id: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InterfaceStat {
    pub name: String,
    pub hardware_addr: Option<String>,
    pub flags: Vec<String>,
    /// CIDR notation, e.g. `192.168.1.10/24`.
    pub addrs: Vec<String>,
}

/// One method per provider; every call may fail on its own.
pub trait HardwareProbe: Send {
    fn memory(&mut self) -> Result<MemoryStat, ProbeError>;
    fn disk_usage(&mut self, mount_point: &Path) -> Result<DiskUsage, ProbeError>;
    fn disk_serial(&mut self, device: &Path) -> Result<String, ProbeError>;
    fn cpu_info(&mut self) -> Result<Vec<CpuStat>, ProbeError>;
    fn cpu_percent(&mut self) -> Result<Vec<CpuPercent>, ProbeError>;
    fn host_info(&mut self) -> Result<HostStat, ProbeError>;
    fn interfaces(&mut self) -> Result<Vec<InterfaceStat>, ProbeError>;
}

//! Hardware probe backed by sysinfo, with Linux sysfs/procfs readers for the
//! facts sysinfo does not expose (disk serial, cpu family, interface flags, host id).

use crate::error::ProbeError;
use crate::probe::{
    CpuPercent, CpuStat, DiskUsage, HardwareProbe, HostStat, InterfaceStat, MemoryStat,
};
#[cfg(target_os = "linux")]
use std::collections::HashMap;
#[cfg(target_os = "linux")]
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};
use sysinfo::{
    CpuRefreshKind, Disks, Networks, ProcessRefreshKind, ProcessesToUpdate, System,
    MINIMUM_CPU_UPDATE_INTERVAL,
};
use tracing::{debug, warn};

pub struct SysinfoProbe {
    sys: System,
    // last cpu usage refresh; usage is a delta between two refreshes
    cpu_sampled_at: Instant,
}

impl SysinfoProbe {
    pub fn new() -> Self {
        let mut sys = System::new();
        sys.refresh_cpu_usage();
        Self {
            sys,
            cpu_sampled_at: Instant::now(),
        }
    }
}

impl Default for SysinfoProbe {
    fn default() -> Self {
        Self::new()
    }
}

// sysinfo refreshes can panic on exotic platforms; turn that into a provider failure.
// Release builds use panic = "abort", so this only catches in unwinding builds.
fn guarded<T>(what: &'static str, f: impl FnOnce() -> T) -> Result<T, ProbeError> {
    std::panic::catch_unwind(std::panic::AssertUnwindSafe(f)).map_err(|e| {
        warn!("sysinfo {what} refresh panicked: {e:?}");
        ProbeError::Unavailable {
            what,
            reason: "provider panicked".into(),
        }
    })
}

impl HardwareProbe for SysinfoProbe {
    fn memory(&mut self) -> Result<MemoryStat, ProbeError> {
        let sys = &mut self.sys;
        guarded("memory", || sys.refresh_memory())?;
        let total = self.sys.total_memory();
        if total == 0 {
            return Err(ProbeError::Unavailable {
                what: "memory",
                reason: "total memory reported as zero".into(),
            });
        }
        Ok(MemoryStat {
            total,
            free: self.sys.free_memory(),
        })
    }

    fn disk_usage(&mut self, mount_point: &Path) -> Result<DiskUsage, ProbeError> {
        let disks = guarded("disk", Disks::new_with_refreshed_list)?;
        let disk = disks
            .iter()
            .find(|d| d.mount_point() == mount_point)
            .ok_or_else(|| ProbeError::MountNotFound(mount_point.to_path_buf()))?;
        let total = disk.total_space();
        let free = disk.available_space();
        Ok(DiskUsage {
            total,
            used: total.saturating_sub(free),
            free,
        })
    }

    fn disk_serial(&mut self, device: &Path) -> Result<String, ProbeError> {
        read_disk_serial(device)
    }

    fn cpu_info(&mut self) -> Result<Vec<CpuStat>, ProbeError> {
        let sys = &mut self.sys;
        guarded("cpu", || {
            sys.refresh_cpu_specifics(CpuRefreshKind::nothing().with_frequency())
        })?;
        let cores = System::physical_core_count().unwrap_or(0);
        let families = cpu_families();
        let cpus: Vec<CpuStat> = self
            .sys
            .cpus()
            .iter()
            .enumerate()
            .map(|(index, c)| CpuStat {
                index,
                vendor_id: c.vendor_id().to_string(),
                family: families.get(index).cloned().unwrap_or_default(),
                cores,
                model_name: c.brand().trim().to_string(),
                mhz: c.frequency(),
            })
            .collect();
        if cpus.is_empty() {
            return Err(ProbeError::Unavailable {
                what: "cpu",
                reason: "no logical cpus reported".into(),
            });
        }
        Ok(cpus)
    }

    fn cpu_percent(&mut self) -> Result<Vec<CpuPercent>, ProbeError> {
        // first sample after startup needs a minimum gap to mean anything.
        // Blocks the task for up to MINIMUM_CPU_UPDATE_INTERVAL; Ctrl-C is
        // handled once it returns.
        let since = self.cpu_sampled_at.elapsed();
        if since < MINIMUM_CPU_UPDATE_INTERVAL {
            std::thread::sleep(MINIMUM_CPU_UPDATE_INTERVAL - since);
        }
        let sys = &mut self.sys;
        guarded("cpu usage", || sys.refresh_cpu_usage())?;
        self.cpu_sampled_at = Instant::now();
        Ok(self
            .sys
            .cpus()
            .iter()
            .enumerate()
            .map(|(index, c)| CpuPercent {
                index,
                percent: f64::from(c.cpu_usage()),
            })
            .collect())
    }

    fn host_info(&mut self) -> Result<HostStat, ProbeError> {
        let sys = &mut self.sys;
        let procs = guarded("process", || {
            sys.refresh_processes_specifics(
                ProcessesToUpdate::All,
                true,
                ProcessRefreshKind::nothing(),
            );
            sys.processes().len() as u64
        })?;
        let hostname = System::host_name()
            .or_else(|| hostname::get().ok().and_then(|s| s.into_string().ok()))
            .unwrap_or_default();
        Ok(HostStat {
            hostname,
            uptime: Duration::from_secs(System::uptime()),
            procs,
            os: System::name().unwrap_or_default(),
            platform: System::distribution_id(),
            host_id: read_host_id().unwrap_or_default(),
        })
    }

    fn interfaces(&mut self) -> Result<Vec<InterfaceStat>, ProbeError> {
        let networks = guarded("network", Networks::new_with_refreshed_list)?;
        let mut out: Vec<InterfaceStat> = networks
            .iter()
            .map(|(name, data)| {
                let mac = data.mac_address();
                InterfaceStat {
                    name: name.to_string(),
                    hardware_addr: (!mac.is_unspecified()).then(|| mac.to_string()),
                    flags: interface_flags(name),
                    addrs: data
                        .ip_networks()
                        .iter()
                        .map(|n| format!("{}/{}", n.addr, n.prefix))
                        .collect(),
                }
            })
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }
}

// ---------- Linux sysfs / procfs readers ----------

#[cfg(target_os = "linux")]
fn read_disk_serial(device: &Path) -> Result<String, ProbeError> {
    let name = device
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ProbeError::Unavailable {
            what: "disk serial",
            reason: format!("bad device path {}", device.display()),
        })?;

    // udev keeps ID_SERIAL under the block device's major:minor
    if let Ok(dev) = fs::read_to_string(format!("/sys/class/block/{name}/dev")) {
        let udev = format!("/run/udev/data/b{}", dev.trim());
        if let Ok(data) = fs::read_to_string(&udev) {
            if let Some(serial) = udev_serial(&data) {
                return Ok(serial);
            }
        }
        debug!("no ID_SERIAL in {udev}");
    }
    let serial = fs::read_to_string(format!("/sys/class/block/{name}/device/serial"))?;
    Ok(serial.trim().to_string())
}

#[cfg(not(target_os = "linux"))]
fn read_disk_serial(_device: &Path) -> Result<String, ProbeError> {
    Err(ProbeError::Unavailable {
        what: "disk serial",
        reason: "only supported on linux".into(),
    })
}

#[cfg(target_os = "linux")]
fn udev_serial(data: &str) -> Option<String> {
    data.lines()
        .find_map(|l| l.strip_prefix("E:ID_SERIAL="))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// `cpu family` per logical processor, in `processor` order.
#[cfg(target_os = "linux")]
fn cpu_families() -> Vec<String> {
    fs::read_to_string("/proc/cpuinfo")
        .map(|s| parse_cpu_families(&s))
        .unwrap_or_default()
}

#[cfg(not(target_os = "linux"))]
fn cpu_families() -> Vec<String> {
    Vec::new()
}

#[cfg(target_os = "linux")]
fn parse_cpu_families(cpuinfo: &str) -> Vec<String> {
    let mut by_proc: HashMap<usize, String> = HashMap::new();
    let mut current: Option<usize> = None;
    for line in cpuinfo.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        match key.trim() {
            "processor" => current = value.trim().parse().ok(),
            "cpu family" => {
                if let Some(p) = current {
                    by_proc.insert(p, value.trim().to_string());
                }
            }
            _ => {}
        }
    }
    let n = by_proc.keys().max().map(|m| m + 1).unwrap_or(0);
    (0..n)
        .map(|i| by_proc.remove(&i).unwrap_or_default())
        .collect()
}

#[cfg(target_os = "linux")]
fn interface_flags(name: &str) -> Vec<String> {
    fs::read_to_string(format!("/sys/class/net/{name}/flags"))
        .ok()
        .and_then(|s| u32::from_str_radix(s.trim().trim_start_matches("0x"), 16).ok())
        .map(decode_flags)
        .unwrap_or_default()
}

#[cfg(not(target_os = "linux"))]
fn interface_flags(_name: &str) -> Vec<String> {
    Vec::new()
}

#[cfg(target_os = "linux")]
fn decode_flags(bits: u32) -> Vec<String> {
    // IFF_* from <linux/if.h>
    const NAMES: [(u32, &str); 5] = [
        (0x1, "up"),
        (0x2, "broadcast"),
        (0x8, "loopback"),
        (0x10, "pointtopoint"),
        (0x1000, "multicast"),
    ];
    NAMES
        .iter()
        .filter(|(bit, _)| bits & bit != 0)
        .map(|(_, n)| n.to_string())
        .collect()
}

#[cfg(target_os = "linux")]
fn read_host_id() -> Option<String> {
    [
        "/sys/class/dmi/id/product_uuid",
        "/etc/machine-id",
        "/proc/sys/kernel/random/boot_id",
    ]
    .iter()
    .find_map(|p| {
        fs::read_to_string(p)
            .ok()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
    })
}

#[cfg(not(target_os = "linux"))]
fn read_host_id() -> Option<String> {
    None
}

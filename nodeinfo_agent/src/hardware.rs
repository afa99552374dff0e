//! Turns provider results into a [`NodeInfo`].
//!
//! Every provider is queried independently. A failing provider is logged and
//! leaves its fields at their zero value; collection itself never fails.

use crate::probe::{CpuPercent, CpuStat, HardwareProbe, InterfaceStat};
use crate::types::{CpuInfo, NetworkInfo, NodeInfo};
use std::collections::HashMap;
use std::net::IpAddr;
use std::path::Path;
use tracing::{debug, warn};

/// Unix-only locations; other platforms get a logged disk failure.
pub const ROOT_MOUNT: &str = "/";
pub const SERIAL_DEVICE: &str = "/dev/sda";

pub struct HardwareCollector {
    probe: Box<dyn HardwareProbe>,
}

impl HardwareCollector {
    pub fn new(probe: Box<dyn HardwareProbe>) -> Self {
        Self { probe }
    }

    pub fn collect(&mut self) -> NodeInfo {
        let mut node = NodeInfo {
            runtime_os: std::env::consts::OS.to_string(),
            ..Default::default()
        };

        match self.probe.memory() {
            Ok(m) => {
                node.total_memory = m.total;
                node.free_memory = m.free;
                node.percent_used_memory = percent(m.total.saturating_sub(m.free), m.total);
            }
            Err(e) => warn!(provider = "memory", "{e}"),
        }

        match self.probe.disk_usage(Path::new(ROOT_MOUNT)) {
            Ok(d) => {
                node.total_disk_space = d.total;
                node.used_disk_space = d.used;
                node.free_disk_space = d.free;
                node.percent_disk_space_used = percent(d.used, d.total);
            }
            Err(e) => warn!(provider = "disk", "{e}"),
        }

        match self.probe.disk_serial(Path::new(SERIAL_DEVICE)) {
            Ok(s) => node.disk_serial_number = s,
            Err(e) => warn!(provider = "disk serial", device = SERIAL_DEVICE, "{e}"),
        }

        let cpus = self.probe.cpu_info().unwrap_or_else(|e| {
            warn!(provider = "cpu info", "{e}");
            Vec::new()
        });
        let usage = self.probe.cpu_percent().unwrap_or_else(|e| {
            warn!(provider = "cpu percent", "{e}");
            Vec::new()
        });
        node.cpu_info = merge_cpus(cpus, &usage);

        match self.probe.host_info() {
            Ok(h) => {
                node.host_name = h.hostname;
                node.uptime = h.uptime;
                node.number_of_processes_running = h.procs;
                node.operating_system = h.os;
                node.platform = h.platform;
                node.host_id = h.host_id;
            }
            Err(e) => warn!(provider = "host", "{e}"),
        }

        match self.probe.interfaces() {
            Ok(ifaces) => node.network_info = ifaces.into_iter().map(network_info).collect(),
            Err(e) => warn!(provider = "network", "{e}"),
        }

        node
    }
}

/// Used share of `total` in percent, two decimals; zero when `total` is zero.
pub fn percent(used: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2(used as f64 / total as f64 * 100.0)
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// One entry per reported core; utilization joined on the core index.
pub fn merge_cpus(cpus: Vec<CpuStat>, usage: &[CpuPercent]) -> Vec<CpuInfo> {
    let by_index: HashMap<usize, f64> = usage.iter().map(|u| (u.index, u.percent)).collect();
    if by_index.len() > cpus.len() {
        debug!(
            cores = cpus.len(),
            samples = by_index.len(),
            "more cpu usage samples than cores, extras dropped"
        );
    }
    cpus.into_iter()
        .map(|c| CpuInfo {
            index_number: c.index,
            percent_used: by_index.get(&c.index).copied().map(round2),
            vendor_id: c.vendor_id,
            family: c.family,
            number_of_cores: c.cores,
            model_name: c.model_name,
            speed: c.mhz,
        })
        .collect()
}

fn network_info(iface: InterfaceStat) -> NetworkInfo {
    NetworkInfo {
        ip_address: primary_address(&iface.addrs).unwrap_or_default(),
        interface_name: iface.name,
        mac_address: iface.hardware_addr.unwrap_or_default(),
        interface_flags: iface.flags,
        ip_addresses: iface.addrs,
    }
}

/// First IPv4 that is neither loopback nor link-local, else the first
/// non-loopback address, else the first address.
pub fn primary_address(addrs: &[String]) -> Option<String> {
    let parsed: Vec<(&String, Option<IpAddr>)> = addrs
        .iter()
        .map(|a| (a, a.split('/').next().and_then(|ip| ip.parse().ok())))
        .collect();

    let routable_v4 = parsed.iter().find(|(_, ip)| {
        matches!(ip, Some(IpAddr::V4(v4)) if !v4.is_loopback() && !v4.is_link_local())
    });
    let non_loopback = || {
        parsed
            .iter()
            .find(|(_, ip)| ip.is_some_and(|ip| !ip.is_loopback()))
    };

    routable_v4
        .or_else(non_loopback)
        .or_else(|| parsed.first())
        .map(|(a, _)| a.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn core(index: usize) -> CpuStat {
        CpuStat {
            index,
            vendor_id: "GenuineIntel".into(),
            cores: 4,
            ..Default::default()
        }
    }

    #[test]
    fn percent_rounds_to_two_places() {
        assert_eq!(percent(8_000_000_000, 16_000_000_000), 50.0);
        assert_eq!(percent(1, 3), 33.33);
        assert_eq!(percent(5, 0), 0.0);
    }

    #[test]
    fn usage_joined_by_index_not_position() {
        let usage = [
            CpuPercent { index: 1, percent: 20.0 },
            CpuPercent { index: 0, percent: 10.0 },
        ];
        let merged = merge_cpus(vec![core(0), core(1)], &usage);
        assert_eq!(merged[0].percent_used, Some(10.0));
        assert_eq!(merged[1].percent_used, Some(20.0));
    }

    #[test]
    fn missing_samples_leave_usage_unset() {
        let usage = [CpuPercent { index: 0, percent: 12.5 }];
        let merged = merge_cpus(vec![core(0), core(1), core(2)], &usage);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].percent_used, Some(12.5));
        assert!(merged[1].percent_used.is_none());
        assert!(merged[2].percent_used.is_none());
    }

    #[test]
    fn extra_samples_are_ignored() {
        let usage: Vec<CpuPercent> = (0..8)
            .map(|index| CpuPercent { index, percent: 1.0 })
            .collect();
        let merged = merge_cpus(vec![core(0), core(1)], &usage);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn primary_prefers_routable_v4() {
        let addrs = vec![
            "127.0.0.1/8".to_string(),
            "fe80::1/64".to_string(),
            "169.254.3.4/16".to_string(),
            "10.0.0.7/24".to_string(),
        ];
        assert_eq!(primary_address(&addrs).as_deref(), Some("10.0.0.7/24"));
    }

    #[test]
    fn primary_falls_back_to_v6_then_loopback() {
        let v6 = vec!["::1/128".to_string(), "fe80::1/64".to_string()];
        assert_eq!(primary_address(&v6).as_deref(), Some("fe80::1/64"));

        let lo = vec!["127.0.0.1/8".to_string()];
        assert_eq!(primary_address(&lo).as_deref(), Some("127.0.0.1/8"));

        assert_eq!(primary_address(&[]), None);
    }

    #[test]
    fn interface_keeps_every_flag_and_address() {
        let ni = network_info(InterfaceStat {
            name: "eth0".into(),
            hardware_addr: None,
            flags: vec!["up".into(), "broadcast".into(), "multicast".into()],
            addrs: vec!["192.168.1.5/24".into(), "fe80::2/64".into()],
        });
        assert_eq!(ni.mac_address, "");
        assert_eq!(ni.interface_flags.len(), 3);
        assert_eq!(ni.ip_addresses.len(), 2);
        assert_eq!(ni.ip_address, "192.168.1.5/24");
    }
}

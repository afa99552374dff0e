//! Snapshot types posted to the collection endpoint.
//! Changing a field here changes the collector's wire format.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CpuInfo {
    pub index_number: usize,
    pub vendor_id: String,
    pub family: String,
    pub number_of_cores: usize,
    pub model_name: String,
    // MHz
    pub speed: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent_used: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NetworkInfo {
    pub interface_name: String,
    pub mac_address: String,
    pub interface_flags: Vec<String>,
    pub ip_addresses: Vec<String>,
    /// Address picked by [`crate::hardware::primary_address`].
    pub ip_address: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NodeInfo {
    pub runtime_os: String,
    pub operating_system: String,
    pub platform: String,
    pub host_name: String,
    pub host_id: String,
    #[serde(with = "duration_secs")]
    pub uptime: Duration,
    pub number_of_processes_running: u64,
    pub total_memory: u64,
    pub free_memory: u64,
    pub percent_used_memory: f64,
    pub disk_serial_number: String,
    pub total_disk_space: u64,
    pub used_disk_space: u64,
    pub free_disk_space: u64,
    pub percent_disk_space_used: f64,
    pub cpu_info: Vec<CpuInfo>,
    pub network_info: Vec<NetworkInfo>,
}

/// Inspect output for one running container, passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContainerRecord(pub serde_json::Value);

impl ContainerRecord {
    pub fn id(&self) -> Option<&str> {
        self.0.get("Id").and_then(|v| v.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InfoBase {
    pub node_info: NodeInfo,
    pub container_info: Vec<ContainerRecord>,
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}

use serde::{Deserialize, Serialize};

/// Compute flavor (vCPU/RAM/disk sizing) offered by the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flavor {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub vcpus: u32,
    #[serde(default)]
    pub ram_mb: u64,
    #[serde(default)]
    pub disk_gb: u64,
}

impl Flavor {
    /// One-line description used in select options and the review page.
    pub fn describe(&self) -> String {
        let ram_gb = self.ram_mb as f64 / 1024.0;
        format!("{} ({} vCPU, {} GB RAM, {} GB disk)", self.name, self.vcpus, ram_gb, self.disk_gb)
    }
}

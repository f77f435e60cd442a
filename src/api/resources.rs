use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::api::client::{unwrap_envelope, ApiClient};
use crate::api::ApiError;
use crate::models::{Flavor, Image, Keypair, Network, ProjectScope, ResourceCatalog, SecurityGroup};

/// Supplies the selectable options for the wizard's step forms.
#[async_trait]
pub trait ResourceProvider: Send + Sync {
    async fn list_resources(&self, scope: &ProjectScope) -> Result<ResourceCatalog, ApiError>;
}

/// [`ResourceProvider`] backed by the console API's list endpoints.
#[derive(Clone, Debug)]
pub struct HttpResourceProvider {
    api: ApiClient,
}

impl HttpResourceProvider {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    async fn list(&self, scope: &ProjectScope, endpoint: &str) -> Result<Vec<Map<String, Value>>, ApiError> {
        let params = vec![("per_page".to_string(), "1000".to_string())];
        let payload = self.api.call(scope, "GET", endpoint, None, &params).await?;
        let data = unwrap_envelope(payload)?;
        let items = match data {
            Value::Array(arr) => arr,
            Value::Null => vec![],
            other => return Err(ApiError::Decode(format!("{} returned {} instead of a list", endpoint, kind(&other)))),
        };
        Ok(items
            .into_iter()
            .filter_map(|v| match v {
                Value::Object(obj) => Some(obj),
                _ => None,
            })
            .collect())
    }
}

#[async_trait]
impl ResourceProvider for HttpResourceProvider {
    async fn list_resources(&self, scope: &ProjectScope) -> Result<ResourceCatalog, ApiError> {
        let (flavors, images, networks, keypairs, groups) = tokio::try_join!(
            self.list(scope, "/v1/flavors"),
            self.list(scope, "/v1/images"),
            self.list(scope, "/v1/networks"),
            self.list(scope, "/v1/keypairs"),
            self.list(scope, "/v1/security-groups"),
        )?;
        let catalog = ResourceCatalog {
            flavors: flavors.iter().filter_map(parse_flavor).collect(),
            images: images.iter().filter_map(parse_image).collect(),
            networks: networks.iter().filter_map(parse_network).collect(),
            keypairs: keypairs.iter().filter_map(parse_keypair).collect(),
            security_groups: groups.iter().filter_map(parse_security_group).collect(),
        };
        tracing::info!(
            project = %scope.project_id,
            flavors = catalog.flavors.len(),
            images = catalog.images.len(),
            networks = catalog.networks.len(),
            keypairs = catalog.keypairs.len(),
            security_groups = catalog.security_groups.len(),
            "Loaded resource catalog"
        );
        Ok(catalog)
    }
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

/// First present key as a string; numeric ids are accepted too.
fn str_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| match obj.get(*k) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn u64_field(obj: &Map<String, Value>, keys: &[&str]) -> u64 {
    keys.iter()
        .find_map(|k| match obj.get(*k) {
            Some(Value::Number(n)) => n.as_u64().or_else(|| n.as_f64().map(|f| f.max(0.0) as u64)),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        })
        .unwrap_or(0)
}

fn parse_flavor(obj: &Map<String, Value>) -> Option<Flavor> {
    let id = str_field(obj, &["id"])?;
    Some(Flavor {
        name: str_field(obj, &["name"]).unwrap_or_else(|| id.clone()),
        vcpus: u32::try_from(u64_field(obj, &["vcpus", "vcpu", "cpu"])).unwrap_or(u32::MAX),
        ram_mb: u64_field(obj, &["ram_mb", "ramMB", "ram"]),
        disk_gb: u64_field(obj, &["disk_gb", "diskGB", "disk"]),
        id,
    })
}

fn parse_image(obj: &Map<String, Value>) -> Option<Image> {
    let id = str_field(obj, &["id"])?;
    Some(Image {
        name: str_field(obj, &["name"]).unwrap_or_else(|| id.clone()),
        min_disk_gb: u64_field(obj, &["min_disk_gb", "minDisk", "min_disk"]),
        status: str_field(obj, &["status"]).unwrap_or_else(|| "active".into()).to_lowercase(),
        id,
    })
}

fn parse_network(obj: &Map<String, Value>) -> Option<Network> {
    let id = str_field(obj, &["id"])?;
    let external = ["external", "router:external", "isExternal"]
        .iter()
        .find_map(|k| obj.get(*k).and_then(|v| v.as_bool()))
        .unwrap_or(false);
    Some(Network {
        name: str_field(obj, &["name"]).unwrap_or_else(|| id.clone()),
        external,
        id,
    })
}

fn parse_keypair(obj: &Map<String, Value>) -> Option<Keypair> {
    // Compute APIs often wrap each entry as {"keypair": {...}}.
    let inner = obj.get("keypair").and_then(|v| v.as_object()).unwrap_or(obj);
    Some(Keypair {
        name: str_field(inner, &["name"])?,
        fingerprint: str_field(inner, &["fingerprint"]).unwrap_or_default(),
    })
}

fn parse_security_group(obj: &Map<String, Value>) -> Option<SecurityGroup> {
    let name = str_field(obj, &["name"])?;
    Some(SecurityGroup {
        id: str_field(obj, &["id"]).unwrap_or_else(|| name.clone()),
        description: str_field(obj, &["description"]).unwrap_or_default(),
        name,
    })
}

use serde::{Deserialize, Serialize};

use crate::models::CreateServerRequest;
use crate::wizard::StepData;

/// Flat union of every field validated so far. Fields are only ever set by a
/// merge; the whole record is cleared by a wizard reset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedRequest {
    pub flavor_id: Option<String>,
    pub image_id: Option<String>,
    pub network_id: Option<String>,
    pub key_name: Option<String>,
    pub security_group: Option<String>,
    pub name: Option<String>,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
}

impl AggregatedRequest {
    pub fn is_empty(&self) -> bool {
        *self == AggregatedRequest::default()
    }

    /// Writes the step's values over whatever the aggregate held for the same keys.
    pub fn merge(&mut self, data: &StepData) {
        match data {
            StepData::Flavor(f) => {
                self.flavor_id = Some(f.flavor_id.clone());
            }
            StepData::Image(f) => {
                self.image_id = Some(f.image_id.clone());
            }
            StepData::Network(f) => {
                self.network_id = Some(f.network_id.clone());
                self.key_name = Some(f.key_name.clone());
                self.security_group = Some(f.security_group.clone());
            }
            StepData::Details(f) => {
                self.name = Some(f.name.clone());
                self.admin_username = Some(f.admin_username.clone());
                self.admin_password = Some(f.admin_password.clone());
            }
        }
    }

    /// Names of the fields that are still unset.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let slots: [(&'static str, &Option<String>); 8] = [
            ("flavor_id", &self.flavor_id),
            ("image_id", &self.image_id),
            ("network_id", &self.network_id),
            ("key_name", &self.key_name),
            ("security_group", &self.security_group),
            ("name", &self.name),
            ("admin_username", &self.admin_username),
            ("admin_password", &self.admin_password),
        ];
        slots
            .iter()
            .filter(|(_, v)| v.as_deref().map(str::is_empty).unwrap_or(true))
            .map(|(k, _)| *k)
            .collect()
    }

    pub fn to_request(&self) -> Result<CreateServerRequest, Vec<&'static str>> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(missing);
        }
        let get = |v: &Option<String>| v.clone().unwrap_or_default();
        Ok(CreateServerRequest {
            flavor_id: get(&self.flavor_id),
            image_id: get(&self.image_id),
            network_id: get(&self.network_id),
            key_name: get(&self.key_name),
            security_group: get(&self.security_group),
            name: get(&self.name),
            admin_username: get(&self.admin_username),
            admin_password: get(&self.admin_password),
        })
    }
}

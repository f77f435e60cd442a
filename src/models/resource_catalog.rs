use serde::{Deserialize, Serialize};

use crate::models::{Flavor, Image, Keypair, Network, SecurityGroup};

/// Everything the wizard's step forms can offer for selection, fetched once per session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceCatalog {
    pub flavors: Vec<Flavor>,
    pub images: Vec<Image>,
    pub networks: Vec<Network>,
    pub keypairs: Vec<Keypair>,
    pub security_groups: Vec<SecurityGroup>,
}

impl ResourceCatalog {
    pub fn flavor(&self, id: &str) -> Option<&Flavor> {
        self.flavors.iter().find(|f| f.id == id)
    }

    pub fn image(&self, id: &str) -> Option<&Image> {
        self.images.iter().find(|i| i.id == id)
    }

    pub fn network(&self, id: &str) -> Option<&Network> {
        self.networks.iter().find(|n| n.id == id)
    }

    pub fn keypair(&self, name: &str) -> Option<&Keypair> {
        self.keypairs.iter().find(|k| k.name == name)
    }

    /// Security groups may be referenced either by id or by name.
    pub fn security_group(&self, id_or_name: &str) -> Option<&SecurityGroup> {
        self.security_groups
            .iter()
            .find(|g| g.id == id_or_name || g.name == id_or_name)
    }
}

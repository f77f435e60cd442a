use serde::{Deserialize, Serialize};

/// SSH keypair registered in the current project. Keypairs are referenced by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keypair {
    pub name: String,
    #[serde(default)]
    pub fingerprint: String,
}

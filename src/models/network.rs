use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    pub id: String,
    pub name: String,
    /// Provider (external) networks are listed but flagged in the picker.
    #[serde(default)]
    pub external: bool,
}

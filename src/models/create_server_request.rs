use serde::{Deserialize, Serialize};

/// Fully populated instance creation payload sent to `POST /v1/instances`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateServerRequest {
    pub flavor_id: String,
    pub image_id: String,
    pub network_id: String,
    pub key_name: String,
    pub security_group: String,
    pub name: String,
    pub admin_username: String,
    pub admin_password: String,
}

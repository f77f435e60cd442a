use async_trait::async_trait;
use serde_json::Value;

use crate::api::client::{unwrap_envelope, ApiClient};
use crate::api::ApiError;
use crate::models::{CreateServerRequest, CreatedServer, ProjectScope};

/// Performs the actual provisioning for a completed wizard.
#[async_trait]
pub trait SubmissionGateway: Send + Sync {
    async fn create_server(
        &self,
        scope: &ProjectScope,
        request: &CreateServerRequest,
    ) -> Result<CreatedServer, ApiError>;
}

#[derive(Clone, Debug)]
pub struct HttpSubmissionGateway {
    api: ApiClient,
}

impl HttpSubmissionGateway {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl SubmissionGateway for HttpSubmissionGateway {
    async fn create_server(
        &self,
        scope: &ProjectScope,
        request: &CreateServerRequest,
    ) -> Result<CreatedServer, ApiError> {
        let body = serde_json::to_value(request).map_err(|e| ApiError::Decode(e.to_string()))?;
        let payload = self.api.call(scope, "POST", "/v1/instances", Some(&body), &[]).await?;
        let data = unwrap_envelope(payload)?;
        // Some deployments wrap the record as {"server": {...}} or return a one-element list.
        let record = match &data {
            Value::Array(arr) => arr.first().cloned().unwrap_or(Value::Null),
            Value::Object(obj) if obj.contains_key("server") => obj["server"].clone(),
            _ => data.clone(),
        };
        let text = |key: &str| {
            record.get(key).and_then(|v| match v {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
        };
        let id = text("id").ok_or(ApiError::MissingField("id"))?;
        let created = CreatedServer {
            id,
            name: text("name").unwrap_or_else(|| request.name.clone()),
            status: text("status").unwrap_or_else(|| "BUILD".into()),
        };
        tracing::info!(project = %scope.project_id, id = %created.id, name = %created.name, status = %created.status, "Instance created");
        Ok(created)
    }
}

use std::sync::Arc;

use crate::api::{ApiClient, HttpResourceProvider, HttpSubmissionGateway, ResourceProvider, SubmissionGateway};
use crate::session::SessionStore;

#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    pub provider: Arc<dyn ResourceProvider>,
    pub gateway: Arc<dyn SubmissionGateway>,
    pub api_base_url: String,
    pub public_base_url: String,
    pub default_project_id: String,
}

impl AppState {
    /// State wired to the real console API.
    pub fn with_api(
        api: ApiClient,
        public_base_url: String,
        default_project_id: String,
        max_submit_attempts: u32,
    ) -> Self {
        let api_base_url = api.base_url().to_string();
        Self {
            sessions: SessionStore::new(max_submit_attempts),
            provider: Arc::new(HttpResourceProvider::new(api.clone())),
            gateway: Arc::new(HttpSubmissionGateway::new(api)),
            api_base_url,
            public_base_url,
            default_project_id,
        }
    }
}

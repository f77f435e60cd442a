use serde::{Deserialize, Serialize};

/// Project the API calls of one session are made against (sent as `X-Project-Id`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectScope {
    pub project_id: String,
}

impl ProjectScope {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
        }
    }
}

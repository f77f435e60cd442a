#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use stratus::api::{ApiError, ResourceProvider, SubmissionGateway};
use stratus::models::{
    AppState, CreateServerRequest, CreatedServer, Flavor, Image, Keypair, Network, ProjectScope,
    ResourceCatalog, SecurityGroup,
};
use stratus::session::SessionStore;
use stratus::wizard::{DetailsForm, FlavorForm, ImageForm, NetworkForm, StepData};

pub fn catalog() -> ResourceCatalog {
    ResourceCatalog {
        flavors: vec![Flavor { id: "f1".into(), name: "m1.small".into(), vcpus: 1, ram_mb: 2048, disk_gb: 20 }],
        images: vec![Image { id: "i1".into(), name: "ubuntu-24.04".into(), min_disk_gb: 10, status: "active".into() }],
        networks: vec![Network { id: "n1".into(), name: "private".into(), external: false }],
        keypairs: vec![Keypair { name: "k1".into(), fingerprint: "aa:bb".into() }],
        security_groups: vec![SecurityGroup { id: "s1".into(), name: "default".into(), description: String::new() }],
    }
}

pub fn flavor() -> StepData {
    StepData::Flavor(FlavorForm { flavor_id: "f1".into() })
}

pub fn image() -> StepData {
    StepData::Image(ImageForm { image_id: "i1".into() })
}

pub fn network() -> StepData {
    StepData::Network(NetworkForm {
        network_id: "n1".into(),
        key_name: "k1".into(),
        security_group: "s1".into(),
    })
}

pub fn details() -> StepData {
    StepData::Details(DetailsForm {
        name: "vm-01".into(),
        admin_username: "admin".into(),
        admin_password: "Secret123".into(),
    })
}

/// Provider returning a fixed catalog, or failing, and counting calls.
#[derive(Default)]
pub struct FakeProvider {
    pub fail: bool,
    pub calls: AtomicUsize,
}

#[async_trait]
impl ResourceProvider for FakeProvider {
    async fn list_resources(&self, _scope: &ProjectScope) -> Result<ResourceCatalog, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(ApiError::Transport("connection refused".into()))
        } else {
            Ok(catalog())
        }
    }
}

/// Gateway recording every request it receives.
#[derive(Default)]
pub struct RecordingGateway {
    pub fail: bool,
    pub requests: Mutex<Vec<(String, CreateServerRequest)>>,
}

impl RecordingGateway {
    pub fn failing() -> Self {
        Self { fail: true, ..Default::default() }
    }

    pub fn requests(&self) -> Vec<(String, CreateServerRequest)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl SubmissionGateway for RecordingGateway {
    async fn create_server(
        &self,
        scope: &ProjectScope,
        request: &CreateServerRequest,
    ) -> Result<CreatedServer, ApiError> {
        self.requests.lock().unwrap().push((scope.project_id.clone(), request.clone()));
        if self.fail {
            Err(ApiError::Rejected {
                code: "QUOTA_EXCEEDED".into(),
                detail: Some("Instance quota exceeded".into()),
                errors: vec![],
            })
        } else {
            Ok(CreatedServer { id: "srv-42".into(), name: request.name.clone(), status: "BUILD".into() })
        }
    }
}

pub fn app_state(provider: Arc<FakeProvider>, gateway: Arc<RecordingGateway>, max_attempts: u32) -> AppState {
    AppState {
        sessions: SessionStore::new(max_attempts),
        provider,
        gateway,
        api_base_url: "http://compute.test".into(),
        public_base_url: String::new(),
        default_project_id: "default".into(),
    }
}

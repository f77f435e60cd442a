use askama::Template;

use crate::templates::{SelectOption, StepLink};

#[derive(Template)]
#[template(path = "wizard_network.html")]
pub struct NetworkStepTemplate {
    pub project_id: String,
    pub api_hostname: String,
    pub base_url: String,
    pub flash_messages: Vec<String>,
    pub has_flash_messages: bool,
    pub steps: Vec<StepLink>,
    pub resource_error: String,
    pub networks: Vec<SelectOption>,
    pub keypairs: Vec<SelectOption>,
    pub security_groups: Vec<SelectOption>,
    pub network_error: String,
    pub key_name_error: String,
    pub security_group_error: String,
    pub submit_url: String,
    pub retry_url: String,
}

crate::impl_base_template!(NetworkStepTemplate);

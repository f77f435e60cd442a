use askama::Template;

use crate::templates::{SelectOption, StepLink};

#[derive(Template)]
#[template(path = "wizard_flavor.html")]
pub struct FlavorStepTemplate {
    pub project_id: String,
    pub api_hostname: String,
    pub base_url: String,
    pub flash_messages: Vec<String>,
    pub has_flash_messages: bool,
    pub steps: Vec<StepLink>,
    pub resource_error: String,
    pub flavors: Vec<SelectOption>,
    pub flavor_error: String,
    pub submit_url: String,
    pub retry_url: String,
}

crate::impl_base_template!(FlavorStepTemplate);

use askama::Template;

use crate::templates::{SelectOption, StepLink};

#[derive(Template)]
#[template(path = "wizard_image.html")]
pub struct ImageStepTemplate {
    pub project_id: String,
    pub api_hostname: String,
    pub base_url: String,
    pub flash_messages: Vec<String>,
    pub has_flash_messages: bool,
    pub steps: Vec<StepLink>,
    pub resource_error: String,
    pub images: Vec<SelectOption>,
    pub image_error: String,
    pub submit_url: String,
    pub retry_url: String,
}

crate::impl_base_template!(ImageStepTemplate);

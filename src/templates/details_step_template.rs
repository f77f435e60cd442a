use askama::Template;

use crate::templates::StepLink;

#[derive(Template)]
#[template(path = "wizard_details.html")]
pub struct DetailsStepTemplate {
    pub project_id: String,
    pub api_hostname: String,
    pub base_url: String,
    pub flash_messages: Vec<String>,
    pub has_flash_messages: bool,
    pub steps: Vec<StepLink>,
    pub name: String,
    pub admin_username: String,
    /// A password is stored; it is never written back into the page.
    pub has_password: bool,
    pub name_error: String,
    pub admin_username_error: String,
    pub admin_password_error: String,
    pub submit_url: String,
}

crate::impl_base_template!(DetailsStepTemplate);

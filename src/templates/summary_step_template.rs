use askama::Template;

use crate::templates::StepLink;
use crate::wizard::SummaryRow;

#[derive(Template)]
#[template(path = "wizard_summary.html")]
pub struct SummaryStepTemplate {
    pub project_id: String,
    pub api_hostname: String,
    pub base_url: String,
    pub flash_messages: Vec<String>,
    pub has_flash_messages: bool,
    pub steps: Vec<StepLink>,
    pub rows: Vec<SummaryRow>,
    pub errors: Vec<String>,
    pub has_errors: bool,
    pub attempts_left: u32,
    pub can_submit: bool,
    pub confirm_url: String,
    pub back_url: String,
    pub cancel_url: String,
}

crate::impl_base_template!(SummaryStepTemplate);

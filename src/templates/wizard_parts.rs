use crate::wizard::{Step, WizardController};

/// One entry of the step progress bar.
#[derive(Clone, Debug)]
pub struct StepLink {
    pub label: &'static str,
    pub url: String,
    pub active: bool,
    pub completed: bool,
}

#[derive(Clone, Debug)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>, current: &str) -> Self {
        let value = value.into();
        let selected = value == current;
        Self {
            value,
            label: label.into(),
            selected,
        }
    }
}

pub fn step_links(wizard: &WizardController, base_url: &str) -> Vec<StepLink> {
    Step::ALL
        .iter()
        .map(|s| StepLink {
            label: s.label(),
            url: crate::utils::absolute_url(base_url, &format!("/create/go/{}", s.slug())),
            active: *s == wizard.current_step(),
            completed: wizard.is_completed(*s),
        })
        .collect()
}

use serde::Serialize;

use crate::api::SubmissionGateway;
use crate::models::{CreatedServer, ProjectScope, ResourceCatalog};
use crate::wizard::{AggregatedRequest, Step, WizardController, WizardError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    pub step: Step,
    pub label: &'static str,
    pub value: String,
}

/// Read-only projection of the aggregate for the review page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryView {
    pub rows: Vec<SummaryRow>,
    pub errors: Vec<String>,
    pub submitting: bool,
    pub attempts_left: u32,
}

impl SummaryView {
    /// Selections are shown by name when the catalog knows them; the
    /// password is never echoed.
    pub fn build(aggregate: &AggregatedRequest, catalog: Option<&ResourceCatalog>) -> Self {
        let raw = |v: &Option<String>| v.clone().unwrap_or_default();
        let password = match aggregate.admin_password.as_deref() {
            Some(p) if !p.is_empty() => "•".repeat(8),
            _ => String::new(),
        };
        let rows = vec![
            SummaryRow {
                step: Step::Flavor,
                label: "Flavor",
                value: named(catalog, &aggregate.flavor_id, |c, id| c.flavor(id).map(|f| f.describe())),
            },
            SummaryRow {
                step: Step::Image,
                label: "Image",
                value: named(catalog, &aggregate.image_id, |c, id| c.image(id).map(|i| i.name.clone())),
            },
            SummaryRow {
                step: Step::Network,
                label: "Network",
                value: named(catalog, &aggregate.network_id, |c, id| c.network(id).map(|n| n.name.clone())),
            },
            SummaryRow {
                step: Step::Network,
                label: "Key pair",
                value: raw(&aggregate.key_name),
            },
            SummaryRow {
                step: Step::Network,
                label: "Security group",
                value: named(catalog, &aggregate.security_group, |c, id| c.security_group(id).map(|g| g.name.clone())),
            },
            SummaryRow {
                step: Step::Details,
                label: "Instance name",
                value: raw(&aggregate.name),
            },
            SummaryRow {
                step: Step::Details,
                label: "Admin username",
                value: raw(&aggregate.admin_username),
            },
            SummaryRow {
                step: Step::Details,
                label: "Admin password",
                value: password,
            },
        ];
        Self {
            rows,
            errors: Vec::new(),
            submitting: false,
            attempts_left: 0,
        }
    }

    pub fn value(&self, label: &str) -> Option<&str> {
        self.rows.iter().find(|r| r.label == label).map(|r| r.value.as_str())
    }
}

fn named<F>(catalog: Option<&ResourceCatalog>, id: &Option<String>, lookup: F) -> String
where
    F: Fn(&ResourceCatalog, &str) -> Option<String>,
{
    let id = id.clone().unwrap_or_default();
    catalog.and_then(|c| lookup(c, &id)).unwrap_or(id)
}

/// The summary step: a projection plus confirm/cancel. Only obtainable
/// through [`WizardController::review`].
pub struct Review<'a> {
    wizard: &'a mut WizardController,
}

impl<'a> Review<'a> {
    pub(crate) fn new(wizard: &'a mut WizardController) -> Self {
        Self { wizard }
    }

    pub fn view(&self) -> SummaryView {
        let mut view = SummaryView::build(self.wizard.aggregate(), self.wizard.catalog());
        view.errors = self.wizard.submit_errors().to_vec();
        view.submitting = self.wizard.is_submitting();
        view.attempts_left = self.wizard.attempts_left();
        view
    }

    pub async fn confirm<G>(self, gateway: &G, scope: &ProjectScope) -> Result<CreatedServer, WizardError>
    where
        G: SubmissionGateway + ?Sized,
    {
        self.wizard.submit(gateway, scope).await
    }

    /// Leave the review for the last form step.
    pub fn cancel(self) -> Step {
        self.wizard.retreat()
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

/// Wizard steps in the order they are visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Flavor,
    Image,
    Network,
    Details,
    Summary,
}

impl Step {
    pub const ALL: [Step; 5] = [
        Step::Flavor,
        Step::Image,
        Step::Network,
        Step::Details,
        Step::Summary,
    ];

    /// Steps that own a form and a validation schema.
    pub const FORM_STEPS: [Step; 4] = [Step::Flavor, Step::Image, Step::Network, Step::Details];

    pub fn first() -> Step {
        Step::Flavor
    }

    pub fn index(self) -> usize {
        match self {
            Step::Flavor => 0,
            Step::Image => 1,
            Step::Network => 2,
            Step::Details => 3,
            Step::Summary => 4,
        }
    }

    pub fn next(self) -> Option<Step> {
        Step::ALL.get(self.index() + 1).copied()
    }

    pub fn previous(self) -> Option<Step> {
        self.index().checked_sub(1).map(|i| Step::ALL[i])
    }

    pub fn has_form(self) -> bool {
        self != Step::Summary
    }

    /// Whether the step's form selects from the resource catalog.
    pub fn needs_resources(self) -> bool {
        matches!(self, Step::Flavor | Step::Image | Step::Network)
    }

    pub fn label(self) -> &'static str {
        match self {
            Step::Flavor => "Flavor",
            Step::Image => "Image",
            Step::Network => "Network",
            Step::Details => "Details",
            Step::Summary => "Summary",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Step::Flavor => "flavor",
            Step::Image => "image",
            Step::Network => "network",
            Step::Details => "details",
            Step::Summary => "summary",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Step> {
        let wanted = slug.trim().to_lowercase();
        Step::ALL.into_iter().find(|s| s.slug() == wanted)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

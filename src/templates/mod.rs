// Base template trait for the shared layout
pub mod base_template;
pub use base_template::BaseTemplate;

pub mod wizard_parts;
pub use wizard_parts::{step_links, SelectOption, StepLink};

// Wizard step pages
pub mod details_step_template;
pub mod flavor_step_template;
pub mod image_step_template;
pub mod network_step_template;
pub mod summary_step_template;

pub use details_step_template::DetailsStepTemplate;
pub use flavor_step_template::FlavorStepTemplate;
pub use image_step_template::ImageStepTemplate;
pub use network_step_template::NetworkStepTemplate;
pub use summary_step_template::SummaryStepTemplate;

//! Multi-step instance provisioning wizard.

pub mod aggregate;
pub mod controller;
pub mod error;
pub mod forms;
pub mod step;
pub mod summary;

pub use aggregate::AggregatedRequest;
pub use controller::{ResourceState, WizardController};
pub use error::WizardError;
pub use forms::{
    DetailsForm, FieldErrors, FlavorForm, FormSchema, ImageForm, NetworkForm, StepData, StepForm,
    REQUIRED_MESSAGE,
};
pub use step::Step;
pub use summary::{Review, SummaryRow, SummaryView};

pub mod client;
pub mod error;
pub mod instances;
pub mod resources;

pub use client::{unwrap_envelope, ApiClient};
pub use error::ApiError;
pub use instances::{HttpSubmissionGateway, SubmissionGateway};
pub use resources::{HttpResourceProvider, ResourceProvider};

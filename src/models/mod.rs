pub mod app_state;
pub mod create_server_request;
pub mod created_server;
pub mod flavor;
pub mod image;
pub mod keypair;
pub mod network;
pub mod project_scope;
pub mod resource_catalog;
pub mod security_group;

pub use app_state::AppState;
pub use create_server_request::CreateServerRequest;
pub use created_server::CreatedServer;
pub use flavor::Flavor;
pub use image::Image;
pub use keypair::Keypair;
pub use network::Network;
pub use project_scope::ProjectScope;
pub use resource_catalog::ResourceCatalog;
pub use security_group::SecurityGroup;

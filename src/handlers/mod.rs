pub mod helpers;
pub mod session;
pub mod system;
pub mod wizard;

pub mod fixtures;
pub mod http;
pub mod provider;
pub mod scripted;

pub use fixtures::{FixtureCatalog, DEFAULT_EXAMPLE};
pub use http::HttpGateway;
pub use provider::RemoteGateway;
pub use scripted::{GatewayCall, ScriptedGateway};

mod definition_source;
pub use definition_source::{DefinitionSource, JsonDefinitions};

mod entity_server;
pub use entity_server::EntityServer;

mod server_config;
pub use server_config::ServerConfig;

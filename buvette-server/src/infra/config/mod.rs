pub mod loader;
pub mod models;
pub mod sources;
pub mod validation;

pub use loader::{ConfigLoad, ConfigLoadError, ConfigLoader};
pub use models::{
    AuthConfig, Config, ConfigMetadata, CorsConfig, DatabaseConfig, ServerConfig,
    StaticFilesConfig,
};
pub use validation::{ConfigWarning, ConfigWarnings};

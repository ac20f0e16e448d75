use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    time::Duration,
};

use buvette_core::domain::ArrivalSchedules;

pub const DEFAULT_PORT: u16 = 4000;
pub const DEFAULT_ACCESS_SECRET: &str = "buvette-dev-access-secret";
pub const DEFAULT_REFRESH_SECRET: &str = "buvette-dev-refresh-secret";
pub const DEFAULT_ACCESS_TTL: Duration = Duration::from_secs(15 * 60);
pub const DEFAULT_REFRESH_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub cors: CorsConfig,
    pub static_files: StaticFilesConfig,
    pub schedules: HashMap<String, Vec<String>>,
    pub dev_mode: bool,
    pub metadata: ConfigMetadata,
}

impl Config {
    /// Built-in arrival schedules with the configured overrides applied.
    pub fn arrival_schedules(&self) -> ArrivalSchedules {
        ArrivalSchedules::with_overrides(self.schedules.clone())
    }

    pub fn static_dir(&self) -> Option<&Path> {
        self.static_files.dir.as_deref()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            cors: CorsConfig::default(),
            static_files: StaticFilesConfig::default(),
            schedules: HashMap::new(),
            dev_mode: false,
            metadata: ConfigMetadata::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub primary_url: Option<String>,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            primary_url: None,
            max_connections: 10,
        }
    }
}

#[derive(Clone)]
pub struct AuthConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_secret: DEFAULT_ACCESS_SECRET.to_string(),
            refresh_secret: DEFAULT_REFRESH_SECRET.to_string(),
            access_ttl: DEFAULT_ACCESS_TTL,
            refresh_ttl: DEFAULT_REFRESH_TTL,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

impl CorsConfig {
    pub fn is_wildcard_included(&self) -> bool {
        self.allowed_origins
            .iter()
            .any(|origin| origin.trim() == "*")
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:5500".to_string(),
            ],
            allow_credentials: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StaticFilesConfig {
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigMetadata {
    pub config_path: Option<PathBuf>,
    pub env_file_loaded: bool,
}

use serde::{Deserialize, Serialize};
use std::{collections::HashMap, path::PathBuf};

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FileConfig {
    #[serde(default)]
    pub server: FileServerConfig,
    #[serde(default)]
    pub database: FileDatabaseConfig,
    #[serde(default)]
    pub auth: FileAuthConfig,
    #[serde(default)]
    pub cors: FileCorsConfig,
    #[serde(default)]
    pub static_files: FileStaticFilesConfig,
    /// Arrival times per buvette name, replacing the built-in schedule.
    #[serde(default)]
    pub schedules: HashMap<String, Vec<String>>,
    pub dev_mode: Option<bool>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileDatabaseConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<u32>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileAuthConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_secret: Option<String>,
    /// humantime duration, e.g. `15m`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_ttl: Option<String>,
    /// humantime duration, e.g. `7d`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_ttl: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileCorsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_origins: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_credentials: Option<bool>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileStaticFilesConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

/// Environment-derived configuration values.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub server_host: Option<String>,
    pub server_port: Option<u16>,
    pub database_url: Option<String>,
    pub database_host: Option<String>,
    pub database_port: Option<u16>,
    pub database_user: Option<String>,
    pub database_name: Option<String>,
    pub database_password: Option<String>,
    pub database_max_connections: Option<u32>,
    pub jwt_access_secret: Option<String>,
    pub jwt_refresh_secret: Option<String>,
    pub jwt_access_ttl: Option<String>,
    pub jwt_refresh_ttl: Option<String>,
    pub cors_allowed_origins: Option<Vec<String>>,
    pub cors_allow_credentials: Option<bool>,
    pub static_dir: Option<PathBuf>,
    pub dev_mode: Option<bool>,
}

impl EnvConfig {
    pub fn gather() -> Self {
        let mut env_config = Self::default();

        env_config.config_path =
            std::env::var("BUVETTE_CONFIG").ok().map(PathBuf::from);
        env_config.server_host = std::env::var("SERVER_HOST").ok();
        env_config.server_port = std::env::var("SERVER_PORT")
            .or_else(|_| std::env::var("PORT"))
            .ok()
            .and_then(|s| s.parse().ok());
        env_config.database_url = std::env::var("DATABASE_URL").ok();
        env_config.database_host = std::env::var("DATABASE_HOST").ok();
        env_config.database_port = std::env::var("DATABASE_PORT")
            .ok()
            .and_then(|s| s.parse().ok());
        env_config.database_user = std::env::var("DATABASE_USER").ok();
        env_config.database_name = std::env::var("DATABASE_NAME").ok();
        env_config.database_password = std::env::var("DATABASE_PASSWORD").ok();
        env_config.database_max_connections =
            std::env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok());

        env_config.jwt_access_secret = std::env::var("JWT_ACCESS_SECRET").ok();
        env_config.jwt_refresh_secret =
            std::env::var("JWT_REFRESH_SECRET").ok();
        env_config.jwt_access_ttl = std::env::var("JWT_ACCESS_EXPIRES_IN").ok();
        env_config.jwt_refresh_ttl =
            std::env::var("JWT_REFRESH_EXPIRES_IN").ok();

        env_config.cors_allowed_origins = parse_csv_var("CORS_ALLOWED_ORIGINS");
        env_config.cors_allow_credentials =
            parse_bool_var("CORS_ALLOW_CREDENTIALS");

        env_config.static_dir =
            std::env::var("STATIC_DIR").ok().map(PathBuf::from);
        env_config.dev_mode = parse_bool_var("DEV_MODE");

        env_config
    }
}

pub(crate) fn parse_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .filter_map(|part| {
            let trimmed = part.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
        .collect()
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_csv_var(name: &str) -> Option<Vec<String>> {
    std::env::var(name).ok().map(|raw| parse_csv(&raw))
}

fn parse_bool_var(name: &str) -> Option<bool> {
    std::env::var(name).ok().and_then(|raw| parse_bool(&raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_values_are_trimmed_and_filtered() {
        assert_eq!(
            parse_csv(" http://a.test , ,http://b.test"),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
        assert!(parse_csv("").is_empty());
    }

    #[test]
    fn bool_spellings() {
        assert_eq!(parse_bool("YES"), Some(true));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn file_config_reads_schedules_table() {
        let raw = r#"
            dev_mode = true

            [server]
            port = 8080

            [auth]
            access_ttl = "30m"

            [schedules]
            "Kiosque Est" = ["16:00", "16:30"]
        "#;
        let parsed: FileConfig = toml::from_str(raw).unwrap();
        assert_eq!(parsed.server.port, Some(8080));
        assert_eq!(parsed.dev_mode, Some(true));
        assert_eq!(parsed.auth.access_ttl.as_deref(), Some("30m"));
        assert_eq!(parsed.schedules["Kiosque Est"], ["16:00", "16:30"]);
    }
}

use std::{
    collections::HashMap,
    fs,
    path::PathBuf,
    time::Duration,
};
use thiserror::Error;
use url::Url;

use buvette_core::domain::hours::parse_clock;

use super::{
    models::{
        AuthConfig, Config, ConfigMetadata, CorsConfig, DatabaseConfig,
        ServerConfig, StaticFilesConfig,
    },
    sources::{EnvConfig, FileConfig, FileDatabaseConfig},
    validation::{self, ConfigWarnings},
};

const DEFAULT_CONFIG_LOCATIONS: [&str; 2] =
    ["buvette.toml", "config/buvette.toml"];

#[derive(Debug, Default, Clone)]
pub struct ConfigLoaderOptions {
    pub config_path: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
}

#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.env_file = Some(path.into());
        self
    }

    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded = match &self.options.env_file {
            Some(path) => dotenvy::from_path(path).map(|_| true).or_else(
                |err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                },
            )?,
            None => {
                dotenvy::dotenv().map(|_| true).or_else(|err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                })?
            }
        };

        let env_config = EnvConfig::gather();
        let (file_config, config_path) = self.load_file_config(&env_config)?;

        let (config, warnings) = compose_config(
            file_config,
            env_config,
            ConfigMetadata {
                config_path,
                env_file_loaded,
            },
        )?;

        Ok(ConfigLoad { config, warnings })
    }

    fn load_file_config(
        &self,
        env_config: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        let explicit = self
            .options
            .config_path
            .clone()
            .or_else(|| env_config.config_path.clone());

        let path = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigLoadError::MissingConfig { path });
                }
                path
            }
            None => match DEFAULT_CONFIG_LOCATIONS
                .iter()
                .map(PathBuf::from)
                .find(|candidate| candidate.exists())
            {
                Some(path) => path,
                None => return Ok((None, None)),
            },
        };

        let contents =
            fs::read_to_string(&path).map_err(|source| ConfigLoadError::Io {
                path: path.clone(),
                source,
            })?;
        let file_config: FileConfig =
            toml::from_str(&contents).map_err(|source| {
                ConfigLoadError::Parse {
                    path: path.clone(),
                    source,
                }
            })?;

        Ok((Some(file_config), Some(path)))
    }
}

/// Merges file and environment values; the environment wins.
pub fn compose_config(
    file_config: Option<FileConfig>,
    env: EnvConfig,
    metadata: ConfigMetadata,
) -> Result<(Config, ConfigWarnings), ConfigLoadError> {
    let mut warnings = ConfigWarnings::default();

    if metadata.config_path.is_none() {
        warnings.push_with_hint(
            "No buvette.toml detected; using environment variables and defaults",
            "Pass --config or set BUVETTE_CONFIG to use a configuration file",
        );
    }

    let FileConfig {
        server: file_server,
        database: file_database,
        auth: file_auth,
        cors: file_cors,
        static_files: file_static,
        schedules,
        dev_mode: file_dev_mode,
    } = file_config.unwrap_or_default();

    let defaults = Config::default();

    let server = ServerConfig {
        host: env
            .server_host
            .clone()
            .or(file_server.host)
            .unwrap_or(defaults.server.host),
        port: env
            .server_port
            .or(file_server.port)
            .unwrap_or(defaults.server.port),
    };

    let database = DatabaseConfig {
        primary_url: resolve_database_url(&env, &file_database)?,
        max_connections: env
            .database_max_connections
            .or(file_database.max_connections)
            .unwrap_or(defaults.database.max_connections),
    };

    let auth = AuthConfig {
        access_secret: env
            .jwt_access_secret
            .clone()
            .or(file_auth.access_secret)
            .unwrap_or(defaults.auth.access_secret),
        refresh_secret: env
            .jwt_refresh_secret
            .clone()
            .or(file_auth.refresh_secret)
            .unwrap_or(defaults.auth.refresh_secret),
        access_ttl: parse_ttl(
            "access_ttl",
            env.jwt_access_ttl.clone().or(file_auth.access_ttl),
            defaults.auth.access_ttl,
        )?,
        refresh_ttl: parse_ttl(
            "refresh_ttl",
            env.jwt_refresh_ttl.clone().or(file_auth.refresh_ttl),
            defaults.auth.refresh_ttl,
        )?,
    };

    let cors = CorsConfig {
        allowed_origins: env
            .cors_allowed_origins
            .clone()
            .or(file_cors.allowed_origins)
            .unwrap_or(defaults.cors.allowed_origins),
        allow_credentials: env
            .cors_allow_credentials
            .or(file_cors.allow_credentials)
            .unwrap_or(defaults.cors.allow_credentials),
    };

    let static_files = StaticFilesConfig {
        dir: env
            .static_dir
            .clone()
            .or(file_static.dir)
            .or_else(|| Some(PathBuf::from("public"))),
    };

    let schedules = validate_schedules(schedules)?;
    let dev_mode = env.dev_mode.or(file_dev_mode).unwrap_or(false);

    let config = Config {
        server,
        database,
        auth,
        cors,
        static_files,
        schedules,
        dev_mode,
        metadata,
    };

    warnings.extend(validation::apply_guard_rails(&config));

    Ok((config, warnings))
}

fn parse_ttl(
    field: &'static str,
    raw: Option<String>,
    default: Duration,
) -> Result<Duration, ConfigLoadError> {
    match raw {
        None => Ok(default),
        Some(raw) => humantime::parse_duration(raw.trim()).map_err(|source| {
            ConfigLoadError::InvalidDuration { field, source }
        }),
    }
}

fn validate_schedules(
    schedules: HashMap<String, Vec<String>>,
) -> Result<HashMap<String, Vec<String>>, ConfigLoadError> {
    schedules
        .into_iter()
        .map(|(buvette, times)| {
            let normalized = times
                .iter()
                .map(|raw| {
                    parse_clock(raw)
                        .map(|t| t.format("%H:%M").to_string())
                        .map_err(|_| ConfigLoadError::InvalidSchedule {
                            buvette: buvette.clone(),
                            value: raw.clone(),
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok((buvette, normalized))
        })
        .collect()
}

fn resolve_database_url(
    env: &EnvConfig,
    file_database: &FileDatabaseConfig,
) -> Result<Option<String>, ConfigLoadError> {
    if let Some(url) = env
        .database_url
        .clone()
        .filter(|value| !value.trim().is_empty())
    {
        return Ok(Some(url));
    }

    if let Some(stored_url) = file_database
        .url
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
    {
        let mut parsed = Url::parse(stored_url)
            .map_err(|source| ConfigLoadError::InvalidDatabaseUrl { source })?;
        if parsed.password().is_none()
            && let Some(password) = database_password(env, file_database)
        {
            parsed
                .set_password(Some(&password))
                .map_err(|_| ConfigLoadError::InvalidDatabasePassword)?;
        }
        return Ok(Some(parsed.to_string()));
    }

    let non_empty = |value: Option<&String>| {
        value.filter(|v| !v.trim().is_empty()).cloned()
    };
    let host = non_empty(env.database_host.as_ref())
        .or_else(|| non_empty(file_database.host.as_ref()));
    let user = non_empty(env.database_user.as_ref())
        .or_else(|| non_empty(file_database.user.as_ref()));
    let name = non_empty(env.database_name.as_ref())
        .or_else(|| non_empty(file_database.name.as_ref()));

    if let (Some(host), Some(user), Some(name)) = (host, user, name) {
        let port = env.database_port.or(file_database.port).unwrap_or(5432);
        let mut url = Url::parse(&format!("postgresql://{host}:{port}/{name}"))
            .map_err(|source| ConfigLoadError::InvalidDatabaseUrl { source })?;
        url.set_username(&user).map_err(|_| {
            ConfigLoadError::InvalidDatabaseUsername {
                username: user.clone(),
            }
        })?;
        if let Some(password) = database_password(env, file_database) {
            url.set_password(Some(&password))
                .map_err(|_| ConfigLoadError::InvalidDatabasePassword)?;
        }
        return Ok(Some(url.to_string()));
    }

    Ok(None)
}

fn database_password(
    env: &EnvConfig,
    file_database: &FileDatabaseConfig,
) -> Option<String> {
    env.database_password
        .clone()
        .or_else(|| file_database.password.clone())
        .filter(|value| !value.trim().is_empty())
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("configuration file missing: {path}")]
    MissingConfig { path: PathBuf },
    #[error("failed to read configuration {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid database URL")]
    InvalidDatabaseUrl {
        #[source]
        source: url::ParseError,
    },
    #[error("invalid database username '{username}'")]
    InvalidDatabaseUsername { username: String },
    #[error("failed to encode database password into URL")]
    InvalidDatabasePassword,
    #[error("invalid duration for auth.{field}")]
    InvalidDuration {
        field: &'static str,
        #[source]
        source: humantime::DurationError,
    },
    #[error("invalid arrival time '{value}' in schedule for {buvette}")]
    InvalidSchedule { buvette: String, value: String },
    #[error(transparent)]
    EnvFile(#[from] dotenvy::Error),
}

#[derive(Debug)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn compose(file: Option<FileConfig>, env: EnvConfig) -> Config {
        compose_config(file, env, ConfigMetadata::default())
            .unwrap()
            .0
    }

    #[test]
    fn defaults_apply_without_sources() {
        let config = compose(None, EnvConfig::default());
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.auth.access_ttl, Duration::from_secs(900));
        assert_eq!(config.auth.refresh_ttl, Duration::from_secs(604_800));
        assert_eq!(config.database.primary_url, None);
        assert!(!config.dev_mode);
    }

    #[test]
    fn environment_overrides_file() {
        let file: FileConfig = toml::from_str(
            r#"
            [server]
            port = 5000
            host = "127.0.0.1"

            [auth]
            access_ttl = "30m"
            "#,
        )
        .unwrap();
        let env = EnvConfig {
            server_port: Some(6000),
            jwt_access_ttl: Some("1h".into()),
            ..EnvConfig::default()
        };
        let config = compose(Some(file), env);
        assert_eq!(config.server.port, 6000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.auth.access_ttl, Duration::from_secs(3600));
    }

    #[test]
    fn database_url_is_built_from_parts() {
        let env = EnvConfig {
            database_host: Some("db".into()),
            database_user: Some("buvette".into()),
            database_name: Some("ops".into()),
            database_password: Some("s3cret".into()),
            ..EnvConfig::default()
        };
        let config = compose(None, env);
        assert_eq!(
            config.database.primary_url.as_deref(),
            Some("postgresql://buvette:s3cret@db:5432/ops")
        );
    }

    #[test]
    fn file_url_receives_password() {
        let file = FileConfig {
            database: FileDatabaseConfig {
                url: Some("postgres://ops@localhost/buvette".into()),
                password: Some("pw".into()),
                ..FileDatabaseConfig::default()
            },
            ..FileConfig::default()
        };
        let config = compose(Some(file), EnvConfig::default());
        assert_eq!(
            config.database.primary_url.as_deref(),
            Some("postgres://ops:pw@localhost/buvette")
        );
    }

    #[test]
    fn bad_ttl_is_rejected() {
        let env = EnvConfig {
            jwt_refresh_ttl: Some("soon".into()),
            ..EnvConfig::default()
        };
        let err = compose_config(None, env, ConfigMetadata::default()).unwrap_err();
        assert!(matches!(
            err,
            ConfigLoadError::InvalidDuration { field: "refresh_ttl", .. }
        ));
    }

    #[test]
    fn schedules_are_normalised_and_checked() {
        let mut file = FileConfig::default();
        file.schedules
            .insert("Kiosque Est".into(), vec!["9:30".into(), "10:00".into()]);
        let config = compose(Some(file), EnvConfig::default());
        assert_eq!(config.schedules["Kiosque Est"], ["09:30", "10:00"]);
        assert_eq!(
            config
                .arrival_schedules()
                .arrival_time_for_slot("Kiosque Est", 0)
                .as_deref(),
            Some("09:30")
        );

        let mut file = FileConfig::default();
        file.schedules.insert("Chalet 1".into(), vec!["noon".into()]);
        assert!(matches!(
            compose_config(Some(file), EnvConfig::default(), ConfigMetadata::default()),
            Err(ConfigLoadError::InvalidSchedule { .. })
        ));
    }

    #[test]
    fn explicit_config_file_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[cors]\nallowed_origins = [\"https://ops.example.ch\"]\nallow_credentials = false"
        )
        .unwrap();

        let loader = ConfigLoader::new().with_config_path(file.path());
        let (parsed, path) = loader.load_file_config(&EnvConfig::default()).unwrap();
        let parsed = parsed.unwrap();
        assert_eq!(path.as_deref(), Some(file.path()));
        assert_eq!(
            parsed.cors.allowed_origins,
            Some(vec!["https://ops.example.ch".to_string()])
        );
        assert_eq!(parsed.cors.allow_credentials, Some(false));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let loader = ConfigLoader::new().with_config_path("/nonexistent/buvette.toml");
        assert!(matches!(
            loader.load_file_config(&EnvConfig::default()),
            Err(ConfigLoadError::MissingConfig { .. })
        ));
    }

    #[test]
    fn explicit_env_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let env_path = dir.path().join("stade.env");
        std::fs::write(&env_path, "BUVETTE_LOADER_MARKER=stade\n").unwrap();
        let config_path = dir.path().join("buvette.toml");
        std::fs::write(&config_path, "").unwrap();

        let load = ConfigLoader::new()
            .with_config_path(&config_path)
            .with_env_file(&env_path)
            .load()
            .unwrap();
        assert!(load.config.metadata.env_file_loaded);
        assert_eq!(std::env::var("BUVETTE_LOADER_MARKER").as_deref(), Ok("stade"));

        let absent = ConfigLoader::new()
            .with_config_path(&config_path)
            .with_env_file(dir.path().join("absent.env"))
            .load()
            .unwrap();
        assert!(!absent.config.metadata.env_file_loaded);
    }
}

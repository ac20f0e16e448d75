use super::models::{Config, DEFAULT_ACCESS_SECRET, DEFAULT_REFRESH_SECRET};

#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct ConfigWarnings {
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn push<S: Into<String>>(&mut self, message: S) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: None,
        });
    }

    pub fn push_with_hint<S: Into<String>, H: Into<String>>(
        &mut self,
        message: S,
        hint: H,
    ) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn extend(&mut self, other: ConfigWarnings) {
        self.items.extend(other.items);
    }
}

/// Flags settings that work but should not reach production.
pub fn apply_guard_rails(config: &Config) -> ConfigWarnings {
    let mut warnings = ConfigWarnings::default();

    if config.auth.access_secret == DEFAULT_ACCESS_SECRET
        || config.auth.refresh_secret == DEFAULT_REFRESH_SECRET
    {
        if config.dev_mode {
            warnings.push("JWT secrets use the built-in development defaults");
        } else {
            warnings.push_with_hint(
                "JWT secrets use the built-in development defaults outside dev mode",
                "Set JWT_ACCESS_SECRET and JWT_REFRESH_SECRET or the [auth] section",
            );
        }
    }

    if config.auth.access_secret == config.auth.refresh_secret {
        warnings.push_with_hint(
            "Access and refresh tokens share the same signing secret",
            "Use distinct values so a refresh token can never pass as an access token",
        );
    }

    if !config.dev_mode && config.cors.is_wildcard_included() {
        warnings.push_with_hint(
            "CORS allows any origin outside dev mode; credentials will be disabled",
            "List the front-end origins in CORS_ALLOWED_ORIGINS",
        );
    }

    match config.static_dir() {
        Some(dir) if !dir.is_dir() => warnings.push_with_hint(
            format!("Static files directory {} does not exist", dir.display()),
            "Set STATIC_DIR or [static_files].dir to the front-end folder",
        ),
        None => warnings.push("No static files directory configured; only the API is served"),
        _ => {}
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_warn_about_secrets_and_static_dir() {
        let config = Config::default();
        let warnings = apply_guard_rails(&config);
        let messages: Vec<&str> = warnings.items.iter().map(|w| w.message.as_str()).collect();
        assert!(messages.iter().any(|m| m.contains("JWT secrets")));
        assert!(messages.iter().any(|m| m.contains("static files")));
    }

    #[test]
    fn shared_secret_is_flagged() {
        let mut config = Config::default();
        config.auth.access_secret = "same".into();
        config.auth.refresh_secret = "same".into();
        let warnings = apply_guard_rails(&config);
        assert!(
            warnings
                .items
                .iter()
                .any(|w| w.message.contains("same signing secret"))
        );
    }

    #[test]
    fn existing_static_dir_is_quiet() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.auth.access_secret = "a".into();
        config.auth.refresh_secret = "b".into();
        config.static_files.dir = Some(dir.path().to_path_buf());
        assert!(apply_guard_rails(&config).is_empty());
    }
}

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::models::draft::DEFAULT_MAX_IMAGE_BYTES;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Runtime settings, read from the environment (and `.env`)
#[derive(Debug, Clone)]
pub struct Settings {
    /// Only the interactive form needs the database
    pub database_url: Option<String>,
    pub upload_endpoint: String,
    pub server_host: String,
    pub server_port: u16,
    pub media_root: PathBuf,
    pub public_url_base: String,
    pub upload_folder: String,
    pub max_image_bytes: usize,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| dotenvy::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let server_host = lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let server_port = parse_or("SERVER_PORT", lookup("SERVER_PORT"), 8080)?;
        let max_image_bytes =
            parse_or("MAX_IMAGE_BYTES", lookup("MAX_IMAGE_BYTES"), DEFAULT_MAX_IMAGE_BYTES)?;

        Ok(Self {
            database_url: lookup("DATABASE_URL"),
            upload_endpoint: lookup("UPLOAD_ENDPOINT")
                .unwrap_or_else(|| format!("http://localhost:{server_port}/api/upload-image")),
            media_root: lookup("MEDIA_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("media")),
            public_url_base: lookup("PUBLIC_URL_BASE")
                .unwrap_or_else(|| format!("http://localhost:{server_port}/media")),
            upload_folder: lookup("UPLOAD_FOLDER").unwrap_or_else(|| "registrations".to_string()),
            server_host,
            server_port,
            max_image_bytes,
        })
    }

    pub fn database_url(&self) -> Result<&str, ConfigError> {
        self.database_url
            .as_deref()
            .ok_or(ConfigError::Missing("DATABASE_URL"))
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn settings_from(pairs: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let settings = settings_from(&[]).unwrap();
        assert_eq!(settings.server_port, 8080);
        assert_eq!(settings.upload_folder, "registrations");
        assert_eq!(settings.max_image_bytes, 10 * 1024 * 1024);
        assert_eq!(
            settings.upload_endpoint,
            "http://localhost:8080/api/upload-image"
        );
        assert!(matches!(
            settings.database_url(),
            Err(ConfigError::Missing("DATABASE_URL"))
        ));
    }

    #[test]
    fn test_overrides() {
        let settings = settings_from(&[
            ("DATABASE_URL", "mysql://root@localhost/registrations"),
            ("SERVER_PORT", "9000"),
            ("MAX_IMAGE_BYTES", "2048"),
        ])
        .unwrap();
        assert_eq!(
            settings.database_url().unwrap(),
            "mysql://root@localhost/registrations"
        );
        assert_eq!(settings.public_url_base, "http://localhost:9000/media");
        assert_eq!(settings.max_image_bytes, 2048);
    }

    #[test]
    fn test_invalid_port() {
        let result = settings_from(&[("SERVER_PORT", "eighty")]);
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                name: "SERVER_PORT",
                ..
            })
        ));
    }
}

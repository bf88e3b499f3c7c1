use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::bootstrap::ClientConfig;

pub const ENV_PREFIX: &str = "CLOUD_BOOTSTRAP";
pub const DEFAULT_SERVICE: &str = "s3";

/// Settings for the entry point: which service to bootstrap and how.
///
/// Sources, lowest precedence first:
/// - built-in defaults
/// - an optional settings file (TOML, YAML or JSON, by extension)
/// - `CLOUD_BOOTSTRAP_*` environment variables, `__` separating nested keys
///   (e.g. `CLOUD_BOOTSTRAP_CLIENT__REGION=eu-west-1`)
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "default_service")]
    pub service: String,
    #[serde(default)]
    pub client: ClientConfig,
}

fn default_service() -> String {
    DEFAULT_SERVICE.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            service: default_service(),
            client: ClientConfig::default(),
        }
    }
}

impl Settings {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .context("Failed to read settings")?
            .try_deserialize()
            .context("Failed to parse settings")?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::{ChainLink, CredentialSource};
    use std::io::Write;
    use tempfile::Builder;

    impl Settings {
        fn from_file(path: &Path) -> Result<Self> {
            let settings = config::Config::builder()
                .add_source(config::File::from(path))
                .build()?
                .try_deserialize()?;
            Ok(settings)
        }
    }

    fn write_settings(contents: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.service, "s3");
        assert_eq!(settings.client, ClientConfig::default());
    }

    #[test]
    fn test_from_file_fills_omitted_fields() {
        let file = write_settings(
            r#"
service = "dynamodb"

[client]
region = "eu-west-1"
call_timeout_ms = 5000
"#,
        );

        let settings = Settings::from_file(file.path()).unwrap();
        assert_eq!(settings.service, "dynamodb");
        assert_eq!(settings.client.region(), "eu-west-1");
        assert_eq!(settings.client.call_timeout_ms(), 5000);
        assert_eq!(settings.client.call_attempt_timeout_ms(), 12_000);
        assert_eq!(settings.client.credential_source(), &CredentialSource::default());
    }

    #[test]
    fn test_from_file_credential_chain() {
        let file = write_settings(
            r#"
[client.credential_source]
kind = "chain_derived"
links = [{ source = "environment" }, { source = "profile", name = "dev" }]
"#,
        );

        let settings = Settings::from_file(file.path()).unwrap();
        assert_eq!(settings.service, "s3");
        assert_eq!(
            settings.client.credential_source(),
            &CredentialSource::ChainDerived {
                links: vec![
                    ChainLink::Environment,
                    ChainLink::Profile {
                        name: Some("dev".to_string())
                    },
                ]
            }
        );
    }

    #[test]
    fn test_negative_timeout_survives_parsing() {
        let file = write_settings("[client]\ncall_timeout_ms = -1\n");
        let settings = Settings::from_file(file.path()).unwrap();
        assert_eq!(settings.client.call_timeout_ms(), -1);
    }

    #[test]
    fn test_load_env_overrides_file() {
        let file = write_settings(
            r#"
service = "dynamodb"

[client]
region = "eu-west-1"
call_timeout_ms = 5000
"#,
        );

        std::env::set_var("CLOUD_BOOTSTRAP_CLIENT__REGION", "eu-west-3");
        std::env::set_var("CLOUD_BOOTSTRAP_SERVICE", "sqs");
        let loaded = Settings::load(Some(file.path()));
        std::env::remove_var("CLOUD_BOOTSTRAP_CLIENT__REGION");
        std::env::remove_var("CLOUD_BOOTSTRAP_SERVICE");

        let settings = loaded.unwrap();
        assert_eq!(settings.service, "sqs");
        assert_eq!(settings.client.region(), "eu-west-3");
        assert_eq!(settings.client.call_timeout_ms(), 5000);
        assert_eq!(settings.client.call_attempt_timeout_ms(), 12_000);
    }

    #[test]
    fn test_load_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(Settings::load(Some(&missing)).is_err());
    }
}

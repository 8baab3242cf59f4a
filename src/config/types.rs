//! Configuration data types for acctest.

use camino::Utf8PathBuf;
use ortho_config::{OrthoConfig, OrthoResult, PostMergeContext, PostMergeHook};
use serde::{Deserialize, Serialize};

/// Environment variable that gates acceptance runs unless configured otherwise.
pub const DEFAULT_GATE_ENV: &str = "ACCTEST";

/// Connection settings handed to the caller's client factory.
///
/// acctest never interprets these values; they exist so every test in a suite
/// builds its client from the same layered configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientSettings {
    /// Base URL of the API under test.
    pub endpoint: Option<String>,

    /// Account the tests act as.
    pub account: Option<String>,

    /// Identifier of the signing key.
    pub key_id: Option<String>,

    /// Path to the private key material.
    pub key_path: Option<Utf8PathBuf>,

    /// Request timeout the client should apply, in seconds.
    pub timeout_secs: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            account: None,
            key_id: None,
            key_path: None,
            timeout_secs: 60,
        }
    }
}

impl ClientSettings {
    /// Validates that the fields every client needs are present and non-empty.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingRequired` listing every missing field, or
    /// `ConfigError::InvalidValue` when `timeout_secs` is zero.
    pub fn validate(&self) -> crate::error::Result<()> {
        let required = [
            ("client.endpoint", &self.endpoint),
            ("client.account", &self.account),
            ("client.key_id", &self.key_id),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.as_deref().is_none_or(str::is_empty))
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(crate::error::ConfigError::MissingRequired {
                field: missing.join(", "),
            }
            .into());
        }
        if self.timeout_secs == 0 {
            return Err(crate::error::ConfigError::InvalidValue {
                field: String::from("client.timeout_secs"),
                reason: String::from("must be greater than zero"),
            }
            .into());
        }
        Ok(())
    }

    /// Returns whether endpoint, account, and key ID are all set.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        [&self.endpoint, &self.account, &self.key_id]
            .iter()
            .all(|value| value.as_deref().is_some_and(|text| !text.is_empty()))
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level filter used when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
        }
    }
}

/// Root acctest configuration.
///
/// Loaded with layered precedence (lowest to highest): defaults,
/// configuration file, `ACCTEST_*` environment variables.
///
/// Configuration files are discovered in this order:
/// 1. Path specified via `ACCTEST_CONFIG_PATH` environment variable
/// 2. `.acctest.toml` in the current working directory
/// 3. `.acctest.toml` in the home directory
/// 4. `~/.config/acctest/config.toml` (XDG default)
#[derive(Debug, Clone, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(
    prefix = "ACCTEST",
    post_merge_hook,
    discovery(
        app_name = "acctest",
        env_var = "ACCTEST_CONFIG_PATH",
        config_file_name = "config.toml",
        dotfile_name = ".acctest.toml",
    )
)]
pub struct AccTestConfig {
    /// Environment variable that must be set for acceptance runs. Empty
    /// disables the gate.
    pub gate_env: String,

    /// Fail a test whose steps recorded non-fatal failures.
    #[ortho_config(skip_cli)]
    pub fail_on_accumulated: bool,

    /// Settings for the client under test.
    #[ortho_config(skip_cli)]
    pub client: ClientSettings,

    /// Logging configuration.
    #[ortho_config(skip_cli)]
    pub logging: LoggingConfig,
}

impl Default for AccTestConfig {
    fn default() -> Self {
        Self {
            gate_env: String::from(DEFAULT_GATE_ENV),
            fail_on_accumulated: true,
            client: ClientSettings::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl PostMergeHook for AccTestConfig {
    fn post_merge(&mut self, _ctx: &PostMergeContext) -> OrthoResult<()> {
        self.gate_env = self.gate_env.trim().to_owned();
        self.logging.level = self.logging.level.trim().to_ascii_lowercase();
        Ok(())
    }
}

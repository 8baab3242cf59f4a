//! Configuration loading with layered precedence.
//!
//! This module loads configuration with the precedence order (lowest to
//! highest): application defaults, configuration file, environment variables.
//!
//! # Environment Variable Handling
//!
//! Environment variables are read through `mockable::Env` so tests can supply
//! them without touching the process environment. Variables with unparseable
//! values (e.g., `ACCTEST_FAIL_ON_ACCUMULATED=maybe`) return an error
//! immediately rather than falling back to defaults. String fields are always
//! accepted.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use ortho_config::discovery::ConfigDiscovery;
use ortho_config::serde_json::{self, Map, Value};
use ortho_config::{MergeComposer, toml};
use tracing::debug;

use crate::config::AccTestConfig;
use crate::error::{ConfigError, Result};

/// Environment variable naming an explicit configuration file.
pub const CONFIG_PATH_ENV: &str = "ACCTEST_CONFIG_PATH";

// ============================================================================
// Environment Variable Specification Table
// ============================================================================

/// The type of value expected from an environment variable.
#[derive(Clone, Copy)]
enum EnvVarType {
    /// String value (always accepted).
    String,
    /// Boolean value (`true`/`false`). Invalid values return an error.
    Bool,
    /// Unsigned 64-bit integer. Invalid values return an error.
    U64,
}

/// Specification for a single environment variable mapping.
struct EnvVarSpec {
    /// The environment variable name (e.g., `ACCTEST_GATE_ENV`).
    env_var: &'static str,
    /// The JSON path segments (e.g., `["client", "endpoint"]`).
    path: &'static [&'static str],
    /// The expected value type.
    var_type: EnvVarType,
}

/// Table of all environment variables and their JSON paths.
const ENV_VAR_SPECS: &[EnvVarSpec] = &[
    EnvVarSpec {
        env_var: "ACCTEST_GATE_ENV",
        path: &["gate_env"],
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: "ACCTEST_FAIL_ON_ACCUMULATED",
        path: &["fail_on_accumulated"],
        var_type: EnvVarType::Bool,
    },
    // Client fields
    EnvVarSpec {
        env_var: "ACCTEST_CLIENT_ENDPOINT",
        path: &["client", "endpoint"],
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: "ACCTEST_CLIENT_ACCOUNT",
        path: &["client", "account"],
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: "ACCTEST_CLIENT_KEY_ID",
        path: &["client", "key_id"],
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: "ACCTEST_CLIENT_KEY_PATH",
        path: &["client", "key_path"],
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: "ACCTEST_CLIENT_TIMEOUT_SECS",
        path: &["client", "timeout_secs"],
        var_type: EnvVarType::U64,
    },
    // Logging fields
    EnvVarSpec {
        env_var: "ACCTEST_LOGGING_LEVEL",
        path: &["logging", "level"],
        var_type: EnvVarType::String,
    },
];

/// Returns the list of environment variable names recognised by the loader.
#[must_use]
pub fn env_var_names() -> Vec<&'static str> {
    ENV_VAR_SPECS.iter().map(|spec| spec.env_var).collect()
}

/// Load a configuration file and push it to the composer.
///
/// The parent directory is opened through `cap_std::fs_utf8` and the file is
/// read relative to it.
fn load_config_file(path: &Utf8Path, composer: &mut MergeComposer) -> Result<()> {
    let current_dir = Utf8Path::new(".");
    let parent = path
        .parent()
        .filter(|dir| !dir.as_str().is_empty())
        .unwrap_or(current_dir);
    let file_name = path.file_name().unwrap_or(path.as_str());

    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|e| {
        ConfigError::ParseError {
            message: format!("failed to open directory {parent}: {e}"),
        }
    })?;

    let content = dir
        .read_to_string(file_name)
        .map_err(|e| ConfigError::ParseError {
            message: format!("failed to read {path}: {e}"),
        })?;

    let value =
        toml::from_str::<serde_json::Value>(&content).map_err(|e| ConfigError::ParseError {
            message: format!("failed to parse {path}: {e}"),
        })?;

    debug!(%path, "loaded configuration file");
    composer.push_file(value, Some(path.to_path_buf()));
    Ok(())
}

/// Resolve which configuration file to load, if any.
///
/// An explicit path must exist. Otherwise `ACCTEST_CONFIG_PATH` is honoured,
/// then the discovery candidates are tried in order.
fn resolve_config_path<E: mockable::Env>(
    env: &E,
    explicit: Option<&Utf8Path>,
) -> Result<Option<Utf8PathBuf>> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            }
            .into());
        }
        return Ok(Some(path.to_path_buf()));
    }

    if let Some(path) = env
        .string(CONFIG_PATH_ENV)
        .filter(|value| !value.is_empty())
        .map(Utf8PathBuf::from)
    {
        if !path.exists() {
            return Err(ConfigError::FileNotFound { path }.into());
        }
        return Ok(Some(path));
    }

    let discovery = ConfigDiscovery::builder("acctest")
        .config_file_name("config.toml")
        .dotfile_name(".acctest.toml")
        .build();
    Ok(discovery
        .candidates()
        .into_iter()
        .filter(|p| p.exists())
        .find_map(|p| Utf8PathBuf::try_from(p).ok()))
}

/// Load configuration with full layer precedence.
///
/// Sources, later overriding earlier:
/// 1. Application defaults
/// 2. Configuration file (`explicit_path`, `ACCTEST_CONFIG_PATH`, or discovery)
/// 3. Environment variables prefixed with `ACCTEST_`
///
/// # Errors
///
/// Returns `ConfigError` if configuration loading fails due to:
/// - A named configuration file that does not exist
/// - Malformed configuration files
/// - Invalid typed environment variable values
pub fn load_config<E: mockable::Env>(
    env: &E,
    explicit_path: Option<&Utf8Path>,
) -> Result<AccTestConfig> {
    let mut composer = MergeComposer::new();

    // Layer 1: Defaults (serialised from AccTestConfig::default()).
    let defaults =
        serde_json::to_value(AccTestConfig::default()).map_err(|e| ConfigError::ParseError {
            message: format!("failed to serialise defaults: {e}"),
        })?;
    composer.push_defaults(defaults);

    // Layer 2: Configuration file.
    if let Some(path) = resolve_config_path(env, explicit_path)? {
        load_config_file(&path, &mut composer)?;
    }

    // Layer 3: Environment variables.
    let env_values = collect_env_vars(env)?;
    if !env_values.is_null() {
        composer.push_environment(env_values);
    }

    let config =
        AccTestConfig::merge_from_layers(composer.layers()).map_err(ConfigError::OrthoConfig)?;

    Ok(config)
}

/// Collect `ACCTEST_` environment variables into a JSON value.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` if a typed environment variable (bool,
/// u64) has an unparseable value.
fn collect_env_vars<E: mockable::Env>(env: &E) -> Result<Value> {
    let mut root = Map::new();

    for spec in ENV_VAR_SPECS {
        let Some(raw_value) = env.string(spec.env_var) else {
            continue;
        };

        let json_value = match spec.var_type {
            EnvVarType::String => Value::String(raw_value),
            EnvVarType::Bool => match raw_value.parse::<bool>() {
                Ok(b) => Value::Bool(b),
                Err(_) => {
                    return Err(ConfigError::InvalidValue {
                        field: spec.env_var.to_owned(),
                        reason: format!("expected bool (true/false), got '{raw_value}'"),
                    }
                    .into());
                }
            },
            EnvVarType::U64 => match raw_value.parse::<u64>() {
                Ok(n) => Value::Number(n.into()),
                Err(_) => {
                    return Err(ConfigError::InvalidValue {
                        field: spec.env_var.to_owned(),
                        reason: format!("expected unsigned integer, got '{raw_value}'"),
                    }
                    .into());
                }
            },
        };

        insert_at_path(&mut root, spec.path, json_value);
    }

    if root.is_empty() {
        Ok(Value::Null)
    } else {
        Ok(Value::Object(root))
    }
}

/// Insert a value at a nested path in a JSON map, creating intermediate
/// objects as needed.
fn insert_at_path(root: &mut Map<String, Value>, path: &[&str], value: Value) {
    let Some((&field, parents)) = path.split_last() else {
        return;
    };

    let mut current = root;
    for &segment in parents {
        let entry = current
            .entry(segment.to_owned())
            .or_insert_with(|| Value::Object(Map::new()));
        let Some(obj) = entry.as_object_mut() else {
            return;
        };
        current = obj;
    }

    current.insert(field.to_owned(), value);
}

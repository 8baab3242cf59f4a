//! Configuration system for acctest.
//!
//! Configuration loading and precedence merging is handled by the
//! `ortho_config` crate. Precedence: environment variables override the
//! configuration file, which overrides defaults.
//!
//! The configuration file is expected at `~/.config/acctest/config.toml` by
//! default.
//!
//! # Example Configuration
//!
//! ```toml
//! gate_env = "ACCTEST"
//! fail_on_accumulated = true
//!
//! [client]
//! endpoint = "https://api.example.com"
//! account = "tester"
//! key_id = "aa:bb:cc"
//! key_path = "/home/user/.ssh/id_rsa"
//! timeout_secs = 30
//!
//! [logging]
//! level = "debug"
//! ```

mod loader;
mod types;


pub use loader::{CONFIG_PATH_ENV, env_var_names, load_config};
pub use types::{AccTestConfig, ClientSettings, DEFAULT_GATE_ENV, LoggingConfig};

pub mod config;

pub use self::config::{apply_cli_overrides, load_config, AppConfig, CliOverrides};

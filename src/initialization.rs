use std::fs;
use serde::Deserialize;
use crate::errors::ConfigError;
use crate::logging::setup_logger;

#[derive(Deserialize, Clone, Debug)]
pub struct WebServerParameters {
    pub bind_address: String,
    pub bind_port: u16,
}

#[derive(Deserialize, Clone, Debug)]
pub struct OWMParameters {
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

#[derive(Deserialize, Clone, Debug)]
pub struct General {
    pub log_path: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_true")]
    pub log_to_stdout: bool,
}

#[derive(Deserialize, Clone, Debug)]
pub struct Recipient {
    pub email: String,
    pub city: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct Reports {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_report_hour")]
    pub hour: u32,
    #[serde(default)]
    pub minute: u32,
    #[serde(default)]
    pub recipients: Vec<Recipient>,
}

impl Default for Reports {
    fn default() -> Self {
        Self {
            enabled: false,
            hour: default_report_hour(),
            minute: 0,
            recipients: Vec::new(),
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    pub web_server: WebServerParameters,
    pub owm: OWMParameters,
    pub general: General,
    #[serde(default)]
    pub reports: Reports,
}

fn default_base_url() -> String { "https://api.openweathermap.org".to_string() }
fn default_timeout() -> u64 { 30 }
fn default_log_level() -> String { "info".to_string() }
fn default_true() -> bool { true }
fn default_report_hour() -> u32 { 16 }

/// Loads the configuration file and sets up logging.
///
/// The path to the configuration file is taken from the environment variable `CONFIG_PATH`
/// and defaults to `config.toml` in the current directory.
pub fn config() -> Result<Config, ConfigError> {
    let config_path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    let config = load_config(&config_path)?;

    setup_logger(&config.general.log_path, &config.general.log_level, config.general.log_to_stdout)?;

    Ok(config)
}

/// Reads and validates a configuration file
///
/// # Arguments
///
/// * 'config_path' - path to the toml file
pub fn load_config(config_path: &str) -> Result<Config, ConfigError> {
    let toml = fs::read_to_string(config_path)?;
    let config: Config = toml::from_str(&toml)?;

    if config.owm.api_key.trim().is_empty() {
        return Err(ConfigError::from("owm.api_key must not be empty"));
    }
    if config.reports.hour > 23 || config.reports.minute > 59 {
        return Err(ConfigError::from("reports.hour/minute out of range"));
    }

    Ok(config)
}

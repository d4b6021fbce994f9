//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If `SHOWUP_DB_PATH` is not set, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//! 5. Secrets set in the environment override whatever the file says
//!
//! ## Environment Variables
//! - `SHOWUP_DB_PATH` (required for env loading), `SHOWUP_DB_POOL_SIZE`
//! - `SHOWUP_BIND_ADDRESS`
//! - `SHOWUP_CALENDAR_API_BASE_URL`, `SHOWUP_CALENDAR_TIMEOUT_SECS`,
//!   `SHOWUP_CALENDAR_MAX_RETRIES`
//! - `SHOWUP_EMAIL_ENABLED`, `SHOWUP_EMAIL_BASE_URL`, `SHOWUP_EMAIL_FROM`,
//!   `SHOWUP_EMAIL_API_KEY`, `SHOWUP_APP_URL`
//! - `SHOWUP_LEDGER_RPC_URL`, `SHOWUP_LEDGER_CONTRACT_ADDRESS`
//! - `SHOWUP_CHECK_IN_GRACE_MINUTES`, `SHOWUP_STAKING_CUTOFF_MINUTES`,
//!   `SHOWUP_INVITATION_TTL_DAYS`, `SHOWUP_ATTENDANCE_CODE_LENGTH`,
//!   `SHOWUP_ALLOW_EARLY_SETTLEMENT`, `SHOWUP_ENFORCE_STAKING_DEADLINE`
//!
//! ## File Locations
//! `showup.toml`, `showup.json`, `config.toml` and `config.json` are probed in
//! the working directory, its two parents, and next to the executable.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use showup_domain::{Config, Result, ShowupError};

const CONFIG_FILE_NAMES: [&str; 4] = ["showup.toml", "showup.json", "config.toml", "config.json"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If the required
/// variable is missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `ShowupError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - A value fails validation
pub fn load() -> Result<Config> {
    let config = match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            config
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            let mut config = load_from_file(None)?;
            apply_secret_overrides(&mut config);
            config
        }
    };

    validate(&config)?;
    Ok(config)
}

/// Load configuration from environment variables
///
/// Only `SHOWUP_DB_PATH` is required; every other variable falls back to
/// the documented default when unset.
///
/// # Errors
/// Returns `ShowupError::Config` if the required variable is missing or a
/// set variable has an invalid value.
pub fn load_from_env() -> Result<Config> {
    let mut config = Config::default();

    config.database.path = env_var("SHOWUP_DB_PATH")?;
    config.database.pool_size = env_parse("SHOWUP_DB_POOL_SIZE", config.database.pool_size)?;

    if let Some(bind) = env_opt("SHOWUP_BIND_ADDRESS") {
        config.server.bind_address = bind;
    }

    if let Some(url) = env_opt("SHOWUP_CALENDAR_API_BASE_URL") {
        config.calendar.api_base_url = url;
    }
    config.calendar.timeout_secs =
        env_parse("SHOWUP_CALENDAR_TIMEOUT_SECS", config.calendar.timeout_secs)?;
    config.calendar.max_retries =
        env_parse("SHOWUP_CALENDAR_MAX_RETRIES", config.calendar.max_retries)?;

    config.email.enabled = env_bool("SHOWUP_EMAIL_ENABLED", config.email.enabled);
    if let Some(url) = env_opt("SHOWUP_EMAIL_BASE_URL") {
        config.email.base_url = url;
    }
    if let Some(from) = env_opt("SHOWUP_EMAIL_FROM") {
        config.email.from_address = from;
    }
    if let Some(app_url) = env_opt("SHOWUP_APP_URL") {
        config.email.app_url = app_url;
    }

    config.ledger.rpc_url = env_opt("SHOWUP_LEDGER_RPC_URL");
    config.ledger.contract_address = env_opt("SHOWUP_LEDGER_CONTRACT_ADDRESS");

    let staking = &mut config.staking;
    staking.check_in_grace_minutes =
        env_parse("SHOWUP_CHECK_IN_GRACE_MINUTES", staking.check_in_grace_minutes)?;
    staking.staking_cutoff_minutes =
        env_parse("SHOWUP_STAKING_CUTOFF_MINUTES", staking.staking_cutoff_minutes)?;
    staking.invitation_ttl_days =
        env_parse("SHOWUP_INVITATION_TTL_DAYS", staking.invitation_ttl_days)?;
    staking.attendance_code_length =
        env_parse("SHOWUP_ATTENDANCE_CODE_LENGTH", staking.attendance_code_length)?;
    staking.allow_early_settlement =
        env_bool("SHOWUP_ALLOW_EARLY_SETTLEMENT", staking.allow_early_settlement);
    staking.enforce_staking_deadline =
        env_bool("SHOWUP_ENFORCE_STAKING_DEADLINE", staking.enforce_staking_deadline);

    apply_secret_overrides(&mut config);
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `ShowupError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ShowupError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            ShowupError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| ShowupError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

/// Reject values no service can run with.
pub fn validate(config: &Config) -> Result<()> {
    let staking = &config.staking;
    let mut problems = Vec::new();

    if config.database.path.trim().is_empty() {
        problems.push("database.path must not be empty");
    }
    if config.database.pool_size == 0 {
        problems.push("database.pool_size must be at least 1");
    }
    if staking.check_in_grace_minutes < 0 {
        problems.push("staking.check_in_grace_minutes must not be negative");
    }
    if staking.staking_cutoff_minutes < 0 {
        problems.push("staking.staking_cutoff_minutes must not be negative");
    }
    if staking.invitation_ttl_days <= 0 {
        problems.push("staking.invitation_ttl_days must be positive");
    }
    if staking.attendance_code_length == 0 {
        problems.push("staking.attendance_code_length must be positive");
    }
    if config.email.enabled && config.email.api_key.is_none() {
        problems.push("email.api_key is required when email is enabled");
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(ShowupError::Config(problems.join("; ")))
    }
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| ShowupError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| ShowupError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(ShowupError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe multiple paths for configuration files
///
/// Searches the current working directory, its two parents, and the
/// executable's directory, returning the first file that exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.extend([cwd.clone(), cwd.join(".."), cwd.join("../..")]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.push(exe_dir.to_path_buf());
        }
    }

    roots
        .iter()
        .flat_map(|root| CONFIG_FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

fn apply_secret_overrides(config: &mut Config) {
    if let Some(key) = env_opt("SHOWUP_EMAIL_API_KEY") {
        config.email.api_key = Some(key);
    }
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        ShowupError::Config(format!("Missing required environment variable: {}", key))
    })
}

/// Optional environment variable; blank values count as unset.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Parse an optional environment variable, falling back to `default`.
fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_opt(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ShowupError::Config(format!("Invalid value for {}: {}", key, e))),
        None => Ok(default),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

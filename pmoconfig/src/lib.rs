//! # PMOTv configuration
//!
//! One YAML document shared by every crate of the workspace. It is built
//! at startup from three layers, later ones winning:
//!
//! 1. the defaults embedded in the binary (`pmotv.yaml`),
//! 2. `config.yaml` in the configuration directory,
//! 3. environment overrides (`PMOTV_CONFIG__SECTION__KEY=value`, plus the
//!    `PORT` and `ADDON_URL` aliases).
//!
//! The merged document is written back to `config.yaml`, so a fresh
//! install ends up with a complete, editable file.
//!
//! ```no_run
//! use pmoconfig::get_config;
//!
//! let config = get_config();
//! println!("listening on {}", config.get_http_port());
//!
//! config.set_http_port(9000)?;
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! Source crates add their own typed accessors through extension traits on
//! [`Config`] (see `pmofrancetv::FranceTvConfigExt`).

mod overrides;
mod yaml;

use anyhow::{anyhow, bail, Context, Result};
use lazy_static::lazy_static;
use serde_yaml::{Number, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{info, warn};

const DEFAULT_CONFIG: &str = include_str!("pmotv.yaml");
const CONFIG_FILE: &str = "config.yaml";
const CONFIG_DIR_NAME: &str = ".pmotv";
const ENV_CONFIG_DIR: &str = "PMOTV_CONFIG";

const DEFAULT_HTTP_PORT: u16 = 7000;
const DEFAULT_LOG_MIN_LEVEL: &str = "INFO";

lazy_static! {
    static ref CONFIG: Arc<Config> =
        Arc::new(Config::load_config("").expect("Failed to load PMOTv configuration"));
}

/// Returns the process-wide configuration, loading it on first use
pub fn get_config() -> Arc<Config> {
    CONFIG.clone()
}

/// Loaded configuration, backed by `<dir>/config.yaml`
#[derive(Debug)]
pub struct Config {
    dir: PathBuf,
    file: PathBuf,
    tree: RwLock<Value>,
}

impl Config {
    /// Loads the configuration from `directory`
    ///
    /// An empty `directory` means "search": `$PMOTV_CONFIG`, then `./.pmotv`,
    /// then `~/.pmotv`, falling back to `./.pmotv`. The directory is created
    /// when missing and must be writable.
    pub fn load_config(directory: &str) -> Result<Self> {
        let dir = find_config_dir(directory);
        prepare_config_dir(&dir)
            .with_context(|| format!("Config directory {} is not usable", dir.display()))?;
        info!(config_dir = %dir.display(), "Using config directory");

        let file = dir.join(CONFIG_FILE);
        let mut tree = yaml::lowercase_keys(serde_yaml::from_str(DEFAULT_CONFIG)?);

        match fs::read_to_string(&file) {
            Ok(text) => {
                let user: Value = serde_yaml::from_str(&text)
                    .with_context(|| format!("Invalid YAML in {}", file.display()))?;
                yaml::merge(&mut tree, yaml::lowercase_keys(user));
                info!(config_file = %file.display(), "Loaded config file");
            }
            Err(_) => {
                info!(config_file = %file.display(), "No config file, using embedded defaults")
            }
        }

        overrides::apply_env(&mut tree);

        let config = Self {
            dir,
            file,
            tree: RwLock::new(tree),
        };
        config.save()?;
        Ok(config)
    }

    /// Directory holding `config.yaml`
    pub fn directory(&self) -> &Path {
        &self.dir
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Value>> {
        self.tree
            .read()
            .map_err(|_| anyhow!("Configuration lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Value>> {
        self.tree
            .write()
            .map_err(|_| anyhow!("Configuration lock poisoned"))
    }

    /// Writes the current document to `config.yaml`
    pub fn save(&self) -> Result<()> {
        let tree = self.read()?;
        let text = serde_yaml::to_string(&*tree)?;
        fs::write(&self.file, text)
            .with_context(|| format!("Cannot write {}", self.file.display()))
    }

    /// Value at `path` (keys are case-insensitive)
    pub fn get_value(&self, path: &[&str]) -> Result<Value> {
        let tree = self.read()?;
        let value = yaml::lookup(&tree, path)?.clone();
        Ok(value)
    }

    /// Sets the value at `path`, creating sections as needed, and saves
    pub fn set_value(&self, path: &[&str], value: Value) -> Result<()> {
        {
            let mut tree = self.write()?;
            yaml::insert(&mut tree, path, value)?;
        }
        self.save()
    }

    /// Unsigned integer at `path`; numeric strings are accepted
    pub fn get_u64_or(&self, path: &[&str], default: u64) -> u64 {
        match self.get_value(path) {
            Ok(Value::Number(n)) => n.as_u64().unwrap_or(default),
            Ok(Value::String(s)) => s.trim().parse().unwrap_or(default),
            _ => default,
        }
    }

    /// Non-empty string at `path`
    pub fn get_string_or(&self, path: &[&str], default: &str) -> String {
        match self.get_value(path) {
            Ok(Value::String(s)) if !s.trim().is_empty() => s,
            _ => default.to_string(),
        }
    }

    // ========================================================================
    // Host
    // ========================================================================

    /// HTTP port, 7000 when unset or out of range
    pub fn get_http_port(&self) -> u16 {
        let raw = self.get_u64_or(&["host", "http_port"], u64::from(DEFAULT_HTTP_PORT));
        match u16::try_from(raw) {
            Ok(port) if port != 0 => port,
            _ => {
                warn!("Invalid HTTP port {}, using {}", raw, DEFAULT_HTTP_PORT);
                DEFAULT_HTTP_PORT
            }
        }
    }

    pub fn set_http_port(&self, port: u16) -> Result<()> {
        self.set_value(&["host", "http_port"], Value::Number(Number::from(port)))
    }

    /// Public URL of the add-on, without trailing slash
    ///
    /// Defaults to `http://localhost:{port}`.
    pub fn get_base_url(&self) -> String {
        let url = self.get_string_or(&["host", "base_url"], "");
        if url.is_empty() {
            format!("http://localhost:{}", self.get_http_port())
        } else {
            url.trim_end_matches('/').to_string()
        }
    }

    /// Niveau de log minimum (`TRACE` … `ERROR`)
    pub fn get_log_min_level(&self) -> String {
        self.get_string_or(&["host", "logger", "min_level"], DEFAULT_LOG_MIN_LEVEL)
    }

    pub fn set_log_min_level(&self, level: &str) -> Result<()> {
        self.set_value(
            &["host", "logger", "min_level"],
            Value::String(level.to_uppercase()),
        )
    }
}

fn find_config_dir(explicit: &str) -> PathBuf {
    if !explicit.is_empty() {
        return PathBuf::from(explicit);
    }

    if let Ok(dir) = std::env::var(ENV_CONFIG_DIR) {
        info!(env_var = ENV_CONFIG_DIR, path = %dir, "Config directory from environment");
        return PathBuf::from(dir);
    }

    let local = PathBuf::from(CONFIG_DIR_NAME);
    if local.exists() {
        return local;
    }

    dirs::home_dir()
        .map(|home| home.join(CONFIG_DIR_NAME))
        .filter(|dir| dir.exists())
        .unwrap_or(local)
}

fn prepare_config_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;
    if !dir.is_dir() {
        bail!("{} is not a directory", dir.display());
    }

    let probe = dir.join(".write_test");
    fs::write(&probe, b"")?;
    fs::remove_file(&probe)?;
    Ok(())
}

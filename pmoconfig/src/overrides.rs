//! Environment overrides
//!
//! `PMOTV_CONFIG__HOST__HTTP_PORT=8080` sets `host.http_port`. The plain
//! `PORT` and `ADDON_URL` variables used by container platforms are
//! accepted as aliases; the prefixed form wins when both are set.

use crate::yaml;
use serde_yaml::Value;
use tracing::{info, warn};

pub(crate) const ENV_PREFIX: &str = "PMOTV_CONFIG__";

const ENV_ALIASES: &[(&str, &[&str])] = &[
    ("PORT", &["host", "http_port"]),
    ("ADDON_URL", &["host", "base_url"]),
];

/// Applies the process environment to `tree`
pub(crate) fn apply_env(tree: &mut Value) {
    apply(tree, std::env::vars().collect());
}

pub(crate) fn apply(tree: &mut Value, vars: Vec<(String, String)>) {
    for (alias, path) in ENV_ALIASES {
        if let Some((_, raw)) = vars.iter().find(|(name, _)| name == alias) {
            info!(env_var = alias, "Applying environment override");
            set(tree, path, raw);
        }
    }

    for (name, raw) in &vars {
        if let Some(rest) = name.strip_prefix(ENV_PREFIX) {
            let path: Vec<&str> = rest.split("__").collect();
            set(tree, &path, raw);
        }
    }
}

fn set(tree: &mut Value, path: &[&str], raw: &str) {
    if let Err(e) = yaml::insert(tree, path, parse_scalar(raw)) {
        warn!("Ignoring environment override: {}", e);
    }
}

/// Reads `raw` as YAML so numbers and booleans keep their type
pub(crate) fn parse_scalar(raw: &str) -> Value {
    serde_yaml::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

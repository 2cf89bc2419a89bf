//! Environment loading for manifest values
//!
//! Values come from `.env` and `.env.local` in the project dir (later files
//! override earlier ones), then from process variables carrying the public
//! prefix. They can be referenced as `$NAME` or `${NAME}` from package.json.

use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

use crate::errors::ManifestError;

/// Env files read in order
pub const ENV_FILES: [&str; 2] = [".env", ".env.local"];

/// Process variables with this prefix are exposed to the manifest
pub const PUBLIC_PREFIX: &str = "EXTPACK_PUBLIC_";

pub type EnvVars = BTreeMap<String, String>;

/// Load env files from `project_dir` and overlay public process variables
pub async fn load_env(project_dir: &Path) -> Result<EnvVars, ManifestError> {
    let mut vars = EnvVars::new();
    for name in ENV_FILES {
        let path = project_dir.join(name);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => {
                let parsed = parse_env(&content);
                debug!("Loaded {} variables from {:?}", parsed.len(), path);
                vars.extend(parsed);
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => return Err(ManifestError::io(path, err)),
        }
    }

    vars.extend(std::env::vars().filter(|(key, _)| key.starts_with(PUBLIC_PREFIX)));
    Ok(vars)
}

/// Parse `KEY=VALUE` lines; `#` comments, `export ` prefixes and quotes are handled
pub fn parse_env(content: &str) -> EnvVars {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let line = line.strip_prefix("export ").unwrap_or(line);
            let (key, value) = line.split_once('=')?;
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            Some((key.to_string(), unquote(value.trim()).to_string()))
        })
        .collect()
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    // Unquoted values may carry a trailing comment.
    value.split(" #").next().unwrap_or(value).trim_end()
}

fn reference_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)").ok()
        })
        .as_ref()
}

/// Replace `$NAME` and `${NAME}` references; unknown names are left untouched
pub fn substitute(value: &str, env: &EnvVars) -> String {
    let Some(pattern) = reference_pattern().filter(|_| value.contains('$')) else {
        return value.to_string();
    };
    pattern
        .replace_all(value, |caps: &Captures<'_>| {
            let name = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
            env.get(name)
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Apply [`substitute`] to every string inside a JSON value
pub fn substitute_json(value: &mut serde_json::Value, env: &EnvVars) {
    match value {
        serde_json::Value::String(s) => *s = substitute(s, env),
        serde_json::Value::Array(items) => {
            for item in items {
                substitute_json(item, env);
            }
        }
        serde_json::Value::Object(map) => {
            for item in map.values_mut() {
                substitute_json(item, env);
            }
        }
        _ => {}
    }
}

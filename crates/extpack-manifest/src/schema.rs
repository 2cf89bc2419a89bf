//! Rendering manifest state into manifest JSON
//!
//! The sections shared by both manifest versions are rendered here; the
//! version-specific parts are delegated to a [`ManifestSchema`].

use extpack_config::{Browser, ManifestVersion};
use serde_json::{json, Map, Value};
use smallvec::SmallVec;
use std::path::{Component, Path};

use crate::common_path::CommonPath;
use crate::types::{Feature, ManifestState};

/// Match pattern used for content scripts and their host permissions
pub const ALL_URLS: &str = "<all_urls>";

/// Keys the builder always controls; package.json overrides cannot replace them
pub const OWNED_KEYS: [&str; 3] = ["manifest_version", "background", "content_scripts"];

/// Version-specific parts of the manifest
pub trait ManifestSchema: 'static {
    const VERSION: ManifestVersion;

    /// Key holding the toolbar popup (`action` / `browser_action`)
    fn action_key() -> &'static str;

    fn background(scripts: &[String], browser: Browser) -> Value;

    /// Add host permissions required by content scripts
    fn grant_hosts(manifest: &mut Map<String, Value>, hosts: &[&str]);
}

/// Bundle path of a source file: relative to the source dir, `.js` extension,
/// `/` separators.
pub fn bundle_path(source: &Path, source_dir: &Path) -> String {
    let relative = source
        .strip_prefix(source_dir)
        .ok()
        .filter(|rel| !rel.as_os_str().is_empty())
        .unwrap_or_else(|| source.file_name().map_or(source, Path::new));

    let parts: SmallVec<[String; 4]> = relative
        .with_extension("js")
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    parts.join("/")
}

/// Append `values` to the array at `key`, skipping duplicates
pub fn append_unique(manifest: &mut Map<String, Value>, key: &str, values: &[&str]) {
    let entry = manifest
        .entry(key.to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    if let Value::Array(items) = entry {
        for value in values {
            if !items.iter().any(|item| item == value) {
                items.push(Value::from(*value));
            }
        }
    }
}

/// Render the complete manifest for schema `S`
pub fn render<S: ManifestSchema>(
    state: &ManifestState,
    common: &CommonPath,
    browser: Browser,
) -> Map<String, Value> {
    let mut manifest = Map::new();
    manifest.insert("manifest_version".into(), json!(S::VERSION.number()));

    if let Some(package) = state.package.as_ref() {
        manifest.insert("name".into(), json!(package.title()));
        manifest.insert("version".into(), json!(package.version));
        if let Some(description) = package.description.as_ref() {
            manifest.insert("description".into(), json!(description));
        }
        if let Some(author) = package.author.as_ref() {
            manifest.insert("author".into(), json!(author.name()));
        }
        if let Some(homepage) = package.homepage.as_ref() {
            manifest.insert("homepage_url".into(), json!(homepage));
        }
    }

    let toggles = state.toggles;
    if toggles.popup {
        manifest.insert(
            S::action_key().into(),
            json!({ "default_popup": Feature::Popup.page() }),
        );
    }
    if toggles.options {
        manifest.insert(
            "options_ui".into(),
            json!({ "page": Feature::Options.page(), "open_in_tab": true }),
        );
    }
    if toggles.devtools {
        manifest.insert("devtools_page".into(), json!(Feature::Devtools.page()));
    }
    if toggles.newtab {
        manifest.insert(
            "chrome_url_overrides".into(),
            json!({ "newtab": Feature::Newtab.page() }),
        );
    }

    if let Some(background) = state.background.as_ref() {
        let script = bundle_path(background, &common.source_dir);
        manifest.insert("background".into(), S::background(&[script], browser));
    }

    if !state.content_scripts.is_empty() {
        // BTreeSet iteration keeps the output independent of registration order.
        let scripts: Vec<Value> = state
            .content_scripts
            .iter()
            .map(|path| {
                json!({
                    "matches": [ALL_URLS],
                    "js": [bundle_path(path, &common.source_dir)],
                })
            })
            .collect();
        manifest.insert("content_scripts".into(), Value::Array(scripts));
        S::grant_hosts(&mut manifest, &[ALL_URLS]);
    }

    if let Some(package) = state.package.as_ref() {
        merge_overrides(&mut manifest, &package.manifest);
    }

    manifest
}

/// Merge user overrides: arrays are unioned, objects shallow-merged, anything
/// else replaced. Owned keys are left alone.
fn merge_overrides(manifest: &mut Map<String, Value>, overrides: &Map<String, Value>) {
    for (key, value) in overrides {
        if OWNED_KEYS.contains(&key.as_str()) {
            tracing::warn!("Ignoring package.json manifest override for '{}'", key);
            continue;
        }
        match (manifest.get_mut(key), value) {
            (Some(Value::Array(existing)), Value::Array(extra)) => {
                for item in extra {
                    if !existing.contains(item) {
                        existing.push(item.clone());
                    }
                }
            }
            (Some(Value::Object(existing)), Value::Object(extra)) => {
                for (k, v) in extra {
                    existing.insert(k.clone(), v.clone());
                }
            }
            _ => {
                manifest.insert(key.clone(), value.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundle_path() {
        let src = Path::new("/ext/src");
        assert_eq!(bundle_path(Path::new("/ext/src/background.ts"), src), "background.js");
        assert_eq!(
            bundle_path(Path::new("/ext/src/contents/inline.tsx"), src),
            "contents/inline.js"
        );
        assert_eq!(
            bundle_path(Path::new("/ext/src/background/index.ts"), src),
            "background/index.js"
        );
        // Outside the source dir only the file name is kept.
        assert_eq!(bundle_path(Path::new("/elsewhere/tool.ts"), src), "tool.js");
    }

    #[test]
    fn test_append_unique() {
        let mut manifest = Map::new();
        append_unique(&mut manifest, "permissions", &["storage", "tabs"]);
        append_unique(&mut manifest, "permissions", &["tabs", ALL_URLS]);
        assert_eq!(
            manifest["permissions"],
            json!(["storage", "tabs", "<all_urls>"])
        );
    }

    #[test]
    fn test_merge_overrides() {
        let mut manifest = Map::new();
        manifest.insert("permissions".into(), json!(["<all_urls>"]));
        manifest.insert("options_ui".into(), json!({ "page": "options.html" }));
        manifest.insert("manifest_version".into(), json!(3));

        let overrides = json!({
            "permissions": ["storage", "<all_urls>"],
            "options_ui": { "open_in_tab": false },
            "manifest_version": 2,
            "commands": { "toggle": {} }
        });
        let Value::Object(overrides) = overrides else {
            return;
        };
        merge_overrides(&mut manifest, &overrides);

        assert_eq!(manifest["permissions"], json!(["<all_urls>", "storage"]));
        assert_eq!(
            manifest["options_ui"],
            json!({ "page": "options.html", "open_in_tab": false })
        );
        assert_eq!(manifest["manifest_version"], json!(3));
        assert!(manifest.contains_key("commands"));
    }
}

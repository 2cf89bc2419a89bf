//! Manifest V2 (legacy) schema

use extpack_config::{Browser, ManifestVersion};
use serde_json::{json, Map, Value};

use crate::builder::ExtensionManifest;
use crate::schema::{append_unique, ManifestSchema};

pub struct Mv2Schema;

impl ManifestSchema for Mv2Schema {
    const VERSION: ManifestVersion = ManifestVersion::Mv2;

    fn action_key() -> &'static str {
        "browser_action"
    }

    fn background(scripts: &[String], _browser: Browser) -> Value {
        json!({ "scripts": scripts, "persistent": false })
    }

    // MV2 has no separate host permission list.
    fn grant_hosts(manifest: &mut Map<String, Value>, hosts: &[&str]) {
        append_unique(manifest, "permissions", hosts);
    }
}

/// Builder for legacy (MV2) manifests
pub type ManifestV2 = ExtensionManifest<Mv2Schema>;

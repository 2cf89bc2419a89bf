//! Manifest V3 schema

use extpack_config::{Browser, ManifestVersion};
use serde_json::{json, Map, Value};

use crate::builder::ExtensionManifest;
use crate::schema::{append_unique, ManifestSchema};

pub struct Mv3Schema;

impl ManifestSchema for Mv3Schema {
    const VERSION: ManifestVersion = ManifestVersion::Mv3;

    fn action_key() -> &'static str {
        "action"
    }

    fn background(scripts: &[String], browser: Browser) -> Value {
        match scripts.first() {
            Some(worker) if browser.supports_service_worker() => {
                json!({ "service_worker": worker, "type": "module" })
            }
            _ => json!({ "scripts": scripts, "type": "module" }),
        }
    }

    fn grant_hosts(manifest: &mut Map<String, Value>, hosts: &[&str]) {
        append_unique(manifest, "host_permissions", hosts);
    }
}

/// Builder for MV3 manifests
pub type ManifestV3 = ExtensionManifest<Mv3Schema>;

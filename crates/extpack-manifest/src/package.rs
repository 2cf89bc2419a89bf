//! Package metadata read from `package.json`

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

use crate::env::{substitute, substitute_json, EnvVars};
use crate::errors::ManifestError;

/// `author` may be a plain string or a `{ name, email, url }` object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Author {
    Name(String),
    Person {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        email: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
}

impl Author {
    pub fn name(&self) -> &str {
        match self {
            Author::Name(name) | Author::Person { name, .. } => name,
        }
    }
}

/// The subset of package.json the manifest is derived from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageData {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    /// Raw manifest keys merged over the generated manifest
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub manifest: Map<String, Value>,
}

impl PackageData {
    /// Read and parse package.json
    pub async fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ManifestError::InvalidPackage {
                    path: path.to_path_buf(),
                    message: "file not found".to_string(),
                }
            } else {
                ManifestError::io(path, e)
            }
        })?;
        Self::parse(path, &content)
    }

    pub fn parse(path: &Path, content: &str) -> Result<Self, ManifestError> {
        let package: PackageData =
            serde_json::from_str(content).map_err(|e| ManifestError::InvalidPackage {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        if package.name.trim().is_empty() {
            return Err(ManifestError::InvalidPackage {
                path: path.to_path_buf(),
                message: "missing \"name\"".to_string(),
            });
        }
        Ok(package)
    }

    /// Resolve env references in user-facing strings and manifest overrides
    pub fn apply_env(&mut self, env: &EnvVars) {
        if let Some(display_name) = self.display_name.as_mut() {
            *display_name = substitute(display_name, env);
        }
        if let Some(description) = self.description.as_mut() {
            *description = substitute(description, env);
        }
        for value in self.manifest.values_mut() {
            substitute_json(value, env);
        }
    }

    /// Name shown to users: `displayName` when set, the package name otherwise
    pub fn title(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.name)
    }
}

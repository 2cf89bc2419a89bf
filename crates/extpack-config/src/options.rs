//! Build target selection
//!
//! A build target is a browser plus a manifest version, written on the
//! command line as `<browser>-<mv>` (e.g. `chrome-mv3`, `firefox-mv2`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Browser the extension is built for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    #[default]
    Chrome,
    Firefox,
    Edge,
    Brave,
    Opera,
    Safari,
}

impl Browser {
    pub const ALL: [Browser; 6] = [
        Browser::Chrome,
        Browser::Firefox,
        Browser::Edge,
        Browser::Brave,
        Browser::Opera,
        Browser::Safari,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chrome => "chrome",
            Browser::Firefox => "firefox",
            Browser::Edge => "edge",
            Browser::Brave => "brave",
            Browser::Opera => "opera",
            Browser::Safari => "safari",
        }
    }

    /// Firefox has no MV3 service worker support and loads background
    /// scripts as event pages instead.
    pub fn supports_service_worker(&self) -> bool {
        !matches!(self, Browser::Firefox)
    }
}

impl fmt::Display for Browser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Browser {
    type Err = OptionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Browser::ALL
            .into_iter()
            .find(|b| b.as_str() == needle)
            .ok_or_else(|| OptionsError::UnknownBrowser(s.to_string()))
    }
}

/// Extension manifest format version
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManifestVersion {
    Mv2,
    #[default]
    Mv3,
}

impl ManifestVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            ManifestVersion::Mv2 => "mv2",
            ManifestVersion::Mv3 => "mv3",
        }
    }

    /// Numeric value written to the `manifest_version` key
    pub fn number(&self) -> u8 {
        match self {
            ManifestVersion::Mv2 => 2,
            ManifestVersion::Mv3 => 3,
        }
    }
}

impl fmt::Display for ManifestVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ManifestVersion {
    type Err = OptionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mv2" | "2" => Ok(ManifestVersion::Mv2),
            "mv3" | "3" => Ok(ManifestVersion::Mv3),
            _ => Err(OptionsError::UnknownManifestVersion(s.to_string())),
        }
    }
}

/// Options for a single manifest assembly
///
/// `manifest_version` is optional on purpose: callers that leave it unset get
/// the legacy (MV2) builder, while [`BuildOptions::default`] asks for MV3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOptions {
    #[serde(default)]
    pub browser: Browser,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest_version: Option<ManifestVersion>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions {
            browser: Browser::Chrome,
            manifest_version: Some(ManifestVersion::Mv3),
        }
    }
}

impl BuildOptions {
    pub fn new(browser: Browser, manifest_version: ManifestVersion) -> Self {
        BuildOptions {
            browser,
            manifest_version: Some(manifest_version),
        }
    }

    /// The manifest version the assembler will build: MV3 only when MV3 was
    /// explicitly requested, MV2 otherwise.
    pub fn selected_version(&self) -> ManifestVersion {
        match self.manifest_version {
            Some(ManifestVersion::Mv3) => ManifestVersion::Mv3,
            _ => ManifestVersion::Mv2,
        }
    }

    /// Target string such as `chrome-mv3`
    pub fn target(&self) -> String {
        format!("{}-{}", self.browser, self.selected_version())
    }
}

impl FromStr for BuildOptions {
    type Err = OptionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (browser, version) = s
            .trim()
            .rsplit_once('-')
            .ok_or_else(|| OptionsError::InvalidTarget(s.to_string()))?;
        Ok(BuildOptions::new(browser.parse()?, version.parse()?))
    }
}

/// Errors produced while parsing build options
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionsError {
    UnknownBrowser(String),
    UnknownManifestVersion(String),
    InvalidTarget(String),
}

impl fmt::Display for OptionsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionsError::UnknownBrowser(value) => write!(
                f,
                "Unknown browser '{}'. Expected one of: chrome, firefox, edge, brave, opera, safari",
                value
            ),
            OptionsError::UnknownManifestVersion(value) => {
                write!(f, "Unknown manifest version '{}'. Expected mv2 or mv3", value)
            }
            OptionsError::InvalidTarget(value) => write!(
                f,
                "Invalid target '{}'. Expected <browser>-<mv>, e.g. chrome-mv3",
                value
            ),
        }
    }
}

impl std::error::Error for OptionsError {}

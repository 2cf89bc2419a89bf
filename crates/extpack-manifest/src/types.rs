//! Manifest state accumulated by a builder during one assembly

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;

use crate::package::PackageData;

/// Optional extension page backed by an HTML scaffold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Feature {
    Popup,
    Options,
    Devtools,
    Newtab,
}

impl Feature {
    pub const ALL: [Feature; 4] = [
        Feature::Popup,
        Feature::Options,
        Feature::Devtools,
        Feature::Newtab,
    ];

    /// Base name of the entry file and of the generated page
    pub fn name(&self) -> &'static str {
        match self {
            Feature::Popup => "popup",
            Feature::Options => "options",
            Feature::Devtools => "devtools",
            Feature::Newtab => "newtab",
        }
    }

    /// Page referenced from the manifest, e.g. `popup.html`
    pub fn page(&self) -> String {
        format!("{}.html", self.name())
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The four page toggles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureToggles {
    pub popup: bool,
    pub options: bool,
    pub devtools: bool,
    pub newtab: bool,
}

impl FeatureToggles {
    pub fn get(&self, feature: Feature) -> bool {
        match feature {
            Feature::Popup => self.popup,
            Feature::Options => self.options,
            Feature::Devtools => self.devtools,
            Feature::Newtab => self.newtab,
        }
    }

    pub fn set(&mut self, feature: Feature, enabled: bool) {
        match feature {
            Feature::Popup => self.popup = enabled,
            Feature::Options => self.options = enabled,
            Feature::Devtools => self.devtools = enabled,
            Feature::Newtab => self.newtab = enabled,
        }
    }

    pub fn any(&self) -> bool {
        Feature::ALL.iter().any(|f| self.get(*f))
    }
}

/// Everything a builder knows about the manifest before rendering.
///
/// Each operation writes only its own field, so concurrent registrations
/// never interfere beyond the short critical section of the builder lock.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ManifestState {
    pub env: BTreeMap<String, String>,
    pub package: Option<PackageData>,
    pub toggles: FeatureToggles,
    /// Source paths of registered content scripts
    pub content_scripts: BTreeSet<PathBuf>,
    /// Source path of the registered background script
    pub background: Option<PathBuf>,
    /// Set once the manifest has been written
    pub written: bool,
    /// Set while a write is in flight; cleared again if it fails
    pub writing: bool,
}

impl ManifestState {
    /// Whether mutations and further writes must be refused
    pub fn is_sealed(&self) -> bool {
        self.written || self.writing
    }
}

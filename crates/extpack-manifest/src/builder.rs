//! The manifest builder capability and its MV2/MV3 implementation
//!
//! [`ManifestBuilder`] is the one interface the assembler drives. Both
//! manifest versions are served by [`ExtensionManifest`], parameterized over
//! a [`ManifestSchema`]; the version is picked once in [`new_manifest`].
//!
//! Builder methods take `&self` so that independent registrations can run
//! concurrently. State sits behind a mutex that is only held for the short,
//! synchronous mutation and never across an `.await`.

use async_trait::async_trait;
use extpack_config::{Browser, BuildOptions, ManifestVersion};
use parking_lot::Mutex;
use regex::Regex;
use serde_json::Value;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, info};

use crate::common_path::CommonPath;
use crate::env::load_env;
use crate::errors::ManifestError;
use crate::manifest_writer::write_to_path;
use crate::mv2::ManifestV2;
use crate::mv3::ManifestV3;
use crate::package::PackageData;
use crate::scaffold::write_page;
use crate::schema::{render, ManifestSchema};
use crate::types::{Feature, ManifestState};

/// Toggle-driven manifest accumulator shared by both manifest versions
#[async_trait]
pub trait ManifestBuilder: Send + Sync {
    fn manifest_version(&self) -> ManifestVersion;

    /// Load environment values used while reading package data
    async fn update_env(&self) -> Result<(), ManifestError>;

    /// Load package.json metadata
    async fn update_package_data(&self) -> Result<(), ManifestError>;

    /// Enable or disable one optional page
    fn toggle_feature(&self, feature: Feature, enabled: bool) -> Result<(), ManifestError>;

    /// Generate the page for `feature`; a no-op when the feature is disabled
    async fn create_scaffold(&self, feature: Feature) -> Result<(), ManifestError>;

    async fn toggle_content_script(&self, path: &Path, enabled: bool)
        -> Result<(), ManifestError>;

    async fn toggle_background(&self, path: &Path, enabled: bool) -> Result<(), ManifestError>;

    /// Terminal write; `pretty` also validates the manifest first.
    /// Returns the path written to.
    async fn write(&self, pretty: bool) -> Result<PathBuf, ManifestError>;

    /// Copy of the accumulated state
    fn snapshot(&self) -> ManifestState;

    /// Render the manifest as it would be written
    fn to_json(&self) -> Value;

    fn toggle_popup(&self, enabled: bool) -> Result<(), ManifestError> {
        self.toggle_feature(Feature::Popup, enabled)
    }

    fn toggle_options(&self, enabled: bool) -> Result<(), ManifestError> {
        self.toggle_feature(Feature::Options, enabled)
    }

    fn toggle_devtools(&self, enabled: bool) -> Result<(), ManifestError> {
        self.toggle_feature(Feature::Devtools, enabled)
    }

    fn toggle_newtab(&self, enabled: bool) -> Result<(), ManifestError> {
        self.toggle_feature(Feature::Newtab, enabled)
    }

    async fn create_popup_scaffolds(&self) -> Result<(), ManifestError> {
        self.create_scaffold(Feature::Popup).await
    }

    async fn create_options_scaffolds(&self) -> Result<(), ManifestError> {
        self.create_scaffold(Feature::Options).await
    }

    async fn create_devtools_scaffolds(&self) -> Result<(), ManifestError> {
        self.create_scaffold(Feature::Devtools).await
    }

    async fn create_newtab_scaffolds(&self) -> Result<(), ManifestError> {
        self.create_scaffold(Feature::Newtab).await
    }
}

/// Pick the builder for the requested manifest version
pub fn new_manifest(common: CommonPath, options: &BuildOptions) -> Box<dyn ManifestBuilder> {
    match options.selected_version() {
        ManifestVersion::Mv3 => Box::new(ManifestV3::new(common, options.browser)),
        ManifestVersion::Mv2 => Box::new(ManifestV2::new(common, options.browser)),
    }
}

/// Manifest builder for schema `S`
pub struct ExtensionManifest<S: ManifestSchema> {
    common: CommonPath,
    browser: Browser,
    state: Mutex<ManifestState>,
    schema: PhantomData<fn() -> S>,
}

impl<S: ManifestSchema> ExtensionManifest<S> {
    pub fn new(common: CommonPath, browser: Browser) -> Self {
        ExtensionManifest {
            common,
            browser,
            state: Mutex::new(ManifestState::default()),
            schema: PhantomData,
        }
    }

    pub fn common(&self) -> &CommonPath {
        &self.common
    }

    /// Apply `f` to the state unless the manifest is written or being written
    fn mutate<R>(&self, f: impl FnOnce(&mut ManifestState) -> R) -> Result<R, ManifestError> {
        let mut state = self.state.lock();
        if state.is_sealed() {
            return Err(ManifestError::Finalized);
        }
        Ok(f(&mut state))
    }

    fn render_value(&self, state: &ManifestState) -> Value {
        Value::Object(render::<S>(state, &self.common, self.browser))
    }
}

#[async_trait]
impl<S: ManifestSchema> ManifestBuilder for ExtensionManifest<S> {
    fn manifest_version(&self) -> ManifestVersion {
        S::VERSION
    }

    async fn update_env(&self) -> Result<(), ManifestError> {
        let env = load_env(&self.common.project_dir).await?;
        debug!("Loaded {} environment values", env.len());
        self.mutate(|state| state.env = env)
    }

    async fn update_package_data(&self) -> Result<(), ManifestError> {
        let mut package = PackageData::load(&self.common.package_file).await?;
        self.mutate(|state| {
            package.apply_env(&state.env);
            debug!("Loaded package {}@{}", package.name, package.version);
            state.package = Some(package);
        })
    }

    fn toggle_feature(&self, feature: Feature, enabled: bool) -> Result<(), ManifestError> {
        debug!("Toggle {}: {}", feature, enabled);
        self.mutate(|state| state.toggles.set(feature, enabled))
    }

    async fn create_scaffold(&self, feature: Feature) -> Result<(), ManifestError> {
        let title = {
            let state = self.state.lock();
            if state.is_sealed() {
                return Err(ManifestError::Finalized);
            }
            if !state.toggles.get(feature) {
                return Ok(());
            }
            state
                .package
                .as_ref()
                .map_or_else(|| feature.name().to_string(), |p| p.title().to_string())
        };
        write_page(&self.common.gen_dir, feature, &title).await?;
        Ok(())
    }

    async fn toggle_content_script(
        &self,
        path: &Path,
        enabled: bool,
    ) -> Result<(), ManifestError> {
        self.mutate(|state| {
            if enabled {
                debug!("Register content script {:?}", path);
                state.content_scripts.insert(path.to_path_buf());
            } else {
                state.content_scripts.remove(path);
            }
        })
    }

    async fn toggle_background(&self, path: &Path, enabled: bool) -> Result<(), ManifestError> {
        self.mutate(|state| {
            if enabled {
                debug!("Register background script {:?}", path);
                state.background = Some(path.to_path_buf());
            } else if state.background.as_deref() == Some(path) {
                state.background = None;
            }
        })
    }

    async fn write(&self, pretty: bool) -> Result<PathBuf, ManifestError> {
        let manifest = {
            let mut state = self.state.lock();
            if state.is_sealed() {
                return Err(ManifestError::Finalized);
            }
            state.writing = true;
            self.render_value(&state)
        };

        let path = self.common.manifest_path();
        let result = async {
            if pretty {
                validate(&manifest)?;
            }
            write_to_path(&manifest, &path, pretty).await
        }
        .await;

        let mut state = self.state.lock();
        state.writing = false;
        result?;
        state.written = true;
        drop(state);
        info!("Wrote {} manifest to {:?}", S::VERSION, path);
        Ok(path)
    }

    fn snapshot(&self) -> ManifestState {
        self.state.lock().clone()
    }

    fn to_json(&self) -> Value {
        let state = self.state.lock();
        self.render_value(&state)
    }
}

fn version_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^\d+(\.\d+){0,3}$").ok())
        .as_ref()
}

/// Check the fields every browser rejects a manifest without
pub fn validate(manifest: &Value) -> Result<(), ManifestError> {
    let name = manifest.get("name").and_then(Value::as_str).unwrap_or("");
    if name.trim().is_empty() {
        return Err(ManifestError::Invalid("\"name\" is required".to_string()));
    }

    let version = manifest.get("version").and_then(Value::as_str).unwrap_or("");
    let well_formed = version_pattern().map_or(true, |re| re.is_match(version))
        && version.split('.').all(|part| part.parse::<u16>().is_ok());
    if !well_formed {
        return Err(ManifestError::Invalid(format!(
            "\"version\" must be 1-4 dot-separated integers between 0 and 65535, got '{}'",
            version
        )));
    }
    Ok(())
}

//! Manifest assembly
//!
//! Maps the files present in a project onto manifest toggles and
//! registrations, then writes the manifest once:
//!
//! 1. pick the builder for the manifest version
//! 2. load env, then package data
//! 3. probe the page features (any candidate) and the entry scripts (first candidate)
//! 4. apply the page toggles
//! 5. run scaffolds and registrations concurrently; the first failure aborts
//! 6. write the manifest

use extpack_config::BuildOptions;
use futures::future::{try_join_all, BoxFuture, FutureExt};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::builder::{new_manifest, ManifestBuilder};
use crate::common_path::{absolute, CommonPath};
use crate::errors::{AssemblyError, ManifestError};
use crate::layout::ProjectLayout;
use crate::probe::{exists, exists_any, resolve_first, shadowed, ProbeResult};
use crate::types::{Feature, FeatureToggles};

/// Progress of one assembly; stages are passed strictly in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AssemblyStage {
    Init,
    EnvLoaded,
    MetadataLoaded,
    TogglesApplied,
    ScaffoldsPending,
    Written,
}

impl fmt::Display for AssemblyStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssemblyStage::Init => "init",
            AssemblyStage::EnvLoaded => "env-loaded",
            AssemblyStage::MetadataLoaded => "metadata-loaded",
            AssemblyStage::TogglesApplied => "toggles-applied",
            AssemblyStage::ScaffoldsPending => "scaffolds-pending",
            AssemblyStage::Written => "written",
        };
        f.write_str(name)
    }
}

/// What the probes found in a project layout
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutProbe {
    pub toggles: FeatureToggles,
    pub content: ProbeResult,
    pub background: ProbeResult,
    pub has_contents_directory: bool,
}

impl LayoutProbe {
    /// Probe every candidate group of `layout`
    pub async fn run(layout: &ProjectLayout) -> Result<Self, AssemblyError> {
        let toggles = FeatureToggles {
            popup: exists_any(&layout.popup).await?,
            options: exists_any(&layout.options).await?,
            devtools: exists_any(&layout.devtools).await?,
            newtab: exists_any(&layout.newtab).await?,
        };

        let content = resolve_first(&layout.content).await?;
        let background = resolve_first(&layout.background).await?;
        log_shadowed(&layout.content, &content).await;
        log_shadowed(&layout.background, &background).await;

        let has_contents_directory = exists(&layout.contents_directory).await?;

        Ok(LayoutProbe {
            toggles,
            content,
            background,
            has_contents_directory,
        })
    }
}

async fn log_shadowed(candidates: &[PathBuf], result: &ProbeResult) {
    if let Some(winner) = result.winner() {
        for loser in shadowed(candidates, winner).await {
            debug!("Ignoring {:?}: {:?} takes precedence", loser, winner);
        }
    }
}

/// Assemble and write the manifest for a project
///
/// The builder variant is chosen from `options`; the finished builder is
/// returned so callers can inspect what was written.
pub async fn assemble(
    common: CommonPath,
    layout: &ProjectLayout,
    options: &BuildOptions,
) -> Result<Box<dyn ManifestBuilder>, AssemblyError> {
    info!("Creating extension manifest for {}", options.target());
    let builder = new_manifest(common, options);
    assemble_with(builder.as_ref(), layout).await?;
    Ok(builder)
}

/// Drive an already selected builder through a full assembly
pub async fn assemble_with<B>(builder: &B, layout: &ProjectLayout) -> Result<(), AssemblyError>
where
    B: ManifestBuilder + ?Sized,
{
    let mut stage = AssemblyStage::Init;

    builder
        .update_env()
        .await
        .map_err(AssemblyError::Environment)?;
    advance(&mut stage, AssemblyStage::EnvLoaded);

    builder
        .update_package_data()
        .await
        .map_err(AssemblyError::PackageData)?;
    advance(&mut stage, AssemblyStage::MetadataLoaded);

    let probe = LayoutProbe::run(layout).await?;
    apply_toggles(builder, probe.toggles)?;
    advance(&mut stage, AssemblyStage::TogglesApplied);

    let tasks = pending_tasks(builder, layout, &probe);
    advance(&mut stage, AssemblyStage::ScaffoldsPending);
    debug!("Waiting on {} manifest tasks", tasks.len());
    try_join_all(tasks).await?;

    builder.write(true).await.map_err(AssemblyError::Write)?;
    advance(&mut stage, AssemblyStage::Written);
    Ok(())
}

fn advance(stage: &mut AssemblyStage, next: AssemblyStage) {
    debug!("Manifest assembly: {} -> {}", stage, next);
    *stage = next;
}

fn apply_toggles<B>(builder: &B, toggles: FeatureToggles) -> Result<(), AssemblyError>
where
    B: ManifestBuilder + ?Sized,
{
    let toggle_error = |feature| move |source| AssemblyError::Toggle { feature, source };
    builder
        .toggle_popup(toggles.popup)
        .map_err(toggle_error(Feature::Popup))?;
    builder
        .toggle_options(toggles.options)
        .map_err(toggle_error(Feature::Options))?;
    builder
        .toggle_devtools(toggles.devtools)
        .map_err(toggle_error(Feature::Devtools))?;
    builder
        .toggle_newtab(toggles.newtab)
        .map_err(toggle_error(Feature::Newtab))?;
    Ok(())
}

type Task<'a> = BoxFuture<'a, Result<(), AssemblyError>>;

/// Independent operations that run between the toggles and the write.
/// Absent features add no task; scaffolds check enablement themselves.
fn pending_tasks<'a, B>(
    builder: &'a B,
    layout: &'a ProjectLayout,
    probe: &LayoutProbe,
) -> Vec<Task<'a>>
where
    B: ManifestBuilder + ?Sized,
{
    let mut tasks: Vec<Task<'a>> = vec![
        scaffold(Feature::Popup, builder.create_popup_scaffolds()),
        scaffold(Feature::Options, builder.create_options_scaffolds()),
        scaffold(Feature::Devtools, builder.create_devtools_scaffolds()),
        scaffold(Feature::Newtab, builder.create_newtab_scaffolds()),
    ];

    if let Some(content) = probe.content.winner() {
        let path = content.to_path_buf();
        tasks.push(
            async move {
                builder
                    .toggle_content_script(&path, true)
                    .await
                    .map_err(|source| AssemblyError::Registration { path, source })
            }
            .boxed(),
        );
    }

    if let Some(background) = probe.background.winner() {
        let path = background.to_path_buf();
        tasks.push(
            async move {
                builder
                    .toggle_background(&path, true)
                    .await
                    .map_err(|source| AssemblyError::Registration { path, source })
            }
            .boxed(),
        );
    }

    if probe.has_contents_directory {
        tasks.push(register_contents_directory(builder, &layout.contents_directory).boxed());
    }

    tasks
}

fn scaffold<'a>(
    feature: Feature,
    create: BoxFuture<'a, Result<(), ManifestError>>,
) -> Task<'a> {
    create
        .map(move |result| result.map_err(|source| AssemblyError::Scaffold { feature, source }))
        .boxed()
}

/// Register every regular file directly inside `directory` as a content script
async fn register_contents_directory<B>(builder: &B, directory: &Path) -> Result<(), AssemblyError>
where
    B: ManifestBuilder + ?Sized,
{
    let files = contents_files(directory).await?;
    debug!("Found {} content scripts in {:?}", files.len(), directory);

    try_join_all(files.into_iter().map(|path| async move {
        builder
            .toggle_content_script(&path, true)
            .await
            .map_err(|source| AssemblyError::Registration { path, source })
    }))
    .await?;
    Ok(())
}

/// Regular files directly inside `directory`, as absolute paths.
///
/// Subdirectories and symlinks are skipped. The order is whatever the
/// filesystem returns.
pub async fn contents_files(directory: &Path) -> Result<Vec<PathBuf>, AssemblyError> {
    let scan_error = |source| AssemblyError::DirectoryScan {
        path: directory.to_path_buf(),
        source,
    };

    let base = absolute(directory).map_err(scan_error)?;
    let mut entries = tokio::fs::read_dir(directory).await.map_err(scan_error)?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(scan_error)? {
        let file_type = entry.file_type().await.map_err(scan_error)?;
        if file_type.is_file() {
            files.push(base.join(entry.file_name()));
        }
    }
    Ok(files)
}

//! `extpack build`: assemble and write manifest.json for a project

use anyhow::{bail, Context, Result};
use clap::Args;
use extpack_config::{Browser, BuildOptions, Config, ManifestVersion};
use extpack_logger as logger;
use extpack_manifest::{assemble, CommonPath, ProjectLayout};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::GlobalOpts;

#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    /// Extension project directory (the one holding package.json)
    #[arg(default_value = ".")]
    pub project_dir: PathBuf,

    /// Build target as <browser>-<mv>, e.g. firefox-mv2
    #[arg(long, conflicts_with_all = ["browser", "manifest_version"])]
    pub target: Option<BuildOptions>,

    /// Target browser (chrome, firefox, edge, brave, opera, safari)
    #[arg(long)]
    pub browser: Option<Browser>,

    /// Manifest version to generate (mv2 or mv3)
    #[arg(long, value_name = "MV")]
    pub manifest_version: Option<ManifestVersion>,

    /// Source directory, relative to the project (default: src/ when present)
    #[arg(long)]
    pub src_dir: Option<PathBuf>,

    /// Output directory, relative to the project (default: build/<target>)
    #[arg(long)]
    pub build_dir: Option<PathBuf>,

    /// Also print the generated manifest
    #[arg(long)]
    pub print: bool,
}

impl BuildArgs {
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        BuildArgs {
            project_dir: project_dir.into(),
            target: None,
            browser: None,
            manifest_version: None,
            src_dir: None,
            build_dir: None,
            print: false,
        }
    }

    /// `--target` wins, then `--browser`/`--manifest-version`, then the config file
    pub fn build_options(&self, config: &Config) -> BuildOptions {
        match self.target {
            Some(target) => target,
            None => config.build_options(self.browser, self.manifest_version),
        }
    }
}

/// Resolve project paths, applying directory overrides from flags or config
pub async fn project_paths(
    project_dir: &Path,
    options: &BuildOptions,
    src_dir: Option<&Path>,
    build_dir: Option<&Path>,
    config: &Config,
) -> Result<CommonPath> {
    let resolved = tokio::fs::canonicalize(project_dir)
        .await
        .with_context(|| format!("Project directory {} not found", project_dir.display()))?;
    if !resolved.is_dir() {
        bail!("{} is not a directory", project_dir.display());
    }

    let mut common = CommonPath::new(&resolved, options);
    let src_dir = src_dir
        .map(Path::to_path_buf)
        .or_else(|| config.src_dir.as_ref().map(PathBuf::from));
    if let Some(src_dir) = src_dir {
        common = common.with_source_dir(&src_dir);
    }
    let build_dir = build_dir
        .map(Path::to_path_buf)
        .or_else(|| config.build_dir.as_ref().map(|dir| PathBuf::from(dir).join(options.target())));
    if let Some(build_dir) = build_dir {
        common = common.with_build_dir(&build_dir);
    }
    Ok(common)
}

pub async fn handle_build(args: BuildArgs, opts: &GlobalOpts) -> Result<()> {
    let config = Config::load().context("Failed to load config")?;
    let options = args.build_options(&config);
    let common = project_paths(
        &args.project_dir,
        &options,
        args.src_dir.as_deref(),
        args.build_dir.as_deref(),
        &config,
    )
    .await?;

    debug!("Building {} from {:?}", options.target(), common.source_dir);
    logger::debug(&format!("Source directory: {}", common.source_dir.display()));

    let layout = ProjectLayout::conventional(&common.source_dir);
    let manifest_path = common.manifest_path();

    logger::spinner_start(&format!("Building {} manifest", options.target()));
    let builder = match assemble(common, &layout, &options).await {
        Ok(builder) => builder,
        Err(e) => {
            logger::spinner_error("Manifest build failed");
            return Err(e).with_context(|| format!("Failed to build {}", options.target()));
        }
    };
    logger::spinner_success(&format!(
        "Built {} manifest for {}",
        builder.manifest_version(),
        options.browser
    ));

    if !opts.no_stdout {
        println!("{}", manifest_path.display());
    }
    if args.print {
        let rendered = serde_json::to_string_pretty(&builder.to_json())
            .context("Failed to render manifest")?;
        println!("{}", rendered);
    }
    Ok(())
}

//! `extpack probe`: report which manifest features a project would enable

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use extpack_config::Config;
use extpack_manifest::assembler::contents_files;
use extpack_manifest::{Feature, LayoutProbe, ProjectLayout};
use std::path::{Path, PathBuf};

use super::build::project_paths;
use crate::GlobalOpts;

#[derive(Args, Debug, Clone)]
pub struct ProbeArgs {
    /// Extension project directory
    #[arg(default_value = ".")]
    pub project_dir: PathBuf,

    /// Source directory, relative to the project (default: src/ when present)
    #[arg(long)]
    pub src_dir: Option<PathBuf>,
}

/// Probe results for one project, without any side effects
#[derive(Debug, Clone)]
pub struct ProbeReport {
    pub source_dir: PathBuf,
    pub probe: LayoutProbe,
    /// Files in the contents directory, sorted
    pub contents: Vec<PathBuf>,
}

impl ProbeReport {
    pub async fn collect(source_dir: &Path) -> Result<Self> {
        let layout = ProjectLayout::conventional(source_dir);
        let probe = LayoutProbe::run(&layout).await?;
        let mut contents = if probe.has_contents_directory {
            contents_files(&layout.contents_directory).await?
        } else {
            Vec::new()
        };
        contents.sort();

        Ok(ProbeReport {
            source_dir: source_dir.to_path_buf(),
            probe,
            contents,
        })
    }

    /// `(label, value)` rows; `None` marks an absent entry
    pub fn rows(&self) -> Vec<(&'static str, Option<String>)> {
        let mut rows: Vec<(&'static str, Option<String>)> = Feature::ALL
            .iter()
            .map(|feature| {
                let enabled = self.probe.toggles.get(*feature);
                (feature.name(), enabled.then(|| "enabled".to_string()))
            })
            .collect();

        rows.push(("content", self.probe.content.winner().map(|p| self.relative(p))));
        rows.push((
            "background",
            self.probe.background.winner().map(|p| self.relative(p)),
        ));

        let contents = (!self.contents.is_empty()).then(|| {
            self.contents
                .iter()
                .map(|p| self.relative(p))
                .collect::<Vec<_>>()
                .join(", ")
        });
        rows.push(("contents", contents));
        rows
    }

    fn relative(&self, path: &Path) -> String {
        let source_dir = self
            .source_dir
            .canonicalize()
            .unwrap_or_else(|_| self.source_dir.clone());
        path.strip_prefix(&self.source_dir)
            .or_else(|_| path.strip_prefix(&source_dir))
            .unwrap_or(path)
            .display()
            .to_string()
    }
}

pub async fn handle_probe(args: ProbeArgs, opts: &GlobalOpts) -> Result<()> {
    let config = Config::load().context("Failed to load config")?;
    let options = config.build_options(None, None);
    let common = project_paths(
        &args.project_dir,
        &options,
        args.src_dir.as_deref(),
        None,
        &config,
    )
    .await?;

    let report = ProbeReport::collect(&common.source_dir)
        .await
        .with_context(|| format!("Failed to probe {}", common.project_dir.display()))?;

    if opts.no_stdout {
        return Ok(());
    }
    println!(
        "{} {}",
        "Source:".bold().green(),
        report.source_dir.display()
    );
    for (label, value) in report.rows() {
        match value {
            Some(value) => println!("  {}: {}", label.cyan(), value),
            None => println!("  {}: {}", label.cyan(), "-".dimmed()),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        let _ = fs::write(path, "");
    }

    #[tokio::test]
    async fn test_probe_report_rows() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let dir = temp_dir.path();
        touch(dir, "popup.tsx");
        touch(dir, "background/index.ts");
        touch(dir, "contents/b.ts");
        touch(dir, "contents/a.ts");

        let Ok(report) = ProbeReport::collect(dir).await else {
            panic!("probe failed");
        };
        let rows = report.rows();
        assert_eq!(rows[0], ("popup", Some("enabled".to_string())));
        assert_eq!(rows[1], ("options", None));
        assert_eq!(rows[4], ("content", None));
        assert_eq!(
            rows[5],
            ("background", Some(Path::new("background").join("index.ts").display().to_string()))
        );
        assert_eq!(
            rows[6],
            (
                "contents",
                Some(format!(
                    "{}, {}",
                    Path::new("contents").join("a.ts").display(),
                    Path::new("contents").join("b.ts").display()
                ))
            )
        );
    }

    #[tokio::test]
    async fn test_probe_writes_nothing() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let dir = temp_dir.path();
        touch(dir, "options/index.jsx");

        let report = ProbeReport::collect(dir).await;
        assert!(report.is_ok_and(|r| r.probe.toggles.options));
        assert!(!dir.join(".extpack").exists());
        assert!(!dir.join("build").exists());
    }
}

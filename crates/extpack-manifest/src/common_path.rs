//! Well-known project paths shared by the layout and the manifest builders

use extpack_config::BuildOptions;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Directory holding generated scaffolds
pub const GEN_DIR: &str = ".extpack";

/// Root of the per-target build directories
pub const BUILD_ROOT: &str = "build";

pub const PACKAGE_FILE: &str = "package.json";

pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonPath {
    pub project_dir: PathBuf,
    /// Where feature entry files live (`src/` when present, else the project root)
    pub source_dir: PathBuf,
    pub package_file: PathBuf,
    pub gen_dir: PathBuf,
    pub build_dir: PathBuf,
}

/// Resolve `path` against the current directory, dropping `.` components
pub fn absolute(path: &Path) -> io::Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    Ok(strip_current_dir(&joined))
}

fn strip_current_dir(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

impl CommonPath {
    /// Paths for the project at `project_dir`; a relative dir is made absolute
    /// so source-relative bundle paths stay correct.
    pub fn new(project_dir: &Path, options: &BuildOptions) -> Self {
        let project_dir = absolute(project_dir).unwrap_or_else(|_| project_dir.to_path_buf());
        let project_dir = project_dir.as_path();
        let src = project_dir.join("src");
        let source_dir = if src.is_dir() {
            src
        } else {
            project_dir.to_path_buf()
        };

        CommonPath {
            project_dir: project_dir.to_path_buf(),
            source_dir,
            package_file: project_dir.join(PACKAGE_FILE),
            gen_dir: project_dir.join(GEN_DIR),
            build_dir: project_dir.join(BUILD_ROOT).join(options.target()),
        }
    }

    /// Override the source directory (relative paths resolve against the project dir)
    pub fn with_source_dir(mut self, source_dir: &Path) -> Self {
        self.source_dir = strip_current_dir(&self.project_dir.join(source_dir));
        self
    }

    /// Override the build output directory (relative paths resolve against the project dir)
    pub fn with_build_dir(mut self, build_dir: &Path) -> Self {
        self.build_dir = strip_current_dir(&self.project_dir.join(build_dir));
        self
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.build_dir.join(MANIFEST_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use extpack_config::{Browser, ManifestVersion};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_source_dir_prefers_src() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let root = temp_dir.path();

        let flat = CommonPath::new(root, &BuildOptions::default());
        assert_eq!(flat.source_dir, root);

        assert!(fs::create_dir(root.join("src")).is_ok());
        let nested = CommonPath::new(root, &BuildOptions::default());
        assert_eq!(nested.source_dir, root.join("src"));
    }

    #[test]
    fn test_build_dir_per_target() {
        let options = BuildOptions::new(Browser::Firefox, ManifestVersion::Mv2);
        let paths = CommonPath::new(Path::new("/ext"), &options);
        assert_eq!(paths.build_dir, PathBuf::from("/ext/build/firefox-mv2"));
        assert_eq!(
            paths.manifest_path(),
            PathBuf::from("/ext/build/firefox-mv2/manifest.json")
        );

        let custom = paths.with_build_dir(Path::new("dist"));
        assert_eq!(custom.build_dir, PathBuf::from("/ext/dist"));
    }

    #[test]
    fn test_relative_project_dir_is_made_absolute() {
        let Ok(cwd) = std::env::current_dir() else {
            return;
        };
        let paths = CommonPath::new(Path::new("."), &BuildOptions::default());
        assert_eq!(paths.project_dir, cwd);
        assert!(paths.source_dir.is_absolute());
        assert!(paths.gen_dir.is_absolute());
        assert!(paths.build_dir.starts_with(&cwd));

        let custom = paths.with_source_dir(Path::new("./extension"));
        assert_eq!(custom.source_dir, cwd.join("extension"));
    }

    #[test]
    fn test_absolute_drops_current_dir_components() {
        assert_eq!(
            absolute(Path::new("/ext/./src/.")).ok(),
            Some(PathBuf::from("/ext/src"))
        );
        let Ok(cwd) = std::env::current_dir() else {
            return;
        };
        assert_eq!(absolute(Path::new("./contents")).ok(), Some(cwd.join("contents")));
    }
}

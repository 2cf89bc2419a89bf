//! File probing over candidate lists
//!
//! A candidate list is an ordered set of acceptable locations for one asset.
//! [`exists_any`] answers "is the feature present at all", [`resolve_first`]
//! picks the single winning path where the earliest existing candidate wins.

use std::io;
use std::path::{Path, PathBuf};
use tracing::trace;

use crate::errors::ProbeError;

#[cfg(unix)]
const ENOTDIR: i32 = 20;

/// Outcome of a first-existing-wins resolution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeResult {
    pub exists: bool,
    /// Winning candidate, empty when nothing exists
    pub path: PathBuf,
}

impl ProbeResult {
    pub fn found(path: impl Into<PathBuf>) -> Self {
        ProbeResult {
            exists: true,
            path: path.into(),
        }
    }

    pub fn missing() -> Self {
        ProbeResult::default()
    }

    /// The winning path, if any
    pub fn winner(&self) -> Option<&Path> {
        self.exists.then_some(self.path.as_path())
    }
}

fn is_missing(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::NotFound || parent_is_file(err)
}

// A parent component that is a regular file means the path cannot exist.
#[cfg(unix)]
fn parent_is_file(err: &io::Error) -> bool {
    err.raw_os_error() == Some(ENOTDIR)
}

#[cfg(not(unix))]
fn parent_is_file(_err: &io::Error) -> bool {
    false
}

/// Check whether a single path exists, following symlinks.
pub async fn exists(path: &Path) -> Result<bool, ProbeError> {
    match tokio::fs::metadata(path).await {
        Ok(_) => Ok(true),
        Err(err) if is_missing(&err) => Ok(false),
        Err(source) => Err(ProbeError {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// True iff at least one candidate exists
pub async fn exists_any<P: AsRef<Path>>(candidates: &[P]) -> Result<bool, ProbeError> {
    Ok(resolve_first(candidates).await?.exists)
}

/// Return the first existing candidate in list order
pub async fn resolve_first<P: AsRef<Path>>(candidates: &[P]) -> Result<ProbeResult, ProbeError> {
    for candidate in candidates {
        let candidate = candidate.as_ref();
        if exists(candidate).await? {
            trace!("Resolved candidate {:?}", candidate);
            return Ok(ProbeResult::found(candidate));
        }
    }
    Ok(ProbeResult::missing())
}

/// Existing candidates that lost to an earlier one.
///
/// Only used for diagnostics, so it never fails: a candidate that cannot be
/// checked is skipped. The assembler registers the winner alone.
pub async fn shadowed<P: AsRef<Path>>(candidates: &[P], winner: &Path) -> Vec<PathBuf> {
    let mut losers = Vec::new();
    let mut past_winner = false;
    for candidate in candidates {
        let candidate = candidate.as_ref();
        if candidate == winner {
            past_winner = true;
            continue;
        }
        if !past_winner {
            continue;
        }
        match exists(candidate).await {
            Ok(true) => losers.push(candidate.to_path_buf()),
            Ok(false) => {}
            Err(err) => trace!("Skipping unreadable candidate: {}", err),
        }
    }
    losers
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        let _ = fs::write(&path, "");
        path
    }

    #[tokio::test]
    async fn test_nothing_exists() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let candidates = vec![
            temp_dir.path().join("popup.tsx"),
            temp_dir.path().join("popup/index.tsx"),
        ];

        assert!(matches!(exists_any(&candidates).await, Ok(false)));
        let result = resolve_first(&candidates).await;
        assert!(result.is_ok_and(|r| r == ProbeResult::missing() && r.path.as_os_str().is_empty()));
    }

    #[tokio::test]
    async fn test_empty_candidate_list() {
        let candidates: Vec<PathBuf> = Vec::new();
        assert!(matches!(exists_any(&candidates).await, Ok(false)));
        assert!(resolve_first(&candidates).await.is_ok_and(|r| !r.exists));
    }

    #[tokio::test]
    async fn test_first_existing_wins_regardless_of_later() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let dir = temp_dir.path();
        let candidates = vec![
            dir.join("background.ts"),
            dir.join("background/index.ts"),
            dir.join("background.js"),
            dir.join("background/index.js"),
        ];

        // Only the k-th and some later candidates exist.
        touch(dir, "background/index.ts");
        touch(dir, "background.js");
        touch(dir, "background/index.js");

        let result = resolve_first(&candidates).await;
        assert!(result.is_ok_and(|r| r == ProbeResult::found(dir.join("background/index.ts"))));

        // An earlier candidate appearing changes the winner.
        touch(dir, "background.ts");
        let result = resolve_first(&candidates).await;
        assert!(result.is_ok_and(|r| r.winner() == Some(dir.join("background.ts").as_path())));
        assert!(matches!(exists_any(&candidates).await, Ok(true)));
    }

    #[tokio::test]
    async fn test_resolution_is_stable() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let dir = temp_dir.path();
        touch(dir, "content.ts");
        touch(dir, "content.js");
        let candidates = vec![dir.join("content.ts"), dir.join("content.js")];

        let first = resolve_first(&candidates).await.ok();
        let second = resolve_first(&candidates).await.ok();
        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_directories_count_as_existing() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let contents = temp_dir.path().join("contents");
        assert!(fs::create_dir(&contents).is_ok());
        assert!(matches!(exists(&contents).await, Ok(true)));
    }

    #[tokio::test]
    async fn test_file_as_parent_is_missing() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let file = touch(temp_dir.path(), "popup");
        assert!(matches!(exists(&file.join("index.tsx")).await, Ok(false)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_dangling_symlink_does_not_exist() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let link = temp_dir.path().join("options.tsx");
        assert!(std::os::unix::fs::symlink(temp_dir.path().join("gone.tsx"), &link).is_ok());
        assert!(matches!(exists(&link).await, Ok(false)));
    }

    #[tokio::test]
    async fn test_shadowed_candidates() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let dir = temp_dir.path();
        let ts = touch(dir, "background.ts");
        let js = touch(dir, "background.js");
        let candidates = vec![ts.clone(), dir.join("background/index.ts"), js.clone()];

        let losers = shadowed(&candidates, &ts).await;
        assert_eq!(losers, vec![js]);
    }

    #[cfg(unix)]
    fn self_loop(dir: &Path, name: &str) -> PathBuf {
        let link = dir.join(name);
        if let Some(parent) = link.parent() {
            let _ = fs::create_dir_all(parent);
        }
        let _ = std::os::unix::fs::symlink(&link, &link);
        link
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_loop_is_an_error() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let link = self_loop(temp_dir.path(), "popup.tsx");

        let result = resolve_first(&[link.clone()]).await;
        assert!(matches!(result, Err(ProbeError { ref path, .. }) if *path == link));
        assert!(exists_any(&[link]).await.is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unreadable_loser_is_skipped() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let dir = temp_dir.path();
        let ts = touch(dir, "background.ts");
        let looped = self_loop(dir, "background/index.ts");
        let js = touch(dir, "background.js");
        let candidates = vec![ts.clone(), looped, js.clone()];

        let result = resolve_first(&candidates).await;
        assert!(result.is_ok_and(|r| r == ProbeResult::found(&ts)));
        assert_eq!(shadowed(&candidates, &ts).await, vec![js]);
    }
}

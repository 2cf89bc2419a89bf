//! Conventional project layout
//!
//! Each optional feature is looked up under a fixed set of file names inside
//! the source directory. Candidate order is significant: it decides which
//! file wins when several of them exist.

use std::path::{Path, PathBuf};

/// Ordered acceptable locations for one logical asset
pub type CandidateList = Vec<PathBuf>;

/// Extensions tried for UI pages, in priority order
pub const PAGE_EXTENSIONS: [&str; 4] = ["tsx", "ts", "jsx", "js"];

/// Extensions tried for scripts, in priority order
pub const SCRIPT_EXTENSIONS: [&str; 4] = ["ts", "tsx", "js", "jsx"];

/// Directory (relative to the source dir) whose files are all content scripts
pub const CONTENTS_DIR: &str = "contents";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectLayout {
    pub popup: CandidateList,
    pub options: CandidateList,
    pub devtools: CandidateList,
    pub newtab: CandidateList,
    pub content: CandidateList,
    pub background: CandidateList,
    pub contents_directory: PathBuf,
}

impl ProjectLayout {
    /// Layout following the naming conventions under `source_dir`
    pub fn conventional(source_dir: &Path) -> Self {
        ProjectLayout {
            popup: candidates(source_dir, "popup", &PAGE_EXTENSIONS),
            options: candidates(source_dir, "options", &PAGE_EXTENSIONS),
            devtools: candidates(source_dir, "devtools", &PAGE_EXTENSIONS),
            newtab: candidates(source_dir, "newtab", &PAGE_EXTENSIONS),
            content: candidates(source_dir, "content", &SCRIPT_EXTENSIONS),
            background: candidates(source_dir, "background", &SCRIPT_EXTENSIONS),
            contents_directory: source_dir.join(CONTENTS_DIR),
        }
    }
}

/// `<name>.<ext>` then `<name>/index.<ext>`, for each extension in order
pub fn candidates(source_dir: &Path, name: &str, extensions: &[&str]) -> CandidateList {
    extensions
        .iter()
        .flat_map(|ext| {
            [
                source_dir.join(format!("{}.{}", name, ext)),
                source_dir.join(name).join(format!("index.{}", ext)),
            ]
        })
        .collect()
}

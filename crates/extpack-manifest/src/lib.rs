//! Browser-extension manifest synthesis
//!
//! Inspects an extension project, decides which optional pages and scripts
//! exist, and writes a `manifest.json` for MV2 or MV3.
//!
//! Entry point is [`assemble`]:
//!
//! ```no_run
//! use extpack_config::BuildOptions;
//! use extpack_manifest::{assemble, CommonPath, ProjectLayout};
//! use std::path::Path;
//!
//! # async fn run() -> Result<(), extpack_manifest::AssemblyError> {
//! let options = BuildOptions::default();
//! let common = CommonPath::new(Path::new("."), &options);
//! let layout = ProjectLayout::conventional(&common.source_dir);
//! let builder = assemble(common, &layout, &options).await?;
//! println!("{}", builder.to_json());
//! # Ok(())
//! # }
//! ```

pub mod assembler;
pub mod builder;
pub mod common_path;
pub mod env;
pub mod errors;
pub mod layout;
pub mod manifest_writer;
pub mod mv2;
pub mod mv3;
pub mod package;
pub mod probe;
pub mod scaffold;
pub mod schema;
pub mod types;

pub use assembler::{assemble, assemble_with, AssemblyStage, LayoutProbe};
pub use builder::{new_manifest, ExtensionManifest, ManifestBuilder};
pub use common_path::CommonPath;
pub use errors::{AssemblyError, ManifestError, ProbeError};
pub use layout::{CandidateList, ProjectLayout};
pub use mv2::ManifestV2;
pub use mv3::ManifestV3;
pub use package::PackageData;
pub use probe::ProbeResult;
pub use types::{Feature, FeatureToggles, ManifestState};

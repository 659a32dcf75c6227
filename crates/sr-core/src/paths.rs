//! Filesystem locations a runtime is constructed with.

use std::path::{Path, PathBuf};

/// The three directories handed to the factory at construction.
///
/// - `library_dir`: where backend libraries are resolved from
/// - `system_dir`: where the compiled model/system lives
/// - `config_dir`: where settings files are read from
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RuntimePaths {
    pub library_dir: PathBuf,
    pub system_dir: PathBuf,
    pub config_dir: PathBuf,
}

impl RuntimePaths {
    pub fn new(
        library_dir: impl Into<PathBuf>,
        system_dir: impl Into<PathBuf>,
        config_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            library_dir: library_dir.into(),
            system_dir: system_dir.into(),
            config_dir: config_dir.into(),
        }
    }

    /// Resolve a library file name against `library_dir`.
    pub fn library(&self, file_name: impl AsRef<Path>) -> PathBuf {
        self.library_dir.join(file_name)
    }
}

//! Collections of builds and their JSON snapshot form.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};

use camino::Utf8Path;
use indexmap::IndexMap;
use tracing::debug;

use super::{Build, ModelError, Target};

/// Serialised snapshot layout: build name → raw label → target.
pub type Snapshot = IndexMap<String, IndexMap<String, Target>>;

/// Every build configuration taking part in one translation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Project {
    builds: IndexMap<String, Build>,
}

impl Project {
    /// Create an empty project.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `build`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::DuplicateBuild`] when a build of the same name
    /// was already added.
    pub fn add_build(&mut self, build: Build) -> Result<(), ModelError> {
        if self.builds.contains_key(build.name()) {
            return Err(ModelError::DuplicateBuild {
                build: build.name().to_owned(),
            });
        }
        self.builds.insert(build.name().to_owned(), build);
        Ok(())
    }

    /// Look up a build by name.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownBuild`] when no such build exists.
    pub fn build(&self, name: &str) -> Result<&Build, ModelError> {
        self.builds.get(name).ok_or_else(|| ModelError::UnknownBuild {
            build: name.to_owned(),
        })
    }

    /// Builds in insertion order.
    pub fn builds(&self) -> impl Iterator<Item = &Build> {
        self.builds.values()
    }

    /// Construct a project from snapshot data.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::MissingRootTarget`] when a build lacks its
    /// root target.
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self, ModelError> {
        let mut project = Self::new();
        for (name, targets) in snapshot {
            project.add_build(Build::new(name, targets)?)?;
        }
        Ok(project)
    }

    /// The snapshot form of this project.
    #[must_use]
    pub fn to_snapshot(&self) -> Snapshot {
        self.builds
            .iter()
            .map(|(name, build)| (name.clone(), build.targets().clone()))
            .collect()
    }

    /// Read a JSON snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Snapshot`] for malformed JSON and the errors of
    /// [`Project::from_snapshot`].
    pub fn from_reader(reader: impl Read) -> Result<Self, ModelError> {
        let snapshot: Snapshot =
            serde_json::from_reader(reader).map_err(|source| ModelError::Snapshot { source })?;
        Self::from_snapshot(snapshot)
    }

    /// Write this project as a JSON snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Snapshot`] when serialisation fails.
    pub fn to_writer(&self, writer: impl Write) -> Result<(), ModelError> {
        serde_json::to_writer_pretty(writer, &self.to_snapshot())
            .map_err(|source| ModelError::Snapshot { source })
    }

    /// Load a snapshot file.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Io`] when the file cannot be opened and the
    /// errors of [`Project::from_reader`].
    pub fn from_path(path: &Utf8Path) -> Result<Self, ModelError> {
        let file = File::open(path).map_err(|source| ModelError::Io {
            path: path.to_owned(),
            source,
        })?;
        let project = Self::from_reader(BufReader::new(file))?;
        debug!(path = %path, builds = project.builds.len(), "loaded snapshot");
        Ok(project)
    }

    /// Save this project to a snapshot file.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Io`] when the file cannot be written and the
    /// errors of [`Project::to_writer`].
    pub fn to_path(&self, path: &Utf8Path) -> Result<(), ModelError> {
        let io_error = |source| ModelError::Io {
            path: path.to_owned(),
            source,
        };
        let file = File::create(path).map_err(io_error)?;
        let mut writer = BufWriter::new(file);
        self.to_writer(&mut writer)?;
        writer.flush().map_err(io_error)
    }
}

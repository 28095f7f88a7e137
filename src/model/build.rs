//! A single GN build configuration.

use indexmap::IndexMap;

use super::{ModelError, Target};
use crate::label::Label;

/// Label every build must contain; its toolchain is the build's default.
pub const DEFAULT_ROOT_TARGET: &str = "//:default";

/// Targets of one build directory keyed by their raw GN label strings.
///
/// Labels of targets in the default toolchain are stored unqualified, those
/// of every other toolchain carry a `(<toolchain>)` suffix, as `gn desc`
/// reports them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Build {
    name: String,
    default_toolchain: String,
    targets: IndexMap<String, Target>,
}

impl Build {
    /// Create a build rooted at [`DEFAULT_ROOT_TARGET`].
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::MissingRootTarget`] when the root target is
    /// absent.
    pub fn new(name: impl Into<String>, targets: IndexMap<String, Target>) -> Result<Self, ModelError> {
        Self::with_root(name, targets, DEFAULT_ROOT_TARGET)
    }

    /// Create a build whose default toolchain comes from `root`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::MissingRootTarget`] when `root` is absent.
    pub fn with_root(
        name: impl Into<String>,
        targets: IndexMap<String, Target>,
        root: &str,
    ) -> Result<Self, ModelError> {
        let build_name: String = name.into();
        let default_toolchain = targets
            .get(root)
            .map(|target| target.toolchain.clone())
            .ok_or_else(|| ModelError::MissingRootTarget {
                build: build_name.clone(),
                root: root.to_owned(),
            })?;
        Ok(Self {
            name: build_name,
            default_toolchain,
            targets,
        })
    }

    /// Build directory name, e.g. `Release`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Toolchain of the root target.
    #[must_use]
    pub fn default_toolchain(&self) -> &str {
        &self.default_toolchain
    }

    /// All targets keyed by raw label.
    #[must_use]
    pub const fn targets(&self) -> &IndexMap<String, Target> {
        &self.targets
    }

    /// Look up `label` as evaluated in `toolchain`.
    ///
    /// Any toolchain qualifier already present on `label` is ignored in
    /// favour of `toolchain`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownTarget`] when the build holds no such
    /// target.
    pub fn get_target(&self, toolchain: &str, label: &Label) -> Result<&Target, ModelError> {
        let key = if toolchain == self.default_toolchain {
            label.without_toolchain()
        } else {
            label.with_toolchain(toolchain)
        }
        .to_string();
        self.targets
            .get(&key)
            .ok_or_else(|| ModelError::UnknownTarget {
                build: self.name.clone(),
                label: key,
            })
    }
}

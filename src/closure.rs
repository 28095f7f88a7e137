//! Reachability across builds and toolchains.
//!
//! The closure of a root label is every `(label, build, toolchain)` triple
//! reachable from the root of each build. Dependencies written without a
//! toolchain inherit the toolchain of the target that names them, so a host
//! tool's unqualified dependencies are host targets too.

use std::collections::VecDeque;
use std::fmt::{self, Display, Formatter};

use indexmap::IndexSet;
use tracing::{debug, info};

use crate::config::Settings;
use crate::label::Label;
use crate::model::{ModelError, Project};

/// One target of one build evaluated in one toolchain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetBuildKey {
    /// Logical label, never toolchain qualified.
    pub label: Label,
    /// Build directory name.
    pub build: String,
    /// Toolchain the target is evaluated in.
    pub toolchain: String,
}

impl TargetBuildKey {
    /// Key for `label` in `build` and `toolchain`; any qualifier on
    /// `label` is dropped.
    #[must_use]
    pub fn new(label: &Label, build: impl Into<String>, toolchain: impl Into<String>) -> Self {
        Self {
            label: label.without_toolchain(),
            build: build.into(),
            toolchain: toolchain.into(),
        }
    }
}

impl Display for TargetBuildKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}) in {}", self.label, self.toolchain, self.build)
    }
}

/// Breadth-first closure computation.
#[derive(Debug, Clone)]
pub struct ClosureResolver<'a> {
    settings: &'a Settings,
}

impl<'a> ClosureResolver<'a> {
    /// Resolver starting at the configured root that never enqueues labels
    /// [`Settings::is_excluded`] rejects.
    #[must_use]
    pub const fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    /// Visit every key reachable from the root of each build.
    ///
    /// Keys are returned in discovery order and each appears once.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownTarget`] when a reachable key has no
    /// target in its build.
    pub fn resolve(&self, project: &Project) -> Result<Vec<TargetBuildKey>, ModelError> {
        let mut visited: IndexSet<TargetBuildKey> = IndexSet::new();
        let mut queue: VecDeque<TargetBuildKey> = VecDeque::new();

        for build in project.builds() {
            let toolchain = self.settings.root.toolchain().unwrap_or(build.default_toolchain());
            self.enqueue(
                TargetBuildKey::new(&self.settings.root, build.name(), toolchain),
                &visited,
                &mut queue,
            );
        }

        while let Some(key) = queue.pop_front() {
            if !visited.insert(key.clone()) {
                continue;
            }
            debug!(%key, "visiting");
            let build = project.build(&key.build)?;
            let target = build.get_target(&key.toolchain, &key.label)?;
            for dep in &target.deps {
                let toolchain = dep.toolchain().unwrap_or(&key.toolchain);
                self.enqueue(
                    TargetBuildKey::new(dep, key.build.as_str(), toolchain),
                    &visited,
                    &mut queue,
                );
            }
        }

        info!(root = %self.settings.root, keys = visited.len(), "resolved closure");
        Ok(visited.into_iter().collect())
    }

    fn enqueue(
        &self,
        key: TargetBuildKey,
        visited: &IndexSet<TargetBuildKey>,
        queue: &mut VecDeque<TargetBuildKey>,
    ) {
        if self.settings.is_excluded(&key.label) {
            debug!(label = %key.label, "excluded from closure");
            return;
        }
        if !visited.contains(&key) {
            queue.push_back(key);
        }
    }
}

//! In-memory model of GN build configurations.
//!
//! A [`Project`] holds one [`Build`] per build directory, and each build
//! indexes its [`Target`]s by raw label. The model is built once per run,
//! either from a JSON snapshot or by [`crate::snapshot::SnapshotBuilder`],
//! and is read-only afterwards.

// Scoped suppression for version-dependent lint false positives from
// miette/thiserror derive macros.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

mod build;
mod project;
mod target;

pub use build::{Build, DEFAULT_ROOT_TARGET};
pub use project::{Project, Snapshot};
pub use target::{Target, TargetKind};

use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

/// Errors raised while loading or querying the build model.
#[derive(Debug, Error, Diagnostic)]
pub enum ModelError {
    /// A lookup named a target the build does not contain.
    #[error("build `{build}` has no target `{label}`")]
    #[diagnostic(code(gn2gyp::model::unknown_target))]
    UnknownTarget {
        /// Build that was searched.
        build: String,
        /// Raw label that was looked up.
        label: String,
    },
    /// A build lacks the root target that defines its default toolchain.
    #[error("build `{build}` is missing its root target `{root}`")]
    #[diagnostic(
        code(gn2gyp::model::missing_root_target),
        help("query the root target together with the rest of the graph")
    )]
    MissingRootTarget {
        /// Build being constructed.
        build: String,
        /// Required root label.
        root: String,
    },
    /// A lookup named a build the project does not contain.
    #[error("unknown build `{build}`")]
    #[diagnostic(code(gn2gyp::model::unknown_build))]
    UnknownBuild {
        /// Requested build name.
        build: String,
    },
    /// Two builds share a name.
    #[error("build `{build}` was added twice")]
    #[diagnostic(code(gn2gyp::model::duplicate_build))]
    DuplicateBuild {
        /// Repeated build name.
        build: String,
    },
    /// Snapshot JSON could not be read or written.
    #[error("invalid snapshot: {source}")]
    #[diagnostic(code(gn2gyp::model::snapshot))]
    Snapshot {
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },
    /// A snapshot file could not be accessed.
    #[error("failed to access snapshot `{path}`: {source}")]
    #[diagnostic(code(gn2gyp::model::io))]
    Io {
        /// File that was accessed.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::Label;
    use indexmap::IndexMap;
    use rstest::{fixture, rstest};

    const DEFAULT_TC: &str = "//build/toolchain:clang";
    const HOST_TC: &str = "//build/toolchain:host";

    #[fixture]
    fn build() -> Build {
        let mut targets = IndexMap::new();
        targets.insert(
            DEFAULT_ROOT_TARGET.to_owned(),
            Target::new(TargetKind::Group, DEFAULT_TC),
        );
        targets.insert(
            "//base:base".to_owned(),
            Target::new(TargetKind::StaticLibrary, DEFAULT_TC),
        );
        targets.insert(
            format!("//base:base({HOST_TC})"),
            Target::new(TargetKind::StaticLibrary, HOST_TC),
        );
        Build::new("Release", targets).expect("build")
    }

    #[rstest]
    fn default_toolchain_comes_from_root(build: Build) {
        assert_eq!(build.default_toolchain(), DEFAULT_TC);
    }

    #[rstest]
    #[case(DEFAULT_TC, DEFAULT_TC)]
    #[case(HOST_TC, HOST_TC)]
    fn lookup_qualifies_non_default_toolchains(
        build: Build,
        #[case] toolchain: &str,
        #[case] expected: &str,
    ) {
        let label = Label::parse("//base:base").expect("label");
        let target = build.get_target(toolchain, &label).expect("target");
        assert_eq!(target.toolchain, expected);
    }

    #[rstest]
    fn lookup_of_missing_toolchain_variant_fails(build: Build) {
        let label = Label::parse("//base:base").expect("label");
        let err = build
            .get_target("//build/toolchain:arm", &label)
            .expect_err("missing variant");
        assert!(matches!(
            err,
            ModelError::UnknownTarget { label: missing, .. } if missing == "//base:base(//build/toolchain:arm)"
        ));
    }

    #[rstest]
    fn missing_root_is_rejected() {
        let err = Build::new("Debug", IndexMap::new()).expect_err("no root");
        assert!(matches!(err, ModelError::MissingRootTarget { .. }));
    }

    #[rstest]
    fn duplicate_builds_are_rejected(build: Build) {
        let mut project = Project::new();
        project.add_build(build.clone()).expect("first");
        let err = project.add_build(build).expect_err("second");
        assert!(matches!(err, ModelError::DuplicateBuild { build: name } if name == "Release"));
    }
}

//! Raw GN target descriptions.
//!
//! [`Target`] mirrors one entry of `gn desc --format=json` output. Field
//! names follow GN's JSON so snapshots round-trip without a translation
//! layer, and empty collections are omitted when serialising.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::label::Label;

/// GN target type.
///
/// The set is closed: kinds this crate does not model are kept verbatim in
/// [`TargetKind::Unsupported`] so snapshots stay lossless and translation
/// can reject them explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TargetKind {
    /// A linked binary.
    Executable,
    /// A static archive.
    StaticLibrary,
    /// A shared library.
    SharedLibrary,
    /// A dynamically loaded module.
    LoadableModule,
    /// A virtual library whose objects are linked into dependents.
    SourceSet,
    /// A named collection of dependencies.
    Group,
    /// A script invocation.
    Action,
    /// A script invocation repeated once per source file.
    ActionForeach,
    /// A file copy.
    Copy,
    /// Any other GN type.
    Unsupported(String),
}

impl TargetKind {
    /// The GN spelling of the kind.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Executable => "executable",
            Self::StaticLibrary => "static_library",
            Self::SharedLibrary => "shared_library",
            Self::LoadableModule => "loadable_module",
            Self::SourceSet => "source_set",
            Self::Group => "group",
            Self::Action => "action",
            Self::ActionForeach => "action_foreach",
            Self::Copy => "copy",
            Self::Unsupported(other) => other,
        }
    }
}

impl From<String> for TargetKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "executable" => Self::Executable,
            "static_library" => Self::StaticLibrary,
            "shared_library" => Self::SharedLibrary,
            "loadable_module" => Self::LoadableModule,
            "source_set" => Self::SourceSet,
            "group" => Self::Group,
            "action" => Self::Action,
            "action_foreach" => Self::ActionForeach,
            "copy" => Self::Copy,
            _ => Self::Unsupported(value),
        }
    }
}

impl From<TargetKind> for String {
    fn from(value: TargetKind) -> Self {
        match value {
            TargetKind::Unsupported(other) => other,
            known => known.as_str().to_owned(),
        }
    }
}

impl Display for TargetKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One GN target as reported for a single toolchain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Direct dependencies.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deps: Vec<Label>,
    /// Target type.
    #[serde(rename = "type")]
    pub kind: TargetKind,
    /// Toolchain the target was evaluated in.
    pub toolchain: String,
    /// Header search directories.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include_dirs: Vec<String>,
    /// Preprocessor definitions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub defines: Vec<String>,
    /// Source files.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
    /// Extra inputs of actions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<String>,
    /// Declared outputs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<String>,
    /// Script arguments of actions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    /// Script run by actions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
    /// Raw compiler flags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cflags: Vec<String>,
    /// Libraries to link.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub libs: Vec<String>,
    /// Library search directories.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lib_dirs: Vec<String>,
    /// Raw linker flags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ldflags: Vec<String>,
}

impl Target {
    /// An otherwise empty target of `kind` in `toolchain`.
    #[must_use]
    pub fn new(kind: TargetKind, toolchain: impl Into<String>) -> Self {
        Self {
            deps: Vec::new(),
            kind,
            toolchain: toolchain.into(),
            include_dirs: Vec::new(),
            defines: Vec::new(),
            sources: Vec::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            args: Vec::new(),
            script: None,
            cflags: Vec::new(),
            libs: Vec::new(),
            lib_dirs: Vec::new(),
            ldflags: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("executable", TargetKind::Executable)]
    #[case("source_set", TargetKind::SourceSet)]
    #[case("action_foreach", TargetKind::ActionForeach)]
    #[case("bundle_data", TargetKind::Unsupported("bundle_data".into()))]
    fn kind_keeps_gn_spelling(#[case] raw: &str, #[case] kind: TargetKind) {
        assert_eq!(TargetKind::from(raw.to_owned()), kind);
        assert_eq!(String::from(kind), raw);
    }

    #[rstest]
    fn missing_collections_default_to_empty() {
        let json = r#"{"type": "group", "toolchain": "//tc:default", "deps": ["//a:b"]}"#;
        let target: Target = serde_json::from_str(json).expect("parse target");
        assert_eq!(target.kind, TargetKind::Group);
        assert_eq!(target.deps.len(), 1);
        assert!(target.sources.is_empty());
        assert!(target.script.is_none());
    }
}

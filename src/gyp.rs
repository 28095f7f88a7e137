//! GYP output structures.
//!
//! These types describe the generated target files. A [`Fragment`] is the
//! translation of one GN target for one [`Toolset`]; the merger folds
//! fragments into [`GypTarget`]s, which serialise to the JSON form GYP
//! reads. Fields that may differ per toolset live in [`ToolsetFields`] so
//! they can be emitted either flat or inside `target_conditions`.
//!
//! ```
//! use gn2gyp::config::Toolset;
//! use gn2gyp::gyp::{GypKind, GypTarget, TargetFile, ToolsetFields};
//!
//! let target = GypTarget {
//!     target_name: "base".into(),
//!     kind: GypKind::None,
//!     toolsets: vec![Toolset::Target],
//!     dependencies: Vec::new(),
//!     export_dependent_settings: Vec::new(),
//!     fields: ToolsetFields::default(),
//!     target_conditions: Vec::new(),
//! };
//! let json = gn2gyp::gyp::render(&TargetFile { targets: vec![target] })?;
//! assert!(json.contains("\"target_name\": \"base\""));
//! # Ok::<(), serde_json::Error>(())
//! ```

use std::fmt::{self, Display, Formatter};

use serde::ser::{SerializeTuple, Serializer};
use serde::Serialize;

use crate::config::Toolset;

/// GYP `type` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GypKind {
    /// A linked binary.
    Executable,
    /// A static archive.
    StaticLibrary,
    /// A shared library.
    SharedLibrary,
    /// A dynamically loaded module.
    LoadableModule,
    /// A target producing no linkable product.
    None,
}

impl GypKind {
    /// The GYP spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Executable => "executable",
            Self::StaticLibrary => "static_library",
            Self::SharedLibrary => "shared_library",
            Self::LoadableModule => "loadable_module",
            Self::None => "none",
        }
    }
}

impl Display for GypKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A GYP action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GypAction {
    /// Unique name within the target.
    pub action_name: String,
    /// Files the action reads.
    pub inputs: Vec<String>,
    /// Files the action writes.
    pub outputs: Vec<String>,
    /// Command line.
    pub action: Vec<String>,
}

impl GypAction {
    /// A copy of `from` to `to` run with `command`.
    #[must_use]
    pub fn copy(name: impl Into<String>, command: &[String], from: &str, to: &str) -> Self {
        let mut action = command.to_vec();
        action.push(from.to_owned());
        action.push(to.to_owned());
        Self {
            action_name: name.into(),
            inputs: vec![from.to_owned()],
            outputs: vec![to.to_owned()],
            action,
        }
    }
}

/// Link settings propagated to dependents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LinkSettings {
    /// Libraries to link.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub libraries: Vec<String>,
    /// Library search directories.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub library_dirs: Vec<String>,
}

impl LinkSettings {
    /// Whether nothing is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.libraries.is_empty() && self.library_dirs.is_empty()
    }
}

/// Target fields that may vary between toolsets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ToolsetFields {
    /// Header search directories.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub include_dirs: Vec<String>,
    /// Preprocessor definitions.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub defines: Vec<String>,
    /// Compiler flags.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cflags: Vec<String>,
    /// Linker flags.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ldflags: Vec<String>,
    /// Source files.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
    /// Link settings.
    #[serde(skip_serializing_if = "LinkSettings::is_empty")]
    pub link_settings: LinkSettings,
    /// Actions.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<GypAction>,
}

/// One GN target translated for one toolset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// Flattened logical name.
    pub target_name: String,
    /// GYP type.
    pub kind: GypKind,
    /// Toolset the fragment was translated for.
    pub toolset: Toolset,
    /// Dependencies, each suffixed with `#<toolset>`.
    pub dependencies: Vec<String>,
    /// Toolset-variable fields.
    pub fields: ToolsetFields,
    /// Rewritten declared outputs.
    pub outputs: Vec<String>,
}

impl Fragment {
    /// The output path when exactly one output is declared.
    #[must_use]
    pub fn single_output(&self) -> Option<&str> {
        match self.outputs.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }
}

/// `target_conditions` entry applying `fields` when building `toolset`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetCondition {
    /// Toolset the branch applies to.
    pub toolset: Toolset,
    /// Fields set in the branch.
    pub fields: ToolsetFields,
}

impl TargetCondition {
    /// The GYP condition expression.
    #[must_use]
    pub fn expression(&self) -> String {
        format!("_toolset==\"{}\"", self.toolset)
    }
}

impl Serialize for TargetCondition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut pair = serializer.serialize_tuple(2)?;
        pair.serialize_element(&self.expression())?;
        pair.serialize_element(&self.fields)?;
        pair.end()
    }
}

/// A merged GYP target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GypTarget {
    /// Target name.
    pub target_name: String,
    /// GYP type.
    #[serde(rename = "type")]
    pub kind: GypKind,
    /// Toolsets the target is built for.
    pub toolsets: Vec<Toolset>,
    /// Dependencies shared by every toolset.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
    /// Dependencies whose settings are re-exported.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub export_dependent_settings: Vec<String>,
    /// Fields shared by every toolset.
    #[serde(flatten)]
    pub fields: ToolsetFields,
    /// Per-toolset branches.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub target_conditions: Vec<TargetCondition>,
}

/// Contents of one generated `.gyp` file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TargetFile {
    /// Targets in emission order.
    pub targets: Vec<GypTarget>,
}

/// Render `file` as pretty-printed JSON, which GYP accepts as input.
///
/// # Errors
///
/// Returns the serialiser error, which does not occur for these types in
/// practice.
pub fn render(file: &TargetFile) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(file)
}

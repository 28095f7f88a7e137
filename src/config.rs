//! Translation configuration.
//!
//! [`Settings`] is the declarative part, loadable from JSON. [`Hooks`] holds
//! the injected functions that encode project-specific knowledge: script
//! argument corrections, include-flag corrections, and the classifier and
//! path rewriter of each output group. [`Config::from_settings`] derives
//! default hooks from the settings; callers replace individual hooks as
//! needed.

// Scoped suppression for version-dependent lint false positives from
// miette/thiserror derive macros.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

use std::collections::{BTreeSet, HashMap};
use std::fmt::{self, Debug, Display, Formatter};
use std::sync::Arc;

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::label::Label;
use crate::translate::{OutRootRewriter, PathRewriter};

/// GYP toolsets. GYP knows no others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Toolset {
    /// Tools run during the build.
    Host,
    /// Products shipped to the device.
    Target,
}

impl Toolset {
    /// The GYP spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Host => "host",
            Self::Target => "target",
        }
    }
}

impl Display for Toolset {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mapping from GN toolchain labels to GYP toolsets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolchainTable(IndexMap<String, Toolset>);

impl ToolchainTable {
    /// Build a table from `(toolchain, toolset)` pairs.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Toolset)>,
        S: Into<String>,
    {
        Self(entries.into_iter().map(|(tc, ts)| (tc.into(), ts)).collect())
    }

    /// Toolset of `toolchain`, if mapped.
    #[must_use]
    pub fn resolve(&self, toolchain: &str) -> Option<Toolset> {
        self.0.get(toolchain).copied()
    }

    /// Every toolset some toolchain maps to, in sorted order.
    #[must_use]
    pub fn toolsets(&self) -> BTreeSet<Toolset> {
        self.0.values().copied().collect()
    }
}

/// Declarative description of one output group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupSettings {
    /// File stem of the generated `.gyp` file.
    pub name: String,
    /// Label prefixes belonging to the group.
    pub prefixes: Vec<String>,
}

/// Declarative settings of a translation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Target whose closure is translated.
    pub root: Label,
    /// Build directory whose targets are emitted.
    pub build: String,
    /// GN toolchain to GYP toolset mapping.
    pub toolchains: ToolchainTable,
    /// Label prefixes never traversed, e.g. self-hosting tools.
    #[serde(default)]
    pub exclude_prefixes: Vec<String>,
    /// Output groups. Empty means everything goes to `default_group`.
    #[serde(default)]
    pub groups: Vec<GroupSettings>,
    /// Group used when `groups` is empty.
    #[serde(default = "default_group")]
    pub default_group: String,
    /// Directory holding build directories, relative to the source root.
    #[serde(default = "default_out_root")]
    pub out_root: String,
    /// Interpreter prefixed to action scripts.
    #[serde(default = "default_interpreter")]
    pub script_interpreter: String,
    /// Command used by copy actions; source and destination are appended.
    #[serde(default = "default_copy_command")]
    pub copy_command: Vec<String>,
}

fn default_group() -> String {
    "all".to_owned()
}

fn default_out_root() -> String {
    "out".to_owned()
}

fn default_interpreter() -> String {
    "python3".to_owned()
}

fn default_copy_command() -> Vec<String> {
    vec!["cp".to_owned(), "-f".to_owned()]
}

impl Settings {
    /// Minimal settings with every optional field defaulted.
    #[must_use]
    pub fn new(root: Label, build: impl Into<String>, toolchains: ToolchainTable) -> Self {
        Self {
            root,
            build: build.into(),
            toolchains,
            exclude_prefixes: Vec::new(),
            groups: Vec::new(),
            default_group: default_group(),
            out_root: default_out_root(),
            script_interpreter: default_interpreter(),
            copy_command: default_copy_command(),
        }
    }

    /// Parse settings from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed or unknown fields.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|source| ConfigError::Parse { source })
    }

    /// Read settings from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read and
    /// [`ConfigError::Parse`] when it is malformed.
    pub fn from_path(path: &Utf8Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Whether `label` is excluded from traversal.
    #[must_use]
    pub fn is_excluded(&self, label: &Label) -> bool {
        self.exclude_prefixes
            .iter()
            .any(|prefix| label.starts_with(prefix))
    }
}

/// Rewrites the arguments of one script.
pub type ScriptArgsHook = Arc<dyn Fn(&[String]) -> Vec<String> + Send + Sync>;

/// Maps a raw include directory taken from compiler flags to a GN path,
/// given the build directory name.
pub type IncludeDirHook = Arc<dyn Fn(&str, &str) -> String + Send + Sync>;

/// Decides whether a label belongs to a group.
pub type Classifier = Arc<dyn Fn(&Label) -> bool + Send + Sync>;

/// One output group: a classifier and the path rewriter of its file.
#[derive(Clone)]
pub struct OutputGroup {
    /// Selects the group's labels.
    pub classifier: Classifier,
    /// Rewrites paths of targets in the group.
    pub rewriter: Arc<dyn PathRewriter>,
}

impl Debug for OutputGroup {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputGroup").finish_non_exhaustive()
    }
}

/// Errors raised while assigning labels to output groups.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum GroupError {
    /// A label matched no group or several.
    #[error("`{label}` must belong to exactly one output group, matched {matches:?}")]
    #[diagnostic(
        code(gn2gyp::groups::misclassified),
        help("adjust the group classifiers so they partition the target graph")
    )]
    Misclassified {
        /// Classified label.
        label: String,
        /// Names of the matching groups.
        matches: Vec<String>,
    },
}

/// Injected project-specific functions.
#[derive(Clone)]
pub struct Hooks {
    /// Argument corrections keyed by GN script path.
    pub script_args: HashMap<String, ScriptArgsHook>,
    /// Include-flag directory correction.
    pub include_dir: IncludeDirHook,
    /// Output groups in priority order.
    pub groups: IndexMap<String, OutputGroup>,
}

impl Debug for Hooks {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("script_args", &self.script_args.keys().collect::<Vec<_>>())
            .field("groups", &self.groups.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Hooks {
    /// Correct the arguments of `script`; unknown scripts pass through.
    #[must_use]
    pub fn correct_script_args(&self, script: &str, args: &[String]) -> Vec<String> {
        self.script_args
            .get(script)
            .map_or_else(|| args.to_vec(), |hook| hook(args))
    }

    /// Assign `label` to its output group.
    ///
    /// # Errors
    ///
    /// Returns [`GroupError::Misclassified`] unless exactly one group
    /// matches.
    pub fn classify(&self, label: &Label) -> Result<(&str, &OutputGroup), GroupError> {
        let matches: Vec<_> = self
            .groups
            .iter()
            .filter(|(_, group)| (group.classifier)(label))
            .collect();
        match *matches.as_slice() {
            [(name, group)] => Ok((name.as_str(), group)),
            _ => Err(GroupError::Misclassified {
                label: label.to_string(),
                matches: matches.iter().map(|(name, _)| (*name).clone()).collect(),
            }),
        }
    }
}

/// Resolve an include directory relative to `//<out_root>/<build>/`.
///
/// Source-absolute paths (`//…`) are returned unchanged, as are paths that
/// cannot be resolved; those are rejected later by path rewriting.
#[must_use]
pub fn resolve_build_relative(out_root: &str, build: &str, dir: &str) -> String {
    if dir.starts_with("//") {
        return dir.to_owned();
    }
    let mut resolved = Utf8PathBuf::from(out_root);
    resolved.push(build);
    for component in Utf8Path::new(dir).components() {
        match component {
            Utf8Component::Normal(part) => resolved.push(part),
            Utf8Component::ParentDir => {
                if !resolved.pop() {
                    return dir.to_owned();
                }
            }
            Utf8Component::CurDir => {}
            Utf8Component::RootDir | Utf8Component::Prefix(_) => return dir.to_owned(),
        }
    }
    format!("//{resolved}")
}

/// Settings together with the hooks derived from or injected alongside
/// them.
#[derive(Debug, Clone)]
pub struct Config {
    /// Declarative settings.
    pub settings: Settings,
    /// Injected functions.
    pub hooks: Hooks,
}

impl Config {
    /// Derive default hooks from `settings`.
    ///
    /// Groups classify by label prefix and rewrite paths with
    /// [`OutRootRewriter`]; include directories resolve relative to the
    /// build directory; scripts receive their arguments unchanged.
    #[must_use]
    pub fn from_settings(settings: Settings) -> Self {
        let rewriter: Arc<dyn PathRewriter> = Arc::new(OutRootRewriter::new(&settings.out_root));
        let groups = if settings.groups.is_empty() {
            let everything: Classifier = Arc::new(|_: &Label| true);
            IndexMap::from([(
                settings.default_group.clone(),
                OutputGroup {
                    classifier: everything,
                    rewriter,
                },
            )])
        } else {
            settings
                .groups
                .iter()
                .map(|group| {
                    let prefixes = group.prefixes.clone();
                    let classifier: Classifier = Arc::new(move |label: &Label| {
                        prefixes.iter().any(|prefix| label.starts_with(prefix))
                    });
                    (
                        group.name.clone(),
                        OutputGroup {
                            classifier,
                            rewriter: Arc::clone(&rewriter),
                        },
                    )
                })
                .collect()
        };
        let out_root = settings.out_root.clone();
        let include_dir: IncludeDirHook =
            Arc::new(move |build: &str, dir: &str| resolve_build_relative(&out_root, build, dir));
        Self {
            settings,
            hooks: Hooks {
                script_args: HashMap::new(),
                include_dir,
                groups,
            },
        }
    }

    /// Register an argument correction for `script`.
    #[must_use]
    pub fn with_script_args(
        mut self,
        script: impl Into<String>,
        hook: impl Fn(&[String]) -> Vec<String> + Send + Sync + 'static,
    ) -> Self {
        self.hooks.script_args.insert(script.into(), Arc::new(hook));
        self
    }

    /// Replace the include-flag correction.
    #[must_use]
    pub fn with_include_dir(
        mut self,
        hook: impl Fn(&str, &str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.hooks.include_dir = Arc::new(hook);
        self
    }

    /// Add or replace an output group.
    #[must_use]
    pub fn with_group(mut self, name: impl Into<String>, group: OutputGroup) -> Self {
        self.hooks.groups.insert(name.into(), group);
        self
    }
}

/// Errors raised while loading settings.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// Settings JSON is malformed.
    #[error("invalid settings: {source}")]
    #[diagnostic(code(gn2gyp::config::parse))]
    Parse {
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },
    /// The settings file could not be read.
    #[error("failed to read settings `{path}`: {source}")]
    #[diagnostic(code(gn2gyp::config::io))]
    Io {
        /// File that was read.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

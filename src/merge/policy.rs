//! Per-field merge policies.
//!
//! When a logical target is built for several toolsets, each field either
//! has to agree across toolsets or is emitted per toolset inside
//! `target_conditions`. [`FIELD_POLICIES`] lists every fragment field with
//! its policy; the merger consults nothing else.

use crate::gyp::{Fragment, ToolsetFields};
use crate::translate::{PLACEHOLDER_TARGET, strip_toolset};

/// Whether `dependency` names the placeholder-source generator.
pub(super) fn is_placeholder(dependency: &str) -> bool {
    let name = strip_toolset(dependency);
    name.rsplit_once(':').map_or(name, |(_, bare)| bare) == PLACEHOLDER_TARGET
}

/// Dependencies of `fragment` other than the placeholder generator.
pub(super) fn regular_dependencies(fragment: &Fragment) -> impl Iterator<Item = &str> {
    fragment
        .dependencies
        .iter()
        .map(String::as_str)
        .filter(|dep| !is_placeholder(dep))
}

/// Fragment fields subject to merging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// GYP type.
    Type,
    /// Dependencies, compared without their toolset suffix. The
    /// placeholder generator is left out: only toolsets lacking compiled
    /// sources depend on it.
    Dependencies,
    /// Header search directories.
    IncludeDirs,
    /// Preprocessor definitions.
    Defines,
    /// Compiler flags.
    Cflags,
    /// Linker flags.
    Ldflags,
    /// Source files.
    Sources,
    /// Link settings.
    LinkSettings,
    /// Actions.
    Actions,
}

/// How a field behaves across toolsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Must be identical in every toolset; emitted once.
    Identical,
    /// May differ; emitted in each toolset's branch.
    PerToolset,
}

/// The merge policy of every field.
pub const FIELD_POLICIES: [(Field, Policy); 9] = [
    (Field::Type, Policy::Identical),
    (Field::Dependencies, Policy::Identical),
    (Field::IncludeDirs, Policy::PerToolset),
    (Field::Defines, Policy::PerToolset),
    (Field::Cflags, Policy::PerToolset),
    (Field::Ldflags, Policy::PerToolset),
    (Field::Sources, Policy::PerToolset),
    (Field::LinkSettings, Policy::PerToolset),
    (Field::Actions, Policy::PerToolset),
];

impl Field {
    /// GYP key of the field.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Type => "type",
            Self::Dependencies => "dependencies",
            Self::IncludeDirs => "include_dirs",
            Self::Defines => "defines",
            Self::Cflags => "cflags",
            Self::Ldflags => "ldflags",
            Self::Sources => "sources",
            Self::LinkSettings => "link_settings",
            Self::Actions => "actions",
        }
    }

    /// Value compared across toolsets under [`Policy::Identical`].
    #[must_use]
    pub fn shared_value(self, fragment: &Fragment) -> Vec<String> {
        let fields = &fragment.fields;
        match self {
            Self::Type => vec![fragment.kind.as_str().to_owned()],
            Self::Dependencies => regular_dependencies(fragment)
                .map(|dep| strip_toolset(dep).to_owned())
                .collect(),
            Self::IncludeDirs => fields.include_dirs.clone(),
            Self::Defines => fields.defines.clone(),
            Self::Cflags => fields.cflags.clone(),
            Self::Ldflags => fields.ldflags.clone(),
            Self::Sources => fields.sources.clone(),
            Self::LinkSettings => fields
                .link_settings
                .libraries
                .iter()
                .chain(&fields.link_settings.library_dirs)
                .cloned()
                .collect(),
            Self::Actions => fields
                .actions
                .iter()
                .map(|action| action.action_name.clone())
                .collect(),
        }
    }

    /// Copy the field from `from` into a toolset branch under
    /// [`Policy::PerToolset`].
    pub fn copy_into(self, from: &Fragment, branch: &mut ToolsetFields) {
        let fields = &from.fields;
        match self {
            Self::Type | Self::Dependencies => {}
            Self::IncludeDirs => branch.include_dirs.clone_from(&fields.include_dirs),
            Self::Defines => branch.defines.clone_from(&fields.defines),
            Self::Cflags => branch.cflags.clone_from(&fields.cflags),
            Self::Ldflags => branch.ldflags.clone_from(&fields.ldflags),
            Self::Sources => branch.sources.clone_from(&fields.sources),
            Self::LinkSettings => branch.link_settings.clone_from(&fields.link_settings),
            Self::Actions => branch.actions.clone_from(&fields.actions),
        }
    }
}

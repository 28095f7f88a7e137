//! Folding per-toolset fragments into GYP targets.
//!
//! A [`FragmentMerger`] collects the fragments of one logical target, at
//! most one per toolset. [`FragmentMerger::finalize`] emits a flat target
//! for a single toolset, or a target whose toolset-variable fields sit in
//! `target_conditions` branches, as dictated by [`FIELD_POLICIES`].
//! Executables and static libraries are then split into a `_proxy` target
//! doing the real work and a wrapper under the logical name.

// Scoped suppression for version-dependent lint false positives from
// miette/thiserror derive macros.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

mod policy;
mod proxy;

pub use policy::{FIELD_POLICIES, Field, Policy};

use policy::{is_placeholder, regular_dependencies};

use std::collections::BTreeMap;

use miette::Diagnostic;
use thiserror::Error;
use tracing::debug;

use crate::config::Toolset;
use crate::gyp::{Fragment, GypKind, GypTarget, TargetCondition, ToolsetFields};
use crate::translate::strip_toolset;

/// Errors raised while merging fragments.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum MergeError {
    /// Two fragments of one target were translated for the same toolset.
    #[error("`{target}` has two fragments for toolset `{toolset}`")]
    #[diagnostic(
        code(gn2gyp::merge::duplicate_toolset),
        help("two GN toolchains map to the same GYP toolset")
    )]
    DuplicateToolset {
        /// Logical target.
        target: String,
        /// Repeated toolset.
        toolset: Toolset,
    },
    /// Toolsets disagree on dependencies.
    #[error("`{target}` depends on different targets for `{first}` and `{other}`")]
    #[diagnostic(code(gn2gyp::merge::dependency_mismatch))]
    DependencyMismatch {
        /// Logical target.
        target: String,
        /// Toolset whose dependencies are the reference.
        first: Toolset,
        /// Disagreeing toolset.
        other: Toolset,
    },
    /// Toolsets disagree on a field that must be identical.
    #[error("`{target}` has a different `{field}` for `{first}` and `{other}`")]
    #[diagnostic(code(gn2gyp::merge::field_mismatch))]
    FieldMismatch {
        /// Logical target.
        target: String,
        /// GYP key of the field.
        field: &'static str,
        /// Toolset whose value is the reference.
        first: Toolset,
        /// Disagreeing toolset.
        other: Toolset,
    },
    /// An executable does not declare exactly one output.
    #[error("executable `{target}` declares {count} outputs for `{toolset}`, expected one")]
    #[diagnostic(code(gn2gyp::merge::output_count))]
    OutputCount {
        /// Logical target.
        target: String,
        /// Offending toolset.
        toolset: Toolset,
        /// Number of declared outputs.
        count: usize,
    },
    /// Nothing was added before finalising.
    #[error("cannot finalise a merger without fragments")]
    #[diagnostic(code(gn2gyp::merge::empty_builder))]
    EmptyBuilder,
}

/// Accumulates the fragments of one logical target.
#[derive(Debug, Clone, Default)]
pub struct FragmentMerger {
    copy_command: Vec<String>,
    fragments: BTreeMap<Toolset, Fragment>,
}

impl FragmentMerger {
    /// Merger whose proxy copies run `copy_command`.
    #[must_use]
    pub fn new(copy_command: &[String]) -> Self {
        Self {
            copy_command: copy_command.to_vec(),
            fragments: BTreeMap::new(),
        }
    }

    /// Add the fragment of one toolset.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::DuplicateToolset`] when the toolset already
    /// has a fragment.
    pub fn add(&mut self, fragment: Fragment) -> Result<(), MergeError> {
        if self.fragments.contains_key(&fragment.toolset) {
            return Err(MergeError::DuplicateToolset {
                target: fragment.target_name,
                toolset: fragment.toolset,
            });
        }
        self.fragments.insert(fragment.toolset, fragment);
        Ok(())
    }

    /// Produce the merged targets.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::EmptyBuilder`] without fragments, a mismatch
    /// error when toolsets disagree on an identical-policy field, and
    /// [`MergeError::OutputCount`] for executables without exactly one
    /// output.
    pub fn finalize(self) -> Result<Vec<GypTarget>, MergeError> {
        let merged = match self.fragments.len() {
            0 => return Err(MergeError::EmptyBuilder),
            1 => self.flat()?,
            _ => self.branched()?,
        };
        debug!(
            target = %merged.target_name,
            toolsets = merged.toolsets.len(),
            "merged fragments"
        );
        match merged.kind {
            GypKind::Executable => {
                proxy::expand_executable(merged, &self.fragments, &self.copy_command)
            }
            GypKind::StaticLibrary => Ok(proxy::expand_static_library(merged)),
            _ => Ok(vec![merged]),
        }
    }

    fn first(&self) -> Result<&Fragment, MergeError> {
        self.fragments
            .values()
            .next()
            .ok_or(MergeError::EmptyBuilder)
    }

    fn flat(&self) -> Result<GypTarget, MergeError> {
        let fragment = self.first()?;
        Ok(GypTarget {
            target_name: fragment.target_name.clone(),
            kind: fragment.kind,
            toolsets: vec![fragment.toolset],
            dependencies: fragment.dependencies.clone(),
            export_dependent_settings: Vec::new(),
            fields: fragment.fields.clone(),
            target_conditions: Vec::new(),
        })
    }

    fn branched(&self) -> Result<GypTarget, MergeError> {
        let first = self.first()?;
        for (field, policy) in FIELD_POLICIES {
            if policy != Policy::Identical {
                continue;
            }
            let expected = field.shared_value(first);
            if let Some(other) = self
                .fragments
                .values()
                .find(|fragment| field.shared_value(fragment) != expected)
            {
                return Err(mismatch(field, first, other));
            }
        }

        let target_conditions = self
            .fragments
            .values()
            .map(|fragment| {
                let mut fields = ToolsetFields::default();
                for (field, policy) in FIELD_POLICIES {
                    if policy == Policy::PerToolset {
                        field.copy_into(fragment, &mut fields);
                    }
                }
                TargetCondition {
                    toolset: fragment.toolset,
                    fields,
                }
            })
            .collect();

        Ok(GypTarget {
            target_name: first.target_name.clone(),
            kind: first.kind,
            toolsets: self.fragments.keys().copied().collect(),
            dependencies: self.shared_dependencies(first)?,
            export_dependent_settings: Vec::new(),
            fields: ToolsetFields::default(),
            target_conditions,
        })
    }

    /// Dependencies emitted once for every toolset.
    ///
    /// A reference whose suffix is each fragment's own toolset is emitted
    /// bare, so GYP resolves it per toolset; one naming the same toolset in
    /// every fragment keeps its suffix. The placeholder generator exists for
    /// every toolset and is referenced bare when any fragment needs it.
    fn shared_dependencies(&self, first: &Fragment) -> Result<Vec<String>, MergeError> {
        let columns: Vec<(&Fragment, Vec<&str>)> = self
            .fragments
            .values()
            .map(|fragment| (fragment, regular_dependencies(fragment).collect()))
            .collect();
        let mut dependencies = Vec::new();
        for (index, dep) in regular_dependencies(first).enumerate() {
            let per_toolset = columns.iter().all(|(fragment, deps)| {
                deps.get(index)
                    .is_some_and(|other| names_own_toolset(other, fragment.toolset))
            });
            if per_toolset {
                dependencies.push(strip_toolset(dep).to_owned());
                continue;
            }
            if let Some((other, _)) = columns
                .iter()
                .find(|(_, deps)| deps.get(index) != Some(&dep))
            {
                return Err(mismatch(Field::Dependencies, first, other));
            }
            dependencies.push(dep.to_owned());
        }
        if let Some(placeholder) = self
            .fragments
            .values()
            .flat_map(|fragment| &fragment.dependencies)
            .find(|dep| is_placeholder(dep))
        {
            dependencies.push(strip_toolset(placeholder).to_owned());
        }
        Ok(dependencies)
    }
}

fn names_own_toolset(dependency: &str, toolset: Toolset) -> bool {
    dependency
        .rsplit_once('#')
        .is_none_or(|(_, suffix)| suffix == toolset.as_str())
}

fn mismatch(field: Field, first: &Fragment, other: &Fragment) -> MergeError {
    let target = first.target_name.clone();
    match field {
        Field::Dependencies => MergeError::DependencyMismatch {
            target,
            first: first.toolset,
            other: other.toolset,
        },
        _ => MergeError::FieldMismatch {
            target,
            field: field.name(),
            first: first.toolset,
            other: other.toolset,
        },
    }
}

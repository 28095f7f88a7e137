//! End-to-end assembly of GYP target files.
//!
//! [`GraphAssembler::assemble`] resolves the closure of the configured root,
//! translates every key of the configured build, merges the fragments of
//! each logical target and files the results under their output group. The
//! shared placeholder-source generator is added to the root's group.

// Scoped suppression for version-dependent lint false positives from
// miette/thiserror derive macros.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

use indexmap::IndexMap;
use miette::Diagnostic;
use thiserror::Error;
use tracing::{debug, info};

use crate::closure::{ClosureResolver, TargetBuildKey};
use crate::config::{Config, GroupError};
use crate::gyp::TargetFile;
use crate::label::Label;
use crate::merge::{FragmentMerger, MergeError};
use crate::model::{ModelError, Project};
use crate::translate::{TranslateError, Translator, placeholder_fragment};

/// Generated target files keyed by output group name.
pub type TargetFiles = IndexMap<String, TargetFile>;

/// Errors raised while assembling target files.
#[derive(Debug, Error, Diagnostic)]
pub enum AssembleError {
    /// A label belongs to no output group or to several.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Group(#[from] GroupError),
    /// The model lacks a build or target.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Model(#[from] ModelError),
    /// A target could not be translated.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Translate(#[from] TranslateError),
    /// Fragments of a target could not be merged.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Merge(#[from] MergeError),
}

/// Drives closure, translation and merging for one configuration.
#[derive(Debug, Clone, Copy)]
pub struct GraphAssembler<'a> {
    project: &'a Project,
    config: &'a Config,
}

impl<'a> GraphAssembler<'a> {
    /// Assembler over `project` configured by `config`.
    #[must_use]
    pub const fn new(project: &'a Project, config: &'a Config) -> Self {
        Self { project, config }
    }

    /// Produce the target files of the configured build.
    ///
    /// Every label is assigned to its output group before any target is
    /// translated, so a misclassified label fails as [`AssembleError::Group`].
    ///
    /// # Errors
    ///
    /// Returns the first [`AssembleError`] encountered; nothing is produced
    /// on failure.
    pub fn assemble(&self) -> Result<TargetFiles, AssembleError> {
        let settings = &self.config.settings;
        let build = self.project.build(&settings.build)?;
        let keys = ClosureResolver::new(settings).resolve(self.project)?;
        let mut by_label: IndexMap<&Label, Vec<&TargetBuildKey>> = IndexMap::new();
        for key in keys.iter().filter(|key| key.build == settings.build) {
            by_label.entry(&key.label).or_default().push(key);
        }
        debug!(
            build = %settings.build,
            keys = keys.len(),
            labels = by_label.len(),
            "grouped closure by label"
        );

        let mut classified = Vec::with_capacity(by_label.len());
        for (label, label_keys) in by_label {
            let (group, _) = self.config.hooks.classify(label)?;
            classified.push((group, label_keys));
        }

        let translator = Translator::new(self.project, self.config)?;
        let mut files = TargetFiles::new();
        for (group, label_keys) in classified {
            let mut merger = FragmentMerger::new(&settings.copy_command);
            for key in label_keys {
                let target = build.get_target(&key.toolchain, &key.label)?;
                merger.add(translator.translate(target, key)?)?;
            }
            files
                .entry(group.to_owned())
                .or_default()
                .targets
                .extend(merger.finalize()?);
        }

        let toolsets = settings.toolchains.toolsets();
        if !toolsets.is_empty() {
            let mut merger = FragmentMerger::new(&settings.copy_command);
            for toolset in toolsets {
                merger.add(placeholder_fragment(toolset, settings))?;
            }
            files
                .entry(translator.placeholder_group().to_owned())
                .or_default()
                .targets
                .extend(merger.finalize()?);
        }

        for (group, file) in &files {
            info!(group = %group, targets = file.targets.len(), "assembled target file");
        }
        Ok(files)
    }
}

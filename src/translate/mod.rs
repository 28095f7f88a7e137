//! GN target to GYP fragment translation.
//!
//! [`Translator::translate`] turns one GN target, evaluated for one build
//! and toolchain, into a [`Fragment`]: names are flattened, paths rewritten
//! through the output group's [`PathRewriter`], include flags scraped, and
//! dependencies renamed to `name#toolset`, qualified with the target file
//! when they live in another output group. Script and copy targets gain a
//! synthesised action, and static libraries without compiled sources gain
//! a placeholder source.

mod actions;
mod error;
mod flags;
mod kind;
mod paths;

pub use actions::{PLACEHOLDER_TARGET, placeholder_fragment, placeholder_source};
pub use error::TranslateError;
pub use paths::{DEPTH, OutRootRewriter, PathRewriter, SHARED_INTERMEDIATE_DIR};

use tracing::debug;

use crate::closure::TargetBuildKey;
use crate::config::{Config, Toolset};
use crate::gyp::{Fragment, GypKind, LinkSettings, ToolsetFields};
use crate::label::Label;
use crate::model::{Project, Target};

use self::kind::{KindMapping, map_kind};

/// Flatten a label into a GYP target name.
///
/// The toolchain is dropped, then `//` is stripped and `:`, `/` and `+`
/// become `_`.
///
/// ```
/// use gn2gyp::label::Label;
/// use gn2gyp::translate::flatten_name;
///
/// let label = Label::parse("//third_party/libc++:libc++(//tc:host)")?;
/// assert_eq!(flatten_name(&label), "third_party_libc___libc__");
/// # Ok::<(), gn2gyp::label::LabelError>(())
/// ```
#[must_use]
pub fn flatten_name(label: &Label) -> String {
    let canonical = label.without_toolchain().to_string();
    canonical
        .trim_start_matches('/')
        .replace([':', '/', '+'], "_")
}

/// Strip a trailing `#<toolset>` from a dependency reference.
#[must_use]
pub fn strip_toolset(dependency: &str) -> &str {
    dependency
        .rsplit_once('#')
        .map_or(dependency, |(name, _)| name)
}

/// Path rewriting bound to one target and build.
pub(crate) struct PathContext<'a> {
    rewriter: &'a dyn PathRewriter,
    build: &'a str,
    label: String,
}

impl PathContext<'_> {
    pub(crate) fn label(&self) -> &str {
        &self.label
    }

    pub(crate) fn rewrite(&self, path: &str) -> Result<String, TranslateError> {
        self.rewriter
            .rewrite(self.build, path)
            .ok_or_else(|| TranslateError::UnexpectedPath {
                path: path.to_owned(),
                label: self.label.clone(),
            })
    }

    pub(crate) fn rewrite_all(&self, paths: &[String]) -> Result<Vec<String>, TranslateError> {
        paths.iter().map(|path| self.rewrite(path)).collect()
    }

    /// Libraries named bare are linked with `-l`; paths are rewritten.
    fn library(&self, lib: &str) -> Result<String, TranslateError> {
        if lib.starts_with("//") {
            self.rewrite(lib)
        } else if lib.contains(['/', '.']) || lib.starts_with('-') {
            Ok(lib.to_owned())
        } else {
            Ok(format!("-l{lib}"))
        }
    }
}

/// Translates targets of one project under one configuration.
#[derive(Debug)]
pub struct Translator<'a> {
    project: &'a Project,
    config: &'a Config,
    placeholder_group: String,
}

impl<'a> Translator<'a> {
    /// Prepare a translator.
    ///
    /// # Errors
    ///
    /// Returns [`TranslateError::Group`] when the root target, which hosts
    /// the placeholder generator, belongs to no single output group.
    pub fn new(project: &'a Project, config: &'a Config) -> Result<Self, TranslateError> {
        let root = config.settings.root.without_toolchain();
        let (group, _) = config.hooks.classify(&root)?;
        Ok(Self {
            project,
            config,
            placeholder_group: group.to_owned(),
        })
    }

    /// Output group hosting the placeholder generator.
    #[must_use]
    pub fn placeholder_group(&self) -> &str {
        &self.placeholder_group
    }

    /// Resolve `toolchain` to its toolset.
    ///
    /// # Errors
    ///
    /// Returns [`TranslateError::UnrecognizedToolchain`] for unmapped
    /// toolchains.
    pub fn toolset(&self, toolchain: &str, label: &Label) -> Result<Toolset, TranslateError> {
        self.config
            .settings
            .toolchains
            .resolve(toolchain)
            .ok_or_else(|| TranslateError::UnrecognizedToolchain {
                toolchain: toolchain.to_owned(),
                label: label.to_string(),
            })
    }

    /// Translate `target`, the GN target behind `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`TranslateError`] for unmapped toolchains, unexpected
    /// paths, malformed flags, scripts without a script path, unsupported
    /// kinds, misclassified labels and unknown builds.
    pub fn translate(
        &self,
        target: &Target,
        key: &TargetBuildKey,
    ) -> Result<Fragment, TranslateError> {
        let build = self.project.build(&key.build)?;
        let toolset = self.toolset(&key.toolchain, &key.label)?;
        let (group, output_group) = self.config.hooks.classify(&key.label)?;
        let mapping = map_kind(&target.kind);
        let kind = mapping
            .gyp_kind()
            .ok_or_else(|| TranslateError::NotImplemented {
                label: key.label.to_string(),
                what: format!("target type `{}`", target.kind),
            })?;
        let paths = PathContext {
            rewriter: output_group.rewriter.as_ref(),
            build: build.name(),
            label: key.label.to_string(),
        };
        let target_name = flatten_name(&key.label);
        let mut dependencies = self.dependencies(target, key, group)?;
        let mut fields = self.fields(target, &paths)?;

        match mapping {
            KindMapping::ScriptAction => fields.actions.push(actions::script_action(
                &target_name,
                target,
                &paths,
                &self.config.settings,
                &self.config.hooks,
            )?),
            KindMapping::CopyAction => fields.actions.push(actions::copy_action(
                &target_name,
                target,
                &paths,
                &self.config.settings,
            )?),
            KindMapping::Native(_) => fields.sources = paths.rewrite_all(&target.sources)?,
            KindMapping::Unsupported => {}
        }

        if kind == GypKind::StaticLibrary
            && !fields.sources.iter().any(|source| actions::is_compiled(source))
        {
            debug!(label = %key.label, %toolset, "injecting placeholder source");
            fields.sources.push(placeholder_source());
            dependencies.push(qualify(
                PLACEHOLDER_TARGET,
                &self.placeholder_group,
                group,
                toolset,
            ));
        }

        Ok(Fragment {
            target_name,
            kind,
            toolset,
            dependencies,
            fields,
            outputs: paths.rewrite_all(&target.outputs)?,
        })
    }

    fn dependencies(
        &self,
        target: &Target,
        key: &TargetBuildKey,
        group: &str,
    ) -> Result<Vec<String>, TranslateError> {
        target
            .deps
            .iter()
            .filter(|dep| !self.config.settings.is_excluded(dep))
            .map(|dep| {
                let toolchain = dep.toolchain().unwrap_or(&key.toolchain);
                let toolset = self.toolset(toolchain, dep)?;
                let logical = dep.without_toolchain();
                let (dep_group, _) = self.config.hooks.classify(&logical)?;
                Ok(qualify(&flatten_name(&logical), dep_group, group, toolset))
            })
            .collect()
    }

    /// Compile and link fields shared by every kind.
    fn fields(
        &self,
        target: &Target,
        paths: &PathContext<'_>,
    ) -> Result<ToolsetFields, TranslateError> {
        let scraped = flags::scrape(&target.cflags).map_err(|flag| {
            TranslateError::MalformedFlags {
                flag,
                label: paths.label().to_owned(),
            }
        })?;
        let mut include_dirs = paths.rewrite_all(&target.include_dirs)?;
        for dir in &scraped.include_dirs {
            let corrected = (self.config.hooks.include_dir)(paths.build, dir.as_str());
            include_dirs.push(paths.rewrite(&corrected)?);
        }
        let libraries: Vec<String> = target
            .libs
            .iter()
            .map(|lib| paths.library(lib))
            .collect::<Result<_, _>>()?;
        Ok(ToolsetFields {
            include_dirs,
            defines: target.defines.clone(),
            cflags: scraped.cflags,
            ldflags: target.ldflags.clone(),
            sources: Vec::new(),
            link_settings: LinkSettings {
                libraries,
                library_dirs: paths.rewrite_all(&target.lib_dirs)?,
            },
            actions: Vec::new(),
        })
    }
}

/// Reference `name` built for `toolset` from a target in `from_group`.
fn qualify(name: &str, name_group: &str, from_group: &str, toolset: Toolset) -> String {
    if name_group == from_group {
        format!("{name}#{toolset}")
    } else {
        format!("{name_group}.gyp:{name}#{toolset}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("//base:base", "base_base")]
    #[case("//:default", "_default")]
    #[case("//a/b:c(//tc:host)", "a_b_c")]
    #[case("//x:y+z", "x_y_z")]
    fn flatten_cases(#[case] raw: &str, #[case] expected: &str) {
        let label = Label::parse(raw).expect("label");
        assert_eq!(flatten_name(&label), expected);
    }

    #[rstest]
    #[case("base_base#host", "base_base")]
    #[case("other.gyp:x#target", "other.gyp:x")]
    #[case("plain", "plain")]
    fn strip_toolset_cases(#[case] dependency: &str, #[case] expected: &str) {
        assert_eq!(strip_toolset(dependency), expected);
    }

    #[rstest]
    fn qualify_prefixes_foreign_groups() {
        assert_eq!(qualify("a", "g", "g", Toolset::Host), "a#host");
        assert_eq!(qualify("a", "g", "h", Toolset::Target), "g.gyp:a#target");
    }
}

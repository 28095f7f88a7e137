//! Builders for raw targets, projects and configurations.

use gn2gyp::config::{Config, Settings, ToolchainTable, Toolset};
use gn2gyp::label::Label;
use gn2gyp::model::{Build, DEFAULT_ROOT_TARGET, Project, Target, TargetKind};
use indexmap::IndexMap;

/// Default toolchain of every fixture build.
pub const TARGET_TOOLCHAIN: &str = "//build/toolchain:clang";
/// Toolchain for tools run during the build.
pub const HOST_TOOLCHAIN: &str = "//build/toolchain:host";
/// Build directory used by fixtures.
pub const BUILD: &str = "Release";

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_owned()).collect()
}

/// Fluent builder for [`Target`].
#[derive(Debug, Clone)]
pub struct TargetBuilder {
    target: Target,
}

impl TargetBuilder {
    /// Start a target of `kind` in [`TARGET_TOOLCHAIN`].
    pub fn new(kind: TargetKind) -> Self {
        Self {
            target: Target::new(kind, TARGET_TOOLCHAIN),
        }
    }

    /// Evaluate the target in `toolchain`.
    pub fn toolchain(mut self, toolchain: &str) -> Self {
        toolchain.clone_into(&mut self.target.toolchain);
        self
    }

    /// Set dependencies; each must be a valid label.
    pub fn deps(mut self, deps: &[&str]) -> Self {
        self.target.deps = deps
            .iter()
            .map(|dep| Label::parse(dep).expect("dependency label"))
            .collect();
        self
    }

    /// Set sources.
    pub fn sources(mut self, sources: &[&str]) -> Self {
        self.target.sources = owned(sources);
        self
    }

    /// Set extra inputs.
    pub fn inputs(mut self, inputs: &[&str]) -> Self {
        self.target.inputs = owned(inputs);
        self
    }

    /// Set declared outputs.
    pub fn outputs(mut self, outputs: &[&str]) -> Self {
        self.target.outputs = owned(outputs);
        self
    }

    /// Set the script.
    pub fn script(mut self, script: &str) -> Self {
        self.target.script = Some(script.to_owned());
        self
    }

    /// Set script arguments.
    pub fn args(mut self, args: &[&str]) -> Self {
        self.target.args = owned(args);
        self
    }

    /// Set compiler flags.
    pub fn cflags(mut self, cflags: &[&str]) -> Self {
        self.target.cflags = owned(cflags);
        self
    }

    /// Set include directories.
    pub fn include_dirs(mut self, dirs: &[&str]) -> Self {
        self.target.include_dirs = owned(dirs);
        self
    }

    /// Set preprocessor definitions.
    pub fn defines(mut self, defines: &[&str]) -> Self {
        self.target.defines = owned(defines);
        self
    }

    /// Set libraries.
    pub fn libs(mut self, libs: &[&str]) -> Self {
        self.target.libs = owned(libs);
        self
    }

    /// Set library directories.
    pub fn lib_dirs(mut self, dirs: &[&str]) -> Self {
        self.target.lib_dirs = owned(dirs);
        self
    }

    /// Set linker flags.
    pub fn ldflags(mut self, flags: &[&str]) -> Self {
        self.target.ldflags = owned(flags);
        self
    }

    /// Finish the target.
    pub fn build(self) -> Target {
        self.target
    }
}

/// The root group of a build, depending on `deps`.
pub fn root(deps: &[&str]) -> (String, Target) {
    (
        DEFAULT_ROOT_TARGET.to_owned(),
        TargetBuilder::new(TargetKind::Group).deps(deps).build(),
    )
}

/// A project with one build per entry; each entry lists raw label and
/// target pairs and must include a [`root`].
pub fn project(builds: Vec<(&str, Vec<(String, Target)>)>) -> Project {
    let mut project = Project::new();
    for (name, targets) in builds {
        let indexed: IndexMap<String, Target> = targets.into_iter().collect();
        project
            .add_build(Build::new(name, indexed).expect("build"))
            .expect("unique build");
    }
    project
}

/// Settings translating `root` in [`BUILD`], mapping [`TARGET_TOOLCHAIN`]
/// to the target toolset and [`HOST_TOOLCHAIN`] to the host toolset.
pub fn settings(root: &str) -> Settings {
    Settings::new(
        Label::parse(root).expect("root label"),
        BUILD,
        ToolchainTable::new([
            (TARGET_TOOLCHAIN, Toolset::Target),
            (HOST_TOOLCHAIN, Toolset::Host),
        ]),
    )
}

/// Default-hook configuration over [`settings`].
pub fn config(root: &str) -> Config {
    Config::from_settings(settings(root))
}

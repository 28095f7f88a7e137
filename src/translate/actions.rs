//! Actions synthesised for script, copy and placeholder targets.

use camino::Utf8Path;
use itertools::Itertools;

use super::{PathContext, TranslateError, paths::SHARED_INTERMEDIATE_DIR};
use crate::config::{Hooks, Settings, Toolset};
use crate::gyp::{Fragment, GypAction, GypKind, ToolsetFields};
use crate::model::Target;

/// Name of the shared target generating the placeholder source.
pub const PLACEHOLDER_TARGET: &str = "gn2gyp_placeholder_source";

/// Extensions of files a compiler turns into objects.
const COMPILED_EXTENSIONS: &[&str] = &["c", "cc", "cpp", "cxx", "m", "mm", "s", "S", "asm"];

/// Path of the empty source injected into libraries without sources.
#[must_use]
pub fn placeholder_source() -> String {
    format!("{SHARED_INTERMEDIATE_DIR}/{PLACEHOLDER_TARGET}.cc")
}

/// Whether `source` is compiled rather than merely listed.
pub(crate) fn is_compiled(source: &str) -> bool {
    Utf8Path::new(source)
        .extension()
        .is_some_and(|ext| COMPILED_EXTENSIONS.contains(&ext))
}

/// One action running the target's script.
pub(crate) fn script_action(
    target_name: &str,
    target: &Target,
    paths: &PathContext<'_>,
    settings: &Settings,
    hooks: &Hooks,
) -> Result<GypAction, TranslateError> {
    let script = target
        .script
        .as_deref()
        .filter(|script| !script.is_empty())
        .ok_or_else(|| TranslateError::MissingScript {
            label: paths.label().to_owned(),
        })?;
    let script_path = paths.rewrite(script)?;
    let mut inputs = vec![script_path.clone()];
    inputs.extend(paths.rewrite_all(&target.inputs)?);
    inputs.extend(paths.rewrite_all(&target.sources)?);
    let mut action = vec![settings.script_interpreter.clone(), script_path];
    action.extend(hooks.correct_script_args(script, &target.args));
    Ok(GypAction {
        action_name: format!("{target_name}_action"),
        inputs,
        outputs: paths.rewrite_all(&target.outputs)?,
        action,
    })
}

/// One action copying the target's sources to its outputs.
///
/// A single source is copied to its output path; several sources are
/// copied into the directory shared by every output.
pub(crate) fn copy_action(
    target_name: &str,
    target: &Target,
    paths: &PathContext<'_>,
    settings: &Settings,
) -> Result<GypAction, TranslateError> {
    let name = format!("{target_name}_copy");
    let sources = paths.rewrite_all(&target.sources)?;
    let outputs = paths.rewrite_all(&target.outputs)?;
    if let ([source], [output]) = (sources.as_slice(), outputs.as_slice()) {
        return Ok(GypAction::copy(name, &settings.copy_command, source, output));
    }
    let destination = outputs
        .iter()
        .map(|output| Utf8Path::new(output).parent())
        .all_equal_value()
        .ok()
        .flatten()
        .filter(|_| sources.len() == outputs.len())
        .ok_or_else(|| TranslateError::NotImplemented {
            label: paths.label().to_owned(),
            what: "copy whose outputs do not share one directory".to_owned(),
        })?
        .to_string();
    let mut action = settings.copy_command.clone();
    action.extend(sources.iter().cloned());
    action.push(destination);
    Ok(GypAction {
        action_name: name,
        inputs: sources,
        outputs,
        action,
    })
}

/// The placeholder generator as translated for `toolset`.
#[must_use]
pub fn placeholder_fragment(toolset: Toolset, settings: &Settings) -> Fragment {
    let source = placeholder_source();
    let action = GypAction {
        action_name: "generate_placeholder_source".to_owned(),
        inputs: Vec::new(),
        outputs: vec![source.clone()],
        action: vec![
            settings.script_interpreter.clone(),
            "-c".to_owned(),
            "import sys; open(sys.argv[1], 'a').close()".to_owned(),
            source,
        ],
    };
    Fragment {
        target_name: PLACEHOLDER_TARGET.to_owned(),
        kind: GypKind::None,
        toolset,
        dependencies: Vec::new(),
        fields: ToolsetFields {
            actions: vec![action],
            ..ToolsetFields::default()
        },
        outputs: Vec::new(),
    }
}

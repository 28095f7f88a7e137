//! Proxy expansion for executables and static libraries.
//!
//! GYP decides where a binary lands, so an executable is built as
//! `<name>_proxy` and a `none` target under the original name copies the
//! product to the path GN declared. Static libraries get the same split,
//! with the wrapper re-exporting the proxy's settings instead of copying.

use std::collections::BTreeMap;

use super::MergeError;
use crate::config::Toolset;
use crate::gyp::{Fragment, GypAction, GypKind, GypTarget, TargetCondition, ToolsetFields};

const PROXY_SUFFIX: &str = "_proxy";

/// Rename `real` to its proxy name and return the wrapper's reference to it.
fn into_proxy(real: &mut GypTarget) -> (String, String) {
    let logical = std::mem::take(&mut real.target_name);
    real.target_name = format!("{logical}{PROXY_SUFFIX}");
    let reference = match real.toolsets.as_slice() {
        [toolset] => format!("{}#{toolset}", real.target_name),
        _ => real.target_name.clone(),
    };
    (logical, reference)
}

fn wrapper_target(name: String, toolsets: Vec<Toolset>, reference: String) -> GypTarget {
    GypTarget {
        target_name: name,
        kind: GypKind::None,
        toolsets,
        dependencies: vec![reference],
        export_dependent_settings: Vec::new(),
        fields: ToolsetFields::default(),
        target_conditions: Vec::new(),
    }
}

/// Split an executable into its proxy and a wrapper copying the product.
pub(super) fn expand_executable(
    mut real: GypTarget,
    fragments: &BTreeMap<Toolset, Fragment>,
    copy_command: &[String],
) -> Result<Vec<GypTarget>, MergeError> {
    let (logical, reference) = into_proxy(&mut real);
    let product = format!(
        "<(PRODUCT_DIR)/<(EXECUTABLE_PREFIX){}<(EXECUTABLE_SUFFIX)",
        real.target_name
    );
    let action_name = format!("copy_{}", real.target_name);

    let mut copies = Vec::with_capacity(fragments.len());
    for fragment in fragments.values() {
        let output = fragment
            .single_output()
            .ok_or_else(|| MergeError::OutputCount {
                target: logical.clone(),
                toolset: fragment.toolset,
                count: fragment.outputs.len(),
            })?;
        let action = GypAction::copy(action_name.as_str(), copy_command, &product, output);
        copies.push((fragment.toolset, action));
    }

    let mut wrapper = wrapper_target(logical, real.toolsets.clone(), reference);
    if copies.len() == 1 {
        wrapper.fields.actions = copies.into_iter().map(|(_, action)| action).collect();
    } else {
        wrapper.target_conditions = copies
            .into_iter()
            .map(|(toolset, action)| TargetCondition {
                toolset,
                fields: ToolsetFields {
                    actions: vec![action],
                    ..ToolsetFields::default()
                },
            })
            .collect();
    }
    Ok(vec![real, wrapper])
}

/// Split a static library into its proxy and a wrapper forwarding to it.
pub(super) fn expand_static_library(mut real: GypTarget) -> Vec<GypTarget> {
    let (logical, reference) = into_proxy(&mut real);
    let mut wrapper = wrapper_target(logical, real.toolsets.clone(), reference.clone());
    wrapper.export_dependent_settings = vec![reference];
    vec![real, wrapper]
}

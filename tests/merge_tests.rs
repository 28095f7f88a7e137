//! Tests for merging per-toolset fragments into GYP targets.

use gn2gyp::config::Toolset;
use gn2gyp::gyp::{Fragment, GypKind, GypTarget, ToolsetFields};
use gn2gyp::merge::{FragmentMerger, MergeError};
use gn2gyp::translate::PLACEHOLDER_TARGET;
use rstest::rstest;

fn copy_command() -> Vec<String> {
    vec!["cp".to_owned(), "-f".to_owned()]
}

fn fragment(kind: GypKind, toolset: Toolset) -> Fragment {
    Fragment {
        target_name: "base_base".into(),
        kind,
        toolset,
        dependencies: vec![format!("base_headers#{toolset}")],
        fields: ToolsetFields {
            sources: vec![format!("<(DEPTH)/base/{toolset}.cc")],
            defines: vec![format!("TOOLSET_{}", toolset.as_str().to_uppercase())],
            ..ToolsetFields::default()
        },
        outputs: Vec::new(),
    }
}

fn merge(fragments: Vec<Fragment>) -> Result<Vec<GypTarget>, MergeError> {
    let mut merger = FragmentMerger::new(&copy_command());
    for fragment in fragments {
        merger.add(fragment)?;
    }
    merger.finalize()
}

#[rstest]
fn single_toolset_is_emitted_flat() {
    let only = fragment(GypKind::None, Toolset::Target);
    let targets = merge(vec![only.clone()]).expect("merge");
    let [target] = targets.as_slice() else {
        panic!("expected one target, got {targets:?}");
    };
    assert_eq!(target.toolsets, vec![Toolset::Target]);
    assert_eq!(target.dependencies, only.dependencies);
    assert_eq!(target.fields, only.fields);
    assert!(target.target_conditions.is_empty());
}

#[rstest]
fn toolsets_branch_on_differing_fields() {
    let targets = merge(vec![
        fragment(GypKind::None, Toolset::Target),
        fragment(GypKind::None, Toolset::Host),
    ])
    .expect("merge");
    let [target] = targets.as_slice() else {
        panic!("expected one target, got {targets:?}");
    };
    assert_eq!(target.toolsets, vec![Toolset::Host, Toolset::Target]);
    assert_eq!(target.dependencies, vec!["base_headers"]);
    assert_eq!(target.fields, ToolsetFields::default());
    let expressions: Vec<_> = target
        .target_conditions
        .iter()
        .map(|condition| condition.expression())
        .collect();
    assert_eq!(
        expressions,
        vec![r#"_toolset=="host""#, r#"_toolset=="target""#]
    );
    let host = target.target_conditions.first().expect("host branch");
    assert_eq!(host.fields.sources, vec!["<(DEPTH)/base/host.cc"]);
    assert_eq!(host.fields.defines, vec!["TOOLSET_HOST"]);
}

#[rstest]
fn branched_targets_render_as_condition_pairs() {
    let targets = merge(vec![
        fragment(GypKind::None, Toolset::Host),
        fragment(GypKind::None, Toolset::Target),
    ])
    .expect("merge");
    let json = serde_json::to_value(&targets).expect("serialise");
    let condition = &json[0]["target_conditions"][1];
    assert_eq!(condition[0], r#"_toolset=="target""#);
    assert_eq!(condition[1]["sources"][0], "<(DEPTH)/base/target.cc");
}

#[rstest]
fn dependency_mismatch_fails() {
    let mut host = fragment(GypKind::None, Toolset::Host);
    host.dependencies.push("extra#host".into());
    let err = merge(vec![fragment(GypKind::None, Toolset::Target), host]).expect_err("mismatch");
    assert_eq!(
        err,
        MergeError::DependencyMismatch {
            target: "base_base".into(),
            first: Toolset::Host,
            other: Toolset::Target,
        }
    );
}

fn with_dependencies(toolset: Toolset, dependencies: &[&str]) -> Fragment {
    Fragment {
        dependencies: dependencies.iter().map(|dep| (*dep).to_owned()).collect(),
        ..fragment(GypKind::None, toolset)
    }
}

#[rstest]
fn fixed_toolset_dependencies_keep_their_suffix() {
    let targets = merge(vec![
        with_dependencies(Toolset::Host, &["tools_gen#host", "base#host"]),
        with_dependencies(Toolset::Target, &["tools_gen#host", "base#target"]),
    ])
    .expect("merge");
    let [target] = targets.as_slice() else {
        panic!("expected one target, got {targets:?}");
    };
    assert_eq!(target.dependencies, vec!["tools_gen#host", "base"]);
}

#[rstest]
#[case(&["tools_gen#host"], &["tools_gen#target"], vec!["tools_gen"])]
#[case(&["g.gyp:a#host"], &["g.gyp:a#target"], vec!["g.gyp:a"])]
#[case(&["g.gyp:a#target"], &["g.gyp:a#target"], vec!["g.gyp:a#target"])]
fn suffixes_are_dropped_only_when_each_names_its_own_toolset(
    #[case] host: &[&str],
    #[case] target: &[&str],
    #[case] expected: Vec<&str>,
) {
    let targets = merge(vec![
        with_dependencies(Toolset::Host, host),
        with_dependencies(Toolset::Target, target),
    ])
    .expect("merge");
    assert_eq!(targets[0].dependencies, expected);
}

#[rstest]
fn crossed_toolset_suffixes_fail() {
    let err = merge(vec![
        with_dependencies(Toolset::Host, &["tools_gen#target"]),
        with_dependencies(Toolset::Target, &["tools_gen#host"]),
    ])
    .expect_err("crossed suffixes");
    assert_eq!(
        err,
        MergeError::DependencyMismatch {
            target: "base_base".into(),
            first: Toolset::Host,
            other: Toolset::Target,
        }
    );
}

#[rstest]
fn placeholder_needed_by_one_toolset_is_shared() {
    let host = Fragment {
        dependencies: vec![
            "base_headers#host".to_owned(),
            format!("{PLACEHOLDER_TARGET}#host"),
        ],
        ..fragment(GypKind::StaticLibrary, Toolset::Host)
    };
    let target = Fragment {
        dependencies: vec!["base_headers#target".to_owned()],
        ..fragment(GypKind::StaticLibrary, Toolset::Target)
    };
    let targets = merge(vec![host, target]).expect("merge");
    let [proxy, _] = targets.as_slice() else {
        panic!("expected proxy and wrapper, got {targets:?}");
    };
    assert_eq!(proxy.dependencies, vec!["base_headers", PLACEHOLDER_TARGET]);
}

#[rstest]
fn type_mismatch_fails() {
    let err = merge(vec![
        fragment(GypKind::None, Toolset::Target),
        fragment(GypKind::SharedLibrary, Toolset::Host),
    ])
    .expect_err("mismatch");
    assert!(matches!(err, MergeError::FieldMismatch { field: "type", .. }));
}

#[rstest]
fn duplicate_toolset_fails() {
    let mut merger = FragmentMerger::new(&copy_command());
    merger
        .add(fragment(GypKind::None, Toolset::Host))
        .expect("first");
    let err = merger
        .add(fragment(GypKind::None, Toolset::Host))
        .expect_err("second");
    assert_eq!(
        err,
        MergeError::DuplicateToolset {
            target: "base_base".into(),
            toolset: Toolset::Host,
        }
    );
}

#[rstest]
fn empty_merger_fails() {
    let err = FragmentMerger::new(&copy_command())
        .finalize()
        .expect_err("empty");
    assert_eq!(err, MergeError::EmptyBuilder);
}

#[rstest]
fn executables_are_proxied_and_copied() {
    let mut exe = fragment(GypKind::Executable, Toolset::Target);
    exe.outputs = vec!["<(SHARED_INTERMEDIATE_DIR)/app".into()];
    let targets = merge(vec![exe]).expect("merge");
    let [real, wrapper] = targets.as_slice() else {
        panic!("expected proxy and wrapper, got {targets:?}");
    };
    assert_eq!(real.target_name, "base_base_proxy");
    assert_eq!(real.kind, GypKind::Executable);
    assert_eq!(wrapper.target_name, "base_base");
    assert_eq!(wrapper.kind, GypKind::None);
    assert_eq!(wrapper.dependencies, vec!["base_base_proxy#target"]);
    let [copy] = wrapper.fields.actions.as_slice() else {
        panic!("expected one copy, got {:?}", wrapper.fields.actions);
    };
    assert_eq!(
        copy.action,
        vec![
            "cp",
            "-f",
            "<(PRODUCT_DIR)/<(EXECUTABLE_PREFIX)base_base_proxy<(EXECUTABLE_SUFFIX)",
            "<(SHARED_INTERMEDIATE_DIR)/app",
        ]
    );
}

#[rstest]
fn multi_toolset_executables_copy_per_toolset() {
    let mut host = fragment(GypKind::Executable, Toolset::Host);
    host.outputs = vec!["<(SHARED_INTERMEDIATE_DIR)/host/app".into()];
    let mut target = fragment(GypKind::Executable, Toolset::Target);
    target.outputs = vec!["<(SHARED_INTERMEDIATE_DIR)/app".into()];
    let targets = merge(vec![host, target]).expect("merge");
    let [_, wrapper] = targets.as_slice() else {
        panic!("expected proxy and wrapper, got {targets:?}");
    };
    assert_eq!(wrapper.dependencies, vec!["base_base_proxy"]);
    assert!(wrapper.fields.actions.is_empty());
    let outputs: Vec<_> = wrapper
        .target_conditions
        .iter()
        .flat_map(|condition| condition.fields.actions.iter())
        .flat_map(|action| action.outputs.iter().cloned())
        .collect();
    assert_eq!(
        outputs,
        vec!["<(SHARED_INTERMEDIATE_DIR)/host/app", "<(SHARED_INTERMEDIATE_DIR)/app"]
    );
}

#[rstest]
#[case(Vec::new())]
#[case(vec!["a".to_owned(), "b".to_owned()])]
fn executables_need_exactly_one_output(#[case] outputs: Vec<String>) {
    let mut exe = fragment(GypKind::Executable, Toolset::Host);
    exe.outputs = outputs.clone();
    let err = merge(vec![exe]).expect_err("output count");
    assert_eq!(
        err,
        MergeError::OutputCount {
            target: "base_base".into(),
            toolset: Toolset::Host,
            count: outputs.len(),
        }
    );
}

#[rstest]
fn static_libraries_get_a_forwarding_wrapper() {
    let targets = merge(vec![fragment(GypKind::StaticLibrary, Toolset::Host)]).expect("merge");
    let [real, wrapper] = targets.as_slice() else {
        panic!("expected proxy and wrapper, got {targets:?}");
    };
    assert_eq!(real.target_name, "base_base_proxy");
    assert_eq!(real.kind, GypKind::StaticLibrary);
    assert_eq!(wrapper.kind, GypKind::None);
    assert_eq!(wrapper.dependencies, vec!["base_base_proxy#host"]);
    assert_eq!(wrapper.export_dependent_settings, wrapper.dependencies);
    assert!(wrapper.fields.actions.is_empty());
}

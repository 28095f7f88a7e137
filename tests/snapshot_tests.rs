//! Tests for concurrent snapshot construction.

use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use gn2gyp::label::Label;
use gn2gyp::model::{ModelError, Project, TargetKind};
use gn2gyp::snapshot::{RawTargets, SnapshotBuilder, SnapshotError, TargetQuery};
use mockall::mock;
use mockall::predicate::eq;
use rstest::{fixture, rstest};
use test_support::{HOST_TOOLCHAIN, RecordingQuery, TargetBuilder, project, root};
use tokio::sync::Semaphore;

mock! {
    Query {}

    #[async_trait]
    impl TargetQuery for Query {
        async fn describe(&self, build: &str, label: &str) -> anyhow::Result<RawTargets>;
    }
}

/// A diamond: the root and `//a` both reach `//c` through `//b`, and the
/// host tool `//tool` depends on the host variant of `//c`.
#[fixture]
fn diamond() -> Project {
    let host_tool = format!("//tool:tool({HOST_TOOLCHAIN})");
    let root_entry = root(&["//a:a", "//b:b", host_tool.as_str()]);
    let targets = vec![
        root_entry,
        (
            "//a:a".to_owned(),
            TargetBuilder::new(TargetKind::Group).deps(&["//b:b"]).build(),
        ),
        (
            "//b:b".to_owned(),
            TargetBuilder::new(TargetKind::Group).deps(&["//c:c"]).build(),
        ),
        ("//c:c".to_owned(), TargetBuilder::new(TargetKind::Group).build()),
        (
            format!("//c:c({HOST_TOOLCHAIN})"),
            TargetBuilder::new(TargetKind::Group)
                .toolchain(HOST_TOOLCHAIN)
                .build(),
        ),
        (
            host_tool,
            TargetBuilder::new(TargetKind::Executable)
                .toolchain(HOST_TOOLCHAIN)
                .deps(&["//c:c"])
                .build(),
        ),
    ];
    project(vec![("Release", targets.clone()), ("Debug", targets)])
}

fn builds() -> Vec<String> {
    vec!["Release".to_owned(), "Debug".to_owned()]
}

fn roots() -> Vec<Label> {
    vec![Label::parse("//a:a").expect("label")]
}

#[rstest]
#[tokio::test]
async fn fetched_project_matches_source(diamond: Project) {
    let query = Arc::new(RecordingQuery::new(&diamond));
    let fetched = SnapshotBuilder::new(query)
        .build(&builds(), &roots())
        .await
        .expect("snapshot");
    for build in diamond.builds() {
        let copy = fetched.build(build.name()).expect("build");
        assert_eq!(copy.default_toolchain(), build.default_toolchain());
        let mut expected: Vec<_> = build.targets().keys().collect();
        let mut actual: Vec<_> = copy.targets().keys().collect();
        expected.sort();
        actual.sort();
        assert_eq!(actual, expected);
    }
}

#[rstest]
#[tokio::test]
async fn each_label_is_described_once_per_build(diamond: Project) {
    let query = Arc::new(RecordingQuery::new(&diamond).with_delay(Duration::from_millis(5)));
    SnapshotBuilder::new(Arc::clone(&query) as Arc<dyn TargetQuery>)
        .build(&builds(), &roots())
        .await
        .expect("snapshot");
    for build in builds() {
        for label in ["//:default", "//a:a", "//b:b", "//c:c", "//tool:tool"] {
            assert_eq!(query.calls_for(&build, label), 1, "{label} in {build}");
        }
    }
    assert_eq!(query.calls().len(), 10);
}

#[rstest]
#[tokio::test]
async fn limiter_bounds_concurrent_queries(diamond: Project) {
    let query = Arc::new(RecordingQuery::new(&diamond).with_delay(Duration::from_millis(10)));
    SnapshotBuilder::new(Arc::clone(&query) as Arc<dyn TargetQuery>)
        .with_limiter(Arc::new(Semaphore::new(2)))
        .build(&builds(), &roots())
        .await
        .expect("snapshot");
    assert!(query.peak_concurrency() <= 2);
    assert!(query.peak_concurrency() >= 1);
}

#[rstest]
#[tokio::test]
async fn failing_query_aborts_construction(diamond: Project) {
    let query = Arc::new(RecordingQuery::new(&diamond).failing_on("//c:c"));
    let err = SnapshotBuilder::new(query)
        .build(&builds(), &roots())
        .await
        .expect_err("query failure");
    assert!(matches!(err, SnapshotError::Query { label, .. } if label == "//c:c"));
}

#[rstest]
#[tokio::test]
async fn closed_limiter_fails() {
    let limiter = Arc::new(Semaphore::new(1));
    limiter.close();
    let mut query = MockQuery::new();
    query.expect_describe().never();
    let err = SnapshotBuilder::new(Arc::new(query))
        .with_limiter(limiter)
        .build(&["Release".to_owned()], &[])
        .await
        .expect_err("closed limiter");
    assert!(matches!(err, SnapshotError::LimiterClosed));
}

#[rstest]
#[tokio::test]
async fn root_target_is_always_described() {
    let mut query = MockQuery::new();
    query
        .expect_describe()
        .with(eq("Release"), eq("//:default"))
        .times(1)
        .returning(|_, _| {
            let (raw, target) = root(&[]);
            Ok(RawTargets::from([(raw, target)]))
        });
    let fetched = SnapshotBuilder::new(Arc::new(query))
        .build(&["Release".to_owned()], &[])
        .await
        .expect("snapshot");
    assert_eq!(fetched.build("Release").expect("build").targets().len(), 1);
}

#[rstest]
#[tokio::test]
async fn query_errors_keep_their_cause() {
    let mut query = MockQuery::new();
    query
        .expect_describe()
        .returning(|_, _| Err(anyhow!("gn exited with status 1")));
    let err = SnapshotBuilder::new(Arc::new(query))
        .build(&["Release".to_owned()], &[])
        .await
        .expect_err("query failure");
    let source = std::error::Error::source(&err).expect("source");
    assert_eq!(source.to_string(), "gn exited with status 1");
}

#[rstest]
#[tokio::test]
async fn malformed_labels_in_answers_fail() {
    let mut query = MockQuery::new();
    query.expect_describe().returning(|_, _| {
        let (_, target) = root(&[]);
        Ok(RawTargets::from([("not-a-label".to_owned(), target)]))
    });
    let err = SnapshotBuilder::new(Arc::new(query))
        .build(&["Release".to_owned()], &[])
        .await
        .expect_err("malformed label");
    assert!(matches!(err, SnapshotError::Label(_)));
}

#[rstest]
#[tokio::test]
async fn duplicate_builds_are_rejected() {
    let mut query = MockQuery::new();
    query.expect_describe().never();
    let err = SnapshotBuilder::new(Arc::new(query))
        .build(&["Release".to_owned(), "Release".to_owned()], &[])
        .await
        .expect_err("duplicate build");
    assert!(matches!(
        err,
        SnapshotError::Model(ModelError::DuplicateBuild { build }) if build == "Release"
    ));
}

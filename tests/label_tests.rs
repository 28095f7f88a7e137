//! Tests for parsing and formatting GN labels.

use gn2gyp::label::{Label, LabelError};
use rstest::rstest;

#[rstest]
#[case("//base:base")]
#[case("//:default")]
#[case("//third_party/zlib:zlib(//build/toolchain:host)")]
#[case("//tools/gn:gn+extra")]
fn formatting_reproduces_input(#[case] raw: &str) {
    let label = Label::parse(raw).expect("parse");
    assert_eq!(label.to_string(), raw);
    assert_eq!(Label::parse(&label.to_string()).expect("reparse"), label);
}

#[rstest]
fn parts_are_exposed() {
    let label: Label = "//a/b:c(//tc:host)".parse().expect("parse");
    assert_eq!(label.path(), "a/b");
    assert_eq!(label.name(), "c");
    assert_eq!(label.toolchain(), Some("//tc:host"));
}

#[rstest]
#[case("base:base")]
#[case("/base:base")]
#[case("//base")]
#[case("//base:")]
#[case("//base:base(//tc:host")]
#[case("//base:base(//tc:host)x")]
#[case("")]
fn malformed_labels_fail(#[case] raw: &str) {
    let err = Label::parse(raw).expect_err("malformed");
    assert!(matches!(err, LabelError::Malformed { label, .. } if label == raw));
}

#[rstest]
fn toolchain_qualifier_can_be_swapped() {
    let label = Label::parse("//base:base(//tc:host)").expect("parse");
    let bare = label.without_toolchain();
    assert_eq!(bare.to_string(), "//base:base");
    assert_eq!(
        bare.with_toolchain("//tc:arm").to_string(),
        "//base:base(//tc:arm)"
    );
}

#[rstest]
#[case("//base:base(//tc:host)", "//base", true)]
#[case("//base:base(//tc:host)", "//tc", false)]
#[case("//basement:x", "//base:", false)]
fn prefixes_match_the_unqualified_form(
    #[case] raw: &str,
    #[case] prefix: &str,
    #[case] expected: bool,
) {
    let label = Label::parse(raw).expect("parse");
    assert_eq!(label.starts_with(prefix), expected);
}

#[rstest]
fn labels_serialise_as_strings() {
    let label = Label::parse("//a:b(//tc:host)").expect("parse");
    let json = serde_json::to_string(&label).expect("serialise");
    assert_eq!(json, r#""//a:b(//tc:host)""#);
    let back: Label = serde_json::from_str(&json).expect("deserialise");
    assert_eq!(back, label);
}

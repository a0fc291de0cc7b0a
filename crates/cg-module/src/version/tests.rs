//! Unit tests for version parsing and compatibility.

use rstest::rstest;

use super::*;

#[rstest]
#[case::full("1.2.3", Version::new(1, 2, 3))]
#[case::prefixed("v0.5.1", Version::new(0, 5, 1))]
#[case::major_minor("0.5", Version::new(0, 5, 0))]
#[case::major_only("3", Version::new(3, 0, 0))]
#[case::padded(" 2.1 ", Version::new(2, 1, 0))]
fn parses_accepted_forms(#[case] input: &str, #[case] expected: Version) {
    assert_eq!(input.parse::<Version>().expect("parse"), expected);
}

#[rstest]
#[case::empty("")]
#[case::bare_prefix("v")]
#[case::four_parts("1.2.3.4")]
#[case::non_numeric("1.x")]
#[case::negative("-1.0")]
#[case::trailing_dot("1.")]
fn rejects_malformed_input(#[case] input: &str) {
    assert!(input.parse::<Version>().is_err(), "'{input}' should not parse");
}

#[test]
fn too_many_components_reports_input() {
    let err = "1.2.3.4".parse::<Version>().expect_err("should fail");
    assert_eq!(err, VersionParseError::TooManyComponents("1.2.3.4".into()));
}

#[test]
fn display_always_renders_three_components() {
    assert_eq!(Version::new(0, 5, 0).to_string(), "0.5.0");
}

#[test]
fn ordering_follows_components() {
    let mut versions = vec![
        Version::new(1, 0, 0),
        Version::new(0, 10, 0),
        Version::new(0, 9, 12),
    ];
    versions.sort();
    assert_eq!(
        versions,
        vec![
            Version::new(0, 9, 12),
            Version::new(0, 10, 0),
            Version::new(1, 0, 0)
        ]
    );
}

#[rstest]
#[case::same_major(Version::new(1, 0, 0), Version::new(1, 4, 2), true)]
#[case::different_major(Version::new(1, 0, 0), Version::new(2, 0, 0), false)]
#[case::zero_same_minor(Version::new(0, 5, 0), Version::new(0, 5, 9), true)]
#[case::zero_different_minor(Version::new(0, 5, 0), Version::new(0, 4, 0), false)]
fn compatibility_rules(#[case] left: Version, #[case] right: Version, #[case] expected: bool) {
    assert_eq!(left.is_compatible_with(&right), expected);
}

#[test]
fn serialises_as_string() {
    let json = serde_json::to_string(&Version::new(0, 2, 1)).expect("serialise");
    assert_eq!(json, "\"0.2.1\"");
}

#[test]
fn deserialises_short_form() {
    let version: Version = serde_json::from_str("\"v1.3\"").expect("deserialise");
    assert_eq!(version, Version::new(1, 3, 0));
}

#[test]
fn deserialise_rejects_invalid_string() {
    let result = serde_json::from_str::<Version>("\"one\"");
    assert!(result.is_err());
}

//! Integration tests for model reply parsing against recorded fixtures.

mod common;

use common::{read_fixture, reply_fixture};
use gauthor::analysis::parse_classification;
use gauthor::error::ModelError;
use gauthor::report::Category;

#[test]
fn test_canonical_reply() {
    let map = parse_classification(&read_fixture(reply_fixture("canonical.md"))).unwrap();

    assert_eq!(
        map.get(Category::Features),
        [
            "Add `--format json` output for reports",
            "Support bounded parallel classification with `--jobs`"
        ]
    );
    assert_eq!(map.get(Category::Bugfixes), ["Fix panic when HEAD is unborn"]);
    assert!(map.get(Category::Docs).is_empty());
    assert_eq!(map.get(Category::Refactor), ["Extract reply parsing into its own module"]);
    assert_eq!(map.get(Category::Infra), ["Cache cargo registry in CI"]);
}

#[test]
fn test_decorated_reply_with_unknown_section() {
    let map = parse_classification(&read_fixture(reply_fixture("decorated.md"))).unwrap();

    assert_eq!(
        map.get(Category::Features),
        ["Add streaming export of large reports", "Allow filtering by author email"]
    );
    assert_eq!(map.get(Category::Bugfixes), ["Correct off-by-one error in pagination"]);
    assert!(map.get(Category::Docs).is_empty());
    assert_eq!(
        map.get(Category::Refactor),
        ["Replace hand-written retry loop with backoff crate"]
    );
    assert_eq!(map.get(Category::Infra), ["Pin toolchain to 1.85"]);

    let all: Vec<&String> = map.iter().flat_map(|(_, bullets)| bullets).collect();
    assert!(!all.iter().any(|b| b.contains("signing key")));
}

#[test]
fn test_json_object_reply() {
    let map = parse_classification(&read_fixture(reply_fixture("json_object.md"))).unwrap();

    assert_eq!(map.get(Category::Features), ["Add exporter plugin API"]);
    assert_eq!(map.get(Category::Docs), ["Document plugin lifecycle"]);
    assert!(map.get(Category::Refactor).is_empty());
    assert_eq!(
        map.get(Category::Infra),
        ["Add release workflow", "Enable dependabot"]
    );
}

#[test]
fn test_prose_reply_is_unparseable() {
    let result = parse_classification(&read_fixture(reply_fixture("prose_only.md")));
    assert!(matches!(result, Err(ModelError::UnparseableReply(_))));
}

#[test]
fn test_counted_headers_with_lead_in_lines() {
    let map = parse_classification(&read_fixture(reply_fixture("counted_headers.md"))).unwrap();

    assert_eq!(
        map.get(Category::Features),
        ["Add incremental report cache", "Support `--since` date filter"]
    );
    assert_eq!(
        map.get(Category::Bugfixes),
        ["Fix: handle detached HEAD when walking history"]
    );
    assert!(map.get(Category::Docs).is_empty());
    assert_eq!(
        map.get(Category::Refactor),
        ["Fix:", "Move batching into its own module"]
    );
    assert_eq!(
        map.get(Category::Infra),
        ["Build release binaries for aarch64", "Cache cargo registry in CI"]
    );
}

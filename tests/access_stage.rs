//! Stage integration tests
//!
//! Each test copies a fixture project into a temp directory, runs the stage
//! against it, and asserts on the rewritten config.xml.

mod fixtures;

use std::collections::BTreeMap;

use cordova_access::{
    AccessStage, OriginAction, OriginRequest, OriginValue, ProjectItem,
};
use fixtures::{copy_project, lines, project_with, read_config};

// =============================================================================
// Test Helpers
// =============================================================================

fn attrs(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

async fn apply(dir: &tempfile::TempDir, request: OriginRequest) -> cordova_access::ApplyReport {
    AccessStage::new(request)
        .process(ProjectItem::new(dir.path()))
        .await
        .expect("stage should succeed")
        .report
}

// =============================================================================
// Removal
// =============================================================================

#[tokio::test]
async fn test_remove_origin_set_to_false() {
    let dir = copy_project("minimal");

    apply(&dir, OriginRequest::single("*", false).unwrap()).await;

    let expected = lines(&[
        "<?xml version='1.0' encoding='utf-8'?>",
        "<widget>",
        "</widget>",
    ]);
    assert_eq!(read_config(&dir), expected);
}

#[tokio::test]
async fn test_remove_absent_origin_leaves_file_byte_identical() {
    let dir = copy_project("hello");
    let before = read_config(&dir);

    let request = OriginRequest::from_entries(vec![
        ("http://not-declared.example", OriginValue::Remove),
        ("tel:*", OriginValue::Remove),
    ])
    .unwrap();
    let report = apply(&dir, request).await;

    assert!(!report.written);
    assert_eq!(report.reconcile.count(OriginAction::Absent), 2);
    assert_eq!(read_config(&dir), before);
}

#[tokio::test]
async fn test_remove_only_the_named_entry() {
    let dir = project_with(
        "<widget><access origin=\"*\" /><access origin=\"http://a.com\" /></widget>",
    );

    apply(&dir, OriginRequest::single("*", false).unwrap()).await;

    let expected = lines(&[
        "<?xml version='1.0' encoding='utf-8'?>",
        "<widget>",
        "    <access origin=\"http://a.com\" />",
        "</widget>",
    ]);
    assert_eq!(read_config(&dir), expected);
}

// =============================================================================
// Addition
// =============================================================================

#[tokio::test]
async fn test_add_origin_after_existing() {
    let dir = project_with("<widget><access origin=\"*\" /></widget>");

    let report = apply(&dir, OriginRequest::single("http://www.google.com", true).unwrap()).await;

    assert!(report.written);
    let expected = lines(&[
        "<?xml version='1.0' encoding='utf-8'?>",
        "<widget>",
        "    <access origin=\"*\" />",
        "    <access origin=\"http://www.google.com\" />",
        "</widget>",
    ]);
    assert_eq!(read_config(&dir), expected);
}

#[tokio::test]
async fn test_add_origin_with_attributes_sorted() {
    let dir = project_with("<widget></widget>");

    apply(&dir, OriginRequest::single("X", attrs(&[("k", "v")])).unwrap()).await;

    assert!(read_config(&dir).contains("<access k=\"v\" origin=\"X\" />"));
}

#[tokio::test]
async fn test_remove_and_add_in_one_request() {
    let dir = copy_project("minimal");

    let request = OriginRequest::from_entries(vec![
        ("*", OriginValue::Remove),
        ("Y", OriginValue::AddDefault),
    ])
    .unwrap();
    apply(&dir, request).await;

    let expected = lines(&[
        "<?xml version='1.0' encoding='utf-8'?>",
        "<widget>",
        "    <access origin=\"Y\" />",
        "</widget>",
    ]);
    assert_eq!(read_config(&dir), expected);
}

#[tokio::test]
async fn test_two_additions_keep_request_order() {
    let dir = copy_project("minimal");

    let request = OriginRequest::from_entries(vec![
        ("Y", OriginValue::AddDefault),
        ("Z", OriginValue::from(attrs(&[("a", "b")]))),
    ])
    .unwrap();
    apply(&dir, request).await;

    let expected = lines(&[
        "<?xml version='1.0' encoding='utf-8'?>",
        "<widget>",
        "    <access origin=\"*\" />",
        "    <access origin=\"Y\" />",
        "    <access a=\"b\" origin=\"Z\" />",
        "</widget>",
    ]);
    assert_eq!(read_config(&dir), expected);
}

#[tokio::test]
async fn test_add_preserves_unrelated_content() {
    let dir = copy_project("hello");

    let request =
        OriginRequest::single("tel:*", attrs(&[("launch-external", "yes")])).unwrap();
    apply(&dir, request).await;

    let expected = lines(&[
        "<?xml version='1.0' encoding='utf-8'?>",
        "<widget id=\"io.cordova.hellocordova\" version=\"1.0.0\" xmlns=\"http://www.w3.org/ns/widgets\" xmlns:cdv=\"http://cordova.apache.org/ns/1.0\">",
        "    <name>HelloCordova</name>",
        "    <description>A sample Apache Cordova application that responds to the deviceready event.</description>",
        "    <author email=\"dev@cordova.apache.org\" href=\"http://cordova.io\">Apache Cordova Team</author>",
        "    <content src=\"index.html\" />",
        "    <!-- Allow network requests to any origin -->",
        "    <access origin=\"*\" />",
        "    <allow-intent href=\"http://*/*\" />",
        "    <allow-intent href=\"https://*/*\" />",
        "    <platform name=\"android\">",
        "        <allow-intent href=\"market:*\" />",
        "    </platform>",
        "    <platform name=\"ios\">",
        "        <allow-intent href=\"itms:*\" />",
        "        <allow-intent href=\"itms-apps:*\" />",
        "    </platform>",
        "    <access launch-external=\"yes\" origin=\"tel:*\" />",
        "</widget>",
    ]);
    assert_eq!(read_config(&dir), expected);
}

#[tokio::test]
async fn test_add_keeps_whitespace_only_element_text() {
    let dir = project_with(
        "<widget>\n    <description> </description>\n    <access origin=\"*\" />\n</widget>\n",
    );

    apply(&dir, OriginRequest::single("Y", true).unwrap()).await;

    let expected = lines(&[
        "<?xml version='1.0' encoding='utf-8'?>",
        "<widget>",
        "    <description> </description>",
        "    <access origin=\"*\" />",
        "    <access origin=\"Y\" />",
        "</widget>",
    ]);
    assert_eq!(read_config(&dir), expected);
}

// =============================================================================
// Update and idempotence
// =============================================================================

#[tokio::test]
async fn test_set_existing_origin_updates_in_place() {
    let dir = project_with(
        "<widget><access origin=\"tel:*\" /><access origin=\"*\" /></widget>",
    );

    let request =
        OriginRequest::single("tel:*", attrs(&[("launch-external", "yes")])).unwrap();
    let report = apply(&dir, request).await;

    assert_eq!(report.reconcile.outcomes[0].action, OriginAction::Updated);
    let expected = lines(&[
        "<?xml version='1.0' encoding='utf-8'?>",
        "<widget>",
        "    <access launch-external=\"yes\" origin=\"tel:*\" />",
        "    <access origin=\"*\" />",
        "</widget>",
    ]);
    assert_eq!(read_config(&dir), expected);
}

#[tokio::test]
async fn test_applying_twice_is_idempotent() {
    let dir = copy_project("hello");
    let request = OriginRequest::from_entries(vec![
        ("*", OriginValue::Remove),
        ("https://api.example.com", OriginValue::AddDefault),
        (
            "tel:*",
            OriginValue::from(attrs(&[("launch-external", "yes")])),
        ),
    ])
    .unwrap();

    let first = apply(&dir, request.clone()).await;
    let after_first = read_config(&dir);

    let second = apply(&dir, request).await;
    let after_second = read_config(&dir);

    assert!(first.written);
    assert!(!second.written);
    assert_eq!(after_first, after_second);
    assert_eq!(first.digest_after, second.digest_before);
}

#[tokio::test]
async fn test_empty_request_is_noop() {
    let dir = copy_project("minimal");
    let before = read_config(&dir);

    let report = apply(&dir, OriginRequest::new()).await;

    assert!(!report.written);
    assert!(report.reconcile.outcomes.is_empty());
    assert_eq!(read_config(&dir), before);
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn test_missing_root_fails_and_leaves_file_unchanged() {
    let dir = copy_project("no-root");
    let before = read_config(&dir);

    let result = AccessStage::new(OriginRequest::single("*", false).unwrap())
        .process(ProjectItem::new(dir.path()))
        .await;

    let error = result.unwrap_err();
    assert_eq!(error.plugin(), "cordova-access");
    assert!(error.message().contains("widget"));
    assert_eq!(read_config(&dir), before);
}

#[tokio::test]
async fn test_malformed_xml_fails_and_leaves_file_unchanged() {
    let contents = "<widget><access origin=\"*\"></widget>";
    let dir = project_with(contents);

    let result = AccessStage::new(OriginRequest::single("Y", true).unwrap())
        .process(ProjectItem::new(dir.path()))
        .await;

    assert!(result.is_err());
    assert_eq!(read_config(&dir), contents);
}

#[tokio::test]
async fn test_missing_config_file_fails() {
    let dir = tempfile::TempDir::new().unwrap();

    let result = AccessStage::new(OriginRequest::single("*", true).unwrap())
        .process(ProjectItem::new(dir.path()))
        .await;

    assert!(result.is_err());
    assert!(!dir.path().join("config.xml").exists());
}

// =============================================================================
// Independent invocations
// =============================================================================

#[tokio::test]
async fn test_concurrent_items_use_independent_documents() {
    let first = copy_project("minimal");
    let second = copy_project("minimal");
    let stage = AccessStage::new(OriginRequest::single("Y", true).unwrap());

    let (a, b) = tokio::join!(
        stage.process(ProjectItem::new(first.path())),
        stage.process(ProjectItem::new(second.path())),
    );

    assert!(a.unwrap().report.written);
    assert!(b.unwrap().report.written);
    assert_eq!(read_config(&first), read_config(&second));
}

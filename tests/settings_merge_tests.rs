//! Settings merge tests against real files.
//!
//! Covers fallback on missing/broken files, preservation of unrelated
//! content and idempotent server insertion.

use maven_feed_auth::{
    merge_credentials_into_settings_xml, read_settings, xml, Diagnostic, Node, RepositoryEntry,
    Value, SETTINGS_NAMESPACE,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn repos(ids: &[&str]) -> Vec<RepositoryEntry> {
    ids.iter().map(|id| RepositoryEntry::new(*id)).collect()
}

fn settings_node(document: &Node) -> &Node {
    document.get("settings").and_then(Value::as_node).unwrap()
}

fn server_ids(path: &Path) -> Vec<String> {
    let document = read_settings(path).unwrap();
    settings_node(&document)
        .get("servers")
        .and_then(Value::as_node)
        .and_then(|s| s.get("server"))
        .map(|servers| {
            servers
                .items()
                .iter()
                .filter_map(Value::id)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

// =============================================================================
// No repositories
// =============================================================================

#[test]
fn test_empty_repositories_does_not_create_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("settings.xml");

    let report = merge_credentials_into_settings_xml(&path, &[]).unwrap();

    assert!(!report.written);
    assert!(!path.exists());
}

#[test]
fn test_empty_repositories_leaves_file_untouched() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("settings.xml");
    let original = "<settings>\n<!-- keep me -->\n<offline>true</offline></settings>";
    fs::write(&path, original).unwrap();

    merge_credentials_into_settings_xml(&path, &[]).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), original);
}

// =============================================================================
// Fallback to an empty document
// =============================================================================

#[test]
fn test_missing_file_is_created_with_parent_dirs() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("home").join(".m2").join("settings.xml");

    let report = merge_credentials_into_settings_xml(&path, &repos(&["feed"])).unwrap();

    assert!(report.written);
    assert_eq!(report.inserted, vec!["feed".to_string()]);
    assert_eq!(server_ids(&path), vec!["feed"]);

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("<settings"));
    assert!(!content.contains("<?xml"));
    assert!(content.contains("<name>Authorization</name>"));
    assert!(content.contains("<value>Basic ${env.ENV_MAVEN_ACCESS_TOKEN}</value>"));
}

#[test]
fn test_unparsable_file_is_replaced() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("settings.xml");
    fs::write(&path, "<settings><servers>").unwrap();

    let report = merge_credentials_into_settings_xml(&path, &repos(&["feed"])).unwrap();

    assert!(report.written);
    assert_eq!(server_ids(&path), vec!["feed"]);
}

#[test]
fn test_written_settings_have_namespace() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("settings.xml");

    merge_credentials_into_settings_xml(&path, &repos(&["feed"])).unwrap();

    let document = read_settings(&path).unwrap();
    let settings = settings_node(&document);
    assert_eq!(settings.attribute("xmlns"), Some(SETTINGS_NAMESPACE));
    assert!(settings.attribute("xsi:schemaLocation").is_some());
}

// =============================================================================
// Existing content
// =============================================================================

#[test]
fn test_proxies_are_preserved() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("settings.xml");
    let original = r#"<settings>
  <proxies>
    <proxy>
      <id>corp</id>
      <active>true</active>
      <protocol>http</protocol>
      <host>proxy.corp.local</host>
      <port>8080</port>
    </proxy>
  </proxies>
</settings>"#;
    fs::write(&path, original).unwrap();
    let before = xml::parse_document(original).unwrap();

    merge_credentials_into_settings_xml(&path, &repos(&["feed"])).unwrap();

    let after = read_settings(&path).unwrap();
    assert_eq!(
        settings_node(&after).get("proxies"),
        settings_node(&before).get("proxies")
    );
    assert_eq!(server_ids(&path), vec!["feed"]);
}

#[test]
fn test_existing_servers_are_kept() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("settings.xml");
    fs::write(
        &path,
        r#"<settings>
  <servers>
    <server><id>nexus</id><username>ci</username><password>pw</password></server>
  </servers>
</settings>"#,
    )
    .unwrap();

    merge_credentials_into_settings_xml(&path, &repos(&["feed-a", "feed-b"])).unwrap();

    assert_eq!(server_ids(&path), vec!["nexus", "feed-a", "feed-b"]);
}

#[test]
fn test_empty_servers_element() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("settings.xml");
    fs::write(&path, "<settings><servers/></settings>").unwrap();

    merge_credentials_into_settings_xml(&path, &repos(&["feed"])).unwrap();

    assert_eq!(server_ids(&path), vec!["feed"]);
}

#[test]
fn test_bom_is_stripped() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("settings.xml");
    fs::write(
        &path,
        "\u{feff}<settings><localRepository>/cache</localRepository></settings>",
    )
    .unwrap();

    merge_credentials_into_settings_xml(&path, &repos(&["feed"])).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert!(!content.starts_with('\u{feff}'));
    assert!(content.contains("<localRepository>/cache</localRepository>"));
}

#[test]
fn test_carriage_returns_are_stripped() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("settings.xml");
    fs::write(
        &path,
        "<settings>\r\n  <localRepository>a&#xD;\nb</localRepository>\r\n  <offline>x\r\ny</offline>\r\n</settings>",
    )
    .unwrap();

    merge_credentials_into_settings_xml(&path, &repos(&["f"])).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert!(!content.contains('\r'));
    assert!(!content.contains("&#xD;"));
    assert!(content.contains("<localRepository>a\nb</localRepository>"));
    assert!(content.contains("<offline>x\ny</offline>"));
    assert_eq!(server_ids(&path), vec!["f"]);
}

// =============================================================================
// Duplicates
// =============================================================================

#[test]
fn test_repeated_merge_is_idempotent() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("settings.xml");

    merge_credentials_into_settings_xml(&path, &repos(&["feed"])).unwrap();
    let first = fs::read_to_string(&path).unwrap();
    let report = merge_credentials_into_settings_xml(&path, &repos(&["feed"])).unwrap();

    assert!(report.inserted.is_empty());
    assert_eq!(
        report.diagnostics,
        vec![Diagnostic::EntryAlreadyExists {
            id: "feed".to_string()
        }]
    );
    assert_eq!(server_ids(&path), vec!["feed"]);
    assert_eq!(fs::read_to_string(&path).unwrap(), first);
}

#[test]
fn test_duplicate_ids_in_one_call() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("settings.xml");

    let report =
        merge_credentials_into_settings_xml(&path, &repos(&["feed", "other", "feed"])).unwrap();

    assert_eq!(report.inserted, vec!["feed".to_string(), "other".to_string()]);
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(server_ids(&path), vec!["feed", "other"]);
}

#[test]
fn test_write_failure_is_an_error() {
    let temp = TempDir::new().unwrap();
    // A file where a directory is expected
    let blocker = temp.path().join("blocker");
    fs::write(&blocker, "").unwrap();
    let path = blocker.join("settings.xml");

    let result = merge_credentials_into_settings_xml(&path, &repos(&["feed"]));

    assert!(result.is_err());
}

//! Server credential injection into Maven `settings.xml`.
//!
//! Each repository id gets a `<server>` entry that sends an
//! `Authorization` header whose value refers to [`ACCESS_TOKEN_ENV`]:
//!
//! ```xml
//! <server>
//!   <id>my-feed</id>
//!   <configuration>
//!     <httpHeaders>
//!       <property>
//!         <name>Authorization</name>
//!         <value>Basic ${env.ENV_MAVEN_ACCESS_TOKEN}</value>
//!       </property>
//!     </httpHeaders>
//!   </configuration>
//! </server>
//! ```

use crate::auth::ACCESS_TOKEN_ENV;
use crate::diagnostics::Diagnostic;
use crate::effective_pom::RepositoryEntry;
use crate::error::{Error, Result};
use crate::merge::{insert_or_append, MergeOutcome};
use crate::node::{Node, Value};
use crate::xml::{parse_document, write_document_root, XSI_NAMESPACE};
use std::path::Path;
use tracing::debug;

/// Namespace of the settings 1.0.0 schema.
pub const SETTINGS_NAMESPACE: &str = "http://maven.apache.org/SETTINGS/1.0.0";

/// `xsi:schemaLocation` of the settings 1.0.0 schema.
pub const SETTINGS_SCHEMA_LOCATION: &str =
    "http://maven.apache.org/SETTINGS/1.0.0 https://maven.apache.org/xsd/settings-1.0.0.xsd";

/// A `<server>` entry that authenticates through an HTTP header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerCredential {
    /// Repository id the server applies to.
    pub id: String,
    /// Header name, `Authorization`.
    pub header_name: String,
    /// Header value, `Basic ${env.ENV_MAVEN_ACCESS_TOKEN}`.
    pub header_value: String,
}

impl ServerCredential {
    /// Credential for a repository, resolved by Maven from the environment.
    pub fn for_repository(id: impl Into<String>) -> Self {
        ServerCredential {
            id: id.into(),
            header_name: "Authorization".to_string(),
            header_value: format!("Basic ${{env.{}}}", ACCESS_TOKEN_ENV),
        }
    }

    /// Structural form of the `<server>` element.
    pub fn to_value(&self) -> Value {
        let property = Node::new()
            .with("name", self.header_name.as_str())
            .with("value", self.header_value.as_str());
        let configuration = Node::new().with("httpHeaders", Node::new().with("property", property));

        Node::new()
            .with("id", self.id.as_str())
            .with("configuration", configuration)
            .into()
    }
}

/// What a settings merge did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Whether the settings file was written.
    pub written: bool,
    /// Ids of servers that were added.
    pub inserted: Vec<String>,
    /// Recoverable conditions, e.g. servers that already existed.
    pub diagnostics: Vec<Diagnostic>,
}

/// Insert a server entry into a settings document.
///
/// The `settings` root is created if missing (or if it is a bare string),
/// its namespace attributes are set to the canonical values and a
/// `servers` container is created if needed.
pub fn insert_server(document: &mut Node, server: &ServerCredential) -> MergeOutcome {
    let settings = document.ensure_child("settings").ensure_node();

    settings.set_attribute("xmlns", SETTINGS_NAMESPACE);
    settings.set_attribute("xmlns:xsi", XSI_NAMESPACE);
    settings.set_attribute("xsi:schemaLocation", SETTINGS_SCHEMA_LOCATION);

    insert_or_append(settings.ensure_child("servers"), "server", server.to_value())
}

/// Read and parse a settings file.
pub fn read_settings(path: &Path) -> Result<Node> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_document(&content)
}

/// Serialize the `settings` root of a document and write it to `path`.
///
/// Parent directories are created as needed.
pub fn write_settings(path: &Path, document: &Node) -> Result<()> {
    write_document_root(path, document, "settings")
}

/// Add a server credential for every repository to the settings file at `path`.
///
/// An empty `repositories` list leaves the file untouched. A missing or
/// unparsable settings file is replaced by a fresh document. Servers that
/// already exist are reported as [`Diagnostic::EntryAlreadyExists`].
///
/// # Examples
///
/// ```no_run
/// use maven_feed_auth::{merge_credentials_into_settings_xml, RepositoryEntry};
/// use std::path::Path;
///
/// let repos = vec![RepositoryEntry::new("my-feed")];
/// let report = merge_credentials_into_settings_xml(Path::new("/home/me/.m2/settings.xml"), &repos)?;
/// assert!(report.written);
/// # Ok::<(), maven_feed_auth::Error>(())
/// ```
pub fn merge_credentials_into_settings_xml(
    path: &Path,
    repositories: &[RepositoryEntry],
) -> Result<MergeReport> {
    debug!(file = %path.display(), "merging server credentials into settings.xml");

    if repositories.is_empty() {
        debug!("no repositories, settings.xml left unchanged");
        return Ok(MergeReport::default());
    }

    let mut document = match read_settings(path) {
        Ok(document) => document,
        Err(e) => {
            debug!(error = %e, "starting from an empty settings document");
            Node::new()
        }
    };

    let mut report = MergeReport::default();
    for repository in repositories {
        let server = ServerCredential::for_repository(repository.id.as_str());
        debug!(id = %server.id, "inserting server");
        match insert_server(&mut document, &server) {
            MergeOutcome::Inserted => report.inserted.push(server.id),
            outcome => report.diagnostics.extend(outcome.diagnostic()),
        }
    }

    write_settings(path, &document)?;
    report.written = true;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn servers_of(document: &Node) -> &Value {
        document
            .get("settings")
            .and_then(Value::as_node)
            .and_then(|s| s.get("servers"))
            .and_then(Value::as_node)
            .and_then(|s| s.get("server"))
            .unwrap()
    }

    #[test]
    fn test_server_credential_shape() {
        let server = ServerCredential::for_repository("feed");
        assert_eq!(server.header_value, "Basic ${env.ENV_MAVEN_ACCESS_TOKEN}");

        let value = server.to_value();
        assert_eq!(value.id(), Some("feed"));
        let property = value
            .as_node()
            .and_then(|n| n.get("configuration"))
            .and_then(Value::as_node)
            .and_then(|n| n.get("httpHeaders"))
            .and_then(Value::as_node)
            .and_then(|n| n.get("property"))
            .and_then(Value::as_node)
            .unwrap();
        assert_eq!(
            property.get("name").and_then(Value::as_scalar),
            Some("Authorization")
        );
    }

    #[test]
    fn test_insert_server_into_empty_document() {
        let mut document = Node::new();
        let outcome = insert_server(&mut document, &ServerCredential::for_repository("a"));

        assert_eq!(outcome, MergeOutcome::Inserted);
        let settings = document.get("settings").and_then(Value::as_node).unwrap();
        assert_eq!(settings.attribute("xmlns"), Some(SETTINGS_NAMESPACE));
        assert_eq!(settings.attribute("xmlns:xsi"), Some(XSI_NAMESPACE));
        assert_eq!(
            settings.attribute("xsi:schemaLocation"),
            Some(SETTINGS_SCHEMA_LOCATION)
        );
        assert_eq!(servers_of(&document).id(), Some("a"));
    }

    #[test]
    fn test_insert_server_replaces_string_placeholder() {
        let mut document = Node::new().with("settings", "");
        insert_server(&mut document, &ServerCredential::for_repository("a"));

        assert_eq!(servers_of(&document).id(), Some("a"));
    }

    #[test]
    fn test_insert_server_rewrites_namespace() {
        let mut settings = Node::new();
        settings.set_attribute("xmlns", "http://example.com/old");
        let mut document = Node::new().with("settings", settings);

        insert_server(&mut document, &ServerCredential::for_repository("a"));

        let settings = document.get("settings").and_then(Value::as_node).unwrap();
        assert_eq!(settings.attribute("xmlns"), Some(SETTINGS_NAMESPACE));
        assert_eq!(settings.attributes().count(), 3);
    }

    #[test]
    fn test_insert_server_idempotent() {
        let mut document = Node::new();
        let server = ServerCredential::for_repository("a");
        insert_server(&mut document, &server);
        let outcome = insert_server(&mut document, &server);

        assert!(matches!(outcome, MergeOutcome::Duplicate { .. }));
        assert_eq!(servers_of(&document).items().len(), 1);
    }
}

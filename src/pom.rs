//! Repository insertion into a project `pom.xml`.

use crate::error::{Error, Result};
use crate::merge::{insert_or_append, MergeOutcome};
use crate::node::{Node, Value};
use crate::xml::{parse_document, write_document_root, XSI_NAMESPACE};
use std::path::Path;

/// Namespace of the POM 4.0.0 model.
pub const POM_NAMESPACE: &str = "http://maven.apache.org/POM/4.0.0";

/// `xsi:schemaLocation` of the POM 4.0.0 model.
pub const POM_SCHEMA_LOCATION: &str =
    "http://maven.apache.org/POM/4.0.0 http://maven.apache.org/xsd/maven-4.0.0.xsd";

/// A `<repository>` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PomRepository {
    /// Repository id, referenced by `<server>` entries in settings.xml.
    pub id: String,
    /// Repository URL.
    pub url: String,
}

impl PomRepository {
    /// Create a repository declaration.
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        PomRepository {
            id: id.into(),
            url: url.into(),
        }
    }

    /// Structural form of the `<repository>` element.
    pub fn to_value(&self) -> Value {
        Node::new()
            .with("id", self.id.as_str())
            .with("url", self.url.as_str())
            .into()
    }
}

/// Insert a repository into a POM document.
///
/// A missing or bare-string `project` root is replaced by a fresh one
/// carrying the POM namespace attributes; an existing project keeps its
/// attributes. A `repositories` container is created if needed.
pub fn insert_repository(document: &mut Node, repository: &PomRepository) -> MergeOutcome {
    let fresh = !matches!(document.get("project"), Some(Value::Node(_)));
    let project = document.ensure_child("project").ensure_node();
    if fresh {
        project.set_attribute("xmlns", POM_NAMESPACE);
        project.set_attribute("xmlns:xsi", XSI_NAMESPACE);
        project.set_attribute("xsi:schemaLocation", POM_SCHEMA_LOCATION);
    }

    insert_or_append(
        project.ensure_child("repositories"),
        "repository",
        repository.to_value(),
    )
}

/// Read and parse a POM file.
pub fn read_pom(path: &Path) -> Result<Node> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_document(&content)
}

/// Serialize the `project` root of a document and write it to `path`.
pub fn write_pom(path: &Path, document: &Node) -> Result<()> {
    write_document_root(path, document, "project")
}

//! Feed repository discovery from `mvn help:effective-pom` output.
//!
//! The effective POM is printed between Maven log lines, so the XML is cut
//! out of the surrounding text first. Multi-module builds wrap every module
//! in a `<projects>` element; single-module builds print one `<project>`.

use crate::diagnostics::Diagnostic;
use crate::error::Result;
use crate::feeds::{hostname, FeedPrefixResolver};
use crate::node::{Node, Value};
use crate::xml::parse_document;
use tracing::debug;

/// A repository that should receive credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryEntry {
    /// Repository id, matching the `<server>` id in settings.xml.
    pub id: String,
}

impl RepositoryEntry {
    /// Entry for the repository with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        RepositoryEntry { id: id.into() }
    }
}

/// Decides whether a repository URL belongs to the build's feeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostMatcher {
    collection: String,
    package: String,
}

impl HostMatcher {
    /// Match URLs containing either hostname, case-insensitively.
    ///
    /// Without a package hostname only the collection hostname is used.
    pub fn new(collection_hostname: &str, package_hostname: Option<&str>) -> Self {
        let collection = collection_hostname.to_lowercase();
        let package = package_hostname
            .filter(|h| !h.is_empty())
            .map(str::to_lowercase)
            .unwrap_or_else(|| collection.clone());
        HostMatcher {
            collection,
            package,
        }
    }

    /// Derive both hostnames from the collection URL.
    ///
    /// The package hostname is the host of the URL returned by `resolver`.
    pub fn from_collection_url(
        collection_url: &str,
        resolver: &dyn FeedPrefixResolver,
    ) -> Result<Self> {
        let collection = hostname(collection_url)?;
        let package = match resolver.package_url(collection_url) {
            Some(package_url) => Some(hostname(&package_url)?),
            None => None,
        };
        Ok(Self::new(&collection, package.as_deref()))
    }

    /// Lowercased collection hostname.
    pub fn collection_hostname(&self) -> &str {
        &self.collection
    }

    /// Lowercased package hostname.
    pub fn package_hostname(&self) -> &str {
        &self.package
    }

    /// Check whether `url` points at one of the hostnames.
    pub fn matches(&self, url: &str) -> bool {
        let url = url.to_lowercase();
        [&self.collection, &self.package]
            .into_iter()
            .any(|host| !host.is_empty() && url.contains(host.as_str()))
    }
}

/// Repositories found in an effective POM.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryScan {
    /// Matching repositories in encounter order, not deduplicated.
    pub repositories: Vec<RepositoryEntry>,
    /// Recoverable conditions, e.g. unreadable output.
    pub diagnostics: Vec<Diagnostic>,
}

impl RepositoryScan {
    fn invalid() -> Self {
        RepositoryScan {
            repositories: Vec::new(),
            diagnostics: vec![Diagnostic::EffectivePomInvalid],
        }
    }
}

/// Cut the effective POM XML out of Maven's output.
///
/// A `<projects>` wrapper is preferred over a single `<project>`.
pub fn bounded_effective_pom(output: &str) -> Option<&str> {
    bounded(output, "<projects", "</projects>").or_else(|| bounded(output, "<project", "</project>"))
}

fn bounded<'a>(text: &'a str, begin: &str, end: &str) -> Option<&'a str> {
    let start = text.find(begin)?;
    let stop = text.find(end)?;
    (start < stop).then(|| &text[start..stop + end.len()])
}

/// Collect ids of repositories whose URL matches `matcher`.
///
/// Output without a project element, or whose project element does not
/// parse, yields no repositories and [`Diagnostic::EffectivePomInvalid`].
/// Repositories without a URL or id are skipped.
pub fn scan_effective_pom(output: &str, matcher: &HostMatcher) -> RepositoryScan {
    let Some(xml) = bounded_effective_pom(output) else {
        return RepositoryScan::invalid();
    };
    let Ok(document) = parse_document(xml) else {
        return RepositoryScan::invalid();
    };

    let projects: Vec<&Node> = match (document.get("projects"), document.get("project")) {
        (Some(projects), _) => nodes(Some(projects))
            .flat_map(|p| nodes(p.get("project")))
            .collect(),
        (None, Some(project)) => nodes(Some(project)).collect(),
        (None, None) => return RepositoryScan::invalid(),
    };

    let repositories = projects
        .into_iter()
        .flat_map(|project| nodes(project.get("repositories")))
        .flat_map(|repositories| nodes(repositories.get("repository")))
        .filter(|repo| {
            repo.get("url")
                .and_then(Value::first_text)
                .is_some_and(|url| !url.is_empty() && matcher.matches(url))
        })
        .filter_map(|repo| repo.get("id").and_then(Value::first_text))
        .map(RepositoryEntry::new)
        .collect();

    RepositoryScan {
        repositories,
        diagnostics: Vec::new(),
    }
}

/// Every node occurrence of an optional property.
fn nodes(value: Option<&Value>) -> impl Iterator<Item = &Node> {
    value
        .into_iter()
        .flat_map(Value::items)
        .filter_map(Value::as_node)
}

/// Collect ids of repositories hosted on the collection or package host.
///
/// # Examples
///
/// ```
/// use maven_feed_auth::extract_matching_repositories;
///
/// let pom = r#"<project><repositories><repository>
///   <id>feed</id><url>https://pkgs.dev.azure.com/org/_packaging/feed/maven/v1</url>
/// </repository></repositories></project>"#;
/// let scan = extract_matching_repositories(pom, "dev.azure.com", None);
/// assert_eq!(scan.repositories[0].id, "feed");
/// ```
pub fn extract_matching_repositories(
    output: &str,
    collection_hostname: &str,
    package_hostname: Option<&str>,
) -> RepositoryScan {
    scan_effective_pom(output, &HostMatcher::new(collection_hostname, package_hostname))
}

/// Collect feed repositories for a build running against `collection_url`.
pub fn collect_feed_repositories(
    output: &str,
    collection_url: &str,
    resolver: &dyn FeedPrefixResolver,
) -> Result<RepositoryScan> {
    debug!("collecting account feeds from effective pom");
    let matcher = HostMatcher::from_collection_url(collection_url, resolver)?;
    debug!(
        collection = matcher.collection_hostname(),
        package = matcher.package_hostname(),
        "matching repository hosts"
    );

    let scan = scan_effective_pom(output, &matcher);
    debug!(feeds = scan.repositories.len(), "feeds found");
    Ok(scan)
}

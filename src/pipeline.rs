//! End-to-end feed authentication for a Maven build step.
//!
//! This is the boundary layer: it takes the build's inputs explicitly,
//! runs discovery and the settings merge, and logs every recoverable
//! condition as a warning.

use crate::auth::{exec_options, EndpointAuthorization, ExecOptions};
use crate::diagnostics::Diagnostic;
use crate::effective_pom::{collect_feed_repositories, RepositoryEntry};
use crate::error::{Error, Result};
use crate::feeds::FeedPrefixResolver;
use crate::paths::{find_maven_home, global_settings_path, user_settings_path};
use crate::settings::{merge_credentials_into_settings_xml, MergeReport};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Build variable holding the collection URL.
pub const COLLECTION_URI_VARIABLE: &str = "System.TeamFoundationCollectionUri";

/// Which settings file receives the server entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SettingsLocation {
    /// `~/.m2/settings.xml`
    #[default]
    User,
    /// `{mavenHome}/conf/settings.xml`
    Global,
    /// An explicit file.
    File(PathBuf),
}

impl SettingsLocation {
    /// Resolve to a concrete path.
    pub fn resolve(&self) -> Result<PathBuf> {
        match self {
            SettingsLocation::User => user_settings_path().ok_or_else(|| {
                Error::SettingsPathUnavailable("home directory not found".to_string())
            }),
            SettingsLocation::Global => find_maven_home()
                .map(|home| global_settings_path(&home))
                .ok_or_else(|| Error::SettingsPathUnavailable("mvn not found on PATH".to_string())),
            SettingsLocation::File(path) => Ok(path.clone()),
        }
    }
}

/// Inputs of a feed authentication run.
#[derive(Debug, Clone, Default)]
pub struct FeedAuthOptions {
    /// Output of `mvn help:effective-pom`.
    pub effective_pom: String,
    /// URL of the collection the build runs against.
    pub collection_url: String,
    /// Settings file to update.
    pub settings: SettingsLocation,
    /// Authorization of the system connection.
    pub authorization: Option<EndpointAuthorization>,
    /// Environment the Maven process starts from.
    pub base_env: HashMap<String, String>,
}

impl FeedAuthOptions {
    /// Options with the collection URL taken from build variables.
    pub fn from_variables(variables: &HashMap<String, String>) -> Self {
        FeedAuthOptions {
            collection_url: variables
                .get(COLLECTION_URI_VARIABLE)
                .cloned()
                .unwrap_or_default(),
            ..Default::default()
        }
    }
}

/// Everything a feed authentication run produced.
#[derive(Debug, Clone)]
pub struct FeedAuthReport {
    /// Repositories that received credentials.
    pub repositories: Vec<RepositoryEntry>,
    /// Settings file that was considered.
    pub settings_path: Option<PathBuf>,
    /// Result of the settings merge.
    pub merge: MergeReport,
    /// Environment to run Maven with.
    pub exec: ExecOptions,
    /// All recoverable conditions, in the order they were raised.
    pub diagnostics: Vec<Diagnostic>,
}

/// Discover feed repositories, add their credentials to the settings file
/// and build the Maven process environment.
pub fn authenticate_feeds(
    options: &FeedAuthOptions,
    resolver: &dyn FeedPrefixResolver,
) -> Result<FeedAuthReport> {
    let scan = collect_feed_repositories(&options.effective_pom, &options.collection_url, resolver)?;
    let mut diagnostics = scan.diagnostics;

    let (settings_path, merge) = if scan.repositories.is_empty() {
        debug!("no feed repositories, skipping settings.xml");
        (None, MergeReport::default())
    } else {
        let path = options.settings.resolve()?;
        let merge = merge_credentials_into_settings_xml(&path, &scan.repositories)?;
        (Some(path), merge)
    };
    diagnostics.extend(merge.diagnostics.iter().cloned());

    let base_env = options
        .base_env
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()));
    let exec = exec_options(base_env, options.authorization.as_ref());
    diagnostics.extend(exec.diagnostics.iter().cloned());

    for diagnostic in &diagnostics {
        warn!(key = diagnostic.key(), "{}", diagnostic);
    }

    Ok(FeedAuthReport {
        repositories: scan.repositories,
        settings_path,
        merge,
        exec,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_variables() {
        let mut vars = HashMap::new();
        vars.insert(
            COLLECTION_URI_VARIABLE.to_string(),
            "https://dev.azure.com/org/".to_string(),
        );
        let options = FeedAuthOptions::from_variables(&vars);

        assert_eq!(options.collection_url, "https://dev.azure.com/org/");
        assert_eq!(options.settings, SettingsLocation::User);
    }

    #[test]
    fn test_file_location_resolves_to_itself() {
        let location = SettingsLocation::File(PathBuf::from("/tmp/settings.xml"));
        assert_eq!(location.resolve().unwrap(), PathBuf::from("/tmp/settings.xml"));
    }
}

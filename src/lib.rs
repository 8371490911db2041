//! Package feed credentials for Maven builds.
//!
//! This crate prepares a Maven build step to authenticate against the
//! package feeds of the collection it runs in:
//!
//! - Finds the repositories in `mvn help:effective-pom` output whose URL
//!   points at the collection host or its package feed host
//! - Adds a `<server>` entry for each of them to `settings.xml`, sending an
//!   `Authorization` header that Maven resolves from the environment
//! - Builds the Maven process environment carrying the encoded token
//!
//! # Quick Start
//!
//! ```no_run
//! use maven_feed_auth::{
//!     authenticate_feeds, AssumedFeedPrefixes, EndpointAuthorization, FeedAuthOptions,
//! };
//!
//! let options = FeedAuthOptions {
//!     effective_pom: std::fs::read_to_string("effective-pom.txt")?,
//!     collection_url: "https://dev.azure.com/fabrikam/".to_string(),
//!     authorization: Some(EndpointAuthorization::oauth("access-token")),
//!     base_env: std::env::vars().collect(),
//!     ..Default::default()
//! };
//!
//! let report = authenticate_feeds(&options, &AssumedFeedPrefixes)?;
//! for repo in &report.repositories {
//!     println!("credentials added for {}", repo.id);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Secrets
//!
//! The settings file only ever contains `Basic ${env.ENV_MAVEN_ACCESS_TOKEN}`.
//! The token is base64 of `VSTS:<access token>` and lives solely in the
//! environment returned by [`exec_options`].
//!
//! # Structural documents
//!
//! XML is converted to [`Node`] trees where a property is a [`Value`]:
//! scalar, node or list. A repeated element is a list; a single one is
//! not, and every reader treats a single occurrence as a one-element list.

mod auth;
mod diagnostics;
mod effective_pom;
mod error;
mod feeds;
mod merge;
mod node;
mod paths;
mod pipeline;
mod pom;
mod settings;
pub mod xml;

// Re-export main types
pub use auth::{
    build_auth_token, exec_options, system_access_token, EndpointAuthorization, ExecOptions,
    ACCESS_TOKEN_ENV, SYSTEM_CONNECTION,
};
pub use diagnostics::Diagnostic;
pub use effective_pom::{
    bounded_effective_pom, collect_feed_repositories, extract_matching_repositories,
    scan_effective_pom, HostMatcher, RepositoryEntry, RepositoryScan,
};
pub use error::{Error, Result};
pub use feeds::{hostname, AssumedFeedPrefixes, FeedPrefixResolver, NoFeedPrefixes};
pub use merge::{insert_or_append, MergeOutcome};
pub use node::{Node, Value};
pub use paths::{find_maven_home, global_settings_path, maven_user_dir, user_settings_path};
pub use pipeline::{
    authenticate_feeds, FeedAuthOptions, FeedAuthReport, SettingsLocation,
    COLLECTION_URI_VARIABLE,
};
pub use pom::{insert_repository, read_pom, write_pom, PomRepository, POM_NAMESPACE};
pub use settings::{
    insert_server, merge_credentials_into_settings_xml, read_settings, write_settings,
    MergeReport, ServerCredential, SETTINGS_NAMESPACE,
};

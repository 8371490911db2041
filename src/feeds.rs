//! Package feed host resolution.
//!
//! Repositories only receive credentials when their URL points at the
//! build's collection host or its package feed host. The package host is
//! derived from the collection URL by a [`FeedPrefixResolver`].

use crate::error::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// `https://{account}.visualstudio.com/...`
static VISUALSTUDIO_HOST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?P<scheme>https?)://(?P<account>[^./]+)\.visualstudio\.com(?::\d+)?(?:/|$)")
        .unwrap()
});

/// `https://dev.azure.com/{organization}/...`
static AZURE_DEVOPS_HOST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?P<scheme>https?)://dev\.azure\.com(?::\d+)?/(?P<org>[^/]+)").unwrap()
});

/// Resolves the package feed URL that belongs to a collection URL.
pub trait FeedPrefixResolver {
    /// Return the package feed URL for `collection_url`, or `None` when the
    /// collection has no separate package host.
    fn package_url(&self, collection_url: &str) -> Option<String>;
}

/// Assumes the hosted-service convention for package feed hosts.
///
/// ```
/// use maven_feed_auth::{AssumedFeedPrefixes, FeedPrefixResolver};
///
/// let resolver = AssumedFeedPrefixes;
/// assert_eq!(
///     resolver.package_url("https://contoso.visualstudio.com/"),
///     Some("https://contoso.pkgs.visualstudio.com/".to_string())
/// );
/// assert_eq!(
///     resolver.package_url("https://dev.azure.com/contoso/"),
///     Some("https://pkgs.dev.azure.com/contoso/".to_string())
/// );
/// assert_eq!(resolver.package_url("https://tfs.corp.local/tfs/"), None);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumedFeedPrefixes;

impl FeedPrefixResolver for AssumedFeedPrefixes {
    fn package_url(&self, collection_url: &str) -> Option<String> {
        if let Some(caps) = VISUALSTUDIO_HOST.captures(collection_url) {
            return Some(format!(
                "{}://{}.pkgs.visualstudio.com/",
                &caps["scheme"], &caps["account"]
            ));
        }
        if let Some(caps) = AZURE_DEVOPS_HOST.captures(collection_url) {
            return Some(format!(
                "{}://pkgs.dev.azure.com/{}/",
                &caps["scheme"], &caps["org"]
            ));
        }
        None
    }
}

/// A resolver that never finds a package host.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFeedPrefixes;

impl FeedPrefixResolver for NoFeedPrefixes {
    fn package_url(&self, _collection_url: &str) -> Option<String> {
        None
    }
}

/// Extract the lowercased hostname of a URL.
pub fn hostname(url: &str) -> Result<String> {
    let parsed = Url::parse(url).map_err(|e| Error::InvalidUrl {
        url: url.to_string(),
        message: e.to_string(),
    })?;
    parsed
        .host_str()
        .map(str::to_lowercase)
        .ok_or_else(|| Error::InvalidUrl {
            url: url.to_string(),
            message: "URL has no host".to_string(),
        })
}

//! Recoverable conditions reported alongside results.
//!
//! None of these stop a build. Callers decide how to surface them; the
//! [`key`](Diagnostic::key) is the message identifier used for localized
//! task output.

use std::fmt;

/// A non-fatal condition raised while scanning or merging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A server or repository with this id was already present; the insert was skipped.
    EntryAlreadyExists { id: String },
    /// The effective POM had no `<project>`/`<projects>` element or could not be parsed.
    EffectivePomInvalid,
    /// The system connection carried no usable OAuth access token.
    FeedTokenUnavailable,
}

impl Diagnostic {
    /// Stable message identifier.
    pub fn key(&self) -> &'static str {
        match self {
            Diagnostic::EntryAlreadyExists { .. } => "EntryAlreadyExists",
            Diagnostic::EffectivePomInvalid => "EffectivePomInvalid",
            Diagnostic::FeedTokenUnavailable => "FeedTokenUnavailable",
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::EntryAlreadyExists { id } => {
                write!(f, "entry '{}' already exists, skipping", id)
            }
            Diagnostic::EffectivePomInvalid => {
                write!(f, "effective POM output could not be read, no feeds found")
            }
            Diagnostic::FeedTokenUnavailable => {
                write!(f, "could not get an access token for package feeds")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys() {
        let dup = Diagnostic::EntryAlreadyExists {
            id: "central".to_string(),
        };
        assert_eq!(dup.key(), "EntryAlreadyExists");
        assert!(dup.to_string().contains("central"));
        assert_eq!(Diagnostic::EffectivePomInvalid.key(), "EffectivePomInvalid");
        assert_eq!(Diagnostic::FeedTokenUnavailable.key(), "FeedTokenUnavailable");
    }
}

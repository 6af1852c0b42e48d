use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier attached to every submission.
///
/// The venue never sees it. It lives in the in-flight slot while the request
/// awaits its callback, so a reply can be tied to exactly one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorrelationToken(Uuid);

impl CorrelationToken {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CorrelationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CorrelationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.as_simple())
    }
}

/// Logical request name, carried back by the venue in every reply.
///
/// This is the correlation key used to pick completion handlers and fetch
/// parameters. Two submissions with the same name are indistinguishable to the
/// venue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestName(pub String);

impl RequestName {
    /// Create a new request name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequestName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RequestName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RequestName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::borrow::Borrow<str> for RequestName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_are_unique() {
        let a = CorrelationToken::new();
        let b = CorrelationToken::new();
        assert_ne!(a, b);
        assert_eq!(a.to_string().len(), 32);
    }

    #[test]
    fn test_request_name_lookup_by_str() {
        let mut names = std::collections::HashMap::new();
        names.insert(RequestName::from("minute_chart"), 1);
        assert_eq!(names.get("minute_chart"), Some(&1));
    }
}

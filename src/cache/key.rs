//! Cache Key Module
//!
//! Structured view over colon-delimited cache keys such as `cases:42:v1` or
//! `user:123:profile`. Scoped invalidation compares parsed segments, so
//! `cases1` never matches the `cases` namespace and `cases:12` never matches
//! entity `cases:1`.

use std::fmt;

/// Separator between key segments.
pub const KEY_DELIMITER: char = ':';

/// Namespace under which per-subject data is cached.
pub const USER_NAMESPACE: &str = "user";

// == Cache Key ==
/// A key split into `namespace`, optional `scope` and the remaining segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub namespace: String,
    pub scope: Option<String>,
    pub rest: Vec<String>,
}

impl CacheKey {
    // == Constructor ==
    /// Builds a key from its parts.
    ///
    /// # Arguments
    /// * `namespace` - Entity type or `user`
    /// * `scope` - Entity or subject identifier
    /// * `rest` - Caller-defined trailing segments (version tags etc.)
    pub fn new<I, S>(namespace: impl Into<String>, scope: impl Into<String>, rest: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            namespace: namespace.into(),
            scope: Some(scope.into()),
            rest: rest.into_iter().map(Into::into).collect(),
        }
    }

    // == Parse ==
    /// Splits a raw key on `:`. Never fails: a key without a delimiter is a
    /// bare namespace with no scope.
    pub fn parse(raw: &str) -> Self {
        let mut segments = raw.split(KEY_DELIMITER);
        let namespace = segments.next().unwrap_or_default().to_string();
        let scope = segments.next().map(str::to_string);
        let rest = segments.map(str::to_string).collect();

        Self {
            namespace,
            scope,
            rest,
        }
    }

    // == Predicates ==
    /// True when the first segment equals `namespace`.
    ///
    /// An empty namespace never matches, so malformed keys stay out of
    /// scoped invalidation.
    pub fn in_namespace(&self, namespace: &str) -> bool {
        !namespace.is_empty() && self.namespace == namespace
    }

    /// True when the first two segments equal `(namespace, id)`.
    pub fn is_entity(&self, namespace: &str, id: &str) -> bool {
        self.in_namespace(namespace) && self.scope.as_deref() == Some(id)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.namespace)?;
        if let Some(scope) = &self.scope {
            write!(f, "{}{}", KEY_DELIMITER, scope)?;
        }
        for segment in &self.rest {
            write!(f, "{}{}", KEY_DELIMITER, segment)?;
        }
        Ok(())
    }
}

impl From<&str> for CacheKey {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

// == Free Predicates ==
/// Splits a raw key into its ordered segments.
pub fn segments(key: &str) -> Vec<&str> {
    key.split(KEY_DELIMITER).collect()
}

/// `segments[0] == namespace && segments[1] == id`
pub fn matches_entity(key: &str, namespace: &str, id: &str) -> bool {
    CacheKey::parse(key).is_entity(namespace, id)
}

/// `segments[0] == namespace`
pub fn matches_namespace(key: &str, namespace: &str) -> bool {
    CacheKey::parse(key).in_namespace(namespace)
}

/// Formats the audit resource id for an entity, e.g. `cases:1`.
pub fn entity_id(namespace: &str, id: &str) -> String {
    format!("{}{}{}", namespace, KEY_DELIMITER, id)
}

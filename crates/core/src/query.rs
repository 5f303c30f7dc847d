//! Named media queries and the built-in default table.

use crate::error::{Error, Result};
use alloc::string::String;

/// Built-in conditions registered on every new registry, in registration order.
pub const DEFAULT_QUERIES: &[(&str, &str)] = &[
    ("print", "print"),
    ("phone", "(max-width: 767px)"),
    ("tablet", "(min-width: 768px) and (max-width: 979px)"),
    ("desktop", "(min-width: 979px)"),
    ("portrait", "(orientation: portrait)"),
    ("landscape", "(orientation: landscape)"),
];

/// A named condition and the host expression it evaluates.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MediaQuery {
    name: String,
    media: String,
}

impl MediaQuery {
    /// Creates a named query. Fails if `name` is empty.
    pub fn new(name: impl Into<String>, media: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self {
            name,
            media: media.into(),
        })
    }

    /// Returns the condition name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the host expression.
    #[inline]
    pub fn media(&self) -> &str {
        &self.media
    }

    /// Returns all built-in default queries, in table order.
    pub fn defaults() -> impl Iterator<Item = MediaQuery> {
        DEFAULT_QUERIES.iter().map(|(name, media)| MediaQuery {
            name: String::from(*name),
            media: String::from(*media),
        })
    }
}

/// Checks that a condition name is usable as a registry key.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::invalid_argument("query name must not be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn test_default_table() {
        let names: Vec<&str> = DEFAULT_QUERIES.iter().map(|(n, _)| *n).collect();
        assert_eq!(
            names,
            ["print", "phone", "tablet", "desktop", "portrait", "landscape"]
        );
    }

    #[test]
    fn test_media_query_new() {
        let q = MediaQuery::new("wide", "(min-width: 1400px)").unwrap();
        assert_eq!(q.name(), "wide");
        assert_eq!(q.media(), "(min-width: 1400px)");

        assert!(matches!(
            MediaQuery::new("", "print"),
            Err(Error::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_media_query_defaults() {
        let defaults: Vec<MediaQuery> = MediaQuery::defaults().collect();
        assert_eq!(defaults.len(), 6);
        assert_eq!(defaults[1].name(), "phone");
        assert_eq!(defaults[1].media(), "(max-width: 767px)");
    }
}

//! The set of condition names a listener is attached to.

use crate::error::Result;
use crate::query::validate_name;
use alloc::string::String;
use alloc::vec::Vec;

/// Which conditions a listener should observe.
///
/// Callers either name a single condition, name several, or leave the
/// choice to the registry, which then uses the default conditions that are
/// registered at the time of the call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum QueryNames {
    /// The built-in default names currently registered.
    #[default]
    Defaults,
    /// A single condition name.
    One(String),
    /// An ordered sequence of condition names.
    Many(Vec<String>),
}

impl QueryNames {
    /// Resolves to a concrete list of names.
    ///
    /// `defaults` is only consulted for `QueryNames::Defaults`. Every
    /// explicit name must be non-empty.
    pub fn resolve<F>(self, defaults: F) -> Result<Vec<String>>
    where
        F: FnOnce() -> Vec<String>,
    {
        let names = match self {
            QueryNames::Defaults => return Ok(defaults()),
            QueryNames::One(name) => alloc::vec![name],
            QueryNames::Many(names) => names,
        };
        for name in &names {
            validate_name(name)?;
        }
        Ok(names)
    }
}

impl From<&str> for QueryNames {
    fn from(name: &str) -> Self {
        QueryNames::One(name.into())
    }
}

impl From<String> for QueryNames {
    fn from(name: String) -> Self {
        QueryNames::One(name)
    }
}

impl From<Vec<String>> for QueryNames {
    fn from(names: Vec<String>) -> Self {
        QueryNames::Many(names)
    }
}

impl From<&[&str]> for QueryNames {
    fn from(names: &[&str]) -> Self {
        QueryNames::Many(names.iter().map(|n| String::from(*n)).collect())
    }
}

impl<const N: usize> From<[&str; N]> for QueryNames {
    fn from(names: [&str; N]) -> Self {
        QueryNames::Many(names.iter().map(|n| String::from(*n)).collect())
    }
}

impl From<Option<QueryNames>> for QueryNames {
    fn from(names: Option<QueryNames>) -> Self {
        names.unwrap_or_default()
    }
}

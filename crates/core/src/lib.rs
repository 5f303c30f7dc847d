//! mediaq Core - Shared types for the mediaq media query registry.
//!
//! This crate provides the foundational types used by the registry and the
//! browser bindings:
//!
//! - `Error`: Error types for registry operations
//! - `MediaQuery`: A named condition and its host expression
//! - `QueryNames`: The names a listener is attached to
//! - `DEFAULT_QUERIES`: Built-in conditions (print, phone, tablet, desktop, portrait, landscape)
//!
//! # Example
//!
//! ```rust
//! use mediaq_core::{MediaQuery, QueryNames, DEFAULT_QUERIES};
//!
//! let wide = MediaQuery::new("wide", "(min-width: 1400px)").unwrap();
//! assert_eq!(wide.name(), "wide");
//!
//! let names = QueryNames::from(["phone", "tablet"])
//!     .resolve(|| DEFAULT_QUERIES.iter().map(|(n, _)| (*n).into()).collect())
//!     .unwrap();
//! assert_eq!(names, ["phone", "tablet"]);
//! ```

#![no_std]

extern crate alloc;

pub mod error;
pub mod names;
pub mod query;

pub use error::{Error, Result};
pub use names::QueryNames;
pub use query::{validate_name, MediaQuery, DEFAULT_QUERIES};

//! Query filters for selecting records from collections.
//!
//! Filters are declarative predicates over a single field. They are built
//! with a fluent API, rendered to a BSON filter document, and handed to the
//! document store for evaluation. Nothing is evaluated locally except regex
//! pattern validation.
//!
//! # Creating Filters
//!
//! - `field("age").gt(30.0)` - strict numeric comparison
//! - `field("name").eq("Alice")` - equality
//! - `field("name").matches("^Al", false)` - case-insensitive regex
//! - `field("joined").at(ts)` - exact timestamp
//! - `field("joined").between(from, to)` - inclusive-lower/exclusive-upper range
//! - `all()` - match every record
//! - `by_id(id)` - match on the store's `_id` key
//!
//! # Examples
//!
//! ```rust,ignore
//! use mongocrud::filter::{all, field};
//!
//! let active = field("status").eq("active");
//! let adults = field("age").gt(17.0);
//! let admins = field("name").matches("admin", false)?;
//! let results = repo.find::<User>("users", active).await?;
//! ```

use chrono::{DateTime, Utc};
use mongodb::bson::{doc, Bson, Document};
use std::fmt::{Display, Formatter};

use crate::errors::RepoResult;

/// A declarative predicate over records in a collection.
///
/// A `Filter` wraps the BSON filter document that is sent to the store. It is
/// constructed through [`field`], [`all`] or [`by_id`] and consumed by the
/// repository's find and delete operations.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    document: Document,
}

impl Filter {
    pub(crate) fn new(document: Document) -> Self {
        Filter { document }
    }

    /// Returns the BSON filter document this filter renders to.
    pub fn as_document(&self) -> &Document {
        &self.document
    }

    /// Consumes the filter, yielding the BSON filter document.
    pub fn into_document(self) -> Document {
        self.document
    }
}

impl Display for Filter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.document)
    }
}

/// Creates a filter matching every record in the collection.
pub fn all() -> Filter {
    Filter::new(Document::new())
}

/// Creates a filter matching the record whose `_id` equals the given value.
///
/// # Arguments
///
/// * `id` - The identifier value, in the store's native primary-key type
pub fn by_id<V: Into<Bson>>(id: V) -> Filter {
    Filter::new(doc! { "_id": id.into() })
}

/// Creates a fluent filter builder for the specified field name.
///
/// # Arguments
///
/// * `field_name` - The name of the field to filter on
///
/// # Returns
///
/// A `FluentFilter` builder for constructing field-specific filters
pub fn field(field_name: &str) -> FluentFilter {
    FluentFilter {
        field_name: field_name.to_string(),
    }
}

/// A fluent builder for constructing filters on a specific field.
///
/// `FluentFilter` provides chainable methods for equality, pattern matching,
/// timestamp matching, and range conditions. Each method returns a [`Filter`]
/// ready to be passed to the repository's find and delete operations.
pub struct FluentFilter {
    field_name: String,
}

impl FluentFilter {
    /// Creates a filter matching records where the field equals the value.
    #[inline]
    pub fn eq<V: Into<Bson>>(self, value: V) -> Filter {
        Filter::new(doc! { self.field_name: value.into() })
    }

    /// Creates a filter matching records where the field is strictly greater
    /// than the value. Records where the field equals the value are excluded.
    #[inline]
    pub fn gt<V: Into<Bson>>(self, value: V) -> Filter {
        Filter::new(doc! { self.field_name: { "$gt": value.into() } })
    }

    /// Creates a filter matching records where the field equals the given
    /// timestamp exactly.
    ///
    /// # Arguments
    ///
    /// * `timestamp` - The timestamp to match; millisecond precision, as
    ///   stored by the document store
    #[inline]
    pub fn at(self, timestamp: DateTime<Utc>) -> Filter {
        Filter::new(doc! {
            self.field_name: Bson::DateTime(mongodb::bson::DateTime::from_chrono(timestamp))
        })
    }

    /// Creates a filter matching records where `from <= field < to`.
    ///
    /// The lower bound is inclusive and the upper bound exclusive. When
    /// `from > to` the resulting filter matches nothing; the store returns an
    /// empty result rather than an error.
    #[inline]
    pub fn between(self, from: DateTime<Utc>, to: DateTime<Utc>) -> Filter {
        Filter::new(doc! {
            self.field_name: {
                "$gte": Bson::DateTime(mongodb::bson::DateTime::from_chrono(from)),
                "$lt": Bson::DateTime(mongodb::bson::DateTime::from_chrono(to)),
            }
        })
    }

    /// Creates a filter matching records whose field matches a regular
    /// expression.
    ///
    /// The pattern is validated locally before it is shipped to the store.
    /// The store's PCRE engine accepts look-around and backreferences that
    /// the local dialect does not, so patterns rejected locally only for
    /// using such features are passed through for the store to evaluate.
    ///
    /// # Arguments
    ///
    /// * `pattern` - The regular-expression pattern
    /// * `case_sensitive` - When false, matching ignores letter case
    ///
    /// # Errors
    ///
    /// Returns an `InvalidPattern` error if the pattern is malformed (for
    /// example an unclosed character class or group).
    pub fn matches(self, pattern: &str, case_sensitive: bool) -> RepoResult<Filter> {
        if let Err(err) = regex::Regex::new(pattern) {
            // The local dialect reports features it deliberately lacks
            // (look-around, backreferences) as "not supported" syntax
            // errors; the store evaluates those fine.
            let store_side_only =
                matches!(&err, regex::Error::Syntax(msg) if msg.contains("not supported"));
            if !store_side_only {
                return Err(err.into());
            }
        }
        let options = if case_sensitive { "" } else { "i" };
        Ok(Filter::new(doc! {
            self.field_name: Bson::RegularExpression(mongodb::bson::Regex {
                pattern: pattern.to_string(),
                options: options.to_string(),
            })
        }))
    }
}

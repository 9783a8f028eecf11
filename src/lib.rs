//! # mongocrud - Typed CRUD Over MongoDB
//!
//! mongocrud is a thin, generic convenience layer over the MongoDB Rust
//! driver. One repository type, bound to a connection endpoint and a database
//! name, resolves a named collection per call and forwards typed insert /
//! find / upsert / delete intents to the driver's native operations.
//!
//! ## Key Features
//!
//! - **Typed**: works with any `Serialize`/`Deserialize` record type
//! - **Two API surfaces**: async ([`repository`]) and blocking ([`blocking`]),
//!   with the identical method set
//! - **Declarative filters**: equality, regex (case-sensitive or not), exact
//!   timestamp, date range, strict numeric comparison
//! - **Uniqueness**: insert-with-unique-index in one call
//! - **No magic**: no query planning, no caching of results, no retries;
//!   every failure from the store propagates to the caller
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mongocrud::DocumentRepository;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct User {
//!     #[serde(rename = "_id")]
//!     id: i64,
//!     name: String,
//! }
//!
//! # async fn demo() -> mongocrud::errors::RepoResult<()> {
//! let repo = DocumentRepository::new("mongodb://localhost:27017", "appdb");
//!
//! repo.insert("users", User { id: 1, name: "Alice".into() }).await?;
//!
//! let everyone: Vec<User> = repo.load_all("users").await?;
//! let alice: User = repo.load_by_id("users", 1i64).await?;
//!
//! repo.upsert("users", 1i64, User { id: 1, name: "Alicia".into() }).await?;
//! repo.delete_by_id("users", 1i64).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`blocking`] - Blocking repository over the driver's sync API
//! - [`errors`] - Error kinds, error type, and result alias
//! - [`filter`] - Declarative query filters with a fluent builder
//! - [`options`] - Repository configuration
//! - [`repository`] - Asynchronous repository

pub mod blocking;
pub mod errors;
pub mod filter;
pub mod options;
pub mod repository;

pub use errors::{ErrorKind, RepoError, RepoResult};
pub use options::RepositoryOptions;
pub use repository::DocumentRepository;

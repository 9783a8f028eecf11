//! The blocking document repository.
//!
//! A synchronous rendition of [`crate::repository::DocumentRepository`] over
//! the driver's sync API. The method set is identical; every operation blocks
//! the calling thread until the store responds. Call sites that cannot or do
//! not want to suspend on futures use this variant.

use mongodb::bson::{doc, Bson, Document};
use mongodb::options::IndexOptions;
use mongodb::sync::{Client, Collection};
use mongodb::IndexModel;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

use crate::errors::{ErrorKind, RepoError, RepoResult};
use crate::filter::{all, by_id, field, Filter};
use crate::options::RepositoryOptions;

/// A typed, blocking CRUD façade over one database of a document store.
///
/// Holds the same `(endpoint, database name, options)` triple as the async
/// repository and shares its contract; see
/// [`crate::repository::DocumentRepository`] for operation semantics. The
/// driver client is opened lazily on first use and cached inside the handle.
///
/// All clones share the same underlying state through `Arc`.
#[derive(Clone)]
pub struct DocumentRepository {
    inner: Arc<RepositoryInner>,
}

struct RepositoryInner {
    endpoint: String,
    database_name: String,
    options: RepositoryOptions,
    client: Mutex<Option<Client>>,
}

impl DocumentRepository {
    /// Creates a blocking repository for the given endpoint and database
    /// name.
    ///
    /// No validation is performed here; a malformed endpoint surfaces as a
    /// `StoreUnavailable` failure on first use.
    pub fn new(endpoint: impl Into<String>, database_name: impl Into<String>) -> Self {
        Self::with_options(endpoint, database_name, RepositoryOptions::default())
    }

    /// Creates a blocking repository with explicit [`RepositoryOptions`].
    pub fn with_options(
        endpoint: impl Into<String>,
        database_name: impl Into<String>,
        options: RepositoryOptions,
    ) -> Self {
        DocumentRepository {
            inner: Arc::new(RepositoryInner {
                endpoint: endpoint.into(),
                database_name: database_name.into(),
                options,
                client: Mutex::new(None),
            }),
        }
    }

    /// Returns the connection endpoint this repository is bound to.
    pub fn endpoint(&self) -> &str {
        &self.inner.endpoint
    }

    /// Returns the database name this repository is bound to.
    pub fn database_name(&self) -> &str {
        &self.inner.database_name
    }

    /// Returns the options this repository was configured with.
    pub fn options(&self) -> &RepositoryOptions {
        &self.inner.options
    }

    fn client(&self) -> RepoResult<Client> {
        let mut guard = self.inner.client.lock();
        if let Some(client) = guard.as_ref() {
            return Ok(client.clone());
        }
        log::debug!("opening client for endpoint {}", self.inner.endpoint);
        let client = Client::with_uri_str(&self.inner.endpoint).map_err(|err| {
            RepoError::new_with_cause(
                &format!("cannot open client for endpoint {}", self.inner.endpoint),
                ErrorKind::StoreUnavailable,
                err.into(),
            )
        })?;
        *guard = Some(client.clone());
        Ok(client)
    }

    fn collection<T: Send + Sync>(&self, collection: &str) -> RepoResult<Collection<T>> {
        let client = self.client()?;
        Ok(client.database(&self.inner.database_name).collection(collection))
    }

    /// Inserts a single record into the named collection, returning the
    /// inserted identifier.
    pub fn insert<T>(&self, collection: &str, record: T) -> RepoResult<Bson>
    where
        T: Serialize + Send + Sync,
    {
        let coll = self.collection::<T>(collection)?;
        let result = coll.insert_one(record).run()?;
        Ok(result.inserted_id)
    }

    /// Inserts a record and enforces uniqueness of `unique_field`.
    ///
    /// The unique index is declared before the record is inserted; see the
    /// async variant for the full contract.
    pub fn insert_unique<T>(
        &self,
        collection: &str,
        record: T,
        unique_field: &str,
    ) -> RepoResult<Bson>
    where
        T: Serialize + Send + Sync,
    {
        let coll = self.collection::<T>(collection)?;
        let index = IndexModel::builder()
            .keys(doc! { unique_field: 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        coll.create_index(index).run().map_err(|err| {
            RepoError::new_with_cause(
                &format!(
                    "unique index on field '{}' in collection '{}' could not be created",
                    unique_field, collection
                ),
                ErrorKind::ConstraintCreationFailed,
                err.into(),
            )
        })?;
        let result = coll.insert_one(record).run()?;
        Ok(result.inserted_id)
    }

    /// Finds all records matching a [`Filter`], materialized to a `Vec`.
    ///
    /// The driver's sync cursor iterates records only for `Unpin` types,
    /// hence the extra bound on the blocking read operations.
    pub fn find<T>(&self, collection: &str, filter: Filter) -> RepoResult<Vec<T>>
    where
        T: DeserializeOwned + Unpin + Send + Sync,
    {
        let coll = self.collection::<T>(collection)?;
        let cursor = coll.find(filter.into_document()).run()?;
        let records = cursor.collect::<Result<Vec<T>, mongodb::error::Error>>()?;
        Ok(records)
    }

    /// Finds the first record matching a [`Filter`], if any.
    pub fn find_one<T>(&self, collection: &str, filter: Filter) -> RepoResult<Option<T>>
    where
        T: DeserializeOwned + Send + Sync,
    {
        let coll = self.collection::<T>(collection)?;
        let record = coll.find_one(filter.into_document()).run()?;
        Ok(record)
    }

    /// Loads every record in the named collection.
    pub fn load_all<T>(&self, collection: &str) -> RepoResult<Vec<T>>
    where
        T: DeserializeOwned + Unpin + Send + Sync,
    {
        self.find(collection, all())
    }

    /// Loads all records where `field_name` equals `value`.
    pub fn load_by_field<T, V>(
        &self,
        collection: &str,
        field_name: &str,
        value: V,
    ) -> RepoResult<Vec<T>>
    where
        T: DeserializeOwned + Unpin + Send + Sync,
        V: Into<Bson>,
    {
        self.find(collection, field(field_name).eq(value))
    }

    /// Finds the first record where `field_name` equals `value`, or `None`.
    pub fn find_one_by_field<T, V>(
        &self,
        collection: &str,
        field_name: &str,
        value: V,
    ) -> RepoResult<Option<T>>
    where
        T: DeserializeOwned + Send + Sync,
        V: Into<Bson>,
    {
        self.find_one(collection, field(field_name).eq(value))
    }

    /// Loads the first record where `field_name` equals `value`, failing with
    /// `NotFound` when nothing matches.
    pub fn load_one_by_field<T, V>(
        &self,
        collection: &str,
        field_name: &str,
        value: V,
    ) -> RepoResult<T>
    where
        T: DeserializeOwned + Send + Sync,
        V: Into<Bson>,
    {
        self.find_one_by_field(collection, field_name, value)?
            .ok_or_else(|| {
                RepoError::new(
                    &format!(
                        "no record in collection '{}' where field '{}' matches",
                        collection, field_name
                    ),
                    ErrorKind::NotFound,
                )
            })
    }

    /// Loads the record whose identifier equals `id`, failing with
    /// `NotFound` when absent.
    pub fn load_by_id<T, V>(&self, collection: &str, id: V) -> RepoResult<T>
    where
        T: DeserializeOwned + Send + Sync,
        V: Into<Bson>,
    {
        let id = id.into();
        self.find_one(collection, by_id(id.clone()))?.ok_or_else(|| {
            RepoError::new(
                &format!("no record with id {} in collection '{}'", id, collection),
                ErrorKind::NotFound,
            )
        })
    }

    /// Loads all records whose field matches a regular-expression pattern.
    ///
    /// # Errors
    ///
    /// `InvalidPattern` if the pattern is not a valid regular expression.
    pub fn search_by_pattern<T>(
        &self,
        collection: &str,
        field_name: &str,
        pattern: &str,
        case_sensitive: bool,
    ) -> RepoResult<Vec<T>>
    where
        T: DeserializeOwned + Unpin + Send + Sync,
    {
        let filter = field(field_name).matches(pattern, case_sensitive)?;
        self.find(collection, filter)
    }

    /// Loads all records where the field equals the given timestamp exactly.
    pub fn load_by_date<T>(
        &self,
        collection: &str,
        field_name: &str,
        timestamp: chrono::DateTime<chrono::Utc>,
    ) -> RepoResult<Vec<T>>
    where
        T: DeserializeOwned + Unpin + Send + Sync,
    {
        self.find(collection, field(field_name).at(timestamp))
    }

    /// Loads all records where `from <= field < to`. When `from > to` the
    /// result is an empty `Vec`, never an error.
    pub fn load_between_dates<T>(
        &self,
        collection: &str,
        field_name: &str,
        from: chrono::DateTime<chrono::Utc>,
        to: chrono::DateTime<chrono::Utc>,
    ) -> RepoResult<Vec<T>>
    where
        T: DeserializeOwned + Unpin + Send + Sync,
    {
        self.find(collection, field(field_name).between(from, to))
    }

    /// Loads all records where the field is strictly greater than `number`.
    pub fn load_greater_than<T>(
        &self,
        collection: &str,
        field_name: &str,
        number: f64,
    ) -> RepoResult<Vec<T>>
    where
        T: DeserializeOwned + Unpin + Send + Sync,
    {
        self.find(collection, field(field_name).gt(number))
    }

    fn delete_one(&self, collection: &str, filter: Filter) -> RepoResult<u64> {
        let coll = self.collection::<Document>(collection)?;
        let result = coll.delete_one(filter.into_document()).run()?;
        Ok(result.deleted_count)
    }

    /// Deletes at most one record where `field_name` equals `value`,
    /// returning the deleted count. Honors
    /// [`best_effort_delete`](crate::options::best_effort_delete) the same
    /// way the async variant does.
    pub fn delete_by_field<V: Into<Bson>>(
        &self,
        collection: &str,
        field_name: &str,
        value: V,
    ) -> RepoResult<u64> {
        match self.delete_one(collection, field(field_name).eq(value)) {
            Ok(count) => Ok(count),
            Err(err) if self.inner.options.is_best_effort_delete() => {
                log::warn!(
                    "best-effort delete in collection '{}' on field '{}' failed: {}",
                    collection,
                    field_name,
                    err
                );
                Ok(0)
            }
            Err(err) => Err(err),
        }
    }

    /// Deletes at most one record whose identifier equals `id`, returning
    /// the deleted count. Absence is not an error.
    pub fn delete_by_id<V: Into<Bson>>(&self, collection: &str, id: V) -> RepoResult<u64> {
        self.delete_one(collection, by_id(id))
    }

    /// Replaces the record whose identifier equals `id`, inserting it when
    /// absent.
    pub fn upsert<T, V>(&self, collection: &str, id: V, record: T) -> RepoResult<()>
    where
        T: Serialize + Send + Sync,
        V: Into<Bson>,
    {
        let coll = self.collection::<T>(collection)?;
        coll.replace_one(by_id(id).into_document(), record)
            .upsert(true)
            .run()?;
        Ok(())
    }
}

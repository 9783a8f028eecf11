//! The asynchronous document repository.
//!
//! [`DocumentRepository`] is a generic façade bound to one
//! `(connection endpoint, database name)` pair. Every operation resolves a
//! collection handle by name and forwards the typed CRUD intent to the
//! driver; nothing is planned, cached, or retried locally. All consistency
//! guarantees (atomicity of upsert, uniqueness enforcement) are delegated to
//! the store.
//!
//! For the blocking rendition of the same contract see [`crate::blocking`].

use futures::TryStreamExt;
use mongodb::bson::{doc, Bson, Document};
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, IndexModel};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::errors::{ErrorKind, RepoError, RepoResult};
use crate::filter::{all, by_id, field, Filter};
use crate::options::RepositoryOptions;

/// A typed, asynchronous CRUD façade over one database of a document store.
///
/// The repository holds only the connection endpoint, the database name, and
/// its [`RepositoryOptions`]; it is observably stateless across calls and
/// never mutates those fields. The driver client is opened lazily on first
/// use and cached inside the handle; the driver pools physical connections
/// internally, so the cache is invisible to callers and exists purely to
/// avoid re-opening a client per call. Dropping the repository releases the
/// client.
///
/// All clones share the same underlying state through `Arc`.
///
/// # Examples
///
/// ```rust,ignore
/// use mongocrud::DocumentRepository;
///
/// let repo = DocumentRepository::new("mongodb://localhost:27017", "appdb");
/// repo.insert("users", user).await?;
/// let users: Vec<User> = repo.load_all("users").await?;
/// ```
#[derive(Clone)]
pub struct DocumentRepository {
    inner: Arc<RepositoryInner>,
}

struct RepositoryInner {
    endpoint: String,
    database_name: String,
    options: RepositoryOptions,
    client: OnceCell<Client>,
}

impl DocumentRepository {
    /// Creates a repository for the given endpoint and database name.
    ///
    /// No validation is performed here; a malformed endpoint surfaces as a
    /// `StoreUnavailable` failure on first use.
    pub fn new(endpoint: impl Into<String>, database_name: impl Into<String>) -> Self {
        Self::with_options(endpoint, database_name, RepositoryOptions::default())
    }

    /// Creates a repository with explicit [`RepositoryOptions`].
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
                client: OnceCell::new(),
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

    async fn client(&self) -> RepoResult<&Client> {
        self.inner
            .client
            .get_or_try_init(|| async {
                log::debug!("opening client for endpoint {}", self.inner.endpoint);
                Client::with_uri_str(&self.inner.endpoint).await.map_err(|err| {
                    RepoError::new_with_cause(
                        &format!("cannot open client for endpoint {}", self.inner.endpoint),
                        ErrorKind::StoreUnavailable,
                        err.into(),
                    )
                })
            })
            .await
    }

    /// Resolves a typed collection handle by name.
    async fn collection<T: Send + Sync>(&self, collection: &str) -> RepoResult<Collection<T>> {
        let client = self.client().await?;
        Ok(client.database(&self.inner.database_name).collection(collection))
    }

    /// Inserts a single record into the named collection.
    ///
    /// # Returns
    ///
    /// The identifier of the inserted record. When the record carries no
    /// identifier of its own, the store assigns one.
    ///
    /// # Errors
    ///
    /// `StoreUnavailable` if the store cannot be reached, `WriteRejected` if
    /// the store rejects the write (for example a uniqueness violation).
    pub async fn insert<T>(&self, collection: &str, record: T) -> RepoResult<Bson>
    where
        T: Serialize + Send + Sync,
    {
        let coll = self.collection::<T>(collection).await?;
        let result = coll.insert_one(record).await?;
        Ok(result.inserted_id)
    }

    /// Inserts a record and enforces uniqueness of `unique_field`.
    ///
    /// The unique index is declared *before* the record is inserted, so the
    /// very first write through this method is already checked against the
    /// constraint it declares. (The legacy behavior of this API created the
    /// index after the insert, leaving a window where concurrent inserts
    /// raced the index creation.)
    ///
    /// # Errors
    ///
    /// `ConstraintCreationFailed` if the index cannot be created, typically
    /// because existing records already contain duplicate values for
    /// `unique_field`; `WriteRejected` if the insert itself violates the
    /// constraint.
    pub async fn insert_unique<T>(
        &self,
        collection: &str,
        record: T,
        unique_field: &str,
    ) -> RepoResult<Bson>
    where
        T: Serialize + Send + Sync,
    {
        let coll = self.collection::<T>(collection).await?;
        let index = IndexModel::builder()
            .keys(doc! { unique_field: 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        coll.create_index(index).await.map_err(|err| {
            RepoError::new_with_cause(
                &format!(
                    "unique index on field '{}' in collection '{}' could not be created",
                    unique_field, collection
                ),
                ErrorKind::ConstraintCreationFailed,
                err.into(),
            )
        })?;
        let result = coll.insert_one(record).await?;
        Ok(result.inserted_id)
    }

    /// Finds all records matching a [`Filter`], materialized to a `Vec`.
    ///
    /// Record order is whatever the store returns; callers must not rely on
    /// it.
    pub async fn find<T>(&self, collection: &str, filter: Filter) -> RepoResult<Vec<T>>
    where
        T: DeserializeOwned + Send + Sync,
    {
        let coll = self.collection::<T>(collection).await?;
        let cursor = coll.find(filter.into_document()).await?;
        let records = cursor.try_collect().await?;
        Ok(records)
    }

    /// Finds the first record matching a [`Filter`], if any.
    pub async fn find_one<T>(&self, collection: &str, filter: Filter) -> RepoResult<Option<T>>
    where
        T: DeserializeOwned + Send + Sync,
    {
        let coll = self.collection::<T>(collection).await?;
        let record = coll.find_one(filter.into_document()).await?;
        Ok(record)
    }

    /// Loads every record in the named collection.
    pub async fn load_all<T>(&self, collection: &str) -> RepoResult<Vec<T>>
    where
        T: DeserializeOwned + Send + Sync,
    {
        self.find(collection, all()).await
    }

    /// Loads all records where `field_name` equals `value`.
    ///
    /// Returns an empty `Vec` when nothing matches.
    pub async fn load_by_field<T, V>(
        &self,
        collection: &str,
        field_name: &str,
        value: V,
    ) -> RepoResult<Vec<T>>
    where
        T: DeserializeOwned + Send + Sync,
        V: Into<Bson>,
    {
        self.find(collection, field(field_name).eq(value)).await
    }

    /// Finds the first record where `field_name` equals `value`, or `None`.
    ///
    /// The companion [`load_one_by_field`](Self::load_one_by_field) fails
    /// with `NotFound` instead; both variants are offered because callers
    /// rely on each semantics.
    pub async fn find_one_by_field<T, V>(
        &self,
        collection: &str,
        field_name: &str,
        value: V,
    ) -> RepoResult<Option<T>>
    where
        T: DeserializeOwned + Send + Sync,
        V: Into<Bson>,
    {
        self.find_one(collection, field(field_name).eq(value)).await
    }

    /// Loads the first record where `field_name` equals `value`.
    ///
    /// # Errors
    ///
    /// `NotFound` when no record matches.
    pub async fn load_one_by_field<T, V>(
        &self,
        collection: &str,
        field_name: &str,
        value: V,
    ) -> RepoResult<T>
    where
        T: DeserializeOwned + Send + Sync,
        V: Into<Bson>,
    {
        self.find_one_by_field(collection, field_name, value)
            .await?
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

    /// Loads the record whose identifier equals `id`.
    ///
    /// # Errors
    ///
    /// `NotFound` when no record carries the identifier.
    pub async fn load_by_id<T, V>(&self, collection: &str, id: V) -> RepoResult<T>
    where
        T: DeserializeOwned + Send + Sync,
        V: Into<Bson>,
    {
        let id = id.into();
        self.find_one(collection, by_id(id.clone()))
            .await?
            .ok_or_else(|| {
                RepoError::new(
                    &format!("no record with id {} in collection '{}'", id, collection),
                    ErrorKind::NotFound,
                )
            })
    }

    /// Loads all records whose field matches a regular-expression pattern.
    ///
    /// # Arguments
    ///
    /// * `pattern` - The regular-expression pattern, validated locally
    /// * `case_sensitive` - When false, matching ignores letter case
    ///
    /// # Errors
    ///
    /// `InvalidPattern` if the pattern is not a valid regular expression.
    pub async fn search_by_pattern<T>(
        &self,
        collection: &str,
        field_name: &str,
        pattern: &str,
        case_sensitive: bool,
    ) -> RepoResult<Vec<T>>
    where
        T: DeserializeOwned + Send + Sync,
    {
        let filter = field(field_name).matches(pattern, case_sensitive)?;
        self.find(collection, filter).await
    }

    /// Loads all records where the field equals the given timestamp exactly.
    pub async fn load_by_date<T>(
        &self,
        collection: &str,
        field_name: &str,
        timestamp: chrono::DateTime<chrono::Utc>,
    ) -> RepoResult<Vec<T>>
    where
        T: DeserializeOwned + Send + Sync,
    {
        self.find(collection, field(field_name).at(timestamp)).await
    }

    /// Loads all records where `from <= field < to`.
    ///
    /// The lower bound is inclusive, the upper bound exclusive. When
    /// `from > to` the result is an empty `Vec`, never an error.
    pub async fn load_between_dates<T>(
        &self,
        collection: &str,
        field_name: &str,
        from: chrono::DateTime<chrono::Utc>,
        to: chrono::DateTime<chrono::Utc>,
    ) -> RepoResult<Vec<T>>
    where
        T: DeserializeOwned + Send + Sync,
    {
        self.find(collection, field(field_name).between(from, to)).await
    }

    /// Loads all records where the field is strictly greater than `number`.
    ///
    /// Records where the field equals `number` are excluded.
    pub async fn load_greater_than<T>(
        &self,
        collection: &str,
        field_name: &str,
        number: f64,
    ) -> RepoResult<Vec<T>>
    where
        T: DeserializeOwned + Send + Sync,
    {
        self.find(collection, field(field_name).gt(number)).await
    }

    async fn delete_one(&self, collection: &str, filter: Filter) -> RepoResult<u64> {
        let coll = self.collection::<Document>(collection).await?;
        let result = coll.delete_one(filter.into_document()).await?;
        Ok(result.deleted_count)
    }

    /// Deletes at most one record where `field_name` equals `value`.
    ///
    /// # Returns
    ///
    /// The number of deleted records (0 or 1). A non-match is not an error.
    ///
    /// # Behavior
    ///
    /// When the repository was configured with
    /// [`best_effort_delete`](crate::options::best_effort_delete), a store
    /// failure is logged at warn level and reported as `Ok(0)` instead of
    /// propagating, reproducing the legacy fire-and-forget semantics of this
    /// operation.
    pub async fn delete_by_field<V: Into<Bson>>(
        &self,
        collection: &str,
        field_name: &str,
        value: V,
    ) -> RepoResult<u64> {
        match self.delete_one(collection, field(field_name).eq(value)).await {
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

    /// Deletes at most one record whose identifier equals `id`.
    ///
    /// # Returns
    ///
    /// The number of deleted records (0 or 1). Absence is not an error.
    pub async fn delete_by_id<V: Into<Bson>>(&self, collection: &str, id: V) -> RepoResult<u64> {
        self.delete_one(collection, by_id(id)).await
    }

    /// Replaces the record whose identifier equals `id`, inserting it when
    /// absent.
    ///
    /// The replacement is atomic at the store; repeating the call with the
    /// same arguments leaves the collection in the same state.
    ///
    /// # Errors
    ///
    /// `WriteRejected` if the store rejects the replacement (for example a
    /// uniqueness violation on another field).
    pub async fn upsert<T, V>(&self, collection: &str, id: V, record: T) -> RepoResult<()>
    where
        T: Serialize + Send + Sync,
        V: Into<Bson>,
    {
        let coll = self.collection::<T>(collection).await?;
        coll.replace_one(by_id(id).into_document(), record)
            .upsert(true)
            .await?;
        Ok(())
    }
}

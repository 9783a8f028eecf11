#![allow(dead_code)]

//! Shared fixtures for the integration tests.
//!
//! The live-store tests are gated on the `MONGOCRUD_TEST_URI` environment
//! variable (for example `mongodb://localhost:27017`) and skip cleanly when
//! it is not set. Each test works in its own uniquely named collection of the
//! `mongocrud_test` database and drops it afterwards.

use mongodb::bson::oid::ObjectId;
use mongodb::bson::{DateTime, Document};
use serde::{Deserialize, Serialize};

pub const TEST_DATABASE: &str = "mongocrud_test";

#[ctor::ctor]
fn init_logging() {
    colog::init();
}

/// Returns the connection string for the live test store, if configured.
pub fn test_uri() -> Option<String> {
    match std::env::var("MONGOCRUD_TEST_URI") {
        Ok(uri) if !uri.is_empty() => Some(uri),
        _ => {
            log::warn!("MONGOCRUD_TEST_URI not set, skipping live-store test");
            None
        }
    }
}

/// Produces a collection name unique to one test run.
pub fn unique_collection(prefix: &str) -> String {
    format!("{}_{}", prefix, ObjectId::new().to_hex())
}

/// Drops a test collection, ignoring failures during cleanup.
pub async fn drop_collection(uri: &str, collection: &str) {
    if let Ok(client) = mongodb::Client::with_uri_str(uri).await {
        let _ = client
            .database(TEST_DATABASE)
            .collection::<Document>(collection)
            .drop()
            .await;
    }
}

/// Blocking counterpart of [`drop_collection`].
pub fn drop_collection_blocking(uri: &str, collection: &str) {
    if let Ok(client) = mongodb::sync::Client::with_uri_str(uri) {
        let _ = client
            .database(TEST_DATABASE)
            .collection::<Document>(collection)
            .drop()
            .run();
    }
}

/// A record with a store-assigned identifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub email: String,
    pub age: i64,
    pub joined: DateTime,
}

impl User {
    pub fn new(name: &str, email: &str, age: i64, joined_millis: i64) -> Self {
        User {
            id: None,
            name: name.to_string(),
            email: email.to_string(),
            age,
            joined: DateTime::from_millis(joined_millis),
        }
    }
}

/// A record with a caller-supplied identifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    #[serde(rename = "_id")]
    pub id: i64,
    pub name: String,
}

impl Item {
    pub fn new(id: i64, name: &str) -> Self {
        Item {
            id,
            name: name.to_string(),
        }
    }
}

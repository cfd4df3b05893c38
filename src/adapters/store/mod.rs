//! Document store seam.
//!
//! Every component talks to persistence through [`DocumentStore`], which models a
//! collection-of-JSON-documents database: insert, filtered find with skip/limit,
//! count and single delete. Uniqueness is declared per collection and enforced by
//! the store itself, so a racing pair of inserts can never both succeed.
pub mod memory;
pub mod postgres;

use std::fmt::Display;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use thiserror::Error;

pub use memory::MemoryStore;
pub use postgres::PgDocumentStore;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Collection {
	Users,
	Posts,
	Comments,
	Follows,
}

impl Collection {
	pub fn name(&self) -> &'static str {
		match self {
			Collection::Users => "users",
			Collection::Posts => "posts",
			Collection::Comments => "comments",
			Collection::Follows => "follows",
		}
	}
}

impl Display for Collection {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.name())
	}
}

/// Fields whose combined values must be unique within a collection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UniqueIndex {
	pub name: &'static str,
	pub fields: &'static [&'static str],
}

impl UniqueIndex {
	pub const fn new(name: &'static str, fields: &'static [&'static str]) -> Self {
		Self { name, fields }
	}
}

/// A record on its way into the store. `body` must be a JSON object; `id` and
/// `created_at` are also kept outside the body for keyed access and ordering.
#[derive(Clone, Debug)]
pub struct Document {
	pub id: String,
	pub created_at: DateTime<Utc>,
	pub body: Value,
}

impl Document {
	pub fn new<T: serde::Serialize>(
		id: impl Into<String>,
		created_at: DateTime<Utc>,
		entity: &T,
	) -> Result<Self, StoreError> {
		let body = serde_json::to_value(entity).map_err(|err| StoreError::Serialization(err.to_string()))?;
		if !body.is_object() {
			return Err(StoreError::Serialization("document body must be an object".into()));
		}
		Ok(Self {
			id: id.into(),
			created_at,
			body,
		})
	}
}

#[derive(Clone, Debug, PartialEq)]
pub enum Filter {
	All,
	/// Every listed top-level field must equal the given value.
	Eq(Map<String, Value>),
	/// At least one of the nested filters matches.
	AnyOf(Vec<Filter>),
}

impl Filter {
	pub fn eq(field: &str, value: impl Into<Value>) -> Self {
		let mut map = Map::new();
		map.insert(field.to_string(), value.into());
		Filter::Eq(map)
	}

	/// Adds another equality clause. On `All` this starts an equality filter.
	pub fn and(self, field: &str, value: impl Into<Value>) -> Self {
		let value: Value = value.into();
		match self {
			Filter::All => Filter::eq(field, value),
			Filter::Eq(mut map) => {
				map.insert(field.to_string(), value);
				Filter::Eq(map)
			}
			Filter::AnyOf(branches) => Filter::AnyOf(branches.into_iter().map(|b| b.and(field, value.clone())).collect()),
		}
	}

	pub fn matches(&self, doc: &Value) -> bool {
		match self {
			Filter::All => true,
			Filter::Eq(fields) => fields.iter().all(|(key, expected)| doc.get(key) == Some(expected)),
			Filter::AnyOf(branches) => branches.iter().any(|branch| branch.matches(doc)),
		}
	}
}

#[derive(Clone, Debug, Default)]
pub struct FindOptions {
	pub skip: u64,
	pub limit: Option<u64>,
	/// Fields removed from every returned document.
	pub exclude: Vec<&'static str>,
}

impl FindOptions {
	pub fn page(skip: u64, limit: u64) -> Self {
		Self {
			skip,
			limit: Some(limit),
			exclude: Vec::new(),
		}
	}

	pub fn excluding(mut self, field: &'static str) -> Self {
		self.exclude.push(field);
		self
	}
}

#[derive(Debug, Error)]
pub enum StoreError {
	#[error("store unavailable: {0}")]
	Unavailable(String),

	#[error("duplicate key violates unique index `{index}`")]
	Duplicate { index: String },

	#[error("serialization error: {0}")]
	Serialization(String),

	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
	/// Prepares the collection and its unique indexes. Safe to call repeatedly.
	async fn ensure_collection(
		&self,
		collection: Collection,
		indexes: &[UniqueIndex],
	) -> Result<(), StoreError>;

	async fn insert(
		&self,
		collection: Collection,
		document: Document,
	) -> Result<String, StoreError>;

	/// Matching documents, newest `created_at` first.
	async fn find(
		&self,
		collection: Collection,
		filter: &Filter,
		options: FindOptions,
	) -> Result<Vec<Value>, StoreError>;

	async fn find_one(
		&self,
		collection: Collection,
		filter: &Filter,
	) -> Result<Option<Value>, StoreError> {
		let mut found = self
			.find(
				collection,
				filter,
				FindOptions {
					limit: Some(1),
					..Default::default()
				},
			)
			.await?;
		Ok(found.pop())
	}

	async fn count(
		&self,
		collection: Collection,
		filter: &Filter,
	) -> Result<u64, StoreError>;

	/// Removes at most one matching document and reports how many went away.
	async fn delete_one(
		&self,
		collection: Collection,
		filter: &Filter,
	) -> Result<u64, StoreError>;

	async fn ping(&self) -> Result<(), StoreError>;
}

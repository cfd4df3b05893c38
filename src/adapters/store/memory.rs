use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::RwLock;

use super::{Collection, Document, DocumentStore, Filter, FindOptions, StoreError, UniqueIndex};

struct StoredDocument {
	seq: u64,
	id: String,
	created_at: DateTime<Utc>,
	body: Value,
}

#[derive(Default)]
struct CollectionState {
	next_seq: u64,
	indexes: Vec<UniqueIndex>,
	documents: Vec<StoredDocument>,
}

impl CollectionState {
	fn violated_index(
		&self,
		candidate: &Document,
	) -> Option<String> {
		if self.documents.iter().any(|doc| doc.id == candidate.id) {
			return Some("_id".to_string());
		}
		self.indexes
			.iter()
			.find(|index| {
				let key = index_key(index, &candidate.body);
				self.documents.iter().any(|doc| index_key(index, &doc.body) == key)
			})
			.map(|index| index.name.to_string())
	}
}

fn index_key<'a>(
	index: &UniqueIndex,
	body: &'a Value,
) -> Vec<Option<&'a Value>> {
	index.fields.iter().map(|field| body.get(*field)).collect()
}

/// In-process store with the same contract as the Postgres one. The uniqueness
/// check and the insert run under a single write lock.
#[derive(Clone, Default)]
pub struct MemoryStore {
	collections: Arc<RwLock<HashMap<Collection, CollectionState>>>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}
}

#[async_trait]
impl DocumentStore for MemoryStore {
	async fn ensure_collection(
		&self,
		collection: Collection,
		indexes: &[UniqueIndex],
	) -> Result<(), StoreError> {
		let mut guard = self.collections.write().await;
		let state = guard.entry(collection).or_default();
		for index in indexes {
			if !state.indexes.iter().any(|existing| existing.name == index.name) {
				state.indexes.push(index.clone());
			}
		}
		Ok(())
	}

	async fn insert(
		&self,
		collection: Collection,
		document: Document,
	) -> Result<String, StoreError> {
		let mut guard = self.collections.write().await;
		let state = guard.entry(collection).or_default();

		if let Some(index) = state.violated_index(&document) {
			return Err(StoreError::Duplicate { index });
		}

		state.next_seq += 1;
		let id = document.id.clone();
		state.documents.push(StoredDocument {
			seq: state.next_seq,
			id: document.id,
			created_at: document.created_at,
			body: document.body,
		});
		Ok(id)
	}

	async fn find(
		&self,
		collection: Collection,
		filter: &Filter,
		options: FindOptions,
	) -> Result<Vec<Value>, StoreError> {
		let guard = self.collections.read().await;
		let Some(state) = guard.get(&collection) else {
			return Ok(Vec::new());
		};

		let mut matched: Vec<&StoredDocument> = state.documents.iter().filter(|doc| filter.matches(&doc.body)).collect();
		matched.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.seq.cmp(&a.seq)));

		let limit = options.limit.map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(usize::MAX));
		Ok(matched
			.into_iter()
			.skip(usize::try_from(options.skip).unwrap_or(usize::MAX))
			.take(limit)
			.map(|doc| {
				let mut body = doc.body.clone();
				if let Some(object) = body.as_object_mut() {
					for field in &options.exclude {
						object.remove(*field);
					}
				}
				body
			})
			.collect())
	}

	async fn count(
		&self,
		collection: Collection,
		filter: &Filter,
	) -> Result<u64, StoreError> {
		let guard = self.collections.read().await;
		Ok(guard
			.get(&collection)
			.map(|state| state.documents.iter().filter(|doc| filter.matches(&doc.body)).count() as u64)
			.unwrap_or(0))
	}

	async fn delete_one(
		&self,
		collection: Collection,
		filter: &Filter,
	) -> Result<u64, StoreError> {
		let mut guard = self.collections.write().await;
		let Some(state) = guard.get_mut(&collection) else {
			return Ok(0);
		};
		match state.documents.iter().position(|doc| filter.matches(&doc.body)) {
			Some(position) => {
				state.documents.remove(position);
				Ok(1)
			}
			None => Ok(0),
		}
	}

	async fn ping(&self) -> Result<(), StoreError> {
		Ok(())
	}
}

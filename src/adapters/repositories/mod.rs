pub(crate) mod comment_repository;
pub(crate) mod follow_repository;
pub(crate) mod post_repository;
pub(crate) mod user_repository;

use std::marker::PhantomData;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::adapters::store::{Collection, Document, DocumentStore, Filter, FindOptions, StoreError, UniqueIndex};
use crate::common::pagination::{Page, PageOf};

/// An entity that lives in one collection of the document store.
pub trait StoredEntity: Serialize + DeserializeOwned + Send + Sync {
	const COLLECTION: Collection;
	const UNIQUE_INDEXES: &'static [UniqueIndex] = &[];

	fn id(&self) -> String;
	fn created_at(&self) -> DateTime<Utc>;
}

/// Typed access to one collection. The entity-specific queries live next to
/// each entity in `impl Repository<E>` blocks.
pub struct Repository<E: StoredEntity> {
	pub store: Arc<dyn DocumentStore>,
	pub _phantom: PhantomData<E>,
}

impl<E: StoredEntity> Clone for Repository<E> {
	fn clone(&self) -> Self {
		Self {
			store: self.store.clone(),
			_phantom: PhantomData,
		}
	}
}

impl<E: StoredEntity> Repository<E> {
	pub fn new(store: Arc<dyn DocumentStore>) -> Self {
		Self {
			store,
			_phantom: Default::default(),
		}
	}

	pub async fn init(&self) -> Result<(), StoreError> {
		self.store.ensure_collection(E::COLLECTION, E::UNIQUE_INDEXES).await
	}

	pub async fn add(
		&self,
		entity: &E,
	) -> Result<(), StoreError> {
		let document = Document::new(entity.id(), entity.created_at(), entity)?;
		self.store.insert(E::COLLECTION, document).await?;
		Ok(())
	}

	pub async fn get(
		&self,
		filter: &Filter,
	) -> Result<Option<E>, StoreError> {
		self.store.find_one(E::COLLECTION, filter).await?.map(decode).transpose()
	}

	pub async fn exists(
		&self,
		filter: &Filter,
	) -> Result<bool, StoreError> {
		Ok(self.store.find_one(E::COLLECTION, filter).await?.is_some())
	}

	/// Matching entities inside the `options` window, decoded as `T` so callers can
	/// read a projection, plus the total number of matches.
	pub async fn window_as<T: DeserializeOwned>(
		&self,
		filter: &Filter,
		options: FindOptions,
	) -> Result<(Vec<T>, u64), StoreError> {
		let items = self
			.store
			.find(E::COLLECTION, filter, options)
			.await?
			.into_iter()
			.map(decode)
			.collect::<Result<Vec<T>, _>>()?;
		let total = self.store.count(E::COLLECTION, filter).await?;
		Ok((items, total))
	}

	pub async fn page_as<T: DeserializeOwned>(
		&self,
		filter: &Filter,
		page: Page,
		exclude: &[&'static str],
	) -> Result<PageOf<T>, StoreError> {
		let mut options = FindOptions::page(page.skip(), page.limit);
		options.exclude.extend_from_slice(exclude);

		let (items, total) = self.window_as(filter, options).await?;
		Ok(PageOf { items, total, page })
	}

	pub async fn page(
		&self,
		filter: &Filter,
		page: Page,
	) -> Result<PageOf<E>, StoreError> {
		self.page_as(filter, page, &[]).await
	}

	pub async fn count(
		&self,
		filter: &Filter,
	) -> Result<u64, StoreError> {
		self.store.count(E::COLLECTION, filter).await
	}

	pub async fn delete(
		&self,
		filter: &Filter,
	) -> Result<u64, StoreError> {
		self.store.delete_one(E::COLLECTION, filter).await
	}
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, StoreError> {
	serde_json::from_value(value).map_err(|err| StoreError::Serialization(err.to_string()))
}

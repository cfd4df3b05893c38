use chrono::{DateTime, Utc};

use super::{Repository, StoredEntity};
use crate::adapters::store::{Collection, Filter, FindOptions, StoreError};
use crate::domain::post::{Post, PostType};

impl StoredEntity for Post {
	const COLLECTION: Collection = Collection::Posts;

	fn id(&self) -> String {
		self.id.to_string()
	}
	fn created_at(&self) -> DateTime<Utc> {
		self.created_at
	}
}

fn visible() -> Filter {
	Filter::eq("is_archived", false)
}

impl Repository<Post> {
	/// Non-archived posts, optionally narrowed to one author and/or type.
	pub async fn list(
		&self,
		user_id: Option<&str>,
		post_type: Option<PostType>,
		offset: u64,
		limit: u64,
	) -> Result<(Vec<Post>, u64), StoreError> {
		let mut filter = visible();
		if let Some(user_id) = user_id {
			filter = filter.and("user_id", user_id);
		}
		if let Some(post_type) = post_type {
			filter = filter.and("post_type", post_type.as_str());
		}
		self.window_as(&filter, FindOptions::page(offset, limit)).await
	}

	pub async fn find_visible(
		&self,
		id: &str,
	) -> Result<Option<Post>, StoreError> {
		self.get(&visible().and("id", id)).await
	}

	/// Existence regardless of archive state.
	pub async fn exists_by_id(
		&self,
		id: &str,
	) -> Result<bool, StoreError> {
		self.exists(&Filter::eq("id", id)).await
	}
}

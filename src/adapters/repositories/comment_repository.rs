use chrono::{DateTime, Utc};

use super::{Repository, StoredEntity};
use crate::adapters::store::{Collection, Filter, StoreError};
use crate::common::pagination::{Page, PageOf};
use crate::domain::comment::Comment;

impl StoredEntity for Comment {
	const COLLECTION: Collection = Collection::Comments;

	fn id(&self) -> String {
		self.id.to_string()
	}
	fn created_at(&self) -> DateTime<Utc> {
		self.created_at
	}
}

impl Repository<Comment> {
	pub async fn for_post(
		&self,
		post_id: &str,
		page: Page,
	) -> Result<PageOf<Comment>, StoreError> {
		self.page(&Filter::eq("post_id", post_id), page).await
	}
}

use chrono::{DateTime, Utc};

use super::{Repository, StoredEntity};
use crate::adapters::store::{Collection, Filter, StoreError, UniqueIndex};
use crate::common::pagination::{Page, PageOf};
use crate::domain::follow::{EdgeSelector, FollowEdge, FollowPair};

pub const FOLLOWER: &str = "followers_id";
pub const FOLLOWING: &str = "following_id";

/// At most one edge per ordered pair.
pub const PAIR_INDEX: UniqueIndex = UniqueIndex::new("pair", &[FOLLOWER, FOLLOWING]);

impl StoredEntity for FollowEdge {
	const COLLECTION: Collection = Collection::Follows;
	const UNIQUE_INDEXES: &'static [UniqueIndex] = &[PAIR_INDEX];

	fn id(&self) -> String {
		self.id.to_string()
	}
	fn created_at(&self) -> DateTime<Utc> {
		self.created_at
	}
}

fn pair_filter(pair: &FollowPair) -> Filter {
	Filter::eq(FOLLOWER, pair.follower_id.as_str()).and(FOLLOWING, pair.following_id.as_str())
}

impl Repository<FollowEdge> {
	pub async fn find_pair(
		&self,
		pair: &FollowPair,
	) -> Result<Option<FollowEdge>, StoreError> {
		self.get(&pair_filter(pair)).await
	}

	/// Both addressing schemes resolve to one filter-based delete.
	pub async fn remove(
		&self,
		selector: &EdgeSelector,
	) -> Result<u64, StoreError> {
		let filter = match selector {
			EdgeSelector::Id(id) => Filter::eq("id", id.to_string()),
			EdgeSelector::Pair(pair) => pair_filter(pair),
		};
		self.delete(&filter).await
	}

	/// Edges pointing at `user_id`.
	pub async fn followers_of(
		&self,
		user_id: &str,
		page: Page,
	) -> Result<PageOf<FollowEdge>, StoreError> {
		self.page(&Filter::eq(FOLLOWING, user_id), page).await
	}

	/// Edges leaving `user_id`.
	pub async fn following_of(
		&self,
		user_id: &str,
		page: Page,
	) -> Result<PageOf<FollowEdge>, StoreError> {
		self.page(&Filter::eq(FOLLOWER, user_id), page).await
	}

	pub async fn count_followers(
		&self,
		user_id: &str,
	) -> Result<u64, StoreError> {
		self.count(&Filter::eq(FOLLOWING, user_id)).await
	}

	pub async fn count_following(
		&self,
		user_id: &str,
	) -> Result<u64, StoreError> {
		self.count(&Filter::eq(FOLLOWER, user_id)).await
	}
}

use std::sync::Arc;

use crate::adapters::repositories::Repository;
use crate::adapters::store::{DocumentStore, StoreError};
use crate::common::pagination::{Page, PageOf};
use crate::domain::follow::{EdgeSelector, FollowEdge, FollowPair, FollowStats, FollowStatus};

use super::response::ServiceError;

/// Directed follow edges between user identifiers.
///
/// Uniqueness of an ordered pair is owned by the store's `pair` index: the
/// lookup before insert only produces an early answer, the insert itself is the
/// arbiter when two requests race.
#[derive(Clone)]
pub struct FollowGraph {
	edges: Repository<FollowEdge>,
}

impl FollowGraph {
	pub fn new(store: Arc<dyn DocumentStore>) -> Self {
		Self {
			edges: Repository::new(store),
		}
	}

	pub async fn init(&self) -> Result<(), ServiceError> {
		Ok(self.edges.init().await?)
	}

	pub async fn follow(
		&self,
		follower_id: &str,
		following_id: &str,
	) -> Result<FollowEdge, ServiceError> {
		let pair = FollowPair::new(follower_id, following_id)?;

		if self.edges.find_pair(&pair).await?.is_some() {
			return Err(ServiceError::DuplicateEdge);
		}

		let edge = FollowEdge::new(pair);
		match self.edges.add(&edge).await {
			Ok(()) => {
				tracing::info!(follow_id = %edge.id, follower = %edge.follower_id, following = %edge.following_id, "follow created");
				Ok(edge)
			}
			Err(StoreError::Duplicate { .. }) => Err(ServiceError::DuplicateEdge),
			Err(err) => Err(err.into()),
		}
	}

	/// Removes the selected edge. A second call for the same edge reports
	/// `NotFound`.
	pub async fn unfollow(
		&self,
		selector: EdgeSelector,
	) -> Result<(), ServiceError> {
		match self.edges.remove(&selector).await? {
			0 => Err(ServiceError::NotFound("Follow relationship not found".into())),
			_ => {
				tracing::info!(?selector, "follow removed");
				Ok(())
			}
		}
	}

	pub async fn unfollow_by_id(
		&self,
		edge_id: &str,
	) -> Result<(), ServiceError> {
		self.unfollow(EdgeSelector::by_id(edge_id)?).await
	}

	pub async fn unfollow_by_pair(
		&self,
		follower_id: &str,
		following_id: &str,
	) -> Result<(), ServiceError> {
		self.unfollow(EdgeSelector::Pair(FollowPair::lookup(follower_id, following_id)?)).await
	}

	pub async fn list_followers(
		&self,
		user_id: &str,
		page: Page,
	) -> Result<PageOf<FollowEdge>, ServiceError> {
		Ok(self.edges.followers_of(required_user(user_id)?, page).await?)
	}

	pub async fn list_following(
		&self,
		user_id: &str,
		page: Page,
	) -> Result<PageOf<FollowEdge>, ServiceError> {
		Ok(self.edges.following_of(required_user(user_id)?, page).await?)
	}

	pub async fn is_following(
		&self,
		follower_id: &str,
		following_id: &str,
	) -> Result<FollowStatus, ServiceError> {
		let edge = self.edges.find_pair(&FollowPair::lookup(follower_id, following_id)?).await?;
		Ok(FollowStatus {
			is_following: edge.is_some(),
			follow_id: edge.map(|e| e.id),
		})
	}

	/// Two independent counts; they are not a consistent snapshot of each other.
	pub async fn stats(
		&self,
		user_id: &str,
	) -> Result<FollowStats, ServiceError> {
		let user_id = required_user(user_id)?;
		let (followers_count, following_count) =
			futures::try_join!(self.edges.count_followers(user_id), self.edges.count_following(user_id))?;
		Ok(FollowStats {
			followers_count,
			following_count,
		})
	}
}

fn required_user(user_id: &str) -> Result<&str, ServiceError> {
	let user_id = user_id.trim();
	if user_id.is_empty() {
		return Err(ServiceError::InvalidArgument("userId is required".into()));
	}
	Ok(user_id)
}

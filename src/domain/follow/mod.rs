// domain for the follow graph
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::response::ServiceError;

/// Directed edge: `follower_id` follows `following_id`.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct FollowEdge {
	pub id: Uuid,
	#[serde(rename = "followers_id")]
	pub follower_id: String,
	pub following_id: String,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl FollowEdge {
	pub fn new(pair: FollowPair) -> Self {
		let now = Utc::now();
		Self {
			id: Uuid::new_v4(),
			follower_id: pair.follower_id,
			following_id: pair.following_id,
			created_at: now,
			updated_at: now,
		}
	}
}

/// An ordered (follower, following) pair that has passed input checks.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct FollowPair {
	pub follower_id: String,
	pub following_id: String,
}

impl FollowPair {
	/// Both ids present, no self-follow.
	pub fn new(
		follower_id: &str,
		following_id: &str,
	) -> Result<Self, ServiceError> {
		let pair = Self::lookup(follower_id, following_id)?;
		if pair.follower_id == pair.following_id {
			return Err(ServiceError::SelfFollowRejected);
		}
		Ok(pair)
	}

	/// Both ids present. Used for reads and deletes, where a self pair simply
	/// matches nothing.
	pub fn lookup(
		follower_id: &str,
		following_id: &str,
	) -> Result<Self, ServiceError> {
		let (follower_id, following_id) = (follower_id.trim(), following_id.trim());
		if follower_id.is_empty() || following_id.is_empty() {
			return Err(ServiceError::InvalidArgument("follower_id and following_id are required".into()));
		}
		Ok(Self {
			follower_id: follower_id.to_string(),
			following_id: following_id.to_string(),
		})
	}
}

/// The two ways a client can name an edge to remove.
#[derive(Clone, Debug)]
pub enum EdgeSelector {
	Id(Uuid),
	Pair(FollowPair),
}

impl EdgeSelector {
	pub fn by_id(raw: &str) -> Result<Self, ServiceError> {
		Uuid::parse_str(raw.trim())
			.map(EdgeSelector::Id)
			.map_err(|_| ServiceError::InvalidArgument("Invalid follow ID".into()))
	}
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowStats {
	pub followers_count: u64,
	pub following_count: u64,
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowStatus {
	pub is_following: bool,
	pub follow_id: Option<Uuid>,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::response::ServiceError;

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Comment {
	pub id: Uuid,
	pub user_id: String,
	pub post_id: String,
	/// Stored as given; whether the parent exists is not checked.
	pub parent_comment_id: Option<String>,
	pub content: String,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct CreateComment {
	pub user_id: Option<String>,
	pub post_id: Option<String>,
	#[serde(alias = "parents_comments_id")]
	pub parent_comment_id: Option<String>,
	pub content: Option<String>,
}

impl CreateComment {
	/// Checks required fields and builds the comment to insert.
	pub fn into_comment(self) -> Result<Comment, ServiceError> {
		let required = |value: Option<String>, name: &str| {
			value
				.filter(|v| !v.trim().is_empty())
				.ok_or_else(|| ServiceError::InvalidArgument(format!("{name} is required")))
		};
		let user_id = required(self.user_id, "user_id")?;
		let post_id = required(self.post_id, "post_id")?;
		let content = required(self.content, "content")?;

		let now = Utc::now();
		Ok(Comment {
			id: Uuid::new_v4(),
			user_id: user_id.trim().to_string(),
			post_id: post_id.trim().to_string(),
			parent_comment_id: self.parent_comment_id.filter(|p| !p.trim().is_empty()),
			content,
			created_at: now,
			updated_at: now,
		})
	}
}

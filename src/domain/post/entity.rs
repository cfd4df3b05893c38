use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::response::ServiceError;

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Post {
	pub id: Uuid,
	pub user_id: String,
	/// Serialized as the `post_type` tag plus the matching `content` object.
	#[serde(flatten)]
	pub content: PostContent,
	pub caption: String,
	pub location: Option<String>,
	pub is_archived: bool,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostType {
	Text,
	Image,
	Video,
	Carousel,
	Reel,
}

impl PostType {
	pub const ALL: [PostType; 5] = [PostType::Text, PostType::Image, PostType::Video, PostType::Carousel, PostType::Reel];

	pub fn as_str(&self) -> &'static str {
		match self {
			PostType::Text => "text",
			PostType::Image => "image",
			PostType::Video => "video",
			PostType::Carousel => "carousel",
			PostType::Reel => "reel",
		}
	}
}

impl Display for PostType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for PostType {
	type Err = ServiceError;
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		PostType::ALL.into_iter().find(|t| t.as_str() == s).ok_or_else(|| {
			let valid = PostType::ALL.iter().map(PostType::as_str).collect::<Vec<_>>().join(", ");
			ServiceError::InvalidArgument(format!("Invalid post_type. Must be one of: {valid}"))
		})
	}
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(tag = "post_type", content = "content", rename_all = "lowercase")]
pub enum PostContent {
	Text { text: String },
	Image { media_url: String, aspect_ratio: String },
	Video(VideoContent),
	Carousel { media_urls: Vec<String>, aspect_ratio: String },
	Reel(VideoContent),
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct VideoContent {
	pub media_url: String,
	pub thumbnail_url: String,
	pub duration: Option<f64>,
	pub aspect_ratio: String,
}

impl PostContent {
	pub fn post_type(&self) -> PostType {
		match self {
			PostContent::Text { .. } => PostType::Text,
			PostContent::Image { .. } => PostType::Image,
			PostContent::Video(_) => PostType::Video,
			PostContent::Carousel { .. } => PostType::Carousel,
			PostContent::Reel(_) => PostType::Reel,
		}
	}
}

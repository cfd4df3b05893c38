pub mod entity;

use bytes::Bytes;
use chrono::Utc;
use uuid::Uuid;

pub use self::entity::{Post, PostContent, PostType, VideoContent};
use crate::services::response::ServiceError;

pub const DEFAULT_SQUARE_RATIO: &str = "1:1";
pub const DEFAULT_VIDEO_RATIO: &str = "16:9";
pub const REEL_RATIO: &str = "9:16";

/// One uploaded file from a post form, in arrival order.
#[derive(Clone, Debug)]
pub struct MediaFile {
	pub field_name: String,
	pub file_name: Option<String>,
	pub content_type: Option<String>,
	pub data: Bytes,
}

/// Post creation input as received, before content is resolved.
#[derive(Clone, Debug, Default)]
pub struct NewPost {
	pub user_id: Option<String>,
	pub post_type: Option<String>,
	pub caption: Option<String>,
	pub location: Option<String>,
	pub text: Option<String>,
	pub aspect_ratio: Option<String>,
	pub files: Vec<MediaFile>,
}

/// A post request whose type and per-type requirements have been checked. Media
/// still has to be uploaded before it becomes a [`Post`].
#[derive(Clone, Debug)]
pub struct ValidatedPost {
	pub user_id: String,
	pub post_type: PostType,
	pub caption: String,
	pub location: Option<String>,
	pub text: Option<String>,
	pub aspect_ratio: Option<String>,
	pub files: Vec<MediaFile>,
}

fn non_empty(value: Option<String>) -> Option<String> {
	value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl NewPost {
	pub fn validate(self) -> Result<ValidatedPost, ServiceError> {
		let (Some(user_id), Some(post_type)) = (non_empty(self.user_id), non_empty(self.post_type)) else {
			return Err(ServiceError::InvalidArgument("user_id and post_type are required".into()));
		};
		let post_type: PostType = post_type.parse()?;
		let text = self.text.filter(|t| !t.trim().is_empty());

		match post_type {
			PostType::Text if text.is_none() => {
				return Err(ServiceError::InvalidArgument("Text content is required for text posts".into()));
			}
			PostType::Image if self.files.is_empty() => {
				return Err(ServiceError::InvalidArgument("Image file is required for image posts".into()));
			}
			PostType::Video | PostType::Reel if self.files.is_empty() => {
				return Err(ServiceError::InvalidArgument(format!("Video file is required for {post_type} posts")));
			}
			PostType::Carousel if self.files.is_empty() => {
				return Err(ServiceError::InvalidArgument("At least one file is required for carousel posts".into()));
			}
			_ => {}
		}

		Ok(ValidatedPost {
			user_id,
			post_type,
			caption: self.caption.unwrap_or_default(),
			location: non_empty(self.location),
			text,
			aspect_ratio: non_empty(self.aspect_ratio),
			files: self.files,
		})
	}
}

impl ValidatedPost {
	/// Media folder for this author.
	pub fn folder(&self) -> String {
		format!("posts/{}", self.user_id)
	}

	pub fn aspect_ratio_or(
		&self,
		default: &str,
	) -> String {
		self.aspect_ratio.clone().unwrap_or_else(|| default.to_string())
	}

	pub fn into_post(
		self,
		content: PostContent,
	) -> Post {
		debug_assert_eq!(content.post_type(), self.post_type);
		let now = Utc::now();
		Post {
			id: Uuid::new_v4(),
			user_id: self.user_id,
			content,
			caption: self.caption,
			location: self.location,
			is_archived: false,
			created_at: now,
			updated_at: now,
		}
	}
}

#[cfg(test)]
mod test {
	use bytes::Bytes;
	use serde_json::json;

	use super::{MediaFile, NewPost, Post, PostContent, PostType, VideoContent};
	use crate::services::response::ServiceError;

	fn file() -> MediaFile {
		MediaFile {
			field_name: "file".into(),
			file_name: Some("a.png".into()),
			content_type: Some("image/png".into()),
			data: Bytes::from_static(b"png"),
		}
	}

	fn new_post(
		post_type: &str,
		text: Option<&str>,
		files: Vec<MediaFile>,
	) -> NewPost {
		NewPost {
			user_id: Some("u1".into()),
			post_type: Some(post_type.into()),
			text: text.map(String::from),
			files,
			..Default::default()
		}
	}

	#[test]
	fn test_text_post_needs_text() {
		assert!(matches!(new_post("text", None, vec![]).validate(), Err(ServiceError::InvalidArgument(_))));
		assert!(matches!(new_post("text", Some("  "), vec![]).validate(), Err(ServiceError::InvalidArgument(_))));
		assert_eq!(new_post("text", Some("hi"), vec![]).validate().unwrap().text.as_deref(), Some("hi"));
	}

	#[test]
	fn test_media_posts_need_files() {
		for post_type in ["image", "video", "reel", "carousel"] {
			assert!(
				matches!(new_post(post_type, None, vec![]).validate(), Err(ServiceError::InvalidArgument(_))),
				"{post_type}"
			);
			assert!(new_post(post_type, None, vec![file()]).validate().is_ok(), "{post_type}");
		}
	}

	#[test]
	fn test_required_fields_and_type() {
		let missing = NewPost {
			post_type: Some("text".into()),
			text: Some("hi".into()),
			..Default::default()
		};
		assert!(matches!(missing.validate(), Err(ServiceError::InvalidArgument(_))));
		assert!(matches!(new_post("story", Some("hi"), vec![]).validate(), Err(ServiceError::InvalidArgument(m)) if m.contains("carousel")));
	}

	#[test]
	fn test_stored_shape_is_tagged_by_post_type() {
		let post = new_post("reel", None, vec![file()]).validate().unwrap().into_post(PostContent::Reel(VideoContent {
			media_url: "https://cdn/x.mp4".into(),
			thumbnail_url: "https://cdn/x.jpg".into(),
			duration: Some(3.5),
			aspect_ratio: "9:16".into(),
		}));

		let json = serde_json::to_value(&post).unwrap();
		assert_eq!(json["post_type"], "reel");
		assert_eq!(json["content"]["thumbnail_url"], "https://cdn/x.jpg");
		assert_eq!(json["is_archived"], false);
		assert_eq!(json["caption"], "");
		assert_eq!(json["location"], json!(null));

		let back: Post = serde_json::from_value(json).unwrap();
		assert_eq!(back.content.post_type(), PostType::Reel);
		assert_eq!(back, post);
	}
}

//! Media host seam. Binary content goes out, a durable URL comes back.
pub mod cloudinary;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub use cloudinary::CloudinaryHost;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceType {
	Image,
	Video,
	Auto,
}

impl ResourceType {
	pub fn as_str(&self) -> &'static str {
		match self {
			ResourceType::Image => "image",
			ResourceType::Video => "video",
			ResourceType::Auto => "auto",
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadOptions {
	pub folder: String,
	pub resource_type: ResourceType,
}

impl UploadOptions {
	pub fn new(
		folder: impl Into<String>,
		resource_type: ResourceType,
	) -> Self {
		Self {
			folder: folder.into(),
			resource_type,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct UploadedMedia {
	pub url: String,
	pub thumbnail_url: Option<String>,
	/// Seconds, reported for video uploads.
	pub duration: Option<f64>,
}

#[derive(Debug, Error)]
pub enum MediaError {
	#[error("file input is required")]
	EmptyInput,

	#[error("media host credentials are not configured")]
	NotConfigured,

	#[error("upload rejected by media host: {0}")]
	Rejected(String),

	#[error("media host request failed: {0}")]
	Transport(#[from] reqwest::Error),
}

#[async_trait]
pub trait MediaHost: Send + Sync {
	async fn upload(
		&self,
		data: Bytes,
		options: UploadOptions,
	) -> Result<UploadedMedia, MediaError>;
}

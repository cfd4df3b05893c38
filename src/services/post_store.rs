use std::sync::Arc;

use crate::adapters::media::{cloudinary::video_thumbnail, MediaHost, ResourceType, UploadOptions};
use crate::adapters::repositories::Repository;
use crate::adapters::store::DocumentStore;
use crate::common::pagination::{check_limit, parse_number};
use crate::domain::post::{
	NewPost, Post, PostContent, PostType, ValidatedPost, VideoContent, DEFAULT_SQUARE_RATIO, DEFAULT_VIDEO_RATIO, REEL_RATIO,
};

use super::response::ServiceError;

pub const DEFAULT_POST_LIMIT: u64 = 20;

/// Raw `GET /posts` filters.
#[derive(Debug, Default, serde::Deserialize)]
pub struct PostQuery {
	pub user_id: Option<String>,
	pub post_type: Option<String>,
	pub limit: Option<String>,
	pub offset: Option<String>,
}

#[derive(Debug)]
pub struct PostListing {
	pub posts: Vec<Post>,
	pub limit: u64,
	pub offset: u64,
	pub total: u64,
}

#[derive(Clone)]
pub struct PostStore {
	posts: Repository<Post>,
	media: Arc<dyn MediaHost>,
}

impl PostStore {
	pub fn new(
		store: Arc<dyn DocumentStore>,
		media: Arc<dyn MediaHost>,
	) -> Self {
		Self {
			posts: Repository::new(store),
			media,
		}
	}

	pub async fn init(&self) -> Result<(), ServiceError> {
		Ok(self.posts.init().await?)
	}

	pub async fn create(
		&self,
		input: NewPost,
	) -> Result<Post, ServiceError> {
		let draft = input.validate()?;
		let content = self.resolve_content(&draft).await?;
		let post = draft.into_post(content);

		self.posts.add(&post).await?;
		tracing::info!(post_id = %post.id, post_type = %post.content.post_type(), "post created");
		Ok(post)
	}

	/// Uploads whatever media the post type needs and assembles its content.
	async fn resolve_content(
		&self,
		draft: &ValidatedPost,
	) -> Result<PostContent, ServiceError> {
		let folder = draft.folder();
		let first_file = || {
			draft
				.files
				.first()
				.map(|f| f.data.clone())
				.ok_or_else(|| ServiceError::InvalidArgument(format!("A file is required for {} posts", draft.post_type)))
		};

		let content = match draft.post_type {
			PostType::Text => PostContent::Text {
				text: draft.text.clone().unwrap_or_default(),
			},
			PostType::Image => {
				let uploaded = self
					.media
					.upload(first_file()?, UploadOptions::new(folder, ResourceType::Image))
					.await
					.map_err(|err| {
						tracing::error!(error = %err, "image upload failed");
						ServiceError::UploadFailed("Failed to upload image".into())
					})?;
				PostContent::Image {
					media_url: uploaded.url,
					aspect_ratio: draft.aspect_ratio_or(DEFAULT_SQUARE_RATIO),
				}
			}
			PostType::Video | PostType::Reel => {
				let uploaded = self
					.media
					.upload(first_file()?, UploadOptions::new(folder, ResourceType::Video))
					.await
					.map_err(|err| {
						tracing::error!(error = %err, "video upload failed");
						ServiceError::UploadFailed("Failed to upload video".into())
					})?;
				let thumbnail_url = uploaded.thumbnail_url.unwrap_or_else(|| video_thumbnail(&uploaded.url));
				let video = VideoContent {
					media_url: uploaded.url,
					thumbnail_url,
					duration: uploaded.duration,
					aspect_ratio: match draft.post_type {
						PostType::Reel => REEL_RATIO.to_string(),
						_ => draft.aspect_ratio_or(DEFAULT_VIDEO_RATIO),
					},
				};
				match draft.post_type {
					PostType::Reel => PostContent::Reel(video),
					_ => PostContent::Video(video),
				}
			}
			PostType::Carousel => {
				let folder = format!("{folder}/carousel");
				let mut media_urls = Vec::with_capacity(draft.files.len());
				for file in &draft.files {
					match self.media.upload(file.data.clone(), UploadOptions::new(folder.clone(), ResourceType::Auto)).await {
						Ok(uploaded) => media_urls.push(uploaded.url),
						Err(err) => tracing::warn!(error = %err, file = ?file.file_name, "carousel item upload failed, skipping"),
					}
				}
				if media_urls.is_empty() {
					return Err(ServiceError::UploadFailed("Failed to upload carousel media".into()));
				}
				tracing::debug!(uploaded = media_urls.len(), requested = draft.files.len(), "carousel uploaded");
				PostContent::Carousel {
					media_urls,
					aspect_ratio: draft.aspect_ratio_or(DEFAULT_SQUARE_RATIO),
				}
			}
		};
		Ok(content)
	}

	pub async fn list(
		&self,
		query: PostQuery,
	) -> Result<PostListing, ServiceError> {
		let limit = check_limit(parse_number("limit", query.limit.as_deref(), DEFAULT_POST_LIMIT)?)?;
		let offset = parse_number("offset", query.offset.as_deref(), 0)?;
		let post_type = query
			.post_type
			.as_deref()
			.filter(|t| !t.is_empty())
			.map(str::parse::<PostType>)
			.transpose()?;
		let user_id = query.user_id.as_deref().filter(|u| !u.is_empty());

		let (posts, total) = self.posts.list(user_id, post_type, offset, limit).await?;
		Ok(PostListing {
			posts,
			limit,
			offset,
			total,
		})
	}

	/// Archived posts are reported as missing.
	pub async fn get(
		&self,
		id: &str,
	) -> Result<Post, ServiceError> {
		self.posts
			.find_visible(id.trim())
			.await?
			.ok_or_else(|| ServiceError::NotFound("Post not found".into()))
	}
}

#[cfg(test)]
pub(crate) mod test {
	use std::sync::atomic::{AtomicUsize, Ordering};
	use std::sync::{Arc, Mutex};

	use async_trait::async_trait;
	use bytes::Bytes;

	use super::{PostQuery, PostStore};
	use crate::adapters::media::{MediaError, MediaHost, UploadOptions, UploadedMedia};
	use crate::adapters::store::{Collection, DocumentStore, Filter, MemoryStore};
	use crate::domain::post::{MediaFile, NewPost, PostContent};
	use crate::services::response::ServiceError;

	/// Hands out predictable URLs and can be told to fail chosen calls.
	#[derive(Default)]
	pub(crate) struct FakeMediaHost {
		pub calls: Mutex<Vec<UploadOptions>>,
		pub fail_calls: Vec<usize>,
		counter: AtomicUsize,
	}

	impl FakeMediaHost {
		pub fn failing(calls: Vec<usize>) -> Self {
			Self {
				fail_calls: calls,
				..Default::default()
			}
		}
	}

	#[async_trait]
	impl MediaHost for FakeMediaHost {
		async fn upload(
			&self,
			_data: Bytes,
			options: UploadOptions,
		) -> Result<UploadedMedia, MediaError> {
			let n = self.counter.fetch_add(1, Ordering::SeqCst);
			self.calls.lock().unwrap().push(options.clone());
			if self.fail_calls.contains(&n) {
				return Err(MediaError::Rejected("boom".into()));
			}
			Ok(UploadedMedia {
				url: format!("https://media.test/{}/{n}.bin", options.folder),
				thumbnail_url: None,
				duration: Some(12.5),
			})
		}
	}

	pub(crate) fn file(name: &str) -> MediaFile {
		MediaFile {
			field_name: "file".into(),
			file_name: Some(name.into()),
			content_type: None,
			data: Bytes::from_static(b"\x00\x01"),
		}
	}

	fn post(
		post_type: &str,
		files: Vec<MediaFile>,
	) -> NewPost {
		NewPost {
			user_id: Some("u1".into()),
			post_type: Some(post_type.into()),
			files,
			..Default::default()
		}
	}

	async fn set_up(media: FakeMediaHost) -> (PostStore, Arc<MemoryStore>, Arc<FakeMediaHost>) {
		let store = Arc::new(MemoryStore::new());
		let media = Arc::new(media);
		let posts = PostStore::new(store.clone(), media.clone());
		posts.init().await.unwrap();
		(posts, store, media)
	}

	#[tokio::test]
	async fn test_text_post_without_text_is_invalid() {
		let (posts, store, _) = set_up(FakeMediaHost::default()).await;

		assert!(matches!(posts.create(post("text", vec![])).await, Err(ServiceError::InvalidArgument(_))));
		assert!(matches!(posts.create(post("carousel", vec![])).await, Err(ServiceError::InvalidArgument(_))));
		assert_eq!(store.count(Collection::Posts, &Filter::All).await.unwrap(), 0);
	}

	#[tokio::test]
	async fn test_image_post_uploads_to_user_folder() {
		let (posts, _, media) = set_up(FakeMediaHost::default()).await;

		let created = posts.create(post("image", vec![file("a.png")])).await.unwrap();

		match created.content {
			PostContent::Image { media_url, aspect_ratio } => {
				assert_eq!(media_url, "https://media.test/posts/u1/0.bin");
				assert_eq!(aspect_ratio, "1:1");
			}
			other => panic!("unexpected content {other:?}"),
		}
		assert_eq!(media.calls.lock().unwrap()[0].folder, "posts/u1");
		assert!(!created.is_archived);
	}

	#[tokio::test]
	async fn test_reel_forces_portrait_and_derives_thumbnail() {
		let (posts, _, _) = set_up(FakeMediaHost::default()).await;
		let mut input = post("reel", vec![file("clip.mp4")]);
		input.aspect_ratio = Some("16:9".into());

		let created = posts.create(input).await.unwrap();

		let PostContent::Reel(video) = created.content else {
			panic!("expected reel content");
		};
		assert_eq!(video.aspect_ratio, "9:16");
		assert_eq!(video.thumbnail_url, "https://media.test/posts/u1/0.jpg");
		assert_eq!(video.duration, Some(12.5));
	}

	#[tokio::test]
	async fn test_failed_upload_is_upload_failed() {
		let (posts, store, _) = set_up(FakeMediaHost::failing(vec![0])).await;

		assert!(matches!(posts.create(post("video", vec![file("a.mp4")])).await, Err(ServiceError::UploadFailed(_))));
		assert_eq!(store.count(Collection::Posts, &Filter::All).await.unwrap(), 0);
	}

	#[tokio::test]
	async fn test_carousel_skips_failed_items() {
		let (posts, _, media) = set_up(FakeMediaHost::failing(vec![1])).await;

		let created = posts.create(post("carousel", vec![file("a"), file("b"), file("c")])).await.unwrap();

		let PostContent::Carousel { media_urls, .. } = created.content else {
			panic!("expected carousel content");
		};
		assert_eq!(media_urls.len(), 2);
		assert!(media.calls.lock().unwrap().iter().all(|o| o.folder == "posts/u1/carousel"));
	}

	#[tokio::test]
	async fn test_carousel_with_no_successful_upload_fails() {
		let (posts, _, _) = set_up(FakeMediaHost::failing(vec![0, 1])).await;

		assert!(matches!(
			posts.create(post("carousel", vec![file("a"), file("b")])).await,
			Err(ServiceError::UploadFailed(_))
		));
	}

	#[tokio::test]
	async fn test_list_filters_and_get_hides_archived() {
		let (posts, store, _) = set_up(FakeMediaHost::default()).await;
		let mut text = post("text", vec![]);
		text.text = Some("hello".into());
		let first = posts.create(text.clone()).await.unwrap();
		posts.create(post("image", vec![file("a.png")])).await.unwrap();

		let mut archived = first.clone();
		archived.id = uuid::Uuid::new_v4();
		archived.is_archived = true;
		crate::adapters::repositories::Repository::new(store.clone()).add(&archived).await.unwrap();

		let all = posts.list(PostQuery::default()).await.unwrap();
		assert_eq!(all.total, 2);
		assert_eq!(all.limit, 20);

		let only_text = posts
			.list(PostQuery {
				post_type: Some("text".into()),
				..Default::default()
			})
			.await
			.unwrap();
		assert_eq!(only_text.total, 1);
		assert_eq!(only_text.posts[0].id, first.id);

		assert_eq!(posts.get(&first.id.to_string()).await.unwrap().id, first.id);
		assert!(matches!(posts.get(&archived.id.to_string()).await, Err(ServiceError::NotFound(_))));
	}
}

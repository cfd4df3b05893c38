use std::sync::Arc;

use crate::adapters::repositories::Repository;
use crate::adapters::store::DocumentStore;
use crate::common::pagination::{Page, PageOf};
use crate::domain::comment::{Comment, CreateComment};
use crate::domain::post::Post;

use super::response::ServiceError;

#[derive(Clone)]
pub struct CommentStore {
	comments: Repository<Comment>,
	posts: Repository<Post>,
}

impl CommentStore {
	pub fn new(store: Arc<dyn DocumentStore>) -> Self {
		Self {
			comments: Repository::new(store.clone()),
			posts: Repository::new(store),
		}
	}

	pub async fn init(&self) -> Result<(), ServiceError> {
		Ok(self.comments.init().await?)
	}

	/// The post must exist (archived or not). `parent_comment_id` is stored
	/// without checking that the parent exists.
	pub async fn create(
		&self,
		input: CreateComment,
	) -> Result<Comment, ServiceError> {
		let comment = input.into_comment()?;

		if !self.posts.exists_by_id(&comment.post_id).await? {
			return Err(ServiceError::NotFound("Post not found".into()));
		}

		self.comments.add(&comment).await?;
		tracing::info!(comment_id = %comment.id, post_id = %comment.post_id, "comment created");
		Ok(comment)
	}

	pub async fn list_for_post(
		&self,
		post_id: &str,
		page: Page,
	) -> Result<PageOf<Comment>, ServiceError> {
		Ok(self.comments.for_post(post_id.trim(), page).await?)
	}
}

#[cfg(test)]
mod test {
	use std::sync::Arc;

	use chrono::Utc;
	use uuid::Uuid;

	use super::CommentStore;
	use crate::adapters::repositories::Repository;
	use crate::adapters::store::{Collection, DocumentStore, Filter, MemoryStore};
	use crate::common::pagination::Page;
	use crate::domain::comment::CreateComment;
	use crate::domain::post::{Post, PostContent};
	use crate::services::response::ServiceError;

	async fn set_up() -> (CommentStore, Arc<MemoryStore>, Post) {
		let store = Arc::new(MemoryStore::new());
		let comments = CommentStore::new(store.clone());
		comments.init().await.unwrap();

		let now = Utc::now();
		let post = Post {
			id: Uuid::new_v4(),
			user_id: "author".into(),
			content: PostContent::Text { text: "hi".into() },
			caption: String::new(),
			location: None,
			is_archived: true,
			created_at: now,
			updated_at: now,
		};
		Repository::<Post>::new(store.clone()).add(&post).await.unwrap();
		(comments, store, post)
	}

	fn comment_on(post_id: &str) -> CreateComment {
		CreateComment {
			user_id: Some("u1".into()),
			post_id: Some(post_id.into()),
			parent_comment_id: None,
			content: Some("nice".into()),
		}
	}

	#[tokio::test]
	async fn test_comment_on_missing_post_is_not_found() {
		let (comments, store, _) = set_up().await;

		let err = comments.create(comment_on(&Uuid::new_v4().to_string())).await.unwrap_err();

		assert!(matches!(err, ServiceError::NotFound(_)));
		assert_eq!(store.count(Collection::Comments, &Filter::All).await.unwrap(), 0);
	}

	#[tokio::test]
	async fn test_archived_post_still_accepts_comments() {
		let (comments, _, post) = set_up().await;

		let created = comments.create(comment_on(&post.id.to_string())).await.unwrap();

		assert_eq!(created.post_id, post.id.to_string());
	}

	#[tokio::test]
	async fn test_unknown_parent_is_stored_as_given() {
		// Parent existence is not validated; orphaned threads are accepted.
		let (comments, _, post) = set_up().await;
		let mut input = comment_on(&post.id.to_string());
		input.parent_comment_id = Some("no-such-comment".into());

		let created = comments.create(input).await.unwrap();
		assert_eq!(created.parent_comment_id.as_deref(), Some("no-such-comment"));

		let listed = comments.list_for_post(&post.id.to_string(), Page::default()).await.unwrap();
		assert_eq!(listed.total, 1);
		assert_eq!(listed.items[0].id, created.id);
	}
}

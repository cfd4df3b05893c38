use std::sync::Arc;

use crate::adapters::media::MediaHost;
use crate::adapters::store::DocumentStore;
use crate::services::{
	comment_store::CommentStore, follow_graph::FollowGraph, post_store::PostStore, response::ServiceError,
	user_directory::UserDirectory,
};

/// `Dependency` carries every injectable collaborator a request handler needs.
/// The store and media host are handed in once at startup; nothing reaches for
/// a global.
#[derive(Clone)]
pub struct Dependency {
	pub store: Arc<dyn DocumentStore>,
	pub users: UserDirectory,
	pub follows: FollowGraph,
	pub posts: PostStore,
	pub comments: CommentStore,
}

impl Dependency {
	pub fn new(
		store: Arc<dyn DocumentStore>,
		media: Arc<dyn MediaHost>,
	) -> Self {
		Self {
			users: UserDirectory::new(store.clone()),
			follows: FollowGraph::new(store.clone()),
			posts: PostStore::new(store.clone(), media),
			comments: CommentStore::new(store.clone()),
			store,
		}
	}

	/// Creates collections and the unique indexes that guard them.
	pub async fn init(&self) -> Result<(), ServiceError> {
		self.users.init().await?;
		self.follows.init().await?;
		self.posts.init().await?;
		self.comments.init().await?;
		Ok(())
	}
}

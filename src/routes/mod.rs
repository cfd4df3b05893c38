mod comments;
mod follows;
mod health;
mod posts;
mod users;

use axum::extract::rejection::JsonRejection;
use axum::{
	extract::DefaultBodyLimit,
	routing::{delete, get, post},
	Json, Router,
};
use serde::Serialize;

use crate::common::pagination::PageOf;
use crate::dependencies::Dependency;
use crate::services::response::ServiceError;

pub use posts::{MAX_FILES, MAX_FILE_BYTES};

/// Every route of the service, with state applied. Cross-cutting layers (CORS,
/// tracing) are added by the binary.
pub fn create_routes(dependency: Dependency) -> Router {
	let api = Router::new()
		.route("/users", post(users::create_user).get(users::list_users))
		.route("/follows", post(follows::follow))
		.route("/follows/:id", delete(follows::unfollow_by_id))
		.route("/follows/:id/:following_id", delete(follows::unfollow_by_pair))
		.route("/follows/check/:follower_id/:following_id", get(follows::check))
		// `check` is also a user id as far as pair deletes are concerned
		.route("/follows/check/:follower_id", delete(follows::unfollow_check_by_pair))
		.route("/followers/:user_id", get(follows::followers))
		.route("/following/:user_id", get(follows::following))
		.route("/stats/:user_id", get(follows::stats))
		.route(
			"/posts",
			post(posts::create_post)
				.layer(DefaultBodyLimit::max(MAX_FILE_BYTES * MAX_FILES))
				.get(posts::list_posts),
		)
		.route("/posts/:id", get(posts::get_post))
		.route("/posts/:id/comments", get(comments::list_comments))
		.route("/comments", post(comments::create_comment));

	Router::new()
		.route("/health", get(health::check))
		.nest("/api", api)
		.with_state(dependency)
}

/// Turns a JSON extractor rejection into an `InvalidArgument` with a JSON body.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ServiceError> {
	payload
		.map(|Json(value)| value)
		.map_err(|rejection| ServiceError::InvalidArgument(rejection.body_text()))
}

/// `{success, data, total, page, limit, totalPages}`
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PagedResponse<T: Serialize> {
	pub success: bool,
	pub data: Vec<T>,
	pub total: u64,
	pub page: u64,
	pub limit: u64,
	pub total_pages: u64,
}

impl<T: Serialize> From<PageOf<T>> for PagedResponse<T> {
	fn from(page: PageOf<T>) -> Self {
		let total_pages = page.total_pages();
		Self {
			success: true,
			data: page.items,
			total: page.total,
			page: page.page.page,
			limit: page.page.limit,
			total_pages,
		}
	}
}

#[cfg(test)]
pub(crate) mod test_support {
	use std::sync::Arc;

	use axum::body::Body;
	use axum::http::{Method, Request, StatusCode};
	use axum::Router;
	use serde_json::Value;
	use tower::ServiceExt;

	use super::create_routes;
	use crate::adapters::store::MemoryStore;
	use crate::dependencies::Dependency;
	use crate::services::post_store::test::FakeMediaHost;

	pub(crate) async fn setup_test_router() -> Router {
		let dependency = Dependency::new(Arc::new(MemoryStore::new()), Arc::new(FakeMediaHost::default()));
		dependency.init().await.unwrap();
		create_routes(dependency)
	}

	pub(crate) async fn send(
		router: &Router,
		request: Request<Body>,
	) -> (StatusCode, Value) {
		let response = router.clone().oneshot(request).await.unwrap();
		let status = response.status();
		let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
		let body = if bytes.is_empty() {
			Value::Null
		} else {
			serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
		};
		(status, body)
	}

	pub(crate) async fn get_request(
		router: &Router,
		uri: &str,
	) -> (StatusCode, Value) {
		send(router, Request::builder().method(Method::GET).uri(uri).body(Body::empty()).unwrap()).await
	}

	pub(crate) async fn delete_request(
		router: &Router,
		uri: &str,
	) -> (StatusCode, Value) {
		send(router, Request::builder().method(Method::DELETE).uri(uri).body(Body::empty()).unwrap()).await
	}

	pub(crate) async fn post_json(
		router: &Router,
		uri: &str,
		body: Value,
	) -> (StatusCode, Value) {
		send(
			router,
			Request::builder()
				.method(Method::POST)
				.uri(uri)
				.header("content-type", "application/json")
				.body(Body::from(body.to_string()))
				.unwrap(),
		)
		.await
	}
}

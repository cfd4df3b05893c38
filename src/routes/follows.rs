use axum::extract::rejection::JsonRejection;
use axum::{
	extract::{Path, Query, State},
	http::StatusCode,
	response::IntoResponse,
	Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{json_body, PagedResponse};
use crate::common::pagination::{Page, PageQuery};
use crate::dependencies::Dependency;
use crate::domain::follow::FollowStatus;
use crate::services::response::{ServiceError, ServiceResponse};

#[derive(Debug, Deserialize)]
pub(super) struct FollowRequest {
	#[serde(alias = "follower_id")]
	followers_id: Option<String>,
	following_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusResponse {
	success: bool,
	#[serde(flatten)]
	status: FollowStatus,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatsBody {
	user_id: String,
	followers_count: u64,
	following_count: u64,
}

pub(super) async fn follow(
	State(dependency): State<Dependency>,
	payload: Result<Json<FollowRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ServiceError> {
	let request = json_body(payload)?;
	let edge = dependency
		.follows
		.follow(
			request.followers_id.as_deref().unwrap_or_default(),
			request.following_id.as_deref().unwrap_or_default(),
		)
		.await?;
	Ok((StatusCode::CREATED, ServiceResponse::with_message("Successfully followed user", edge)))
}

fn unfollowed() -> Json<serde_json::Value> {
	Json(json!({"success": true, "message": "Successfully unfollowed user"}))
}

pub(super) async fn unfollow_by_id(
	State(dependency): State<Dependency>,
	Path(id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
	dependency.follows.unfollow_by_id(&id).await?;
	Ok(unfollowed())
}

pub(super) async fn unfollow_by_pair(
	State(dependency): State<Dependency>,
	Path((follower_id, following_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ServiceError> {
	dependency.follows.unfollow_by_pair(&follower_id, &following_id).await?;
	Ok(unfollowed())
}

/// `DELETE /follows/check/:following_id`, the pair delete for a follower whose
/// id is literally `check`, which the static check route would otherwise shadow.
pub(super) async fn unfollow_check_by_pair(
	State(dependency): State<Dependency>,
	Path(following_id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
	dependency.follows.unfollow_by_pair("check", &following_id).await?;
	Ok(unfollowed())
}

pub(super) async fn followers(
	State(dependency): State<Dependency>,
	Path(user_id): Path<String>,
	Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ServiceError> {
	let page = dependency.follows.list_followers(&user_id, Page::try_from(query)?).await?;
	Ok(Json(PagedResponse::from(page)))
}

pub(super) async fn following(
	State(dependency): State<Dependency>,
	Path(user_id): Path<String>,
	Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ServiceError> {
	let page = dependency.follows.list_following(&user_id, Page::try_from(query)?).await?;
	Ok(Json(PagedResponse::from(page)))
}

pub(super) async fn check(
	State(dependency): State<Dependency>,
	Path((follower_id, following_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ServiceError> {
	let status = dependency.follows.is_following(&follower_id, &following_id).await?;
	Ok(Json(StatusResponse { success: true, status }))
}

pub(super) async fn stats(
	State(dependency): State<Dependency>,
	Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
	let stats = dependency.follows.stats(&user_id).await?;
	Ok(ServiceResponse::data(StatsBody {
		user_id,
		followers_count: stats.followers_count,
		following_count: stats.following_count,
	}))
}

#[cfg(test)]
mod test {
	use axum::http::StatusCode;
	use serde_json::json;

	use crate::routes::test_support::{delete_request, get_request, post_json, setup_test_router};

	#[tokio::test]
	async fn test_follow_lifecycle() {
		let router = setup_test_router().await;

		let (status, body) = post_json(&router, "/api/follows", json!({"followers_id": "alice", "following_id": "bob"})).await;
		assert_eq!(status, StatusCode::CREATED);
		assert_eq!(body["success"], true);
		assert_eq!(body["data"]["followers_id"], "alice");
		let follow_id = body["data"]["id"].as_str().unwrap().to_string();

		let (status, _) = post_json(&router, "/api/follows", json!({"followers_id": "alice", "following_id": "bob"})).await;
		assert_eq!(status, StatusCode::CONFLICT);

		let (_, body) = get_request(&router, "/api/follows/check/alice/bob").await;
		assert_eq!(body["isFollowing"], true);
		assert_eq!(body["followId"], follow_id.as_str());

		let (_, body) = get_request(&router, "/api/stats/bob").await;
		assert_eq!(body["data"]["userId"], "bob");
		assert_eq!(body["data"]["followersCount"], 1);
		assert_eq!(body["data"]["followingCount"], 0);

		let (status, _) = delete_request(&router, &format!("/api/follows/{follow_id}")).await;
		assert_eq!(status, StatusCode::OK);
		let (status, _) = delete_request(&router, &format!("/api/follows/{follow_id}")).await;
		assert_eq!(status, StatusCode::NOT_FOUND);

		let (_, body) = get_request(&router, "/api/follows/check/alice/bob").await;
		assert_eq!(body["isFollowing"], false);
		assert_eq!(body["followId"], json!(null));
	}

	#[tokio::test]
	async fn test_follow_rejections() {
		let router = setup_test_router().await;

		let (status, body) = post_json(&router, "/api/follows", json!({"followers_id": "alice", "following_id": "alice"})).await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(body["message"], "You cannot follow yourself");

		let (status, _) = post_json(&router, "/api/follows", json!({"followers_id": "alice"})).await;
		assert_eq!(status, StatusCode::BAD_REQUEST);

		let (status, _) = delete_request(&router, "/api/follows/not-an-id").await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
	}

	#[tokio::test]
	async fn test_unfollow_by_pair_and_paged_lists() {
		let router = setup_test_router().await;
		for follower in ["f1", "f2", "f3"] {
			post_json(&router, "/api/follows", json!({"followers_id": follower, "following_id": "star"})).await;
		}

		let (status, body) = get_request(&router, "/api/followers/star?page=2&limit=2").await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(body["total"], 3);
		assert_eq!(body["totalPages"], 2);
		assert_eq!(body["data"].as_array().unwrap().len(), 1);
		assert_eq!(body["data"][0]["followers_id"], "f1");

		let (status, _) = delete_request(&router, "/api/follows/f2/star").await;
		assert_eq!(status, StatusCode::OK);
		let (status, _) = delete_request(&router, "/api/follows/f2/star").await;
		assert_eq!(status, StatusCode::NOT_FOUND);

		let (_, body) = get_request(&router, "/api/following/f1").await;
		assert_eq!(body["total"], 1);
		assert_eq!(body["page"], 1);
		assert_eq!(body["limit"], 10);
	}

	#[tokio::test]
	async fn test_user_named_check_can_unfollow_by_pair() {
		let router = setup_test_router().await;
		post_json(&router, "/api/follows", json!({"followers_id": "check", "following_id": "bob"})).await;

		let (status, body) = get_request(&router, "/api/follows/check/check/bob").await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(body["isFollowing"], true);

		let (status, _) = delete_request(&router, "/api/follows/check/bob").await;
		assert_eq!(status, StatusCode::OK);
		let (_, body) = get_request(&router, "/api/follows/check/check/bob").await;
		assert_eq!(body["isFollowing"], false);
	}

	#[tokio::test]
	async fn test_page_far_past_the_end_is_empty() {
		let router = setup_test_router().await;
		post_json(&router, "/api/follows", json!({"followers_id": "fan", "following_id": "star"})).await;

		let (status, body) = get_request(&router, "/api/followers/star?page=18446744073709551615&limit=10").await;

		assert_eq!(status, StatusCode::OK);
		assert_eq!(body["total"], 1);
		assert!(body["data"].as_array().unwrap().is_empty());
	}
}

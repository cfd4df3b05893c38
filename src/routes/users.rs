use axum::extract::rejection::JsonRejection;
use axum::{
	extract::{Query, State},
	http::StatusCode,
	response::IntoResponse,
	Json,
};
use serde::Serialize;

use super::json_body;
use crate::common::pagination::{Page, PageQuery};
use crate::dependencies::Dependency;
use crate::domain::user::{CreateUser, UserView};
use crate::services::response::ServiceError;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UserList {
	users: Vec<UserView>,
	total: u64,
	page: u64,
	limit: u64,
	total_pages: u64,
}

pub(super) async fn create_user(
	State(dependency): State<Dependency>,
	payload: Result<Json<CreateUser>, JsonRejection>,
) -> Result<impl IntoResponse, ServiceError> {
	let user = dependency.users.create(json_body(payload)?).await?;
	Ok((StatusCode::CREATED, Json(user)))
}

pub(super) async fn list_users(
	State(dependency): State<Dependency>,
	Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ServiceError> {
	let page = dependency.users.list(Page::try_from(query)?).await?;
	let total_pages = page.total_pages();
	Ok(Json(UserList {
		users: page.items,
		total: page.total,
		page: page.page.page,
		limit: page.page.limit,
		total_pages,
	}))
}

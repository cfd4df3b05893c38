use axum::extract::rejection::JsonRejection;
use axum::{
	extract::{Path, Query, State},
	http::StatusCode,
	response::IntoResponse,
	Json,
};

use super::{json_body, PagedResponse};
use crate::common::pagination::{Page, PageQuery};
use crate::dependencies::Dependency;
use crate::domain::comment::CreateComment;
use crate::services::response::{ServiceError, ServiceResponse};

pub(super) async fn create_comment(
	State(dependency): State<Dependency>,
	payload: Result<Json<CreateComment>, JsonRejection>,
) -> Result<impl IntoResponse, ServiceError> {
	let comment = dependency.comments.create(json_body(payload)?).await?;
	Ok((StatusCode::CREATED, ServiceResponse::with_message("Comment created successfully", comment)))
}

pub(super) async fn list_comments(
	State(dependency): State<Dependency>,
	Path(post_id): Path<String>,
	Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ServiceError> {
	let page = dependency.comments.list_for_post(&post_id, Page::try_from(query)?).await?;
	Ok(Json(PagedResponse::from(page)))
}

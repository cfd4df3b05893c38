use axum::extract::multipart::{Field, MultipartRejection};
use axum::{
	extract::{Multipart, Path, Query, State},
	http::StatusCode,
	response::IntoResponse,
	Json,
};
use bytes::BytesMut;
use serde::Serialize;

use crate::dependencies::Dependency;
use crate::domain::post::{MediaFile, NewPost, Post};
use crate::services::post_store::PostQuery;
use crate::services::response::{ServiceError, ServiceResponse};

pub const MAX_FILE_BYTES: usize = 100 * 1024 * 1024;
pub const MAX_FILES: usize = 10;

#[derive(Serialize)]
struct Pagination {
	limit: u64,
	offset: u64,
	total: u64,
}

#[derive(Serialize)]
struct PostList {
	success: bool,
	data: Vec<Post>,
	pagination: Pagination,
}

/// `multipart/form-data` with text fields and up to [`MAX_FILES`] file parts.
pub(super) async fn create_post(
	State(dependency): State<Dependency>,
	multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, ServiceError> {
	let multipart = multipart.map_err(|_| ServiceError::InvalidArgument("Request must be multipart/form-data".into()))?;
	let input = read_post_form(multipart).await?;
	tracing::debug!(files = input.files.len(), post_type = ?input.post_type, "post form received");

	let post = dependency.posts.create(input).await?;
	Ok((StatusCode::CREATED, ServiceResponse::with_message("Post created successfully", post)))
}

async fn read_post_form(mut multipart: Multipart) -> Result<NewPost, ServiceError> {
	let mut input = NewPost::default();

	while let Some(field) = multipart
		.next_field()
		.await
		.map_err(|err| ServiceError::InvalidArgument(format!("Malformed multipart body: {}", err.body_text())))?
	{
		let name = field.name().unwrap_or_default().to_string();

		if field.file_name().is_some() {
			if input.files.len() == MAX_FILES {
				return Err(ServiceError::InvalidArgument(format!("At most {MAX_FILES} files are allowed")));
			}
			input.files.push(read_file(name, field, MAX_FILE_BYTES).await?);
			continue;
		}

		let slot = match name.as_str() {
			"user_id" => &mut input.user_id,
			"post_type" => &mut input.post_type,
			"caption" => &mut input.caption,
			"location" => &mut input.location,
			"text" => &mut input.text,
			"aspect_ratio" => &mut input.aspect_ratio,
			_ => continue,
		};
		let value = field
			.text()
			.await
			.map_err(|err| ServiceError::InvalidArgument(format!("Failed to read {name}: {}", err.body_text())))?;
		*slot = Some(value);
	}

	Ok(input)
}

/// Streams one file part, giving up as soon as it grows past `max_bytes`.
async fn read_file(
	field_name: String,
	mut field: Field<'_>,
	max_bytes: usize,
) -> Result<MediaFile, ServiceError> {
	let file_name = field.file_name().map(str::to_string);
	let content_type = field.content_type().map(str::to_string);

	let mut data = BytesMut::new();
	while let Some(chunk) = field
		.chunk()
		.await
		.map_err(|err| ServiceError::InvalidArgument(format!("Failed to read file: {}", err.body_text())))?
	{
		if data.len() + chunk.len() > max_bytes {
			return Err(ServiceError::InvalidArgument(format!(
				"File exceeds the {}MB limit",
				max_bytes / (1024 * 1024)
			)));
		}
		data.extend_from_slice(&chunk);
	}

	Ok(MediaFile {
		field_name,
		file_name,
		content_type,
		data: data.freeze(),
	})
}

pub(super) async fn list_posts(
	State(dependency): State<Dependency>,
	Query(query): Query<PostQuery>,
) -> Result<impl IntoResponse, ServiceError> {
	let listing = dependency.posts.list(query).await?;
	Ok(Json(PostList {
		success: true,
		data: listing.posts,
		pagination: Pagination {
			limit: listing.limit,
			offset: listing.offset,
			total: listing.total,
		},
	}))
}

pub(super) async fn get_post(
	State(dependency): State<Dependency>,
	Path(id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
	Ok(ServiceResponse::data(dependency.posts.get(&id).await?))
}

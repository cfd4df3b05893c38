use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::adapters::store::StoreError;

#[derive(Debug, Error)]
pub enum ServiceError {
	#[error("{0}")]
	InvalidArgument(String),

	#[error("You cannot follow yourself")]
	SelfFollowRejected,

	#[error("Already following this user")]
	DuplicateEdge,

	#[error("{0}")]
	DuplicateUser(String),

	#[error("{0}")]
	NotFound(String),

	#[error("{0}")]
	UploadFailed(String),

	#[error("document store unavailable: {0}")]
	StoreUnavailable(String),

	#[error("configuration error: {0}")]
	Config(String),

	#[error(transparent)]
	Store(#[from] StoreError),

	#[error("{0}")]
	Internal(String),
}

impl ServiceError {
	pub fn status(&self) -> StatusCode {
		match self {
			ServiceError::InvalidArgument(_) | ServiceError::SelfFollowRejected => StatusCode::BAD_REQUEST,
			ServiceError::DuplicateEdge | ServiceError::DuplicateUser(_) => StatusCode::CONFLICT,
			ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
			ServiceError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
			ServiceError::UploadFailed(_) | ServiceError::Config(_) | ServiceError::Store(_) | ServiceError::Internal(_) => {
				StatusCode::INTERNAL_SERVER_ERROR
			}
		}
	}

	fn kind(&self) -> &'static str {
		match self {
			ServiceError::InvalidArgument(_) => "InvalidArgument",
			ServiceError::SelfFollowRejected => "SelfFollowRejected",
			ServiceError::DuplicateEdge => "DuplicateEdge",
			ServiceError::DuplicateUser(_) => "User already exists",
			ServiceError::NotFound(_) => "NotFound",
			ServiceError::UploadFailed(_) => "UploadFailed",
			ServiceError::StoreUnavailable(_) => "StoreUnavailable",
			ServiceError::Config(_) | ServiceError::Store(_) | ServiceError::Internal(_) => "Internal Server Error",
		}
	}
}

impl IntoResponse for ServiceError {
	fn into_response(self) -> Response {
		let status = self.status();
		if status.is_server_error() {
			tracing::error!(error = %self, "request failed");
		} else {
			tracing::debug!(error = %self, status = status.as_u16(), "request rejected");
		}

		let body = json!({
			"success": false,
			"error": self.kind(),
			"message": self.to_string(),
		});
		(status, Json(body)).into_response()
	}
}

/// `{success: true, message?, data}` envelope used by most routes.
#[derive(Debug, Serialize)]
pub struct ServiceResponse<T: Serialize> {
	pub success: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub message: Option<&'static str>,
	pub data: T,
}

impl<T: Serialize> ServiceResponse<T> {
	pub fn data(data: T) -> Self {
		Self {
			success: true,
			message: None,
			data,
		}
	}

	pub fn with_message(
		message: &'static str,
		data: T,
	) -> Self {
		Self {
			success: true,
			message: Some(message),
			data,
		}
	}
}

impl<T: Serialize> IntoResponse for ServiceResponse<T> {
	fn into_response(self) -> Response {
		Json(self).into_response()
	}
}

#[cfg(test)]
mod test {
	use axum::http::StatusCode;

	use super::ServiceError;
	use crate::adapters::store::StoreError;

	#[test]
	fn test_status_mapping() {
		assert_eq!(ServiceError::InvalidArgument("x".into()).status(), StatusCode::BAD_REQUEST);
		assert_eq!(ServiceError::SelfFollowRejected.status(), StatusCode::BAD_REQUEST);
		assert_eq!(ServiceError::DuplicateEdge.status(), StatusCode::CONFLICT);
		assert_eq!(ServiceError::DuplicateUser("x".into()).status(), StatusCode::CONFLICT);
		assert_eq!(ServiceError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
		assert_eq!(ServiceError::UploadFailed("x".into()).status(), StatusCode::INTERNAL_SERVER_ERROR);
		assert_eq!(
			ServiceError::from(StoreError::Unavailable("down".into())).status(),
			StatusCode::INTERNAL_SERVER_ERROR
		);
	}
}

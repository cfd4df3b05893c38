use axum::{extract::State, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::dependencies::Dependency;

#[derive(Serialize)]
struct Health {
	status: &'static str,
	store: &'static str,
	timestamp: DateTime<Utc>,
}

/// Liveness plus a store ping. Always 200; the store state is in the body.
pub(super) async fn check(State(dependency): State<Dependency>) -> impl IntoResponse {
	let store = match dependency.store.ping().await {
		Ok(()) => "connected",
		Err(err) => {
			tracing::warn!(error = %err, "store ping failed");
			"disconnected"
		}
	};
	Json(Health {
		status: "ok",
		store,
		timestamp: Utc::now(),
	})
}

#[cfg(test)]
mod test {
	use axum::http::StatusCode;

	use crate::routes::test_support::{get_request, setup_test_router};

	#[tokio::test]
	async fn test_health_reports_store() {
		let router = setup_test_router().await;

		let (status, body) = get_request(&router, "/health").await;

		assert_eq!(status, StatusCode::OK);
		assert_eq!(body["status"], "ok");
		assert_eq!(body["store"], "connected");
		assert!(body["timestamp"].is_string());
	}
}

use axum::{
	http::{header, HeaderValue, Method},
	Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use social::{config::Config, dependencies::Dependency, routes::create_routes, services::response::ServiceError};

/// Application routes wrapped in CORS and request tracing.
pub fn app(
	dependency: Dependency,
	config: &Config,
) -> Result<Router, ServiceError> {
	let origin = config
		.cors_origin
		.parse::<HeaderValue>()
		.map_err(|_| ServiceError::Config(format!("CORS_ORIGIN is not a valid header value: `{}`", config.cors_origin)))?;

	Ok(create_routes(dependency)
		.layer(
			CorsLayer::new()
				.allow_origin(origin)
				.allow_credentials(true)
				.allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
				.allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
		)
		.layer(TraceLayer::new_for_http()))
}

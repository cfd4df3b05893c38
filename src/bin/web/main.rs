pub mod routers;

use std::{net::SocketAddr, process, sync::Arc};

use social::{
	adapters::{media::CloudinaryHost, store::PgDocumentStore},
	config::Config,
	database::connection_pool,
	dependencies::Dependency,
	services::response::ServiceError,
};
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
	let config = match Config::new() {
		Ok(config) => config,
		Err(err) => {
			eprintln!("{err}");
			process::exit(1);
		}
	};

	// ! Tracing
	tracing_subscriber::registry()
		.with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
			// axum logs rejections from built-in extractors with the `axum::rejection`
			// target, at `TRACE` level. `axum::rejection=trace` enables showing those events
			config.log_filter().into()
		}))
		.with(tracing_subscriber::fmt::layer())
		.init();

	if config.uses_default_cookie_secret() {
		tracing::warn!("COOKIE_SECRET not set, using the development default");
	}

	if let Err(err) = run(config).await {
		tracing::error!(error = %err, "server stopped");
		process::exit(1);
	}
}

async fn run(config: Config) -> Result<(), ServiceError> {
	// ! Connection
	let pool = connection_pool(&config).await?;
	let dependency = Dependency::new(Arc::new(PgDocumentStore::new(pool)), Arc::new(CloudinaryHost::new(config.cloudinary.clone())));
	dependency.init().await?;

	let app = routers::app(dependency, &config)?;

	let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
	let listener = tokio::net::TcpListener::bind(addr)
		.await
		.map_err(|err| ServiceError::Internal(format!("failed to bind {addr}: {err}")))?;
	tracing::info!(%addr, "Start Web Server...");

	axum::serve(listener, app)
		.with_graceful_shutdown(shutdown_signal())
		.await
		.map_err(|err| ServiceError::Internal(err.to_string()))?;

	tracing::info!("Server shut down");
	Ok(())
}

async fn shutdown_signal() {
	let ctrl_c = async {
		match signal::ctrl_c().await {
			Ok(()) => tracing::info!("Received Ctrl+C, shutting down"),
			Err(err) => {
				tracing::error!(error = %err, "failed to listen for Ctrl+C");
				std::future::pending::<()>().await;
			}
		}
	};

	#[cfg(unix)]
	let terminate = async {
		match signal::unix::signal(signal::unix::SignalKind::terminate()) {
			Ok(mut stream) => {
				stream.recv().await;
				tracing::info!("Received terminate signal, shutting down");
			}
			Err(err) => {
				tracing::error!(error = %err, "failed to install SIGTERM handler");
				std::future::pending::<()>().await;
			}
		}
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => {},
		_ = terminate => {},
	}
}

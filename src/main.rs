#![warn(clippy::pedantic)]

mod auth;
mod config;
mod error;
mod extract;
mod model;
mod openapi;
mod route;
mod store;
#[cfg(test)]
mod test;
mod trace;

use std::{process::ExitCode, sync::Arc};

use aide::openapi::OpenApi;
use axum::{
	extract::{DefaultBodyLimit, Request},
	routing::{get, on, MethodFilter},
	Extension, Router,
};
use tower::ServiceBuilder;
use tower_http::{
	compression::CompressionLayer,
	request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
	trace::TraceLayer,
};

pub use error::Error;

use auth::Authenticator;
use config::Config;
use route::shell::Shell;
use store::Store;

pub type AppState = State;

/// The shared application state.
///
/// This contains every dependency handlers need to access. The store is the
/// only mutable part and guards itself.
#[derive(Clone, axum::extract::FromRef)]
pub struct State {
	pub store: Arc<Store>,
	pub authenticator: Authenticator,
	pub shell: Arc<Shell>,
}

/// Builds the service: the documented API, the usage hint for other methods on
/// `/post`, the `OpenAPI` document and the static shell.
pub fn app(state: AppState, body_limit: usize) -> Router {
	let mut api = OpenApi::default();

	let not_submission = MethodFilter::GET
		.or(MethodFilter::PUT)
		.or(MethodFilter::PATCH)
		.or(MethodFilter::DELETE);

	route::routes()
		.finish_api_with(&mut api, openapi::docs)
		.route("/post", on(not_submission, route::post::usage))
		.route("/docs/api.json", get(route::docs::serve_api))
		.route("/", get(route::shell::index))
		.fallback_service(route::shell::files(&state))
		.layer(Extension(Arc::new(api)))
		.layer(DefaultBodyLimit::max(body_limit))
		.layer(
			ServiceBuilder::new()
				.layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
				.layer(
					TraceLayer::new_for_http().make_span_with(|request: &Request| {
						let request_id = request
							.headers()
							.get("x-request-id")
							.and_then(|value| value.to_str().ok())
							.unwrap_or_default();

						tracing::info_span!(
							"request",
							method = %request.method(),
							uri = %request.uri(),
							request_id,
						)
					}),
				)
				.layer(PropagateRequestIdLayer::x_request_id())
				.layer(CompressionLayer::new()),
		)
		.with_state(state)
}

#[tokio::main]
async fn main() -> ExitCode {
	dotenvy::dotenv().ok();

	let config = match Config::from_env() {
		Ok(config) => config,
		Err(error) => {
			eprintln!("invalid configuration: {error}");
			return ExitCode::FAILURE;
		}
	};

	let _guard =
		trace::init_tracing_subscriber(config.log_level, config.otlp_endpoint.as_deref());

	let authenticator = match &config.tokens {
		Some(path) => Authenticator::from_file(path),
		None => Authenticator::disabled(),
	};

	match authenticator.check().await {
		Ok(count) if authenticator.is_enabled() => tracing::info!(count, "loaded bearer tokens"),
		Ok(_) => tracing::warn!("TIMELINE_TOKENS is not set, submissions are not authenticated"),
		Err(error) => {
			tracing::error!(%error, path = ?config.tokens, "cannot read token file");
			return ExitCode::FAILURE;
		}
	}

	let seed = chrono::Utc::now().timestamp();
	let store = match &config.data_dir {
		Some(dir) => match Store::open(dir, seed).await {
			Ok(store) => store,
			Err(error) => {
				tracing::error!(%error, "cannot open post store");
				return ExitCode::FAILURE;
			}
		},
		None => Store::memory(seed),
	};

	tracing::info!(
		posts = store.len().await,
		durable = config.data_dir.is_some(),
		"post store ready"
	);

	let state = State {
		store: Arc::new(store),
		authenticator,
		shell: Arc::new(Shell::new(&config.static_dir, &config.title)),
	};

	let listener = match tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await {
		Ok(listener) => listener,
		Err(error) => {
			tracing::error!(%error, port = config.port, "failed to bind");
			return ExitCode::FAILURE;
		}
	};

	tracing::info!("listening on {}:{}", config.host, config.port);

	if let Err(error) = axum::serve(listener, app(state, config.body_limit)).await {
		tracing::error!(%error, "server error");
		return ExitCode::FAILURE;
	}

	ExitCode::SUCCESS
}

//! Helpers shared by the route tests.

use std::{path::Path, sync::Arc};

pub use axum_test::{TestResponse, TestServer};
use axum::{
	body::Bytes,
	http::{header, HeaderValue},
};

use crate::{
	auth::Authenticator, config::DEFAULT_BODY_LIMIT, model::NewPost, route::shell::Shell,
	store::Store, AppState,
};

const BOUNDARY: &str = "timeline-test-boundary";

/// An in-memory state with ids starting at 1 and token checks disabled.
pub fn state() -> AppState {
	AppState {
		store: Arc::new(Store::memory(1)),
		authenticator: Authenticator::disabled(),
		shell: Arc::new(Shell::new("public", "Timeline")),
	}
}

pub fn state_with_tokens(tokens: &Path) -> AppState {
	AppState {
		authenticator: Authenticator::from_file(tokens),
		..state()
	}
}

/// Serves the full router, returning the server and a handle to its store.
pub fn server(state: AppState) -> (TestServer, Arc<Store>) {
	let store = Arc::clone(&state.store);
	let server = TestServer::new(crate::app(state, DEFAULT_BODY_LIMIT)).unwrap();

	(server, store)
}

pub fn new_post(message: &str) -> NewPost {
	NewPost {
		from: "tester".into(),
		message: message.into(),
		date: 1_700_000_000,
		raw: Bytes::from_static(b"\x89PNG"),
		raw_type: "image/png".into(),
	}
}

/// Builds a raw `multipart/form-data` body part by part, so tests control
/// each part's content type (or its absence).
#[derive(Default)]
pub struct Form {
	body: Vec<u8>,
}

impl Form {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn part(mut self, name: &str, content_type: Option<&str>, body: impl AsRef<[u8]>) -> Self {
		self.body.extend_from_slice(
			format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n").as_bytes(),
		);

		if let Some(content_type) = content_type {
			self.body
				.extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
		}

		self.body.extend_from_slice(b"\r\n");
		self.body.extend_from_slice(body.as_ref());
		self.body.extend_from_slice(b"\r\n");
		self
	}

	pub fn finish(mut self) -> Bytes {
		self.body
			.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

		self.body.into()
	}
}

pub async fn submit(server: &TestServer, body: Bytes) -> TestResponse {
	server
		.post("/post")
		.content_type(&format!("multipart/form-data; boundary={BOUNDARY}"))
		.bytes(body)
		.await
}

pub async fn submit_with(
	server: &TestServer,
	body: Bytes,
	authorization: HeaderValue,
) -> TestResponse {
	server
		.post("/post")
		.add_header(header::AUTHORIZATION, authorization)
		.content_type(&format!("multipart/form-data; boundary={BOUNDARY}"))
		.bytes(body)
		.await
}

/// Stores a post through the HTTP endpoint with a one-byte PNG attachment.
pub async fn publish(server: &TestServer, message: &str) {
	let body = Form::new()
		.part(
			"json",
			Some("application/json"),
			serde_json::json!({ "from": "tester", "message": message }).to_string(),
		)
		.part("image", Some("image/png"), b"\x89")
		.finish();

	let response = submit(server, body).await;

	assert_eq!(response.status_code(), 200, "{}", response.text());
}

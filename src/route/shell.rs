use std::{path::PathBuf, sync::Arc};

use axum::{
	extract::State,
	http::{StatusCode, Uri},
	response::{Html, IntoResponse, Response},
	routing::{get, MethodRouter},
};
use tower_http::services::ServeDir;

use crate::AppState;

/// Placeholder in `index.html` replaced by the configured title.
pub const TITLE_PLACEHOLDER: &str = "***Timeline***";

/// The static page that hosts the timeline client.
#[derive(Debug)]
pub struct Shell {
	dir: PathBuf,
	title: String,
}

impl Shell {
	pub fn new(dir: impl Into<PathBuf>, title: impl Into<String>) -> Self {
		Self {
			dir: dir.into(),
			title: title.into(),
		}
	}

	async fn render(&self) -> Option<String> {
		let page = tokio::fs::read_to_string(self.dir.join("index.html"))
			.await
			.ok()?;

		Some(page.replace(TITLE_PLACEHOLDER, &self.title))
	}
}

/// Serves the shell document with its title filled in.
pub async fn index(State(shell): State<Arc<Shell>>, uri: Uri) -> Response {
	match shell.render().await {
		Some(page) => Html(page).into_response(),
		None => (
			StatusCode::NOT_FOUND,
			format!("404: \"{}\" not found\n", uri.path().trim_start_matches('/')),
		)
			.into_response(),
	}
}

/// Serves files from the static directory, falling back to the shell.
pub fn files(state: &AppState) -> ServeDir<MethodRouter> {
	let shell: MethodRouter = get(index).with_state(state.clone());

	ServeDir::new(&state.shell.dir).fallback(shell)
}

use std::{
	io,
	path::{Path, PathBuf},
	sync::Arc,
};

use axum::http::StatusCode;

/// An error that can occur while authenticating a submission.
///
/// Note that the messages are presented to the client, so they should not contain
/// sensitive information.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("No Bearer token provided")]
	MissingToken,
	#[error("Incorrect token provided")]
	IncorrectToken,
	#[error("Token list unavailable")]
	TokensUnavailable,
}

impl Error {
	pub fn status(&self) -> StatusCode {
		match self {
			Self::MissingToken => StatusCode::BAD_REQUEST,
			Self::IncorrectToken | Self::TokensUnavailable => StatusCode::UNAUTHORIZED,
		}
	}
}

/// Checks bearer credentials against a token file.
///
/// The file is read again on every check so it can be edited while the
/// service is running. Without a file, every credential is accepted.
#[derive(Debug, Clone, Default)]
pub struct Authenticator {
	source: Option<Arc<Path>>,
}

impl Authenticator {
	pub fn disabled() -> Self {
		Self::default()
	}

	pub fn from_file(path: impl Into<PathBuf>) -> Self {
		Self {
			source: Some(Arc::from(path.into())),
		}
	}

	pub fn is_enabled(&self) -> bool {
		self.source.is_some()
	}

	/// Reads the token file once, returning how many tokens it holds.
	pub async fn check(&self) -> io::Result<usize> {
		let Some(path) = &self.source else {
			return Ok(0);
		};

		let list = tokio::fs::read_to_string(path).await?;
		let count = tokens(&list).count();

		Ok(count)
	}

	pub async fn authenticate(&self, credential: &str) -> io::Result<bool> {
		let Some(path) = &self.source else {
			return Ok(true);
		};

		let list = tokio::fs::read_to_string(path).await?;
		let found = tokens(&list).any(|token| token == credential);

		Ok(found)
	}
}

/// Yields the tokens of a token file: one per line, `#` starts a comment,
/// blank lines are skipped.
pub fn tokens(list: &str) -> impl Iterator<Item = &str> {
	list.lines()
		.map(|line| line.split_once('#').map_or(line, |(token, _)| token).trim())
		.filter(|token| !token.is_empty())
}

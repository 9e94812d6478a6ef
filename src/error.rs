use aide::OperationOutput;
use axum::{
	extract::rejection::QueryRejection,
	http::StatusCode,
	response::{IntoResponse, Response},
};

use crate::{auth, route, store};

/// Error type for the application.
///
/// The Display output of every variant except [`Error::Store`] is sent to the
/// client verbatim as a single plaintext line.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Post(#[from] route::post::Error),
	#[error(transparent)]
	Auth(#[from] auth::Error),
	#[error("{}", validation_message(.0))]
	Validation(#[from] validator::ValidationErrors),
	#[error("{}", .0.body_text())]
	Query(#[from] QueryRejection),
	#[error("Unknown post {0}")]
	UnknownPost(i64),
	#[error("store error: {0}")]
	Store(#[from] store::Error),
}

impl Error {
	pub fn status(&self) -> StatusCode {
		match self {
			Self::Post(..) | Self::Validation(..) | Self::Query(..) => StatusCode::BAD_REQUEST,
			Self::Auth(error) => error.status(),
			Self::UnknownPost(..) => StatusCode::NOT_FOUND,
			Self::Store(..) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}
}

/// Renders the first failing field as `field: message`, falling back to the
/// validator's error code when no message was attached.
fn validation_message(errors: &validator::ValidationErrors) -> String {
	let mut fields = errors.field_errors().into_iter().collect::<Vec<_>>();
	fields.sort_by(|(a, _), (b, _)| a.cmp(b));

	fields
		.into_iter()
		.find_map(|(field, errors)| {
			errors.first().map(|error| {
				let detail = error
					.message
					.as_deref()
					.unwrap_or_else(|| error.code.as_ref());

				if field == "__all__" {
					detail.to_string()
				} else {
					format!("{field}: {detail}")
				}
			})
		})
		.unwrap_or_else(|| "invalid request".to_string())
}

impl IntoResponse for Error {
	fn into_response(self) -> Response {
		let status = self.status();

		if let Self::Store(error) = &self {
			tracing::error!(%error, "store failure");

			return (status, "Internal server error").into_response();
		}

		tracing::debug!(status = status.as_u16(), error = %self, "request rejected");

		(status, self.to_string()).into_response()
	}
}

impl OperationOutput for Error {
	type Inner = Self;
}

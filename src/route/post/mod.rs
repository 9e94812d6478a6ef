pub mod model;
pub mod route;

pub use route::{create_post, create_post_docs, usage};

/// An error that rejects a submission.
///
/// Exactly one is reported per rejected request, for the first check that
/// fails. The messages are sent to the client as-is.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(
		"Expected multipart POST request with 1st part as JSON containing 'from' and 'message', \
		 and 2nd part containing an image to post"
	)]
	Usage,
	#[error("{0}")]
	Multipart(String),
	#[error("No JSON part detected")]
	NoJsonPart,
	#[error("First part must be JSON")]
	FirstPartNotJson,
	#[error("JSON parse error: {0}")]
	Json(#[from] serde_json::Error),
	#[error(transparent)]
	Field(#[from] model::FieldError),
	#[error("No image part detected")]
	NoImagePart,
	#[error("Second part must be an image")]
	SecondPartNotImage,
	#[error("The image cannot be null")]
	EmptyImage,
}

impl From<axum::extract::multipart::MultipartError> for Error {
	fn from(error: axum::extract::multipart::MultipartError) -> Self {
		Self::Multipart(error.body_text())
	}
}

use axum::extract::State;
use macros::route;
use serde::Deserialize;
use serde_json::Value;

use crate::{
	extract::{Authorized, Submission},
	model::NewPost,
	openapi::tag,
	store::Store,
	Error,
};

use super::{model::PostInput, Error as PostError};

/// Create post
/// Submits a message with an attached image. The body is a multipart form: the
/// first part is JSON with non-empty `from` and `message` strings, the second
/// part is the image.
#[route(
	tag = tag::POST,
	response(status = 200, description = "The post was stored."),
	response(status = 400, description = "The submission was rejected; the body says why."),
	response(status = 401, description = "The bearer token is not on the allow-list.")
)]
pub async fn create_post(
	State(store): State<std::sync::Arc<Store>>,
	_: Authorized,
	Submission(mut multipart): Submission,
) -> Result<(), Error> {
	let part = multipart
		.next_field()
		.await
		.map_err(PostError::from)?
		.ok_or(PostError::NoJsonPart)?;

	if !part.content_type().is_some_and(|kind| kind.contains("json")) {
		return Err(PostError::FirstPartNotJson.into());
	}

	let body = part.bytes().await.map_err(PostError::from)?;
	let input = decode(&body)?.validate().map_err(PostError::from)?;

	let part = multipart
		.next_field()
		.await
		.map_err(PostError::from)?
		.ok_or(PostError::NoImagePart)?;

	let Some(raw_type) = part
		.content_type()
		.filter(|kind| kind.starts_with("image/"))
		.map(str::to_string)
	else {
		return Err(PostError::SecondPartNotImage.into());
	};

	let raw = part.bytes().await.map_err(PostError::from)?;

	if raw.is_empty() {
		return Err(PostError::EmptyImage.into());
	}

	let post = store
		.append(NewPost {
			from: input.from,
			message: input.message,
			date: chrono::Utc::now().timestamp(),
			raw,
			raw_type,
		})
		.await?;

	tracing::info!(
		monotonic_counter.posts_created = 1_u64,
		id = post.id,
		from = %post.from,
		date = post.date,
		bytes = post.raw.len(),
		"stored post"
	);

	Ok(())
}

/// Decodes the JSON part, which must be an object.
fn decode(body: &[u8]) -> Result<PostInput, PostError> {
	let object = serde_json::from_slice::<serde_json::Map<String, Value>>(body)?;

	Ok(PostInput::deserialize(Value::Object(object))?)
}

/// Answers any other method on the submission path with a usage hint.
pub async fn usage() -> Error {
	PostError::Usage.into()
}

use std::sync::Arc;

use aide::OperationOutput;
use axum::{
	body::Bytes,
	extract::State,
	http::header,
	response::{IntoResponse, Response},
};
use macros::route;
use schemars::JsonSchema;
use serde::Deserialize;
use validator::Validate;

use crate::{extract::Query, openapi::tag, store::Store, Error};

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct ImageQuery {
	/// The id of the post whose image to return.
	#[validate(range(min = 1))]
	pub id: i64,
}

/// The raw attachment of a post, served with its stored media type.
pub struct Image {
	pub bytes: Bytes,
	pub content_type: String,
}

impl IntoResponse for Image {
	fn into_response(self) -> Response {
		([(header::CONTENT_TYPE, self.content_type)], self.bytes).into_response()
	}
}

impl OperationOutput for Image {
	type Inner = Self;
}

/// Get image
/// Returns the image attached to a post, with the media type it was submitted with.
#[route(
	tag = tag::TIMELINE,
	response(status = 200, description = "The image bytes."),
	response(status = 404, description = "No retained post has this id.")
)]
pub async fn get_image(
	State(store): State<Arc<Store>>,
	Query(query): Query<ImageQuery>,
) -> Result<Image, Error> {
	let post = store
		.get(query.id)
		.await
		.ok_or(Error::UnknownPost(query.id))?;

	Ok(Image {
		bytes: post.raw.clone(),
		content_type: post.raw_type.clone(),
	})
}

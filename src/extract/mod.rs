mod bearer;

pub use bearer::Authorized;

use aide::OperationInput;
use axum::{
	extract::{FromRequest, FromRequestParts, Request},
	http::request,
};
use schemars::JsonSchema;
use serde::de;

use crate::{error::Error, route::post};

/// Extractor that deserializes a query string and validates it.
///
/// T must implement [`serde::de::DeserializeOwned`] and [`validator::Validate`]
/// in order to be used in an extractor.
///
/// ```rust
/// async fn route(Query(params): Query<Params>) {
///   // ...
/// }
/// ```
pub struct Query<T>(pub T);

impl<T: JsonSchema> OperationInput for Query<T> {
	fn operation_input(ctx: &mut aide::gen::GenContext, operation: &mut aide::openapi::Operation) {
		<axum::extract::Query<T> as OperationInput>::operation_input(ctx, operation);
	}
}

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for Query<T>
where
	T: de::DeserializeOwned + validator::Validate + JsonSchema,
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		let result = axum::extract::Query::<T>::from_request_parts(parts, state)
			.await?
			.0;

		result.validate()?;
		Ok(Self(result))
	}
}

/// Extractor for a multipart submission body.
///
/// Unlike [`axum::extract::Multipart`], a body that is not a multipart form is
/// rejected with the parser's message as a plaintext 400.
pub struct Submission(pub axum::extract::Multipart);

#[axum::async_trait]
impl<S> FromRequest<S> for Submission
where
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
		axum::extract::Multipart::from_request(req, state)
			.await
			.map(Self)
			.map_err(|rejection| post::Error::Multipart(rejection.body_text()).into())
	}
}

impl OperationInput for Submission {
	/// Documents the two-part body: a JSON part followed by an image part.
	fn operation_input(_ctx: &mut aide::gen::GenContext, operation: &mut aide::openapi::Operation) {
		operation.request_body = Some(aide::openapi::ReferenceOr::Item(
			aide::openapi::RequestBody {
				description: Some(
					"A multipart form whose first part is JSON with `from` and `message`, \
					 and whose second part is the image."
						.into(),
				),
				content: [(
					"multipart/form-data".to_string(),
					aide::openapi::MediaType::default(),
				)]
				.into_iter()
				.collect(),
				required: true,
				..Default::default()
			},
		));
	}
}

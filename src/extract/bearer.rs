use aide::OperationInput;
use axum::{
	extract::{FromRef, FromRequestParts},
	http::{header, request},
};

use crate::{
	auth::{self, Authenticator},
	error::Error,
	openapi::SECURITY_SCHEME_BEARER,
};

pub const AUTHORIZATION_PREFIX: &str = "Bearer ";

/// Proof that the request carried an allow-listed bearer token.
///
/// If token checks are disabled, every request is authorized.
/// If the header is absent or malformed, a [`auth::Error::MissingToken`] is returned.
/// If the token is not in the list, a [`auth::Error::IncorrectToken`] is returned.
///
/// ```rust
/// async fn route(_: Authorized) {
///   // ...
/// }
/// ```
#[derive(Debug)]
pub struct Authorized;

#[axum::async_trait]
impl<S> FromRequestParts<S> for Authorized
where
	Authenticator: FromRef<S>,
	S: Sync + Send,
{
	type Rejection = Error;

	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		let authenticator = Authenticator::from_ref(state);

		if !authenticator.is_enabled() {
			return Ok(Self);
		}

		let credential = parts
			.headers
			.get(header::AUTHORIZATION)
			.and_then(|value| value.to_str().ok())
			.filter(|value| value.len() > AUTHORIZATION_PREFIX.len())
			.and_then(|value| value.strip_prefix(AUTHORIZATION_PREFIX))
			.ok_or(auth::Error::MissingToken)?;

		match authenticator.authenticate(credential).await {
			Ok(true) => Ok(Self),
			Ok(false) => {
				tracing::debug!("rejected submission with unknown token");
				Err(auth::Error::IncorrectToken.into())
			}
			Err(error) => {
				tracing::error!(%error, "failed to read token list");
				Err(auth::Error::TokensUnavailable.into())
			}
		}
	}
}

impl OperationInput for Authorized {
	/// Operation input for the bearer extractor.
	///
	/// This adds a bearer token requirement to the `OpenAPI` operation.
	fn operation_input(_ctx: &mut aide::gen::GenContext, operation: &mut aide::openapi::Operation) {
		operation.security.push(
			[(SECURITY_SCHEME_BEARER.to_string(), Vec::new())]
				.into_iter()
				.collect(),
		);
	}
}

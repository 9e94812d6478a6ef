use aide::{
	openapi::{ApiKeyLocation, SecurityScheme, Tag},
	transform::TransformOpenApi,
};

pub const SECURITY_SCHEME_BEARER: &str = "Bearer";

pub mod tag {
	pub const POST: &str = "Post";
	pub const TIMELINE: &str = "Timeline";
}

pub fn docs(api: TransformOpenApi) -> TransformOpenApi {
	api.title("Timeline")
		.summary("A bounded feed of short messages with images")
		.description(include_str!("../README.md"))
		.tag(Tag {
			name: tag::POST.into(),
			description: Some("Submitting posts".into()),
			..Default::default()
		})
		.tag(Tag {
			name: tag::TIMELINE.into(),
			description: Some("Reading the feed and its images".into()),
			..Default::default()
		})
		.security_scheme(
			SECURITY_SCHEME_BEARER,
			SecurityScheme::ApiKey {
				location: ApiKeyLocation::Header,
				name: "Authorization".into(),
				description: Some(
					"`Bearer <token>`, checked against the token file when one is configured".into(),
				),
				extensions: Default::default(),
			},
		)
}

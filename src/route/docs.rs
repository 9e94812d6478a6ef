use std::sync::Arc;

use aide::openapi::OpenApi;
use axum::{
	response::{IntoResponse, Response},
	Extension, Json,
};

/// Serves the generated `OpenAPI` document.
pub async fn serve_api(Extension(api): Extension<Arc<OpenApi>>) -> Response {
	Json(&*api).into_response()
}

#[cfg(test)]
mod test {
	use crate::test::*;

	#[tokio::test]
	async fn test_documents_routes() {
		let (server, _) = server(state());

		let api = server.get("/docs/api.json").await.json::<serde_json::Value>();

		assert_eq!(api["info"]["title"], "Timeline");
		assert!(api["paths"]["/post"]["post"].is_object());
		assert!(api["paths"]["/timeline"]["get"].is_object());
		assert!(api["paths"]["/image"]["get"].is_object());
		assert!(api["components"]["securitySchemes"]["Bearer"].is_object());
	}

	#[tokio::test]
	async fn test_operations_carry_doc_comments() {
		let (server, _) = server(state());

		let api = server.get("/docs/api.json").await.json::<serde_json::Value>();
		let create = &api["paths"]["/post"]["post"];

		assert_eq!(create["summary"], "Create post");
		assert!(create["description"]
			.as_str()
			.unwrap()
			.starts_with("Submits a message with an attached image. The body is"));
		assert_eq!(create["tags"][0], crate::openapi::tag::POST);
		assert_eq!(
			create["responses"]["401"]["description"],
			"The bearer token is not on the allow-list."
		);
		assert_eq!(api["paths"]["/image"]["get"]["summary"], "Get image");
	}
}

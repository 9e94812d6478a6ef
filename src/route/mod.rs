use aide::axum::{
	routing::{get_with, post_with},
	ApiRouter,
};

use crate::AppState;

pub mod docs;
pub mod image;
pub mod post;
pub mod shell;
pub mod timeline;

/// The documented API routes.
pub fn routes() -> ApiRouter<AppState> {
	ApiRouter::new()
		.api_route("/post", post_with(post::create_post, post::create_post_docs))
		.api_route(
			"/timeline",
			get_with(timeline::get_timeline, timeline::get_timeline_docs),
		)
		.api_route("/image", get_with(image::get_image, image::get_image_docs))
}

use std::sync::Arc;

use axum::{extract::State, Json};
use macros::route;
use schemars::JsonSchema;
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::{
	extract::Query,
	model::{Post, TimelinePost},
	openapi::tag,
	store::Store,
	Error,
};

fn one_cursor(query: &TimelineQuery) -> Result<(), ValidationError> {
	if query.id.is_some() && query.t.is_some() {
		return Err(ValidationError::new("cursor")
			.with_message("use either `id` or `t` as the cursor, not both".into()));
	}

	Ok(())
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
#[validate(schema(function = "one_cursor"))]
pub struct TimelineQuery {
	/// Only return posts with an id greater than this one, newest first.
	#[validate(range(min = 0))]
	pub id: Option<i64>,
	/// Only return posts submitted after this epoch second, oldest first.
	#[validate(range(min = 0))]
	pub t: Option<i64>,
}

/// What the client has already seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
	Id(i64),
	Time(i64),
}

impl TimelineQuery {
	pub fn cursor(&self) -> Option<Cursor> {
		self.id.map(Cursor::Id).or(self.t.map(Cursor::Time))
	}
}

/// Projects a snapshot of the store (oldest first) into a listing.
///
/// Without a cursor the whole window is returned oldest first. An id cursor
/// walks back from the newest post and stops at the first one already seen.
pub fn project(posts: &[Arc<Post>], cursor: Option<Cursor>) -> Vec<TimelinePost> {
	match cursor {
		None => posts.iter().map(|post| TimelinePost::from(&**post)).collect(),
		Some(Cursor::Id(seen)) => posts
			.iter()
			.rev()
			.take_while(|post| post.id > seen)
			.map(|post| TimelinePost::from(&**post))
			.collect(),
		Some(Cursor::Time(seen)) => posts
			.iter()
			.filter(|post| post.date > seen)
			.map(|post| TimelinePost::from(&**post))
			.collect(),
	}
}

/// Get timeline
/// Returns the retained posts. With `id`, only posts newer than that id are
/// returned, newest first. With `t`, only posts submitted after that time.
#[route(tag = tag::TIMELINE)]
pub async fn get_timeline(
	State(store): State<Arc<Store>>,
	Query(query): Query<TimelineQuery>,
) -> Result<Json<Vec<TimelinePost>>, Error> {
	let posts = store.list().await;

	Ok(Json(project(&posts, query.cursor())))
}

#[cfg(test)]
mod test {
	use axum::http::StatusCode;

	use super::*;
	use crate::test::*;

	fn ids(posts: &[TimelinePost]) -> Vec<i64> {
		posts.iter().map(|post| post.id).collect()
	}

	fn dated(id: i64, date: i64) -> Arc<Post> {
		let mut post = new_post("dated");
		post.date = date;

		Arc::new(post.into_post(id))
	}

	#[test]
	fn test_id_cursor_stops_at_first_seen_post() {
		// Out of id order to show the scan follows storage order.
		let posts = [dated(1, 0), dated(5, 0), dated(3, 0), dated(6, 0)];

		assert_eq!(ids(&project(&posts, Some(Cursor::Id(4)))), [6]);
		assert_eq!(ids(&project(&posts, Some(Cursor::Id(0)))), [6, 3, 5, 1]);
		assert!(project(&posts, Some(Cursor::Id(6))).is_empty());
	}

	#[test]
	fn test_time_cursor_filters_by_date() {
		let posts = [dated(1, 100), dated(2, 200), dated(3, 150), dated(4, 300)];

		assert_eq!(ids(&project(&posts, Some(Cursor::Time(150)))), [2, 4]);
		assert_eq!(ids(&project(&posts, None)), [1, 2, 3, 4]);
	}

	#[tokio::test]
	async fn test_window_and_cursor_over_http() {
		let (server, _) = server(state());

		for i in 1..=101 {
			publish(&server, &format!("post {i}")).await;
		}

		let all = server.get("/timeline").await.json::<Vec<TimelinePost>>();

		assert_eq!(ids(&all), (2..=101).collect::<Vec<_>>());
		assert_eq!(all[0].message, "post 2");
		assert_eq!(all[0].image, "/image?id=2");

		let newer = server
			.get("/timeline")
			.add_query_param("id", 50)
			.await
			.json::<Vec<TimelinePost>>();

		assert_eq!(ids(&newer), (51..=101).rev().collect::<Vec<_>>());

		let none = server
			.get("/timeline")
			.add_query_param("id", 101)
			.await
			.json::<Vec<TimelinePost>>();

		assert!(none.is_empty());
	}

	#[tokio::test]
	async fn test_listing_has_no_attachment_fields() {
		let (server, _) = server(state());

		publish(&server, "hello").await;

		let response = server.get("/timeline").await;

		assert_eq!(response.header("content-type"), "application/json");

		let listing = response.json::<serde_json::Value>();
		let post = listing[0].as_object().unwrap();

		assert!(!post.contains_key("raw"));
		assert!(!post.contains_key("rawType"));
	}

	#[tokio::test]
	async fn test_invalid_cursors() {
		let (server, _) = server(state());

		let both = server
			.get("/timeline")
			.add_query_param("id", 1)
			.add_query_param("t", 1)
			.await;

		assert_eq!(both.status_code(), StatusCode::BAD_REQUEST);
		assert_eq!(
			both.text(),
			"use either `id` or `t` as the cursor, not both"
		);

		let negative = server.get("/timeline").add_query_param("id", -3).await;

		assert_eq!(negative.status_code(), StatusCode::BAD_REQUEST);

		let garbage = server.get("/timeline").add_query_param("id", "abc").await;

		assert_eq!(garbage.status_code(), StatusCode::BAD_REQUEST);
	}
}

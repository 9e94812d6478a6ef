use axum::body::Bytes;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A single post, as held by the store and written to its record file.
///
/// The attachment is only part of the storage representation. Use
/// [`TimelinePost`] when returning posts to the client.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
	/// Assigned by the store, strictly increasing.
	pub id: i64,
	pub from: String,
	pub message: String,
	/// Epoch seconds (UTC) at which the post was submitted.
	pub date: i64,
	/// Where the client fetches the attachment from.
	pub image: String,
	#[serde(with = "base64_bytes")]
	pub raw: Bytes,
	pub raw_type: String,
}

/// A validated submission that has not been stored yet.
#[derive(Debug, Clone)]
pub struct NewPost {
	pub from: String,
	pub message: String,
	pub date: i64,
	pub raw: Bytes,
	pub raw_type: String,
}

impl NewPost {
	/// Stamps the submission with its id, producing the stored [`Post`].
	pub fn into_post(self, id: i64) -> Post {
		Post {
			id,
			from: self.from,
			message: self.message,
			date: self.date,
			image: image_path(id),
			raw: self.raw,
			raw_type: self.raw_type,
		}
	}
}

/// The public projection of a post shown in timeline listings.
#[derive(Debug, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct TimelinePost {
	/// The unique identifier of the post.
	pub id: i64,
	/// The author label.
	pub from: String,
	/// The text body.
	pub message: String,
	/// Path of the attached image, e.g. `/image?id=42`.
	pub image: String,
	/// The submission time in epoch seconds.
	pub date: i64,
}

impl From<&Post> for TimelinePost {
	fn from(post: &Post) -> Self {
		Self {
			id: post.id,
			from: post.from.clone(),
			message: post.message.clone(),
			image: post.image.clone(),
			date: post.date,
		}
	}
}

pub fn image_path(id: i64) -> String {
	format!("/image?id={id}")
}

mod base64_bytes {
	use axum::body::Bytes;
	use base64::{engine::general_purpose::STANDARD, Engine};
	use serde::{de, Deserialize, Deserializer, Serializer};

	pub fn serialize<S: Serializer>(bytes: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&STANDARD.encode(bytes))
	}

	pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Bytes, D::Error> {
		let encoded = String::deserialize(deserializer)?;

		STANDARD
			.decode(encoded)
			.map(Bytes::from)
			.map_err(de::Error::custom)
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_record_keeps_attachment() {
		let post = NewPost {
			from: "ana".into(),
			message: "hello".into(),
			date: 1_700_000_000,
			raw: Bytes::from_static(&[0, 159, 146, 150, 255]),
			raw_type: "image/png".into(),
		}
		.into_post(7);

		let record = serde_json::to_value(&post).unwrap();

		assert_eq!(record["rawType"], "image/png");
		assert_eq!(record["raw"], "AJ+Slv8=");
		assert_eq!(record["image"], "/image?id=7");

		let decoded: Post = serde_json::from_value(record).unwrap();

		assert_eq!(decoded.raw, post.raw);
	}

	#[test]
	fn test_projection_hides_attachment() {
		let post = NewPost {
			from: "ana".into(),
			message: "hello".into(),
			date: 10,
			raw: Bytes::from_static(b"png"),
			raw_type: "image/png".into(),
		}
		.into_post(1);

		let public = serde_json::to_value(TimelinePost::from(&post)).unwrap();
		let object = public.as_object().unwrap();

		assert!(!object.contains_key("raw"));
		assert!(!object.contains_key("rawType"));
		assert_eq!(object.len(), 5);
	}
}

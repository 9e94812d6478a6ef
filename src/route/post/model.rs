use std::fmt;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A required text field of the JSON part, decoded without rejecting the
/// whole document so that each field can be reported on its own.
#[derive(Debug, Default, PartialEq, Eq)]
pub enum Text {
	/// The key is absent or `null`.
	#[default]
	Undefined,
	/// The key holds something other than a string.
	Other,
	Value(String),
}

impl<'de> Deserialize<'de> for Text {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		Ok(match Value::deserialize(deserializer)? {
			Value::Null => Self::Undefined,
			Value::String(value) => Self::Value(value),
			_ => Self::Other,
		})
	}
}

/// The JSON part of a submission.
#[derive(Debug, Deserialize)]
pub struct PostInput {
	#[serde(default)]
	pub from: Text,
	#[serde(default)]
	pub message: Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Problem {
	Undefined,
	NotString,
	Empty,
}

/// The first field of a [`PostInput`] that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldError {
	pub field: &'static str,
	pub problem: Problem,
}

impl fmt::Display for FieldError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let problem = match self.problem {
			Problem::Undefined => "must be defined",
			Problem::NotString => "must be a string",
			Problem::Empty => "cannot be an empty string",
		};

		write!(f, "\"{}\" {problem}", self.field)
	}
}

impl std::error::Error for FieldError {}

/// Author and body of a submission that passed validation.
#[derive(Debug, PartialEq, Eq)]
pub struct ValidPostInput {
	pub from: String,
	pub message: String,
}

impl PostInput {
	/// Checks `from`, then `message`, stopping at the first problem.
	pub fn validate(self) -> Result<ValidPostInput, FieldError> {
		Ok(ValidPostInput {
			from: require("from", self.from)?,
			message: require("message", self.message)?,
		})
	}
}

fn require(field: &'static str, text: Text) -> Result<String, FieldError> {
	let problem = match text {
		Text::Value(value) if !value.is_empty() => return Ok(value),
		Text::Value(..) => Problem::Empty,
		Text::Other => Problem::NotString,
		Text::Undefined => Problem::Undefined,
	};

	Err(FieldError { field, problem })
}

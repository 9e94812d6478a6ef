use std::{path::PathBuf, str::FromStr};

use tracing::Level;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// A configuration problem that stops the service from starting.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("{name} has an invalid value {value:?}")]
	Invalid { name: &'static str, value: String },
	#[error("{name} is not valid unicode")]
	NotUnicode { name: &'static str },
}

/// Service configuration, read from the environment (and `.env`, if present).
#[derive(Debug, Clone)]
pub struct Config {
	pub host: String,
	pub port: u16,
	/// Token file; when unset, submissions are not authenticated.
	pub tokens: Option<PathBuf>,
	/// Directory holding one record per post; when unset, posts live in memory only.
	pub data_dir: Option<PathBuf>,
	pub title: String,
	pub static_dir: PathBuf,
	pub body_limit: usize,
	pub log_level: Level,
	/// OTLP collector endpoint; when unset, spans and metrics are not exported.
	pub otlp_endpoint: Option<String>,
}

impl Config {
	pub fn from_env() -> Result<Self, Error> {
		Ok(Self {
			host: var("HOST")?.unwrap_or_else(|| "127.0.0.1".into()),
			port: parse("PORT")?.unwrap_or(DEFAULT_PORT),
			tokens: var("TIMELINE_TOKENS")?.map(PathBuf::from),
			data_dir: var("TIMELINE_DATA_DIR")?.map(PathBuf::from),
			title: var("TIMELINE_TITLE")?.unwrap_or_else(|| "Timeline".into()),
			static_dir: var("TIMELINE_STATIC_DIR")?.map_or_else(|| "public".into(), PathBuf::from),
			body_limit: parse("TIMELINE_BODY_LIMIT")?.unwrap_or(DEFAULT_BODY_LIMIT),
			log_level: parse("LOG_LEVEL")?.unwrap_or(Level::INFO),
			otlp_endpoint: var("OTEL_EXPORTER_OTLP_ENDPOINT")?,
		})
	}
}

/// Reads a variable, treating an empty value as unset.
fn var(name: &'static str) -> Result<Option<String>, Error> {
	match std::env::var(name) {
		Ok(value) if value.trim().is_empty() => Ok(None),
		Ok(value) => Ok(Some(value)),
		Err(std::env::VarError::NotPresent) => Ok(None),
		Err(std::env::VarError::NotUnicode(..)) => Err(Error::NotUnicode { name }),
	}
}

fn parse<T: FromStr>(name: &'static str) -> Result<Option<T>, Error> {
	var(name)?
		.map(|value| {
			value
				.trim()
				.parse()
				.map_err(|_| Error::Invalid { name, value })
		})
		.transpose()
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_parse_values() {
		std::env::set_var("TIMELINE_TEST_PORT", " 8080 ");
		std::env::set_var("TIMELINE_TEST_LEVEL", "debug");
		std::env::set_var("TIMELINE_TEST_BAD", "eighty");
		std::env::set_var("TIMELINE_TEST_EMPTY", "");

		assert_eq!(parse::<u16>("TIMELINE_TEST_PORT").unwrap(), Some(8080));
		assert_eq!(
			parse::<Level>("TIMELINE_TEST_LEVEL").unwrap(),
			Some(Level::DEBUG)
		);
		assert!(matches!(
			parse::<u16>("TIMELINE_TEST_BAD"),
			Err(Error::Invalid { name: "TIMELINE_TEST_BAD", .. })
		));
		assert_eq!(parse::<u16>("TIMELINE_TEST_EMPTY").unwrap(), None);
		assert_eq!(var("TIMELINE_TEST_UNSET").unwrap(), None);
	}
}

//! Error type shared by every bunny crate.

/// Errors produced by bunny operations.
///
/// The convenience wrappers (`insert_in`, the persisted store helpers) log
/// these and carry on; the `try_*` forms hand them to the caller.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// A platform DOM call failed (invalid tag name, missing document, ...).
	#[error("DOM error: {0}")]
	Dom(String),

	/// A CSS selector could not be parsed.
	#[error("Invalid selector: {0}")]
	InvalidSelector(String),

	/// No element matched the container an element was inserted into.
	#[error("Container not found: {0}")]
	ContainerNotFound(String),

	/// A state key was read before being created.
	#[error("Unknown state key: {0}")]
	UnknownKey(String),

	/// A state key exists but holds a value of another type.
	#[error("State '{key}' holds a value of a different type")]
	TypeMismatch {
		/// The key that was requested.
		key: String,
	},

	/// The persistent storage area rejected an operation.
	#[error("Storage error: {0}")]
	Storage(String),

	/// JSON (de)serialization failed.
	#[error("Serialization error: {0}")]
	Serialization(#[from] serde_json::Error),

	/// A stored payload could not be compressed or decompressed.
	#[error("Compression error: {0}")]
	Compression(String),

	/// Settings could not be parsed.
	#[error("Settings error: {0}")]
	Settings(#[from] toml::de::Error),

	/// An HTTP call failed.
	#[error("HTTP error: {0}")]
	Http(String),
}

/// Result alias used across bunny.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(Error::UnknownKey("count".to_string()), "Unknown state key: count")]
	#[case(Error::TypeMismatch { key: "user".to_string() }, "State 'user' holds a value of a different type")]
	#[case(Error::ContainerNotFound("#app".to_string()), "Container not found: #app")]
	fn test_error_display(#[case] error: Error, #[case] expected: &str) {
		assert_eq!(error.to_string(), expected);
	}

	#[rstest]
	fn test_serialization_error_converts() {
		let json_error = serde_json::from_str::<u32>("not json").unwrap_err();
		let error: Error = json_error.into();
		assert!(matches!(error, Error::Serialization(_)));
	}
}

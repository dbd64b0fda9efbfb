//! Payload encoding: JSON, then raw deflate, then standard base64.

use std::io::{Read, Write};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bunny_core::{Error, Result};
use flate2::Compression;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Largest accepted decompressed payload, the usual `localStorage` quota.
const MAX_DECODED_SIZE: u64 = 5 * 1024 * 1024;

/// What is stored under a key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payload {
	/// The stored value.
	pub value: Value,
	/// Expiry instant in milliseconds since the epoch; `None` never expires.
	#[serde(rename = "expiresAt")]
	pub expires_at: Option<i64>,
}

impl Payload {
	/// Returns `true` once `now_millis` is past the expiry instant.
	pub fn is_expired(&self, now_millis: i64) -> bool {
		self.expires_at.is_some_and(|expires_at| now_millis > expires_at)
	}
}

/// Serializes and compresses `payload` into a storable string.
pub fn encode(payload: &Payload) -> Result<String> {
	let json = serde_json::to_vec(payload)?;
	let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
	encoder
		.write_all(&json)
		.map_err(|e| Error::Compression(format!("Deflate compression error: {}", e)))?;
	let compressed = encoder
		.finish()
		.map_err(|e| Error::Compression(format!("Deflate compression error: {}", e)))?;
	Ok(STANDARD.encode(compressed))
}

/// Reverses [`encode`].
///
/// # Errors
///
/// [`Error::Compression`] for invalid base64, invalid deflate data or an
/// oversized payload; [`Error::Serialization`] when the JSON is not a payload.
pub fn decode(stored: &str) -> Result<Payload> {
	let compressed = STANDARD
		.decode(stored.trim())
		.map_err(|e| Error::Compression(format!("Base64 decoding error: {}", e)))?;
	let mut limited = DeflateDecoder::new(compressed.as_slice()).take(MAX_DECODED_SIZE + 1);
	let mut json = Vec::new();
	limited
		.read_to_end(&mut json)
		.map_err(|e| Error::Compression(format!("Deflate decompression error: {}", e)))?;
	if json.len() as u64 > MAX_DECODED_SIZE {
		return Err(Error::Compression(format!(
			"payload exceeds {MAX_DECODED_SIZE} bytes"
		)));
	}
	Ok(serde_json::from_slice(&json)?)
}

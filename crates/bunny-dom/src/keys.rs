//! Random `_key` attribute given to built elements.

use rand::Rng;
use rand::distributions::Alphanumeric;

use crate::dom::Node;

/// Attribute holding the generated key.
pub const KEY_ATTRIBUTE: &str = "_key";

/// Returns `length` random ASCII letters and digits.
pub fn generate_key(length: usize) -> String {
	rand::thread_rng()
		.sample_iter(&Alphanumeric)
		.take(length)
		.map(char::from)
		.collect()
}

/// Tags `node` with a fresh key when the active settings ask for one.
pub fn assign_key(node: &Node) {
	let (enabled, length) =
		bunny_core::with_settings(|settings| (settings.element_keys, settings.element_key_length));
	if !enabled {
		return;
	}
	if let Err(error) = node.set_attribute(KEY_ATTRIBUTE, &generate_key(length)) {
		bunny_core::warn_log!("Could not assign element key: {}", error);
	}
}

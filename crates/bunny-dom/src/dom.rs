//! DOM abstraction layer
//!
//! The same API is backed by `web-sys` on `wasm32` and by an in-memory
//! document everywhere else, so element builders can be exercised with plain
//! `cargo test`.
//!
//! | Type | WASM | Native |
//! |------|------|--------|
//! | [`Document`] | `web_sys::Document` | in-memory tree, one per thread |
//! | [`Node`] | `web_sys::Element` | reference-counted element node |
//! | [`Event`] | `web_sys::Event` | type, target and current target |
//!
//! The native document additionally exposes what a test needs to play the
//! browser's part: `Node::dispatch_event`, `Document::set_ready_state`,
//! `Document::dispatch_dom_content_loaded` and `Document::run_pending_tasks`.

#[cfg(not(target_arch = "wasm32"))]
mod native;
#[cfg(not(target_arch = "wasm32"))]
mod selector;
#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(not(target_arch = "wasm32"))]
pub use native::{Document, Event, Node, current_target};
#[cfg(target_arch = "wasm32")]
pub use web::{Document, Event, Node, current_target};

/// Loading phase of the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
	/// The document is still being parsed.
	Loading,
	/// Parsing finished; sub-resources may still be loading.
	Interactive,
	/// The document and its sub-resources are loaded.
	Complete,
}

impl ReadyState {
	/// Returns `true` once `DOMContentLoaded` has fired.
	pub fn is_loaded(self) -> bool {
		!matches!(self, Self::Loading)
	}
}

/// Anything that owns a platform element handle.
pub trait AsNode {
	/// Borrows the underlying handle.
	fn as_node(&self) -> &Node;
}

impl AsNode for Node {
	fn as_node(&self) -> &Node {
		self
	}
}

/// Converts a `camelCase` property name (`fontSize`) into its CSS form
/// (`font-size`). Names already in CSS form are returned unchanged.
pub fn css_property_name(name: &str) -> String {
	if !name.chars().any(|c| c.is_ascii_uppercase()) {
		return name.to_string();
	}
	let mut css = String::with_capacity(name.len() + 4);
	for c in name.chars() {
		if c.is_ascii_uppercase() {
			css.push('-');
			css.push(c.to_ascii_lowercase());
		} else {
			css.push(c);
		}
	}
	css
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("color", "color")]
	#[case("fontSize", "font-size")]
	#[case("borderTopLeftRadius", "border-top-left-radius")]
	#[case("background-color", "background-color")]
	fn test_css_property_name(#[case] input: &str, #[case] expected: &str) {
		assert_eq!(css_property_name(input), expected);
	}

	#[rstest]
	fn test_ready_state_is_loaded() {
		assert!(!ReadyState::Loading.is_loaded());
		assert!(ReadyState::Interactive.is_loaded());
		assert!(ReadyState::Complete.is_loaded());
	}
}

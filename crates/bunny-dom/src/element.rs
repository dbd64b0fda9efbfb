//! Element wrapper
//!
//! [`Element`] owns one platform element handle and exposes chainable
//! mutators. Every mutator takes `&self` and returns `&Self`; failures of the
//! underlying platform call are logged, not returned.
//!
//! ## Example
//!
//! ```ignore
//! use bunny_dom::{Element, kinds::Button};
//!
//! let button = Element::<Button>::new()?;
//! button
//! 	.text("Save")
//! 	.add_class("btn btn-primary")
//! 	.style(&[("backgroundColor", "teal")])
//! 	.when("click", |button, _event| {
//! 		button.text("Saved");
//! 	})
//! 	.insert_in("#toolbar");
//! ```

use core::fmt;
use core::marker::PhantomData;

use bunny_core::{Error, Result, warn_log};

use crate::dom::{AsNode, Document, Event, Node, css_property_name, current_target};
use crate::kinds::{ElementKind, Generic, Kind};

/// Chainable wrapper around one element of kind `K`.
pub struct Element<K: ElementKind = Generic> {
	node: Node,
	kind: PhantomData<K>,
}

impl<K: ElementKind> Clone for Element<K> {
	fn clone(&self) -> Self {
		Self {
			node: self.node.clone(),
			kind: PhantomData,
		}
	}
}

impl<K: ElementKind> fmt::Debug for Element<K> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Element")
			.field("kind", &K::KIND)
			.field("node", &self.node)
			.finish()
	}
}

/// Where [`Element::insert_in`] puts an element.
#[derive(Debug, Clone, Copy)]
pub enum InsertTarget<'a> {
	/// First element of the document matching a CSS selector.
	Selector(&'a str),
	/// A specific element.
	Node(&'a Node),
}

impl<'a> From<&'a str> for InsertTarget<'a> {
	fn from(selector: &'a str) -> Self {
		Self::Selector(selector)
	}
}

impl<'a> From<&'a String> for InsertTarget<'a> {
	fn from(selector: &'a String) -> Self {
		Self::Selector(selector)
	}
}

impl<'a> From<&'a Node> for InsertTarget<'a> {
	fn from(node: &'a Node) -> Self {
		Self::Node(node)
	}
}

impl<'a, K: ElementKind> From<&'a Element<K>> for InsertTarget<'a> {
	fn from(element: &'a Element<K>) -> Self {
		Self::Node(&element.node)
	}
}

impl InsertTarget<'_> {
	fn resolve(self) -> Result<Node> {
		match self {
			Self::Node(node) => Ok(node.clone()),
			Self::Selector(selector) => Document::try_global()?
				.query_selector(selector)?
				.ok_or_else(|| Error::ContainerNotFound(selector.to_string())),
		}
	}
}

/// Splits a space separated class list, ignoring empty tokens.
pub fn split_classes(classes: &str) -> impl Iterator<Item = &str> {
	classes.split_whitespace()
}

impl Element<Generic> {
	/// Takes ownership of an existing handle, whatever its tag.
	pub fn from_node(node: Node) -> Self {
		Self::wrap(node)
	}
}

impl<K: ElementKind> Element<K> {
	pub(crate) fn wrap(node: Node) -> Self {
		Self {
			node,
			kind: PhantomData,
		}
	}

	/// Creates a detached element with the kind's default tag.
	pub fn new() -> Result<Self> {
		Self::create(K::TAG)
	}

	/// Creates a detached `<tag>` element.
	///
	/// # Errors
	///
	/// Fails when `tag` is not a valid tag name or does not belong to `K`.
	pub fn create(tag: &str) -> Result<Self> {
		if !K::accepts(tag) {
			return Err(Error::Dom(format!(
				"<{tag}> cannot be created as {:?}",
				K::KIND
			)));
		}
		Document::try_global()?.create_element(tag).map(Self::wrap)
	}

	/// Wraps an existing handle after checking that its tag belongs to `K`.
	pub fn try_from_node(node: Node) -> Result<Self> {
		let tag = node.tag_name();
		if K::accepts(&tag) {
			Ok(Self::wrap(node))
		} else {
			Err(Error::Dom(format!("<{tag}> is not a {:?} element", K::KIND)))
		}
	}

	/// The wrapped handle.
	pub fn node(&self) -> &Node {
		&self.node
	}

	/// Forgets the static kind.
	pub fn into_generic(self) -> Element<Generic> {
		Element::wrap(self.node)
	}

	/// Kind recovered from the tag at runtime.
	pub fn kind(&self) -> Kind {
		Kind::of(&self.node.tag_name())
	}

	/// Lower-case tag name.
	pub fn tag_name(&self) -> String {
		self.node.tag_name()
	}

	/// Applies inline styles. Property names may be `camelCase` or CSS form.
	pub fn style(&self, styles: &[(&str, &str)]) -> &Self {
		for (property, value) in styles {
			let property = css_property_name(property);
			if let Err(error) = self.node.set_style_property(&property, value) {
				warn_log!("Could not set style '{}': {}", property, error);
			}
		}
		self
	}

	/// Sets attributes.
	pub fn attr(&self, attributes: &[(&str, &str)]) -> &Self {
		for (name, value) in attributes {
			if let Err(error) = self.node.set_attribute(name, value) {
				warn_log!("Could not set attribute '{}': {}", name, error);
			}
		}
		self
	}

	/// Sets the `id` attribute.
	pub fn id(&self, id: &str) -> &Self {
		self.attr(&[("id", id)])
	}

	/// Replaces the content with text.
	pub fn text(&self, text: &str) -> &Self {
		self.node.set_text_content(text);
		self
	}

	/// Replaces the content with markup.
	pub fn html(&self, html: &str) -> &Self {
		self.node.set_inner_html(html);
		self
	}

	/// Registers `handler` for `event`. The handler receives this element and
	/// the event. Every call adds another listener.
	///
	/// Listeners live as long as the node, so a handler that captures a clone
	/// of its own element (or a container over it) keeps the node alive for
	/// good. Use the element passed to the handler instead.
	pub fn when(&self, event: &str, handler: impl FnMut(&Element<K>, &Event) + 'static) -> &Self {
		let mut handler = handler;
		self.node.add_event_listener(event, move |event| {
			if let Some(node) = current_target(event) {
				handler(&Element::wrap(node), event);
			}
		});
		self
	}

	/// Adds every class of a space separated list, skipping ones already
	/// present.
	pub fn add_class(&self, classes: &str) -> &Self {
		for class in split_classes(classes) {
			self.node.add_class(class);
		}
		self
	}

	/// Removes every class of a space separated list.
	pub fn remove_class(&self, classes: &str) -> &Self {
		for class in split_classes(classes) {
			self.node.remove_class(class);
		}
		self
	}

	/// Appends a child element.
	pub fn append(&self, child: &impl AsNode) -> &Self {
		if let Err(error) = self.node.append_child(child.as_node()) {
			warn_log!("Could not append child: {}", error);
		}
		self
	}

	/// Appends this element to `target`, warning when the target does not
	/// exist.
	pub fn insert_in<'a>(&self, target: impl Into<InsertTarget<'a>>) -> &Self {
		if let Err(error) = self.try_insert_in(target) {
			warn_log!("Could not find the container to insert the element into: {}", error);
		}
		self
	}

	/// Appends this element to `target`.
	///
	/// # Errors
	///
	/// [`Error::ContainerNotFound`] when a selector matches nothing.
	pub fn try_insert_in<'a>(&self, target: impl Into<InsertTarget<'a>>) -> Result<&Self> {
		let parent = target.into().resolve()?;
		parent.append_child(&self.node)?;
		Ok(self)
	}

	/// Detaches the element from the document.
	pub fn remove(&self) {
		self.node.remove();
	}

	/// Text content.
	pub fn get_text(&self) -> String {
		self.node.text_content()
	}

	/// Inner markup.
	pub fn get_html(&self) -> String {
		self.node.inner_html()
	}

	/// Attribute value.
	pub fn get_attr(&self, name: &str) -> Option<String> {
		self.node.attribute(name)
	}

	/// Inline style value, empty when unset.
	pub fn get_style(&self, property: &str) -> String {
		self.node.style_property(&css_property_name(property))
	}

	/// Returns `true` when the element has `class`.
	pub fn has_class(&self, class: &str) -> bool {
		self.node.has_class(class)
	}
}

impl<K: ElementKind> AsNode for Element<K> {
	fn as_node(&self) -> &Node {
		&self.node
	}
}

impl<K: ElementKind> PartialEq for Element<K> {
	fn eq(&self, other: &Self) -> bool {
		self.node.is_same_node(&other.node)
	}
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
	use super::*;
	use crate::kinds::{Button, Div, Paragraph};
	use rstest::rstest;
	use std::cell::RefCell;
	use std::rc::Rc;

	#[rstest]
	fn test_mutators_chain_on_same_instance() {
		let element = Element::<Div>::new().unwrap();
		let chained = element
			.id("card")
			.attr(&[("data-role", "panel"), ("title", "Card")])
			.add_class("card  shadow")
			.style(&[("fontSize", "12px")]);

		assert!(core::ptr::eq(chained, &element));
		assert_eq!(element.get_attr("id").as_deref(), Some("card"));
		assert_eq!(element.get_attr("data-role").as_deref(), Some("panel"));
		assert!(element.has_class("card") && element.has_class("shadow"));
		assert_eq!(element.get_style("fontSize"), "12px");
		assert_eq!(element.get_style("font-size"), "12px");
	}

	#[rstest]
	fn test_add_class_skips_duplicates() {
		let element = Element::<Div>::new().unwrap();
		element.add_class("a b").add_class("b c");
		assert_eq!(element.get_attr("class").as_deref(), Some("a b c"));

		element.remove_class("a  c missing");
		assert_eq!(element.get_attr("class").as_deref(), Some("b"));
	}

	#[rstest]
	fn test_create_checks_kind() {
		assert!(Element::<Paragraph>::create("p").is_ok());
		assert!(matches!(
			Element::<Paragraph>::create("div"),
			Err(Error::Dom(_))
		));
		assert!(Element::<Generic>::create("custom-widget").is_ok());
	}

	#[rstest]
	fn test_try_from_node_checks_kind() {
		let node = Document::global().create_element("button").unwrap();
		assert!(Element::<Button>::try_from_node(node.clone()).is_ok());
		assert!(Element::<Div>::try_from_node(node.clone()).is_err());
		assert_eq!(Element::from_node(node).kind(), Kind::Button);
	}

	#[rstest]
	fn test_when_passes_element_and_event() {
		let button = Element::<Button>::new().unwrap();
		let clicks = Rc::new(RefCell::new(Vec::new()));
		let sink = clicks.clone();
		button.text("Go").when("click", move |target, event| {
			sink.borrow_mut()
				.push(format!("{}:{}", target.get_text(), event.event_type()));
			target.text("Gone");
		});

		button.node().dispatch_event("click");

		assert_eq!(*clicks.borrow(), vec!["Go:click"]);
		assert_eq!(button.get_text(), "Gone");
	}

	#[rstest]
	fn test_insert_in_selector() {
		let host = Element::<Div>::new().unwrap();
		host.id("insert-host").insert_in(&Document::global().body().unwrap());
		let child = Element::<Paragraph>::new().unwrap();

		child.text("hello").insert_in("#insert-host");

		assert_eq!(host.get_html(), "<p>hello</p>");
	}

	#[rstest]
	fn test_try_insert_in_missing_container() {
		let child = Element::<Paragraph>::new().unwrap();
		let result = child.try_insert_in("#nowhere");
		assert!(matches!(result, Err(Error::ContainerNotFound(selector)) if selector == "#nowhere"));

		// The logging form keeps the element usable
		child.insert_in("#nowhere").text("still here");
		assert_eq!(child.get_text(), "still here");
	}

	#[rstest]
	fn test_remove_detaches() {
		let parent = Element::<Div>::new().unwrap();
		let child = Element::<Paragraph>::new().unwrap();
		parent.append(&child);
		assert_eq!(parent.node().children().len(), 1);

		child.remove();

		assert!(parent.node().children().is_empty());
	}

	mod class_tokens {
		use super::*;
		use proptest::prelude::*;

		proptest! {
			#[test]
			fn add_class_never_duplicates(tokens in proptest::collection::vec("[a-z]{1,6}", 0..8)) {
				let element = Element::<Div>::new().unwrap();
				let joined = tokens.join("  ");
				element.add_class(&joined).add_class(&joined);

				let class = element.get_attr("class").unwrap_or_default();
				let mut seen: Vec<&str> = class.split_whitespace().collect();
				let total = seen.len();
				seen.sort_unstable();
				seen.dedup();
				prop_assert_eq!(seen.len(), total);
				for token in &tokens {
					prop_assert!(element.has_class(token));
				}
			}
		}
	}
}

//! `web-sys` backend for `wasm32`.

use bunny_core::{Error, Result, warn_log};
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use web_sys::{DocumentReadyState, HtmlElement, HtmlInputElement};

use super::ReadyState;

/// Browser event passed to listeners.
pub type Event = web_sys::Event;

/// Returns the element whose listener is currently handling `event`.
pub fn current_target(event: &Event) -> Option<Node> {
	event
		.current_target()
		.and_then(|target| target.dyn_into::<web_sys::Element>().ok())
		.map(Node)
}

fn describe(error: &JsValue) -> String {
	error.as_string().unwrap_or_else(|| format!("{error:?}"))
}

fn dom_error(error: JsValue) -> Error {
	Error::Dom(describe(&error))
}

fn selector_error(selector: &str, error: JsValue) -> Error {
	Error::InvalidSelector(format!("{selector}: {}", describe(&error)))
}

/// Handle to a browser element.
#[derive(Clone)]
pub struct Node(web_sys::Element);

impl Node {
	/// Wraps a raw `web_sys::Element`.
	pub fn from_element(element: web_sys::Element) -> Self {
		Self(element)
	}

	/// The underlying `web_sys::Element`.
	pub fn as_element(&self) -> &web_sys::Element {
		&self.0
	}

	fn html_element(&self) -> Result<&HtmlElement> {
		self.0
			.dyn_ref::<HtmlElement>()
			.ok_or_else(|| Error::Dom(format!("<{}> has no inline style", self.tag_name())))
	}

	/// Lower-case tag name.
	pub fn tag_name(&self) -> String {
		self.0.tag_name().to_ascii_lowercase()
	}

	/// Sets an attribute.
	pub fn set_attribute(&self, name: &str, value: &str) -> Result<()> {
		self.0.set_attribute(name, value).map_err(dom_error)
	}

	/// Reads an attribute.
	pub fn attribute(&self, name: &str) -> Option<String> {
		self.0.get_attribute(name)
	}

	/// Removes an attribute if present.
	pub fn remove_attribute(&self, name: &str) {
		if let Err(error) = self.0.remove_attribute(name) {
			warn_log!("remove_attribute('{}') failed: {}", name, describe(&error));
		}
	}

	/// Sets one inline style property. An empty value removes it.
	pub fn set_style_property(&self, property: &str, value: &str) -> Result<()> {
		let style = self.html_element()?.style();
		if value.trim().is_empty() {
			style.remove_property(property).map(drop).map_err(dom_error)
		} else {
			style.set_property(property, value).map_err(dom_error)
		}
	}

	/// Reads one inline style property, empty when unset.
	pub fn style_property(&self, property: &str) -> String {
		self.html_element()
			.ok()
			.and_then(|element| element.style().get_property_value(property).ok())
			.unwrap_or_default()
	}

	/// Adds one class token.
	pub fn add_class(&self, class: &str) {
		if let Err(error) = self.0.class_list().add_1(class) {
			warn_log!("add_class('{}') failed: {}", class, describe(&error));
		}
	}

	/// Removes one class token.
	pub fn remove_class(&self, class: &str) {
		if let Err(error) = self.0.class_list().remove_1(class) {
			warn_log!("remove_class('{}') failed: {}", class, describe(&error));
		}
	}

	/// Returns `true` when the class list contains `class`.
	pub fn has_class(&self, class: &str) -> bool {
		self.0.class_list().contains(class)
	}

	/// Replaces all children with a single text node.
	pub fn set_text_content(&self, text: &str) {
		self.0.set_text_content(Some(text));
	}

	/// Concatenated text of all descendants.
	pub fn text_content(&self) -> String {
		self.0.text_content().unwrap_or_default()
	}

	/// Replaces all children with parsed markup.
	pub fn set_inner_html(&self, html: &str) {
		self.0.set_inner_html(html);
	}

	/// Serialized children.
	pub fn inner_html(&self) -> String {
		self.0.inner_html()
	}

	/// Serialized element including its own tag.
	pub fn outer_html(&self) -> String {
		self.0.outer_html()
	}

	/// Appends `child`, moving it out of its current parent first.
	pub fn append_child(&self, child: &Node) -> Result<()> {
		self.0.append_child(&child.0).map(drop).map_err(dom_error)
	}

	/// Parent element, if attached.
	pub fn parent_element(&self) -> Option<Node> {
		self.0.parent_element().map(Node)
	}

	/// Element children in document order.
	pub fn children(&self) -> Vec<Node> {
		let collection = self.0.children();
		(0..collection.length())
			.filter_map(|index| collection.item(index))
			.map(Node)
			.collect()
	}

	/// Detaches the element from its parent.
	pub fn remove(&self) {
		self.0.remove();
	}

	/// Registers `listener` for `event_type`. The closure is leaked so it
	/// lives as long as the page.
	pub fn add_event_listener(&self, event_type: &str, listener: impl FnMut(&Event) + 'static) {
		let mut listener = listener;
		let closure = Closure::<dyn FnMut(Event)>::new(move |event: Event| listener(&event));
		if let Err(error) = self
			.0
			.add_event_listener_with_callback(event_type, closure.as_ref().unchecked_ref())
		{
			warn_log!(
				"add_event_listener('{}') failed: {}",
				event_type,
				describe(&error)
			);
		}
		closure.forget();
	}

	/// Sets the live value of an `<input>`; other elements get a `value`
	/// attribute.
	pub fn set_value(&self, value: &str) {
		match self.0.dyn_ref::<HtmlInputElement>() {
			Some(input) => input.set_value(value),
			None => {
				if let Err(error) = self.0.set_attribute("value", value) {
					warn_log!("set_value on <{}> failed: {}", self.tag_name(), describe(&error));
				}
			}
		}
	}

	/// Live value of an `<input>`, or the `value` attribute of other elements.
	pub fn value(&self) -> String {
		match self.0.dyn_ref::<HtmlInputElement>() {
			Some(input) => input.value(),
			None => self.attribute("value").unwrap_or_default(),
		}
	}

	/// Returns `true` when both handles refer to the same element.
	pub fn is_same_node(&self, other: &Node) -> bool {
		let other: &web_sys::Node = &other.0;
		self.0.is_same_node(Some(other))
	}

	/// Returns `true` when this element matches `selector`.
	pub fn matches(&self, selector: &str) -> Result<bool> {
		self.0
			.matches(selector)
			.map_err(|error| selector_error(selector, error))
	}

	/// First descendant matching `selector`.
	pub fn query_selector(&self, selector: &str) -> Result<Option<Node>> {
		self.0
			.query_selector(selector)
			.map(|found| found.map(Node))
			.map_err(|error| selector_error(selector, error))
	}

	/// Every descendant matching `selector`, in document order.
	pub fn query_selector_all(&self, selector: &str) -> Result<Vec<Node>> {
		let list = self
			.0
			.query_selector_all(selector)
			.map_err(|error| selector_error(selector, error))?;
		Ok(collect_elements(&list))
	}
}

fn collect_elements(list: &web_sys::NodeList) -> Vec<Node> {
	(0..list.length())
		.filter_map(|index| list.get(index))
		.filter_map(|node| node.dyn_into::<web_sys::Element>().ok())
		.map(Node)
		.collect()
}

impl PartialEq for Node {
	fn eq(&self, other: &Self) -> bool {
		self.is_same_node(other)
	}
}

impl core::fmt::Debug for Node {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		write!(f, "Node(<{}>)", self.tag_name())
	}
}

/// The page's `document`.
#[derive(Clone, Debug)]
pub struct Document(web_sys::Document);

impl Document {
	/// Returns the page's document.
	///
	/// # Panics
	///
	/// Panics when called outside a browser window.
	pub fn global() -> Self {
		match Self::try_global() {
			Ok(document) => document,
			Err(error) => panic!("{error}"),
		}
	}

	/// Returns the page's document, or an error outside a browser window.
	pub fn try_global() -> Result<Self> {
		web_sys::window()
			.and_then(|window| window.document())
			.map(Self)
			.ok_or_else(|| Error::Dom("no global document".to_string()))
	}

	/// Creates a detached element.
	pub fn create_element(&self, tag: &str) -> Result<Node> {
		self.0.create_element(tag).map(Node).map_err(dom_error)
	}

	/// The `<html>` element.
	pub fn document_element(&self) -> Option<Node> {
		self.0.document_element().map(Node)
	}

	/// The `<head>` element.
	pub fn head(&self) -> Result<Node> {
		self.0
			.head()
			.map(|head| Node(head.into()))
			.ok_or_else(|| Error::Dom("document has no <head>".to_string()))
	}

	/// The `<body>` element.
	pub fn body(&self) -> Result<Node> {
		self.0
			.body()
			.map(|body| Node(body.into()))
			.ok_or_else(|| Error::Dom("document has no <body>".to_string()))
	}

	/// First element of the document matching `selector`.
	pub fn query_selector(&self, selector: &str) -> Result<Option<Node>> {
		self.0
			.query_selector(selector)
			.map(|found| found.map(Node))
			.map_err(|error| selector_error(selector, error))
	}

	/// Every element of the document matching `selector`.
	pub fn query_selector_all(&self, selector: &str) -> Result<Vec<Node>> {
		let list = self
			.0
			.query_selector_all(selector)
			.map_err(|error| selector_error(selector, error))?;
		Ok(collect_elements(&list))
	}

	/// Current loading phase.
	pub fn ready_state(&self) -> ReadyState {
		match self.0.ready_state() {
			DocumentReadyState::Loading => ReadyState::Loading,
			DocumentReadyState::Interactive => ReadyState::Interactive,
			_ => ReadyState::Complete,
		}
	}

	/// Runs `callback` once on `DOMContentLoaded`.
	pub fn on_content_loaded(&self, callback: impl FnOnce() + 'static) {
		let closure = Closure::once_into_js(callback);
		if let Err(error) = self
			.0
			.add_event_listener_with_callback("DOMContentLoaded", closure.unchecked_ref())
		{
			warn_log!("DOMContentLoaded listener failed: {}", describe(&error));
		}
	}

	/// Runs `callback` after `delay_ms` milliseconds.
	pub fn defer(&self, delay_ms: u32, callback: impl FnOnce() + 'static) {
		gloo_timers::callback::Timeout::new(delay_ms, callback).forget();
	}
}
